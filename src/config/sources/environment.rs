//! Environment source: PALLETIZER__SECTION__KEY overrides.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Add the environment override source. `PALLETIZER_LOG*` and
/// `PALLETIZER_ENV` use a single underscore and are not picked up here.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("PALLETIZER")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
