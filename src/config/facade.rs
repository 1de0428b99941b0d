//! Public entry point for configuration loading.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::PalletizerConfig;
use crate::error::PalletizerError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): built-in defaults, global file,
    /// `config/config.toml`, `config/{PALLETIZER_ENV}.toml`, then
    /// `PALLETIZER__SECTION__KEY` environment variables.
    pub fn load(workspace_root: &Path) -> Result<PalletizerConfig, PalletizerError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: PalletizerConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from one explicit file, skipping the global and
    /// workspace files. Environment overrides still apply.
    pub fn load_from_file(path: &Path) -> Result<PalletizerConfig, PalletizerError> {
        if !path.exists() {
            return Err(PalletizerError::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder);

        let config: PalletizerConfig = builder.build()?.try_deserialize()?;
        debug!(path = %path.display(), "Configuration loaded from file");
        Ok(config)
    }

    /// Path of the user-level configuration file, if a home can be found.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
