//! Layered configuration loading through the public loader.

use super::test_utils::{write_workspace, ENV_MUTEX};
use palletizer::config::ValidationError;
use palletizer::ConfigLoader;
use tempfile::TempDir;

/// Points HOME and XDG_CONFIG_HOME at `home` for the duration of a test.
struct HomeGuard {
    home: Option<String>,
    xdg: Option<String>,
}

impl HomeGuard {
    fn set(home: &std::path::Path) -> Self {
        let guard = Self {
            home: std::env::var("HOME").ok(),
            xdg: std::env::var("XDG_CONFIG_HOME").ok(),
        };
        std::env::set_var("HOME", home);
        std::env::remove_var("XDG_CONFIG_HOME");
        guard
    }
}

impl Drop for HomeGuard {
    fn drop(&mut self) {
        match self.home.take() {
            Some(home) => std::env::set_var("HOME", home),
            None => std::env::remove_var("HOME"),
        }
        if let Some(xdg) = self.xdg.take() {
            std::env::set_var("XDG_CONFIG_HOME", xdg);
        }
    }
}

#[test]
fn test_defaults_without_any_files() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    let _home = HomeGuard::set(&temp_dir.path().join("home"));

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert_eq!(config.cell.robot, "Doosan Robotics H2017");
    assert_eq!(config.stack.retreat_distance, -50.0);
    assert_eq!(config.pacing.start_delay_ms, 2000);
    assert!(config.validate().is_ok());
}

#[test]
fn test_workspace_overrides_global_file() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    let home = temp_dir.path().join("home");
    let _home = HomeGuard::set(&home);

    let global_dir = home.join(".config").join("palletizer");
    std::fs::create_dir_all(&global_dir).unwrap();
    std::fs::write(
        global_dir.join("config.toml"),
        "[stack]\nbox_height = 180.0\nnum_layers = 6\n\n[cell]\nrobot = \"Cell Robot\"\n",
    )
    .unwrap();

    let workspace = temp_dir.path().join("ws");
    write_workspace(&workspace, "[stack]\nnum_layers = 2\n");

    let config = ConfigLoader::load(&workspace).unwrap();
    // Global values survive where the workspace is silent
    assert_eq!(config.stack.box_height, 180.0);
    assert_eq!(config.cell.robot, "Cell Robot");
    // Workspace wins on conflicts
    assert_eq!(config.stack.num_layers, 2);
}

#[test]
fn test_xdg_config_home_is_preferred() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    let _home = HomeGuard::set(&temp_dir.path().join("home"));
    let xdg = temp_dir.path().join("xdg");
    std::env::set_var("XDG_CONFIG_HOME", &xdg);

    let path = ConfigLoader::global_config_path().unwrap();
    assert_eq!(path, xdg.join("palletizer").join("config.toml"));
    std::env::remove_var("XDG_CONFIG_HOME");
}

#[test]
fn test_invalid_values_surface_in_validation() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    let _home = HomeGuard::set(&temp_dir.path().join("home"));
    write_workspace(
        temp_dir.path(),
        "[stack]\nbox_height = -1.0\n\n[motion]\njoint_speed = 0.0\n\n[targets]\npick = \"\"\n",
    );

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0], ValidationError::Targets(_)));
    assert!(matches!(errors[1], ValidationError::Motion(_)));
    assert_eq!(
        errors[2].to_string(),
        "stack: Invalid parameter box_height: must be a positive number, got -1"
    );
}

#[test]
fn test_malformed_file_is_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    let _home = HomeGuard::set(&temp_dir.path().join("home"));
    write_workspace(temp_dir.path(), "[stack]\nnum_layers = \"many\"\n");

    assert!(ConfigLoader::load(temp_dir.path()).is_err());
}
