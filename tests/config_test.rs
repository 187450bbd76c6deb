//! Integration tests for Settings loading with layered precedence.
//!
//! Layers: defaults, global config, local `.graphphys.toml` next to the
//! document, then `GRAPHPHYS_*` environment variables. These tests only
//! write local configs (temp directories).

use std::fs;
use std::sync::Mutex;

use tempfile::TempDir;

use graphphys::application::ApplicationError;
use graphphys::config::{local_config_path, Settings};

/// Serializes tests that read or write GRAPHPHYS_* variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "database = \"particles.toml\"\nmax_alternatives = 250\n",
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.max_alternatives, 250);
    assert_eq!(settings.database, Some(dir.path().join("particles.toml")));
}

#[test]
fn given_env_var_when_load_then_replaces_local_value() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "max_alternatives = 250\n").unwrap();
    std::env::set_var("GRAPHPHYS_MAX_ALTERNATIVES", "42");

    // Act
    let result = Settings::load(Some(dir.path()));
    std::env::remove_var("GRAPHPHYS_MAX_ALTERNATIVES");

    // Assert
    assert_eq!(result.unwrap().max_alternatives, 42);
}

#[test]
fn given_negative_env_ceiling_when_load_then_config_error() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    std::env::set_var("GRAPHPHYS_MAX_ALTERNATIVES", "-1");

    let result = Settings::load(Some(dir.path()));
    std::env::remove_var("GRAPHPHYS_MAX_ALTERNATIVES");

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_malformed_local_config_when_load_then_config_error() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "max_alternatives = [").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_template_when_parsed_then_yields_defaults() {
    let parsed: Settings = toml::from_str(&Settings::template()).unwrap();

    assert_eq!(parsed, Settings::default());
}
