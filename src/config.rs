//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/graphphys/graphphys.toml`
//! 3. Local config: `<document_dir>/.graphphys.toml`
//! 4. Environment variables: `GRAPHPHYS_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::DEFAULT_MAX_ALTERNATIVES;

/// Raw settings for intermediate parsing.
///
/// `None` means "not specified in this layer, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub database: Option<PathBuf>,
    pub max_alternatives: Option<usize>,
}

/// Unified configuration for graphphys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Particle database TOML file; no database when unset
    pub database: Option<PathBuf>,
    /// Ceiling on the number of trees one expansion may produce
    pub max_alternatives: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: None,
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
        }
    }
}

/// Get the XDG config directory for graphphys.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "graphphys").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("graphphys.toml"))
}

/// Get the path to the local config file next to a document.
pub fn local_config_path(document_dir: &Path) -> PathBuf {
    document_dir.join(".graphphys.toml")
}

/// Load a TOML file into RawSettings for manual merging.
///
/// A relative `database` path is taken relative to the file's directory.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    let mut raw: RawSettings = toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })?;
    if let (Some(database), Some(dir)) = (&raw.database, path.parent()) {
        let expanded = expand_path(database);
        if expanded.is_relative() {
            raw.database = Some(dir.join(expanded));
        }
    }
    Ok(raw)
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables are left as written.
fn expand_path(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    match shellexpand::full(text.as_ref()) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(text.as_ref()).as_ref()),
    }
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(database) = &self.database {
            self.database = Some(expand_path(database));
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            database: overlay.database.clone().or_else(|| self.database.clone()),
            max_alternatives: overlay.max_alternatives.unwrap_or(self.max_alternatives),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `document_dir` - Directory of the document being processed, for local config
    pub fn load(document_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Local config next to the document
        if let Some(dir) = document_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply GRAPHPHYS_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("GRAPHPHYS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("database") {
            settings.database = Some(PathBuf::from(val));
        }
        match config.get_int("max_alternatives") {
            Ok(val) => {
                settings.max_alternatives = usize::try_from(val).map_err(|_| ApplicationError::Config {
                    message: format!("max_alternatives must not be negative, got {val}"),
                })?;
            }
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# graphphys configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/graphphys/graphphys.toml
#   Local:  <document_dir>/.graphphys.toml
#   Env:    GRAPHPHYS_* environment variables

# Particle database (TOML). Relative paths are resolved against this file.
# database = "~/physics/particles.toml"

# Refuse expansions producing more alternative trees than this
# max_alternatives = 10000
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
