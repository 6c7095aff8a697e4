//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/taxedit/taxedit.toml`
//! 3. Local config: `./.taxedit.toml` (working directory)
//! 4. Environment variables: `TAXEDIT_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::DEFAULT_EXPORT_FILE;
use crate::application::ApplicationError;
use crate::domain::LevelCap;

/// Unified configuration for taxedit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// File name offered for exports (default: taxonomy_updated.json)
    pub export_file: String,
    /// Depth filter applied when a session starts ("all" or 1..N)
    pub default_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_file: DEFAULT_EXPORT_FILE.to_string(),
            default_level: "all".to_string(),
        }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect
/// "not specified" during layered merging).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub export_file: Option<String>,
    pub default_level: Option<String>,
}

/// Get the XDG config directory for taxedit.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "taxedit").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("taxedit.toml"))
}

/// Get the path to the local config file in the working directory.
pub fn local_config_path() -> PathBuf {
    PathBuf::from(".taxedit.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// The startup depth cap parsed from `default_level`.
    pub fn default_cap(&self) -> Result<LevelCap, ApplicationError> {
        self.default_level
            .parse::<LevelCap>()
            .map_err(|message| ApplicationError::Config { message })
    }

    /// Overlay wins where it specifies a value, base otherwise.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            export_file: overlay
                .export_file
                .clone()
                .unwrap_or_else(|| self.export_file.clone()),
            default_level: overlay
                .default_level
                .clone()
                .unwrap_or_else(|| self.default_level.clone()),
        }
    }

    /// Apply TAXEDIT_* environment variables as explicit overrides.
    ///
    /// Env vars replace values (not merge) - they are explicit user overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(Environment::with_prefix("TAXEDIT"));
        let config = builder.build().map_err(config_err)?;

        // Apply individual env vars if set (they replace, not merge)
        if let Ok(val) = config.get_string("export_file") {
            settings.export_file = val;
        }
        if let Ok(val) = config.get_string("default_level") {
            settings.default_level = val;
        }

        Ok(settings)
    }

    /// Load settings with full layering.
    pub fn load() -> Result<Self, ApplicationError> {
        let mut settings = Settings::default();

        if let Some(global) = global_config_path() {
            if global.exists() {
                settings = settings.merge_with(&load_raw_settings(&global)?);
            }
        }

        let local = local_config_path();
        if local.exists() {
            settings = settings.merge_with(&load_raw_settings(&local)?);
        }

        let settings = Self::apply_env_overrides(settings)?;
        // Fail early on an unusable default_level rather than at session start.
        settings.default_cap()?;
        Ok(settings)
    }

    /// TOML template with the compiled defaults, for `config init`.
    pub fn template() -> Result<String, ApplicationError> {
        toml::to_string_pretty(&Settings::default()).map_err(|e| ApplicationError::Config {
            message: format!("render config template: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.export_file, "taxonomy_updated.json");
        assert_eq!(settings.default_cap().unwrap(), LevelCap::All);
    }

    #[test]
    fn test_overlay_wins_where_specified() {
        let base = Settings::default();
        let overlay = RawSettings {
            export_file: Some("out.json".to_string()),
            default_level: None,
        };
        let merged = base.merge_with(&overlay);
        assert_eq!(merged.export_file, "out.json");
        assert_eq!(merged.default_level, "all");
    }

    #[test]
    fn test_env_override_replaces_value() {
        std::env::set_var("TAXEDIT_EXPORT_FILE", "from_env.json");
        let settings = Settings::apply_env_overrides(Settings::default()).unwrap();
        std::env::remove_var("TAXEDIT_EXPORT_FILE");
        assert_eq!(settings.export_file, "from_env.json");
        assert_eq!(settings.default_level, "all");
    }

    #[test]
    fn test_template_parses_back() {
        let template = Settings::template().unwrap();
        let parsed: Settings = toml::from_str(&template).unwrap();
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn test_invalid_default_level_is_config_error() {
        let settings = Settings {
            default_level: "deep".to_string(),
            ..Settings::default()
        };
        assert!(settings.default_cap().is_err());
    }
}
