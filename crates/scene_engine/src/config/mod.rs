//! Configuration system
//!
//! Scene settings and entity templates are plain serde types stored as TOML
//! or RON. [`ConfigFormat`] picks the syntax from the file extension and the
//! [`Config`] trait adds file loading and saving on top of it.

pub use serde::{Deserialize, Serialize};

use crate::foundation::diagnostics::DiagnosticLog;
use std::path::{Path, PathBuf};

/// On-disk syntax of a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Format matching the extension of `path`
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Deserialize `text` in this format
    pub fn parse<T: for<'de> Deserialize<'de>>(self, text: &str) -> Result<T, String> {
        match self {
            Self::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            Self::Ron => ron::from_str(text).map_err(|e| e.to_string()),
        }
    }

    /// Serialize `value` as pretty-printed text in this format
    pub fn render<T: Serialize>(self, value: &T) -> Result<String, String> {
        match self {
            Self::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
                .map_err(|e| e.to_string()),
        }
    }
}

/// Serde type that can be stored as a TOML or RON file
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load from `path`; missing fields take their defaults when the type
    /// uses `#[serde(default)]`
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = format.parse(&text).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save to `path` in the format named by its extension
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = ConfigFormat::from_path(path)?
            .render(self)
            .map_err(ConfigError::Serialize)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("cannot access {}: {source}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The file contents do not match the target type
    #[error("cannot parse {}: {message}", path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// The value could not be serialized
    #[error("cannot serialize configuration: {0}")]
    Serialize(String),

    /// The extension names neither TOML nor RON
    #[error("unsupported configuration format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// # Scene Configuration
///
/// Controls logging and how diagnostics raised by a [`World`](crate::ecs::World)
/// are surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Log filter used by applications when initialising logging
    pub log_level: String,
    /// Forward every diagnostic to the `log` facade as it is raised
    pub echo_diagnostics: bool,
    /// Keep diagnostics in the world's log for later inspection
    pub retain_diagnostics: bool,
}

impl SceneConfig {
    /// Build the diagnostic log described by this configuration
    pub fn diagnostic_log(&self) -> DiagnosticLog {
        DiagnosticLog::new()
            .with_echo(self.echo_diagnostics)
            .with_retention(self.retain_diagnostics)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            echo_diagnostics: true,
            retain_diagnostics: true,
        }
    }
}

impl Config for SceneConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("scene_engine_{}_{name}", std::process::id()))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SceneConfig = toml::from_str("log_level = \"debug\"").expect("valid toml");
        assert_eq!(config.log_level, "debug");
        assert!(config.echo_diagnostics);
        assert!(config.retain_diagnostics);
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = temp_path("scene.ron");
        let config = SceneConfig {
            log_level: "warn".to_string(),
            echo_diagnostics: false,
            retain_diagnostics: true,
        };
        config.save_to_file(&path).expect("save should succeed");
        let loaded = SceneConfig::load_from_file(&path).expect("load should succeed");
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let path = temp_path("scene.toml");
        let config = SceneConfig::default();
        config.save_to_file(&path).expect("save should succeed");
        let loaded = SceneConfig::load_from_file(&path).expect("load should succeed");
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_format_follows_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("scene.TOML")).ok(), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_path(Path::new("a/b.ron")).ok(), Some(ConfigFormat::Ron));
        assert!(ConfigFormat::from_path(Path::new("scene")).is_err());
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let path = temp_path("broken.ron");
        std::fs::write(&path, "(log_level: ").expect("temp file writable");
        let error = SceneConfig::load_from_file(&path).expect_err("truncated ron");
        assert!(matches!(&error, ConfigError::Parse { path: failed, .. } if failed.to_string_lossy().ends_with("broken.ron")));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = SceneConfig::default().save_to_file(&temp_path("scene.yaml"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
