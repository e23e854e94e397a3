//! Configuration using Figment
//!
//! Configuration is layered, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. An optional TOML file (`config/andor.toml` by default)
//! 3. Environment variables prefixed with `ANDOR_`, `__` separating sections
//!
//! ```text
//! ANDOR_LIBRARY__PATH="C:/Program Files/Andor SDK/atmcd64d.dll"
//! ANDOR_LIBRARY__INIT_DIR="C:/Program Files/Andor SDK"
//! ANDOR_LOGGING__LEVEL=debug
//! ```
//!
//! # Example
//!
//! ```toml
//! [library]
//! path = "lib/atmcd64d.dll"
//! init_dir = "."
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

use crate::error::{AndorError, AndorResult};
use andor_sys::DEFAULT_LIBRARY_PATH;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/andor.toml";

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "ANDOR_";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AndorConfig {
    /// `[library]` section.
    #[serde(default)]
    pub library: LibraryConfig,
    /// `[logging]` section.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the driver lives and how to start it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Path to `atmcd64d.dll` (or `libandor.so`)
    #[serde(default = "default_library_path")]
    pub path: PathBuf,
    /// Directory handed to `Initialize`; must contain `detector.ini`
    #[serde(default = "default_init_dir")]
    pub init_dir: PathBuf,
}

/// Logging settings for the binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of the human format
    #[serde(default)]
    pub json: bool,
}

fn default_library_path() -> PathBuf {
    PathBuf::from(DEFAULT_LIBRARY_PATH)
}

fn default_init_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: default_library_path(),
            init_dir: default_init_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AndorConfig {
    /// Base figment: defaults, then `path` if it exists, then the environment.
    ///
    /// Only `ANDOR_<SECTION>__<KEY>` variables are read. A bare
    /// `ANDOR_LIBRARY` would otherwise replace the whole `library` table
    /// with a string.
    pub fn figment<P: AsRef<Path>>(path: P) -> Figment {
        Figment::from(Serialized::defaults(AndorConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .filter(|key| key.as_str().contains("__"))
                    .split("__"),
            )
    }

    /// Load from `config/andor.toml` and the environment.
    pub fn load() -> AndorResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from a specific file and the environment, then validate.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AndorResult<Self> {
        let config: Self = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks:
    /// - `logging.level` is a known level
    /// - `library.path` is not empty
    pub fn validate(&self) -> AndorResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(AndorError::Configuration(format!(
                "Invalid logging.level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            )));
        }

        if self.library.path.as_os_str().is_empty() {
            return Err(AndorError::Configuration(
                "library.path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AndorConfig::default();
        assert_eq!(config.library.path, PathBuf::from("lib/atmcd64d.dll"));
        assert_eq!(config.logging.level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn test_rejects_unknown_level() {
        let mut config = AndorConfig::default();
        config.logging.level = "verbose".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("verbose"));
    }

    #[test]
    fn test_rejects_empty_library_path() {
        let mut config = AndorConfig::default();
        config.library.path = PathBuf::new();
        assert!(matches!(config.validate(), Err(AndorError::Configuration(_))));
    }
}
