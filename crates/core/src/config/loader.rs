//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-local configuration files, checked in order.
pub const CONFIG_CANDIDATES: [&str; 3] = [".territory.toml", "territory.toml", ".config/territory.toml"];

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed settings
    pub schema: ConfigSchema,
    /// File the settings came from, `None` for built-in defaults
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist. Without one, the project-local candidates
    /// and then `<user config dir>/territory/config.toml` are tried.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = if let Some(ref p) = config_path {
            debug!(path = %p.display(), "Loading configuration");
            load_config_file(p)?
        } else {
            debug!("No configuration file found, using defaults");
            ConfigSchema::default()
        };

        schema.validate()?;

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Load with defaults only (no file)
    pub fn defaults() -> Self {
        Self::default()
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .chain(dirs::config_dir().map(|d| d.join("territory").join("config.toml")))
        .find(|p| p.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path.display(), e)).with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::from(e).with_context(format!("While parsing {}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = Config::defaults();
        assert!(config.path.is_none());
        assert_eq!(config.schema.scoring.default_weight, 1.0);
    }

    #[test]
    fn test_config_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scoring.weights]\njob = 2.5\n\n[output]\ninclude_points = true").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.path.as_deref(), Some(file.path()));
        assert_eq!(config.schema.scoring.weights["job"], 2.5);
        assert!(config.schema.output.include_points);
    }

    #[test]
    fn test_config_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/territory.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_config_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scoring\ndefault_weight = ").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_config_rejects_invalid_weight() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scoring]\ndefault_weight = -2.0").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
    }
}
