//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `StreamerConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("detstream.toml")).unwrap();
//! println!("Batch size: {}", config.streamer.batch_size);
//! ```

mod parser;
mod validator;

pub use contracts::StreamerConfig;
pub use parser::ConfigFormat;

use contracts::StreamerError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<StreamerConfig, StreamerError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<StreamerConfig, StreamerError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Serialize StreamerConfig to TOML string
    pub fn to_toml(config: &StreamerConfig) -> Result<String, StreamerError> {
        toml::to_string_pretty(config)
            .map_err(|e| StreamerError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize StreamerConfig to JSON string
    pub fn to_json(config: &StreamerConfig) -> Result<String, StreamerError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| StreamerError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, StreamerError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            StreamerError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            StreamerError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, StreamerError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
[streamer]
source_identifier = "none"
batch_size = 10
max_consecutive_incomplete = 5

[event_source]
type = "internal"
number_of_events = 100

[data_sources.detector]
type = "random_array"
shape = [4, 4]
element_type = "float"

[data_sources.timestamp]
type = "timestamp"

[serializer]
format = "json"

[[sinks]]
name = "files"
type = "file"
write_directory = "./output"
file_suffix = "bin"

[[sinks]]
name = "push"
type = "network"
urls = ["127.0.0.1:5555"]
role = "client"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.streamer.batch_size, 10);
        assert_eq!(config.data_sources.len(), 2);
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.streamer.batch_size, config2.streamer.batch_size);
        assert_eq!(config.sinks.len(), config2.sinks.len());
        assert_eq!(config.sinks[0].name, config2.sinks[0].name);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.streamer.batch_size, config2.streamer.batch_size);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Duplicate sink name should fail validation
        let content = MINIMAL_TOML.replace("name = \"push\"", "name = \"files\"");
        let result = ConfigLoader::load_from_str(&content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }
}
