//! Configuration validation module
//!
//! Validation rules:
//! - batch_size >= 1
//! - max_consecutive_incomplete >= 1
//! - at least one data source
//! - random_array sources have a non-empty shape
//! - sink names unique and non-empty, at least one sink
//! - network sinks have at least one parseable socket address
//! - preprocessing pad targets >= 1

use std::collections::HashSet;
use std::net::SocketAddr;

use contracts::{DataSourceConfig, SinkKindConfig, StreamerConfig, StreamerError};

/// Validate a StreamerConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &StreamerConfig) -> Result<(), StreamerError> {
    validate_streamer_section(config)?;
    validate_data_sources(config)?;
    validate_preprocessing(config)?;
    validate_sinks(config)?;
    Ok(())
}

fn validate_streamer_section(config: &StreamerConfig) -> Result<(), StreamerError> {
    if config.streamer.batch_size < 1 {
        return Err(StreamerError::config_validation(
            "streamer.batch_size",
            "batch_size must be >= 1",
        ));
    }
    if config.streamer.max_consecutive_incomplete < 1 {
        return Err(StreamerError::config_validation(
            "streamer.max_consecutive_incomplete",
            "max_consecutive_incomplete must be >= 1",
        ));
    }
    Ok(())
}

fn validate_data_sources(config: &StreamerConfig) -> Result<(), StreamerError> {
    if config.data_sources.is_empty() {
        return Err(StreamerError::config_validation(
            "data_sources",
            "at least one data source must be configured",
        ));
    }
    for (name, source) in &config.data_sources {
        if let DataSourceConfig::RandomArray { shape, .. } = source {
            if shape.is_empty() {
                return Err(StreamerError::config_validation(
                    format!("data_sources.{name}.shape"),
                    "shape must have at least one dimension",
                ));
            }
            if shape.contains(&0) {
                return Err(StreamerError::config_validation(
                    format!("data_sources.{name}.shape"),
                    "shape dimensions must be non-zero",
                ));
            }
        }
    }
    Ok(())
}

fn validate_preprocessing(config: &StreamerConfig) -> Result<(), StreamerError> {
    if let Some(ref preprocessing) = config.preprocessing {
        if preprocessing.pad_height < 1 || preprocessing.pad_width < 1 {
            return Err(StreamerError::config_validation(
                "preprocessing.pad_height / preprocessing.pad_width",
                "pad targets must be >= 1",
            ));
        }
    }
    Ok(())
}

fn validate_sinks(config: &StreamerConfig) -> Result<(), StreamerError> {
    if config.sinks.is_empty() {
        return Err(StreamerError::config_validation(
            "sinks",
            "at least one sink must be configured",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, sink) in config.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(StreamerError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(StreamerError::config_validation(
                format!("sinks[{idx}].name"),
                format!("duplicate sink name '{}'", sink.name),
            ));
        }

        if let SinkKindConfig::Network { ref urls, .. } = sink.kind {
            if urls.is_empty() {
                return Err(StreamerError::config_validation(
                    format!("sinks[{idx}].urls"),
                    "network sink needs at least one URL",
                ));
            }
            for url in urls {
                if url.parse::<SocketAddr>().is_err() {
                    return Err(StreamerError::config_validation(
                        format!("sinks[{idx}].urls"),
                        format!("'{url}' is not a valid socket address"),
                    ));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigFormat, ConfigLoader};

    fn base_config() -> String {
        r#"
[streamer]
source_identifier = "none"
batch_size = 10

[event_source]
type = "internal"
number_of_events = 100

[data_sources.detector]
type = "random_array"
shape = [4, 4]
element_type = "float"

[serializer]
format = "json"

[[sinks]]
name = "log"
type = "log"
"#
        .to_string()
    }

    fn parse(content: &str) -> Result<StreamerConfig, StreamerError> {
        ConfigLoader::load_from_str(content, ConfigFormat::Toml)
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(parse(&base_config()).is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let content = base_config().replace("batch_size = 10", "batch_size = 0");
        let err = parse(&content).unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_zero_max_consecutive_rejected() {
        let content = base_config().replace(
            "batch_size = 10",
            "batch_size = 10\nmax_consecutive_incomplete = 0",
        );
        let err = parse(&content).unwrap_err();
        assert!(err.to_string().contains("max_consecutive_incomplete"));
    }

    #[test]
    fn test_empty_shape_rejected() {
        let content = base_config().replace("shape = [4, 4]", "shape = []");
        assert!(parse(&content).is_err());
    }

    #[test]
    fn test_missing_sinks_section_rejected() {
        let content = base_config().replace("[[sinks]]\nname = \"log\"\ntype = \"log\"\n", "");
        let err = parse(&content).unwrap_err();
        assert!(err.to_string().contains("at least one sink"));
    }

    #[test]
    fn test_empty_sink_list_rejected() {
        // Top-level `sinks = []` has to precede the first table
        let without_sinks =
            base_config().replace("[[sinks]]\nname = \"log\"\ntype = \"log\"\n", "");
        let content = format!("sinks = []\n{without_sinks}");
        let err = parse(&content).unwrap_err();
        assert!(err.to_string().contains("at least one sink"));
    }

    #[test]
    fn test_bad_network_url_rejected() {
        let content = format!(
            "{}\n[[sinks]]\nname = \"push\"\ntype = \"network\"\nurls = [\"not-an-addr\"]\n",
            base_config()
        );
        let err = parse(&content).unwrap_err();
        assert!(err.to_string().contains("socket address"));
    }
}
