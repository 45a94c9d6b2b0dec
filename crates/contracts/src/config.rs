//! StreamerConfig - Config Loader output
//!
//! Describes one worker's full pipeline: event source, per-field data
//! sources, batching, optional preprocessing, serializer, and output sinks.
//!
//! Component selection uses tagged enums: a closed, explicit mapping from the
//! configuration discriminator to a constructor, validated exhaustively at
//! parse time.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ElementType;

/// Complete pipeline configuration for one worker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamerConfig {
    /// Top-level streamer settings
    pub streamer: StreamerSection,

    /// Event source selection
    pub event_source: EventSourceConfig,

    /// Field name -> data source definition
    pub data_sources: BTreeMap<String, DataSourceConfig>,

    /// Optional per-field preprocessing applied by the batching stage
    #[serde(default)]
    pub preprocessing: Option<PreprocessingConfig>,

    /// Serializer selection
    pub serializer: SerializerConfig,

    /// Output sinks, opened in configuration order
    ///
    /// A missing or empty list parses fine and is rejected by validation,
    /// which reports "at least one sink" instead of a bare parse error.
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Top-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamerSection {
    /// Facility source identifier, passed through to event sources
    pub source_identifier: String,

    /// Number of events accumulated per batch, must be >= 1
    pub batch_size: usize,

    /// Consecutive incomplete events tolerated before early stop, must be >= 1
    ///
    /// A value of 1 means "fail on first missing field".
    #[serde(default = "default_max_consecutive_incomplete")]
    pub max_consecutive_incomplete: u64,
}

fn default_max_consecutive_incomplete() -> u64 {
    100
}

/// Event source selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum EventSourceConfig {
    /// Framework-free synthetic source, driven by the configured data sources
    Internal {
        /// Total events generated across the whole worker pool
        number_of_events: u64,
    },
}

/// Per-field data source definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum DataSourceConfig {
    /// Random array of a fixed shape and element type
    RandomArray {
        shape: Vec<usize>,
        element_type: ElementType,
        /// Every Nth event yields an absent value (exercises the filter)
        #[serde(default)]
        missing_every: Option<u64>,
    },

    /// Scalar epoch timestamp, shape (1,)
    Timestamp,
}

/// Preprocessing settings for the batching stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreprocessingConfig {
    /// Target height for 2-D (image-like) fields
    pub pad_height: usize,

    /// Target width for 2-D (image-like) fields
    pub pad_width: usize,

    /// Zero-padding placement
    #[serde(default)]
    pub pad_style: PadStyle,

    /// Insert a channel axis into 3-D stacked arrays: (B, H, W) -> (B, 1, H, W)
    #[serde(default)]
    pub add_channel_axis: bool,
}

/// Zero-padding placement for 2-D fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadStyle {
    /// Pad evenly on all sides
    #[default]
    Center,
    /// Pad below and to the right only
    BottomRight,
}

/// Serializer selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case", deny_unknown_fields)]
pub enum SerializerConfig {
    /// JSON (human-readable, larger)
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// One configured sink
///
/// Deserialized through a strict flat form (`SinkConfigRaw`) so that unknown
/// keys and keys belonging to a different transport are rejected at parse
/// time; `deny_unknown_fields` cannot be combined with the flattened tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SinkConfigRaw")]
pub struct SinkConfig {
    /// Unique sink name (used for logging/metrics and error reports)
    pub name: String,

    /// Transport-specific settings
    #[serde(flatten)]
    pub kind: SinkKindConfig,
}

/// Transport-specific sink settings
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkKindConfig {
    /// One file per dispatched block
    File {
        write_directory: PathBuf,
        file_prefix: String,
        file_suffix: String,
    },

    /// TCP push socket, length-prefixed blocks
    Network {
        /// Socket addresses; a client dials all of them and round-robins
        urls: Vec<String>,
        role: SocketRole,
    },

    /// Logs block sizes via tracing (debugging / dry runs)
    Log,
}

/// Network sink socket role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketRole {
    /// Bind and accept one peer
    #[default]
    Server,
    /// Dial every configured URL
    Client,
}

fn default_write_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_suffix() -> String {
    "bin".to_string()
}

/// Flat strict form of [`SinkConfig`]: every transport's keys side by side
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
struct SinkConfigRaw {
    name: String,
    #[serde(rename = "type")]
    transport: SinkTransport,
    write_directory: Option<PathBuf>,
    file_prefix: Option<String>,
    file_suffix: Option<String>,
    urls: Option<Vec<String>>,
    role: Option<SocketRole>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SinkTransport {
    File,
    Network,
    Log,
}

fn reject_key(sink: &str, key: &str, present: bool) -> Result<(), String> {
    if present {
        Err(format!(
            "sink '{sink}': key '{key}' does not apply to this sink type"
        ))
    } else {
        Ok(())
    }
}

impl TryFrom<SinkConfigRaw> for SinkConfig {
    type Error = String;

    fn try_from(raw: SinkConfigRaw) -> Result<Self, Self::Error> {
        let SinkConfigRaw {
            name,
            transport,
            write_directory,
            file_prefix,
            file_suffix,
            urls,
            role,
        } = raw;

        let kind = match transport {
            SinkTransport::File => {
                reject_key(&name, "urls", urls.is_some())?;
                reject_key(&name, "role", role.is_some())?;
                SinkKindConfig::File {
                    write_directory: write_directory.unwrap_or_else(default_write_directory),
                    file_prefix: file_prefix.unwrap_or_default(),
                    file_suffix: file_suffix.unwrap_or_else(default_file_suffix),
                }
            }
            SinkTransport::Network => {
                reject_key(&name, "write_directory", write_directory.is_some())?;
                reject_key(&name, "file_prefix", file_prefix.is_some())?;
                reject_key(&name, "file_suffix", file_suffix.is_some())?;
                let urls =
                    urls.ok_or_else(|| format!("sink '{name}': network sink requires 'urls'"))?;
                SinkKindConfig::Network {
                    urls,
                    role: role.unwrap_or_default(),
                }
            }
            SinkTransport::Log => {
                reject_key(&name, "write_directory", write_directory.is_some())?;
                reject_key(&name, "file_prefix", file_prefix.is_some())?;
                reject_key(&name, "file_suffix", file_suffix.is_some())?;
                reject_key(&name, "urls", urls.is_some())?;
                reject_key(&name, "role", role.is_some())?;
                SinkKindConfig::Log
            }
        };

        Ok(SinkConfig { name, kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
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
"#;

    #[test]
    fn test_minimal_config_parses() {
        let config: StreamerConfig = toml::from_str(MINIMAL_TOML).unwrap();
        assert_eq!(config.streamer.batch_size, 10);
        assert_eq!(config.streamer.max_consecutive_incomplete, 100);
        assert!(config.preprocessing.is_none());
        assert_eq!(config.sinks.len(), 1);
        assert!(matches!(config.sinks[0].kind, SinkKindConfig::Log));
    }

    #[test]
    fn test_unknown_field_rejected() {
        // Top-level keys must come before the first table
        let bad = format!("unknown_section = 1\n{MINIMAL_TOML}");
        assert!(toml::from_str::<StreamerConfig>(&bad).is_err());
    }

    #[test]
    fn test_unknown_sink_key_rejected() {
        let bad = format!("{MINIMAL_TOML}retries = 3\n");
        assert!(toml::from_str::<StreamerConfig>(&bad).is_err());
    }

    #[test]
    fn test_cross_transport_sink_key_rejected() {
        let toml_str = r#"
name = "files"
type = "file"
urls = ["127.0.0.1:5555"]
"#;
        let err = toml::from_str::<SinkConfig>(toml_str).unwrap_err();
        assert!(err.to_string().contains("does not apply"));
    }

    #[test]
    fn test_network_sink_requires_urls() {
        let toml_str = r#"
name = "push"
type = "network"
"#;
        let err = toml::from_str::<SinkConfig>(toml_str).unwrap_err();
        assert!(err.to_string().contains("requires 'urls'"));
    }

    #[test]
    fn test_missing_sinks_section_parses_empty() {
        let no_sinks = MINIMAL_TOML.replace("[[sinks]]\nname = \"log\"\ntype = \"log\"\n", "");
        let config: StreamerConfig = toml::from_str(&no_sinks).unwrap();
        assert!(config.sinks.is_empty());
    }

    #[test]
    fn test_sink_kind_tagged_by_type() {
        let toml_str = r#"
name = "push"
type = "network"
urls = ["127.0.0.1:5555"]
role = "client"
"#;
        let sink: SinkConfig = toml::from_str(toml_str).unwrap();
        match sink.kind {
            SinkKindConfig::Network { ref urls, role } => {
                assert_eq!(urls.len(), 1);
                assert_eq!(role, SocketRole::Client);
            }
            _ => panic!("expected network sink"),
        }
    }
}
