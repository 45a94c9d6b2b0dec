//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    streamer: StreamerInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    data_sources: Vec<DataSourceInfo>,
    serializer: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct StreamerInfo {
    source_identifier: String,
    batch_size: usize,
    max_consecutive_incomplete: u64,
    preprocessing: bool,
}

#[derive(Serialize)]
struct DataSourceInfo {
    name: String,
    source_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    shape: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    element_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_every: Option<u64>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &contracts::StreamerConfig, args: &InfoArgs) -> ConfigInfo {
    let data_sources = if args.data_sources {
        config
            .data_sources
            .iter()
            .map(|(name, source)| match source {
                contracts::DataSourceConfig::RandomArray {
                    shape,
                    element_type,
                    missing_every,
                } => DataSourceInfo {
                    name: name.clone(),
                    source_type: "random_array".to_string(),
                    shape: Some(shape.clone()),
                    element_type: Some(element_type.to_string()),
                    missing_every: *missing_every,
                },
                contracts::DataSourceConfig::Timestamp => DataSourceInfo {
                    name: name.clone(),
                    source_type: "timestamp".to_string(),
                    shape: None,
                    element_type: None,
                    missing_every: None,
                },
            })
            .collect()
    } else {
        Vec::new()
    };

    let sinks = if args.sinks {
        config
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.kind),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        streamer: StreamerInfo {
            source_identifier: config.streamer.source_identifier.clone(),
            batch_size: config.streamer.batch_size,
            max_consecutive_incomplete: config.streamer.max_consecutive_incomplete,
            preprocessing: config.preprocessing.is_some(),
        },
        data_sources,
        serializer: format!("{:?}", config.serializer),
        sinks,
    }
}

fn print_config_info(config: &contracts::StreamerConfig, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Detstream Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📍 Streamer");
    println!("   ├─ Source identifier: {}", config.streamer.source_identifier);
    println!("   ├─ Batch size: {}", config.streamer.batch_size);
    println!(
        "   ├─ Max consecutive incomplete: {}",
        config.streamer.max_consecutive_incomplete
    );
    match &config.preprocessing {
        Some(pre) => {
            println!(
                "   └─ Preprocessing: pad to {}x{} ({:?})",
                pre.pad_height, pre.pad_width, pre.pad_style
            );
        }
        None => {
            println!("   └─ Preprocessing: none");
        }
    }

    println!("\n📡 Data sources ({})", config.data_sources.len());
    let count = config.data_sources.len();
    for (i, (name, source)) in config.data_sources.iter().enumerate() {
        let prefix = if i == count - 1 { "└─" } else { "├─" };
        if args.data_sources {
            match source {
                contracts::DataSourceConfig::RandomArray {
                    shape,
                    element_type,
                    missing_every,
                } => {
                    let missing = missing_every
                        .map(|n| format!(", missing every {n}"))
                        .unwrap_or_default();
                    println!(
                        "   {} {} (random_array {:?} {}{})",
                        prefix, name, shape, element_type, missing
                    );
                }
                contracts::DataSourceConfig::Timestamp => {
                    println!("   {} {} (timestamp)", prefix, name);
                }
            }
        } else {
            println!("   {} {}", prefix, name);
        }
    }

    println!("\n⚙️  Serializer: {:?}", config.serializer);

    if !config.sinks.is_empty() {
        println!("\n📤 Sinks ({})", config.sinks.len());
        for (i, sink) in config.sinks.iter().enumerate() {
            let is_last = i == config.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            if args.sinks {
                println!("   {} {} ({:?})", prefix, sink.name, sink.kind);
            } else {
                println!("   {} {}", prefix, sink.name);
            }
        }
    }

    println!();
}
