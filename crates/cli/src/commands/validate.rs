//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    source_identifier: String,
    batch_size: usize,
    data_source_count: usize,
    serializer: String,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    source_identifier: config.streamer.source_identifier.clone(),
                    batch_size: config.streamer.batch_size,
                    data_source_count: config.data_sources.len(),
                    serializer: format!("{:?}", config.serializer),
                    sink_count: config.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &contracts::StreamerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    // A batch size of 1 produces one block per event
    if config.streamer.batch_size == 1 {
        warnings.push("streamer.batch_size is 1 - every event becomes its own block".to_string());
    }

    // Preprocessing without any 2-D array source does nothing
    if config.preprocessing.is_some() {
        let has_matrix = config.data_sources.values().any(|source| {
            matches!(
                source,
                contracts::DataSourceConfig::RandomArray { shape, .. } if shape.len() == 2
            )
        });
        if !has_matrix {
            warnings
                .push("preprocessing is configured but no data source is 2-dimensional".to_string());
        }
    }

    // Log-only sink sets are typically a debugging leftover
    if config
        .sinks
        .iter()
        .all(|s| matches!(s.kind, contracts::SinkKindConfig::Log))
    {
        warnings.push("all sinks are log sinks - serialized data is discarded".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Source identifier: {}", summary.source_identifier);
            println!("  Batch size: {}", summary.batch_size);
            println!("  Data sources: {}", summary.data_source_count);
            println!("  Serializer: {}", summary.serializer);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
