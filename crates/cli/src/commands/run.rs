//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let streamer_config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        source_identifier = %streamer_config.streamer.source_identifier,
        batch_size = streamer_config.streamer.batch_size,
        data_sources = streamer_config.data_sources.len(),
        sinks = streamer_config.sinks.len(),
        rank = args.rank,
        world_size = args.world_size,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&streamer_config);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        streamer_config,
        max_events: if args.max_events == 0 {
            None
        } else {
            Some(args.max_events)
        },
        rank: args.rank,
        world_size: args.world_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    let pipeline = Pipeline::new(pipeline_config);

    // Graceful shutdown: the signal flips a flag that the pipeline checks
    // between items, so the in-flight dispatch finishes and sinks close
    // before the process exits
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        warn!("Received shutdown signal, finishing in-flight work...");
        let _ = shutdown_tx.send(true);
    });

    info!("Starting pipeline...");

    let stats = pipeline
        .run(shutdown_rx)
        .await
        .context("Pipeline execution failed")?;

    info!(
        events_processed = stats.events_processed,
        events_dropped = stats.events_dropped,
        batches_dispatched = stats.batches_dispatched,
        duration_secs = stats.duration.as_secs_f64(),
        "Pipeline completed successfully"
    );
    stats.print_summary();

    info!("Detstream finished");
    Ok(())
}

/// Resolve when Ctrl+C or SIGTERM arrives
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &contracts::StreamerConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Streamer:");
    println!("  Source identifier: {}", config.streamer.source_identifier);
    println!("  Batch size: {}", config.streamer.batch_size);
    println!(
        "  Max consecutive incomplete: {}",
        config.streamer.max_consecutive_incomplete
    );

    println!("\nData sources ({}):", config.data_sources.len());
    for (name, source) in &config.data_sources {
        match source {
            contracts::DataSourceConfig::RandomArray {
                shape,
                element_type,
                missing_every,
            } => {
                let missing = missing_every
                    .map(|n| format!(", missing every {n}"))
                    .unwrap_or_default();
                println!("  - {name}: random_array {shape:?} {element_type}{missing}");
            }
            contracts::DataSourceConfig::Timestamp => {
                println!("  - {name}: timestamp");
            }
        }
    }

    println!("\nSerializer: {:?}", config.serializer);

    if !config.sinks.is_empty() {
        println!("\nSinks ({}):", config.sinks.len());
        for sink in &config.sinks {
            println!("  - {} ({:?})", sink.name, sink.kind);
        }
    }

    println!();
}
