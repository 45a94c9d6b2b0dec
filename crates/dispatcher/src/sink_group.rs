//! SinkGroup - owns every configured sink and fans blocks out to all of them

use futures::future::join_all;
use tracing::{info, instrument, warn};

use contracts::{ByteBlock, ByteSink, SinkConfig, SinkKindConfig, StreamerError};

use crate::error::{DispatcherError, SinkFailure};
use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::sinks::{FileSink, LogSink, NetworkSink};

/// Closed set of sink transports
///
/// Dispatch goes through this enum rather than trait objects so the set of
/// supported transports is fixed at compile time, matching the tagged sink
/// configuration.
pub enum Sink {
    File(FileSink),
    Network(NetworkSink),
    Log(LogSink),
}

impl ByteSink for Sink {
    fn name(&self) -> &str {
        match self {
            Sink::File(sink) => sink.name(),
            Sink::Network(sink) => sink.name(),
            Sink::Log(sink) => sink.name(),
        }
    }

    async fn send(&mut self, block: &ByteBlock) -> Result<(), StreamerError> {
        match self {
            Sink::File(sink) => sink.send(block).await,
            Sink::Network(sink) => sink.send(block).await,
            Sink::Log(sink) => sink.send(block).await,
        }
    }

    async fn close(&mut self) -> Result<(), StreamerError> {
        match self {
            Sink::File(sink) => sink.close().await,
            Sink::Network(sink) => sink.close().await,
            Sink::Log(sink) => sink.close().await,
        }
    }
}

/// Open a single sink from its configuration
pub async fn open_sink(config: &SinkConfig, rank: u64) -> Result<Sink, DispatcherError> {
    let sink = match &config.kind {
        SinkKindConfig::File {
            write_directory,
            file_prefix,
            file_suffix,
        } => Sink::File(
            FileSink::open(&config.name, write_directory, file_prefix, file_suffix, rank)
                .map_err(|e| open_error(&config.name, e))?,
        ),
        SinkKindConfig::Network { urls, role } => Sink::Network(
            NetworkSink::open(&config.name, urls, *role)
                .await
                .map_err(|e| open_error(&config.name, e))?,
        ),
        SinkKindConfig::Log => Sink::Log(LogSink::new(&config.name)),
    };
    Ok(sink)
}

fn open_error(name: &str, error: StreamerError) -> DispatcherError {
    match error {
        // Already an open error, keep only the inner message
        StreamerError::SinkOpen { message, .. } => DispatcherError::sink_open(name, message),
        other => DispatcherError::sink_open(name, other.to_string()),
    }
}

struct SinkEntry<S> {
    sink: S,
    metrics: SinkMetrics,
}

/// Owns the configured sinks for the pipeline's lifetime
///
/// Every dispatched block is sent to every sink concurrently; the dispatch
/// only returns once all sends for that block have finished, so sinks never
/// run more than one block apart.
pub struct SinkGroup<S: ByteSink = Sink> {
    entries: Vec<SinkEntry<S>>,
}

impl<S: ByteSink> std::fmt::Debug for SinkGroup<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkGroup")
            .field("sinks", &self.entries.len())
            .finish()
    }
}

impl SinkGroup<Sink> {
    /// Open every configured sink, fail-fast in configuration order
    ///
    /// On failure, sinks already opened are closed in reverse order before
    /// the error is returned.
    #[instrument(name = "sink_group_open", skip(configs), fields(sinks = configs.len()))]
    pub async fn open(configs: &[SinkConfig], rank: u64) -> Result<Self, DispatcherError> {
        let mut group = Self::with_sinks(Vec::new());
        for config in configs {
            match open_sink(config, rank).await {
                Ok(sink) => group.entries.push(SinkEntry {
                    sink,
                    metrics: SinkMetrics::new(),
                }),
                Err(e) => {
                    warn!(sink = %config.name, error = %e, "Sink open failed, closing opened sinks");
                    let _ = group.close_all().await;
                    return Err(e);
                }
            }
        }
        info!(sinks = group.entries.len(), "All sinks open");
        Ok(group)
    }
}

impl<S: ByteSink> SinkGroup<S> {
    /// Build a group from already-opened sinks
    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self {
            entries: sinks
                .into_iter()
                .map(|sink| SinkEntry {
                    sink,
                    metrics: SinkMetrics::new(),
                })
                .collect(),
        }
    }

    /// Number of sinks in the group
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the group has no sinks
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fan one block out to every sink concurrently
    ///
    /// Waits for every send to finish, then reports all failures together.
    /// Successful sinks keep their delivery; nothing is retried.
    pub async fn dispatch(&mut self, block: &ByteBlock) -> Result<(), DispatcherError> {
        let sends = self.entries.iter_mut().map(|entry| async move {
            let result = entry.sink.send(block).await;
            match &result {
                Ok(()) => {
                    entry.metrics.inc_send_count();
                    entry.metrics.add_bytes_sent(block.len() as u64);
                }
                Err(_) => entry.metrics.inc_failure_count(),
            }
            (entry.sink.name().to_string(), result)
        });

        let failures: Vec<SinkFailure> = join_all(sends)
            .await
            .into_iter()
            .filter_map(|(sink, result)| {
                result.err().map(|e| SinkFailure {
                    sink,
                    message: e.to_string(),
                })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatcherError::Fanout { failures })
        }
    }

    /// Close every sink in reverse configuration order
    ///
    /// All sinks are closed even if earlier closes fail; failures are
    /// reported together at the end.
    pub async fn close_all(&mut self) -> Result<(), DispatcherError> {
        let mut failures = Vec::new();
        for entry in self.entries.iter_mut().rev() {
            if let Err(e) = entry.sink.close().await {
                warn!(sink = entry.sink.name(), error = %e, "Sink close failed");
                failures.push(SinkFailure {
                    sink: entry.sink.name().to_string(),
                    message: e.to_string(),
                });
            }
        }
        self.entries.clear();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatcherError::Fanout { failures })
        }
    }

    /// Snapshot per-sink delivery metrics
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.entries
            .iter()
            .map(|entry| (entry.sink.name().to_string(), entry.metrics.snapshot()))
            .collect()
    }
}
