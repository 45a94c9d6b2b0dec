//! Pipeline statistics and metrics.

use std::collections::BTreeMap;
use std::time::Duration;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total events consumed from the source
    pub events_seen: u64,

    /// Complete events that made it into a batch
    pub events_processed: u64,

    /// Events dropped for missing fields
    pub events_dropped: u64,

    /// Drop count per field name
    pub dropped_per_field: BTreeMap<String, u64>,

    /// Whether the run stopped early on consecutive incomplete events
    pub early_stop: bool,

    /// Serialized blocks dispatched to the sinks
    pub batches_dispatched: u64,

    /// Total payload bytes dispatched
    pub bytes_dispatched: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of sinks that received data
    pub active_sinks: usize,
}

impl PipelineStats {
    /// Events per second throughput
    pub fn event_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.events_processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Drop rate as percentage of consumed events
    pub fn drop_rate(&self) -> f64 {
        if self.events_seen > 0 {
            (self.events_dropped as f64 / self.events_seen as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Events consumed: {}", self.events_seen);
        println!("   ├─ Events processed: {}", self.events_processed);
        println!("   ├─ Event rate: {:.2}/s", self.event_rate());
        println!("   ├─ Batches dispatched: {}", self.batches_dispatched);
        println!("   ├─ Bytes dispatched: {}", self.bytes_dispatched);
        println!("   └─ Active sinks: {}", self.active_sinks);

        println!("\n📈 Filter");
        println!(
            "   ├─ Events dropped: {} ({:.2}%)",
            self.events_dropped,
            self.drop_rate()
        );
        println!("   └─ Early stop: {}", self.early_stop);

        if !self.dropped_per_field.is_empty() {
            println!("\n⚠️  Missing Field Counts");
            for (field, count) in &self.dropped_per_field {
                println!("   ├─ {}: {}", field, count);
            }
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_rate() {
        let stats = PipelineStats {
            events_seen: 200,
            events_dropped: 10,
            ..Default::default()
        };
        assert!((stats.drop_rate() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_rates_are_zero_for_empty_run() {
        let stats = PipelineStats::default();
        assert_eq!(stats.event_rate(), 0.0);
        assert_eq!(stats.drop_rate(), 0.0);
    }
}
