//! IncompleteEventFilter - drops or halts on events with missing fields
//!
//! Tracks a run of consecutive incomplete events; when the run reaches the
//! configured limit the sequence terminates early. Early termination is a
//! controlled stop, not an error, and is always accompanied by a summary.

use std::collections::BTreeMap;

use tracing::{info, warn};

use contracts::Event;

/// Decision for one offered event
#[derive(Debug)]
pub enum FilterOutcome {
    /// Event is complete: pass it downstream
    Pass(Event),
    /// Event had missing fields and was dropped
    Dropped,
    /// The consecutive-missing limit was reached: stop consuming the source
    Halt,
}

/// End-of-sequence diagnostic summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSummary {
    /// Total events offered to the filter
    pub events_seen: u64,
    /// Total events dropped for missing fields
    pub events_dropped: u64,
    /// Drop count per field name
    pub dropped_per_field: BTreeMap<String, u64>,
    /// Whether the sequence terminated early
    pub early_stop: bool,
}

/// Incomplete-event filter
///
/// `max_consecutive_missing = 1` means "fail on first missing field", used by
/// deployments that treat any incompleteness as fatal to the worker's run.
pub struct IncompleteEventFilter {
    max_consecutive_missing: u64,
    consecutive: u64,
    events_seen: u64,
    events_dropped: u64,
    dropped_per_field: BTreeMap<String, u64>,
    halted: bool,
    summary_emitted: bool,
}

impl IncompleteEventFilter {
    /// Create a filter tolerating up to `max_consecutive_missing - 1`
    /// consecutive incomplete events
    pub fn new(max_consecutive_missing: u64) -> Self {
        Self {
            max_consecutive_missing: max_consecutive_missing.max(1),
            consecutive: 0,
            events_seen: 0,
            events_dropped: 0,
            dropped_per_field: BTreeMap::new(),
            halted: false,
            summary_emitted: false,
        }
    }

    /// Offer one event; complete events pass and reset the run counter
    pub fn offer(&mut self, event: Event) -> FilterOutcome {
        self.events_seen += 1;

        let missing = event.missing_fields();
        if missing.is_empty() {
            self.consecutive = 0;
            return FilterOutcome::Pass(event);
        }

        self.events_dropped += 1;
        self.consecutive += 1;
        metrics::counter!("detstream_events_dropped_total").increment(1);
        for field in &missing {
            *self
                .dropped_per_field
                .entry(field.to_string())
                .or_insert(0) += 1;
        }
        warn!(
            missing = ?missing,
            consecutive = self.consecutive,
            "Incomplete event dropped"
        );

        if self.consecutive >= self.max_consecutive_missing {
            self.halted = true;
            return FilterOutcome::Halt;
        }
        FilterOutcome::Dropped
    }

    /// Whether the filter terminated the sequence early
    pub fn halted(&self) -> bool {
        self.halted
    }

    /// Build the end-of-sequence summary
    pub fn summary(&self) -> FilterSummary {
        FilterSummary {
            events_seen: self.events_seen,
            events_dropped: self.events_dropped,
            dropped_per_field: self.dropped_per_field.clone(),
            early_stop: self.halted,
        }
    }

    /// Emit the summary via tracing, exactly once
    ///
    /// Called at end of sequence whether the source was exhausted or the
    /// filter halted it.
    pub fn log_summary(&mut self) -> FilterSummary {
        let summary = self.summary();
        if !self.summary_emitted {
            self.summary_emitted = true;
            if summary.early_stop {
                warn!(
                    events_seen = summary.events_seen,
                    events_dropped = summary.events_dropped,
                    dropped_per_field = ?summary.dropped_per_field,
                    "Stopped early after {} consecutive incomplete events",
                    self.consecutive
                );
            } else {
                info!(
                    events_seen = summary.events_seen,
                    events_dropped = summary.events_dropped,
                    dropped_per_field = ?summary.dropped_per_field,
                    "Event stream exhausted"
                );
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::FieldValue;
    use ndarray::array;

    fn complete_event() -> Event {
        let mut event = Event::new();
        event.insert("detector", Some(FieldValue::Float(array![1.0].into_dyn())));
        event
    }

    fn incomplete_event() -> Event {
        let mut event = Event::new();
        event.insert("detector", None);
        event
    }

    #[test]
    fn test_complete_events_pass_through() {
        let mut filter = IncompleteEventFilter::new(3);
        for _ in 0..5 {
            assert!(matches!(
                filter.offer(complete_event()),
                FilterOutcome::Pass(_)
            ));
        }
        let summary = filter.summary();
        assert_eq!(summary.events_seen, 5);
        assert_eq!(summary.events_dropped, 0);
        assert!(!summary.early_stop);
    }

    #[test]
    fn test_halts_after_exact_run_of_missing() {
        let mut filter = IncompleteEventFilter::new(3);

        assert!(matches!(filter.offer(complete_event()), FilterOutcome::Pass(_)));
        assert!(matches!(filter.offer(incomplete_event()), FilterOutcome::Dropped));
        assert!(matches!(filter.offer(incomplete_event()), FilterOutcome::Dropped));
        // Third consecutive miss terminates the sequence
        assert!(matches!(filter.offer(incomplete_event()), FilterOutcome::Halt));
        assert!(filter.halted());

        let summary = filter.summary();
        assert_eq!(summary.events_seen, 4);
        assert_eq!(summary.events_dropped, 3);
        assert_eq!(summary.dropped_per_field["detector"], 3);
        assert!(summary.early_stop);
    }

    #[test]
    fn test_complete_event_resets_run_counter() {
        let mut filter = IncompleteEventFilter::new(2);

        assert!(matches!(filter.offer(incomplete_event()), FilterOutcome::Dropped));
        assert!(matches!(filter.offer(complete_event()), FilterOutcome::Pass(_)));
        assert!(matches!(filter.offer(incomplete_event()), FilterOutcome::Dropped));
        assert!(matches!(filter.offer(incomplete_event()), FilterOutcome::Halt));
    }

    #[test]
    fn test_limit_one_fails_on_first_missing() {
        let mut filter = IncompleteEventFilter::new(1);
        assert!(matches!(filter.offer(incomplete_event()), FilterOutcome::Halt));
    }

    #[test]
    fn test_summary_logged_once() {
        let mut filter = IncompleteEventFilter::new(2);
        filter.offer(complete_event());
        let first = filter.log_summary();
        let second = filter.log_summary();
        assert_eq!(first, second);
    }
}
