//! BatchingStage - events in, batches out
//!
//! Wraps a `DataBatch` as a stream transform: every `batch_size` accepted
//! events yield one batch, and `finish` flushes the final partial batch so no
//! event is silently dropped at end-of-stream. For N events the stage emits
//! exactly ceil(N / batch_size) batches, the last of which may be smaller.

use tracing::debug;

use contracts::{Batch, Event, StreamerError};

use crate::{DataBatch, Preprocessor};

/// Batching stream stage
pub struct BatchingStage {
    batch_size: usize,
    preprocessor: Option<Preprocessor>,
    batch: DataBatch,
}

impl BatchingStage {
    /// Create a stage emitting batches of `batch_size` events
    pub fn new(batch_size: usize, preprocessor: Option<Preprocessor>) -> Self {
        Self {
            batch_size,
            preprocessor,
            batch: DataBatch::new(),
        }
    }

    /// Accept one event; emits a batch when the fill count reaches `batch_size`
    ///
    /// No accumulation happens across yields: the internal batch is empty
    /// immediately after a batch is returned.
    pub fn push(&mut self, mut event: Event) -> Result<Option<Batch>, StreamerError> {
        if let Some(ref preprocessor) = self.preprocessor {
            preprocessor.apply_event(&mut event)?;
        }
        self.batch.add(event)?;

        if self.batch.size() >= self.batch_size {
            return self.emit().map(Some);
        }
        Ok(None)
    }

    /// Flush the final partial batch on upstream exhaustion
    pub fn finish(&mut self) -> Result<Option<Batch>, StreamerError> {
        if self.batch.size() == 0 {
            return Ok(None);
        }
        self.emit().map(Some)
    }

    /// Number of events currently accumulated
    pub fn pending(&self) -> usize {
        self.batch.size()
    }

    fn emit(&mut self) -> Result<Batch, StreamerError> {
        let mut batch = self.batch.retrieve_and_reset()?;
        if let Some(ref preprocessor) = self.preprocessor {
            preprocessor.apply_batch(&mut batch);
        }
        metrics::counter!("detstream_batches_total").increment(1);
        debug!(events = batch.len(), "Batch emitted");
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{FieldValue, PadStyle, PreprocessingConfig};
    use ndarray::array;

    fn event(value: f64) -> Event {
        let mut event = Event::new();
        event.insert(
            "detector",
            Some(FieldValue::Float(array![[value, value], [value, value]].into_dyn())),
        );
        event
    }

    #[test]
    fn test_ceil_n_over_b_batches() {
        let mut stage = BatchingStage::new(4, None);
        let mut batches = Vec::new();

        for i in 0..10 {
            if let Some(batch) = stage.push(event(i as f64)).unwrap() {
                batches.push(batch);
            }
        }
        if let Some(batch) = stage.finish().unwrap() {
            batches.push(batch);
        }

        // 10 events, batch size 4: sizes 4, 4, 2
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 4);
        assert_eq!(batches[1].len(), 4);
        assert_eq!(batches[2].len(), 2);
    }

    #[test]
    fn test_exact_multiple_leaves_nothing_pending() {
        let mut stage = BatchingStage::new(2, None);
        let mut emitted = 0;
        for i in 0..6 {
            if stage.push(event(i as f64)).unwrap().is_some() {
                emitted += 1;
            }
        }
        assert_eq!(emitted, 3);
        assert_eq!(stage.pending(), 0);
        assert!(stage.finish().unwrap().is_none());
    }

    #[test]
    fn test_batched_arrays_stack_in_arrival_order() {
        let mut stage = BatchingStage::new(3, None);
        stage.push(event(0.0)).unwrap();
        stage.push(event(1.0)).unwrap();
        let batch = stage.push(event(2.0)).unwrap().unwrap();

        let FieldValue::Float(ref a) = batch.fields["detector"] else {
            panic!("expected float field");
        };
        assert_eq!(a.shape(), &[3, 2, 2]);
        for i in 0..3 {
            assert_eq!(a[[i, 0, 0]], i as f64);
        }
    }

    #[test]
    fn test_padding_and_channel_axis_end_to_end() {
        let config = PreprocessingConfig {
            pad_height: 4,
            pad_width: 4,
            pad_style: PadStyle::Center,
            add_channel_axis: true,
        };
        let mut stage = BatchingStage::new(2, Some(Preprocessor::from_config(&config)));

        stage.push(event(1.0)).unwrap();
        let batch = stage.push(event(2.0)).unwrap().unwrap();

        // (2 events, 1 channel, padded 4x4)
        assert_eq!(batch.fields["detector"].shape(), &[2, 1, 4, 4]);
    }

    #[test]
    fn test_schema_error_propagates() {
        let mut stage = BatchingStage::new(4, None);
        stage.push(event(1.0)).unwrap();

        let mut diverged = Event::new();
        diverged.insert("other", Some(FieldValue::Float(array![1.0].into_dyn())));
        assert!(stage.push(diverged).is_err());
    }
}
