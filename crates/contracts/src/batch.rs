//! Batch - aggregator output
//!
//! One array per field; the leading axis indexes the events that were
//! accumulated, the remaining axes are the field's baseline shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::FieldValue;

/// An aggregation of consecutive events' values, stacked per field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Field name -> stacked array, leading dimension = fill count
    pub fields: BTreeMap<String, FieldValue>,
}

impl Batch {
    /// Number of events stacked into this batch
    ///
    /// Every field carries the same leading dimension; 0 for an empty batch.
    pub fn len(&self) -> usize {
        self.fields
            .values()
            .next()
            .map(|v| v.shape().first().copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// True when no events were stacked
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayD;

    #[test]
    fn test_batch_len_tracks_leading_axis() {
        let mut batch = Batch::default();
        assert_eq!(batch.len(), 0);
        assert!(batch.is_empty());

        batch.fields.insert(
            "detector".to_string(),
            FieldValue::Float(ArrayD::zeros(ndarray::IxDyn(&[5, 2, 2]))),
        );
        assert_eq!(batch.len(), 5);
        assert!(!batch.is_empty());
    }
}
