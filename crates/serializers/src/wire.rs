//! Bincode wire form
//!
//! Bincode carries no field names, so the tagged `FieldValue` layout that
//! JSON uses cannot cross a bincode boundary. Batches are encoded instead as
//! flat element buffers with an explicit shape per field.

use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use contracts::{Batch, FieldValue, StreamerError};

#[derive(Serialize, Deserialize)]
pub(crate) struct WireBatch {
    fields: BTreeMap<String, WireField>,
}

#[derive(Serialize, Deserialize)]
enum WireField {
    Float { shape: Vec<usize>, data: Vec<f64> },
    Int { shape: Vec<usize>, data: Vec<i64> },
    Text { shape: Vec<usize>, data: Vec<String> },
}

impl From<&Batch> for WireBatch {
    fn from(batch: &Batch) -> Self {
        Self {
            fields: batch
                .fields
                .iter()
                .map(|(name, value)| (name.clone(), WireField::from(value)))
                .collect(),
        }
    }
}

impl WireBatch {
    pub(crate) fn into_batch(self) -> Result<Batch, StreamerError> {
        let mut batch = Batch::default();
        for (name, field) in self.fields {
            let value = field.into_value().map_err(|message| {
                StreamerError::serialize("bincode", format!("field '{name}': {message}"))
            })?;
            batch.fields.insert(name, value);
        }
        Ok(batch)
    }
}

impl From<&FieldValue> for WireField {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Float(array) => WireField::Float {
                shape: array.shape().to_vec(),
                data: array.iter().copied().collect(),
            },
            FieldValue::Int(array) => WireField::Int {
                shape: array.shape().to_vec(),
                data: array.iter().copied().collect(),
            },
            FieldValue::Text(array) => WireField::Text {
                shape: array.shape().to_vec(),
                data: array.iter().cloned().collect(),
            },
        }
    }
}

impl WireField {
    fn into_value(self) -> Result<FieldValue, String> {
        fn rebuild<A>(shape: Vec<usize>, data: Vec<A>) -> Result<ArrayD<A>, String> {
            ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| e.to_string())
        }

        match self {
            WireField::Float { shape, data } => rebuild(shape, data).map(FieldValue::Float),
            WireField::Int { shape, data } => rebuild(shape, data).map(FieldValue::Int),
            WireField::Text { shape, data } => rebuild(shape, data).map(FieldValue::Text),
        }
    }
}
