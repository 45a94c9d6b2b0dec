//! Event - one facility-provided detector record
//!
//! A mapping from field name to a typed n-dimensional array, or an explicit
//! absence marker for fields the acquisition framework failed to deliver.

use std::collections::BTreeMap;

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

/// Element type of a field array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// 64-bit floating point
    Float,
    /// 64-bit signed integer
    Int,
    /// UTF-8 text
    Text,
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementType::Float => write!(f, "float"),
            ElementType::Int => write!(f, "int"),
            ElementType::Text => write!(f, "text"),
        }
    }
}

/// A typed n-dimensional field value
///
/// The shape is carried by the array itself; the element type is fixed by the
/// variant. Dynamic dimensionality (`ArrayD`) is used because field shapes are
/// only known at configuration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", content = "data", rename_all = "snake_case")]
pub enum FieldValue {
    Float(ArrayD<f64>),
    Int(ArrayD<i64>),
    Text(ArrayD<String>),
}

impl FieldValue {
    /// Element type of this value
    pub fn element_type(&self) -> ElementType {
        match self {
            FieldValue::Float(_) => ElementType::Float,
            FieldValue::Int(_) => ElementType::Int,
            FieldValue::Text(_) => ElementType::Text,
        }
    }

    /// Shape of this value
    pub fn shape(&self) -> &[usize] {
        match self {
            FieldValue::Float(a) => a.shape(),
            FieldValue::Int(a) => a.shape(),
            FieldValue::Text(a) => a.shape(),
        }
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }
}

/// One detector event
///
/// Keys are stable across a run; a `None` value marks a field the event source
/// could not extract for this event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Field name -> value-or-absent
    pub fields: BTreeMap<String, Option<FieldValue>>,
}

impl Event {
    /// Create an empty event
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field value (or absence marker)
    pub fn insert(&mut self, name: impl Into<String>, value: Option<FieldValue>) {
        self.fields.insert(name.into(), value);
    }

    /// True when every field carries a value
    pub fn is_complete(&self) -> bool {
        self.fields.values().all(|v| v.is_some())
    }

    /// Names of fields whose value is absent
    pub fn missing_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the event has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
