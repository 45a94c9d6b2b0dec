//! DataBatch - per-field array accumulator
//!
//! The schema (field set, element types, shapes) is fixed by the first event
//! added after creation or reset. Later events either match it, substitute a
//! type-appropriate sentinel for a documented absence, or fail hard. Downstream
//! serializers therefore always see a uniform, predictable layout.

use std::collections::BTreeMap;

use ndarray::{ArrayD, Axis, IxDyn};

use contracts::{Batch, ElementType, Event, FieldValue, StreamerError};

/// Null sentinel for integer fields
const INT_SENTINEL: i64 = -999;

/// Null sentinel for text fields
const TEXT_SENTINEL: &str = "None";

/// Element type and shape observed on the first non-absent value of a field
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldBaseline {
    element_type: ElementType,
    shape: Vec<usize>,
}

impl FieldBaseline {
    fn sentinel(&self) -> FieldValue {
        let shape = IxDyn(&self.shape);
        match self.element_type {
            ElementType::Float => FieldValue::Float(ArrayD::from_elem(shape, f64::NAN)),
            ElementType::Int => FieldValue::Int(ArrayD::from_elem(shape, INT_SENTINEL)),
            ElementType::Text => {
                FieldValue::Text(ArrayD::from_elem(shape, TEXT_SENTINEL.to_string()))
            }
        }
    }
}

#[derive(Debug)]
struct FieldAccumulator {
    baseline: FieldBaseline,
    /// Insertion order = event arrival order
    values: Vec<FieldValue>,
}

/// Accumulates events field-by-field until retrieved as one stacked `Batch`
///
/// Lifecycle: created empty, mutated by [`DataBatch::add`], read and cleared
/// by [`DataBatch::retrieve_and_reset`]. Reset also clears the baselines, so
/// the schema is re-established fresh by the first event of the next batch.
#[derive(Debug, Default)]
pub struct DataBatch {
    fields: BTreeMap<String, FieldAccumulator>,
}

impl DataBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Common fill count (length of any field's list; 0 if empty)
    pub fn size(&self) -> usize {
        self.fields
            .values()
            .next()
            .map(|acc| acc.values.len())
            .unwrap_or(0)
    }

    /// Add one event
    ///
    /// The first call establishes the baseline for every field. Subsequent
    /// calls append matching values, or sentinels for absent ones.
    ///
    /// # Errors
    /// - `FirstEventIncomplete` when a field is absent on the first call
    /// - `SchemaMismatch` when the key set diverges from the baseline
    /// - `ShapeMismatch` / `TypeMismatch` when a present value diverges
    ///
    /// A failed `add` leaves the batch state unchanged.
    pub fn add(&mut self, event: Event) -> Result<(), StreamerError> {
        if self.fields.is_empty() {
            return self.establish(event);
        }
        self.validate(&event)?;
        for (name, value) in event.fields {
            if let Some(acc) = self.fields.get_mut(&name) {
                let value = value.unwrap_or_else(|| acc.baseline.sentinel());
                acc.values.push(value);
            }
        }
        Ok(())
    }

    /// Stack each field's list along a new leading axis and reset
    ///
    /// The returned arrays have shape `(size(), ..baseline_shape)`. Afterward
    /// the object equals its state immediately after construction.
    pub fn retrieve_and_reset(&mut self) -> Result<Batch, StreamerError> {
        let fields = std::mem::take(&mut self.fields);
        let mut batch = Batch::default();
        for (name, acc) in fields {
            batch.fields.insert(name, stack_values(&acc.values)?);
        }
        Ok(batch)
    }

    /// Establish the baseline from the first event
    fn establish(&mut self, event: Event) -> Result<(), StreamerError> {
        // Check completeness before touching state: shape cannot be inferred
        // from an absent value, and a partial baseline must never survive.
        if let Some(field) = event.missing_fields().first() {
            return Err(StreamerError::FirstEventIncomplete {
                field: field.to_string(),
            });
        }
        for (name, value) in event.fields {
            if let Some(value) = value {
                let baseline = FieldBaseline {
                    element_type: value.element_type(),
                    shape: value.shape().to_vec(),
                };
                self.fields.insert(
                    name,
                    FieldAccumulator {
                        baseline,
                        values: vec![value],
                    },
                );
            }
        }
        Ok(())
    }

    /// Validate an event against the established baselines without mutating
    fn validate(&self, event: &Event) -> Result<(), StreamerError> {
        if !event.fields.keys().eq(self.fields.keys()) {
            return Err(StreamerError::schema_mismatch(format!(
                "event fields {:?} do not match established fields {:?}",
                event.fields.keys().collect::<Vec<_>>(),
                self.fields.keys().collect::<Vec<_>>(),
            )));
        }
        for (name, value) in &event.fields {
            let Some(value) = value else { continue };
            // Key equality was checked above
            let Some(acc) = self.fields.get(name) else {
                continue;
            };
            if value.element_type() != acc.baseline.element_type {
                return Err(StreamerError::TypeMismatch {
                    field: name.clone(),
                    expected: acc.baseline.element_type,
                    actual: value.element_type(),
                });
            }
            if value.shape() != acc.baseline.shape.as_slice() {
                return Err(StreamerError::ShapeMismatch {
                    field: name.clone(),
                    expected: acc.baseline.shape.clone(),
                    actual: value.shape().to_vec(),
                });
            }
        }
        Ok(())
    }
}

/// Stack a field's accumulated arrays along a new leading axis
fn stack_values(values: &[FieldValue]) -> Result<FieldValue, StreamerError> {
    let Some(first) = values.first() else {
        return Err(StreamerError::schema_mismatch(
            "cannot stack a field with no accumulated values",
        ));
    };
    match first {
        FieldValue::Float(_) => {
            let views: Vec<_> = values
                .iter()
                .filter_map(|v| match v {
                    FieldValue::Float(a) => Some(a.view()),
                    _ => None,
                })
                .collect();
            Ok(FieldValue::Float(stack_views(&views)?))
        }
        FieldValue::Int(_) => {
            let views: Vec<_> = values
                .iter()
                .filter_map(|v| match v {
                    FieldValue::Int(a) => Some(a.view()),
                    _ => None,
                })
                .collect();
            Ok(FieldValue::Int(stack_views(&views)?))
        }
        FieldValue::Text(_) => {
            let views: Vec<_> = values
                .iter()
                .filter_map(|v| match v {
                    FieldValue::Text(a) => Some(a.view()),
                    _ => None,
                })
                .collect();
            Ok(FieldValue::Text(stack_views(&views)?))
        }
    }
}

fn stack_views<A: Clone>(
    views: &[ndarray::ArrayViewD<'_, A>],
) -> Result<ArrayD<A>, StreamerError> {
    ndarray::stack(Axis(0), views)
        .map_err(|e| StreamerError::Other(format!("failed to stack field arrays: {e}")))
}
