//! Synthetic per-field data source generators
//!
//! Each configured data source produces one field value per event, or an
//! absence marker when extraction fails (simulated here via `missing_every`).

use std::time::{SystemTime, UNIX_EPOCH};

use ndarray::{ArrayD, IxDyn};
use rand::Rng;

use contracts::{DataSourceConfig, ElementType, FieldValue};

/// One instantiated per-field generator
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Random array of fixed shape and element type
    RandomArray {
        shape: Vec<usize>,
        element_type: ElementType,
        missing_every: Option<u64>,
    },
    /// Scalar epoch timestamp, shape (1,)
    Timestamp,
}

impl DataSource {
    /// Build from validated configuration
    pub fn from_config(config: &DataSourceConfig) -> Self {
        match config {
            DataSourceConfig::RandomArray {
                shape,
                element_type,
                missing_every,
            } => DataSource::RandomArray {
                shape: shape.clone(),
                element_type: *element_type,
                missing_every: *missing_every,
            },
            DataSourceConfig::Timestamp => DataSource::Timestamp,
        }
    }

    /// Generate the value for one event index, or `None` for a simulated miss
    pub fn generate<R: Rng>(&self, rng: &mut R, event_index: u64) -> Option<FieldValue> {
        match self {
            DataSource::RandomArray {
                shape,
                element_type,
                missing_every,
            } => {
                if let Some(every) = missing_every {
                    // Index 0 always yields a value: the aggregator needs the
                    // first event of a run to establish baselines.
                    if event_index > 0 && event_index % every == 0 {
                        return None;
                    }
                }
                let shape = IxDyn(shape);
                Some(match element_type {
                    ElementType::Float => FieldValue::Float(ArrayD::from_shape_simple_fn(
                        shape,
                        || rng.random::<f64>(),
                    )),
                    ElementType::Int => FieldValue::Int(ArrayD::from_shape_simple_fn(
                        shape,
                        || rng.random_range(0..255),
                    )),
                    ElementType::Text => FieldValue::Text(ArrayD::from_shape_simple_fn(
                        shape,
                        || format!("ev{event_index}"),
                    )),
                })
            }
            DataSource::Timestamp => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs_f64();
                Some(FieldValue::Float(ArrayD::from_elem(IxDyn(&[1]), now)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_array_respects_shape_and_type() {
        let source = DataSource::RandomArray {
            shape: vec![3, 2],
            element_type: ElementType::Int,
            missing_every: None,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let value = source.generate(&mut rng, 0).unwrap();
        assert_eq!(value.shape(), &[3, 2]);
        assert_eq!(value.element_type(), ElementType::Int);
    }

    #[test]
    fn test_missing_every_skips_but_never_event_zero() {
        let source = DataSource::RandomArray {
            shape: vec![2],
            element_type: ElementType::Float,
            missing_every: Some(3),
        };
        let mut rng = StdRng::seed_from_u64(7);
        assert!(source.generate(&mut rng, 0).is_some());
        assert!(source.generate(&mut rng, 1).is_some());
        assert!(source.generate(&mut rng, 3).is_none());
        assert!(source.generate(&mut rng, 6).is_none());
        assert!(source.generate(&mut rng, 7).is_some());
    }

    #[test]
    fn test_timestamp_is_scalar_float() {
        let mut rng = StdRng::seed_from_u64(7);
        let value = DataSource::Timestamp.generate(&mut rng, 0).unwrap();
        assert_eq!(value.shape(), &[1]);
        assert_eq!(value.element_type(), ElementType::Float);
    }
}
