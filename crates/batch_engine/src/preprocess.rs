//! Shape-heuristic preprocessing
//!
//! A 2-D field value is treated as image-like and eligible for zero padding
//! before aggregation; a 3-D stacked array (B, H, W) can receive a channel
//! axis after stacking. Classification is purely shape-based and a field is
//! never reclassified mid-run.

use ndarray::{s, Array2, ArrayD, Axis, Ix2};

use contracts::{Batch, Event, FieldValue, PadStyle, PreprocessingConfig, StreamerError};

/// Per-field preprocessing applied by the batching stage
#[derive(Debug, Clone)]
pub struct Preprocessor {
    target_height: usize,
    target_width: usize,
    pad_style: PadStyle,
    add_channel_axis: bool,
}

impl Preprocessor {
    /// Build from validated configuration
    pub fn from_config(config: &PreprocessingConfig) -> Self {
        Self {
            target_height: config.pad_height,
            target_width: config.pad_width,
            pad_style: config.pad_style,
            add_channel_axis: config.add_channel_axis,
        }
    }

    /// Pad 2-D image-like fields before aggregation
    ///
    /// Text fields are never image-like and pass through unchanged. Absent
    /// values stay absent; the aggregator substitutes sentinels at the padded
    /// baseline shape once it is established.
    pub fn apply_event(&self, event: &mut Event) -> Result<(), StreamerError> {
        for (name, value) in event.fields.iter_mut() {
            let Some(v) = value else { continue };
            if v.ndim() != 2 {
                continue;
            }
            let padded = match v {
                FieldValue::Float(a) => {
                    FieldValue::Float(self.pad(name, a, 0.0)?)
                }
                FieldValue::Int(a) => FieldValue::Int(self.pad(name, a, 0)?),
                FieldValue::Text(_) => continue,
            };
            *value = Some(padded);
        }
        Ok(())
    }

    /// Insert a channel axis into 3-D stacked fields: (B, H, W) -> (B, 1, H, W)
    pub fn apply_batch(&self, batch: &mut Batch) {
        if !self.add_channel_axis {
            return;
        }
        let fields = std::mem::take(&mut batch.fields);
        batch.fields = fields
            .into_iter()
            .map(|(name, value)| {
                let value = if value.ndim() == 3 {
                    insert_channel_axis(value)
                } else {
                    value
                };
                (name, value)
            })
            .collect();
    }

    fn pad<A: Clone>(
        &self,
        field: &str,
        a: &ArrayD<A>,
        fill: A,
    ) -> Result<ArrayD<A>, StreamerError> {
        let view = a.view().into_dimensionality::<Ix2>().map_err(|e| {
            StreamerError::Other(format!("field '{field}' is not 2-D: {e}"))
        })?;
        let (height, width) = view.dim();
        let out_height = height.max(self.target_height);
        let out_width = width.max(self.target_width);

        let (top, left) = match self.pad_style {
            PadStyle::Center => ((out_height - height) / 2, (out_width - width) / 2),
            PadStyle::BottomRight => (0, 0),
        };

        let mut out = Array2::from_elem((out_height, out_width), fill);
        out.slice_mut(s![top..top + height, left..left + width])
            .assign(&view);
        Ok(out.into_dyn())
    }
}

fn insert_channel_axis(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::Float(a) => FieldValue::Float(a.insert_axis(Axis(1))),
        FieldValue::Int(a) => FieldValue::Int(a.insert_axis(Axis(1))),
        FieldValue::Text(a) => FieldValue::Text(a.insert_axis(Axis(1))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn preprocessor(height: usize, width: usize, style: PadStyle) -> Preprocessor {
        Preprocessor {
            target_height: height,
            target_width: width,
            pad_style: style,
            add_channel_axis: true,
        }
    }

    #[test]
    fn test_center_padding_places_image_in_middle() {
        let p = preprocessor(4, 4, PadStyle::Center);
        let mut event = Event::new();
        event.insert(
            "img",
            Some(FieldValue::Float(array![[1.0, 2.0], [3.0, 4.0]].into_dyn())),
        );
        p.apply_event(&mut event).unwrap();

        let Some(FieldValue::Float(ref a)) = event.fields["img"] else {
            panic!("expected float field");
        };
        assert_eq!(a.shape(), &[4, 4]);
        assert_eq!(a[[1, 1]], 1.0);
        assert_eq!(a[[2, 2]], 4.0);
        assert_eq!(a[[0, 0]], 0.0);
    }

    #[test]
    fn test_bottom_right_padding_keeps_origin() {
        let p = preprocessor(3, 3, PadStyle::BottomRight);
        let mut event = Event::new();
        event.insert(
            "img",
            Some(FieldValue::Int(array![[7i64, 8], [9, 10]].into_dyn())),
        );
        p.apply_event(&mut event).unwrap();

        let Some(FieldValue::Int(ref a)) = event.fields["img"] else {
            panic!("expected int field");
        };
        assert_eq!(a.shape(), &[3, 3]);
        assert_eq!(a[[0, 0]], 7);
        assert_eq!(a[[2, 2]], 0);
    }

    #[test]
    fn test_larger_image_is_not_cropped() {
        let p = preprocessor(2, 2, PadStyle::Center);
        let mut event = Event::new();
        event.insert(
            "img",
            Some(FieldValue::Float(ArrayD::zeros(ndarray::IxDyn(&[5, 3])))),
        );
        p.apply_event(&mut event).unwrap();
        let Some(FieldValue::Float(ref a)) = event.fields["img"] else {
            panic!("expected float field");
        };
        assert_eq!(a.shape(), &[5, 3]);
    }

    #[test]
    fn test_non_2d_fields_pass_through() {
        let p = preprocessor(4, 4, PadStyle::Center);
        let mut event = Event::new();
        event.insert("scalar", Some(FieldValue::Float(array![1.0].into_dyn())));
        p.apply_event(&mut event).unwrap();
        let Some(FieldValue::Float(ref a)) = event.fields["scalar"] else {
            panic!("expected float field");
        };
        assert_eq!(a.shape(), &[1]);
    }

    #[test]
    fn test_channel_axis_on_3d_stacked_fields() {
        let p = preprocessor(2, 2, PadStyle::Center);
        let mut batch = Batch::default();
        batch.fields.insert(
            "img".to_string(),
            FieldValue::Float(ArrayD::zeros(ndarray::IxDyn(&[5, 2, 2]))),
        );
        batch.fields.insert(
            "ts".to_string(),
            FieldValue::Float(ArrayD::zeros(ndarray::IxDyn(&[5, 1]))),
        );
        p.apply_batch(&mut batch);

        assert_eq!(batch.fields["img"].shape(), &[5, 1, 2, 2]);
        // 2-D stacked fields are untouched
        assert_eq!(batch.fields["ts"].shape(), &[5, 1]);
    }
}
