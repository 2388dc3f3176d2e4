//! Composite suitability: multiplicative combination of per-variable layers
//! and the optional threshold mask.

use crate::error::ModelError;
use crate::raster::Raster;

/// Element-wise product of N aligned suitability layers.
///
/// A cell is no-data in the output when any input layer is no-data there,
/// and 0 wherever any input is 0. Errors on an empty list or a grid
/// mismatch.
pub fn combine_layers(layers: &[Raster]) -> Result<Raster, ModelError> {
    let first = layers.first().ok_or(ModelError::EmptyStack)?;
    for layer in &layers[1..] {
        if !first.same_grid(layer) {
            return Err(ModelError::GridMismatch {
                left_width: first.width,
                left_height: first.height,
                right_width: layer.width,
                right_height: layer.height,
            });
        }
    }

    let mut out = first.clone();
    for layer in &layers[1..] {
        for (o, &v) in out.data.iter_mut().zip(layer.data.iter()) {
            *o *= v;
        }
    }
    Ok(out)
}

/// Binary suitable/unsuitable mask: 1.0 where the composite score is at
/// least `threshold`, 0.0 below it. No-data propagates.
pub fn threshold_mask(composite: &Raster, threshold: f32) -> Raster {
    composite.map_values(|v| if v >= threshold { 1.0 } else { 0.0 })
}
