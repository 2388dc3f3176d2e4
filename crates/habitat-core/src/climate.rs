//! Projected climate compositing.
//!
//! Each MACA time slice arrives as one aligned temperature raster (Kelvin).
//! The projected-climate layer for a site/GCM/scenario is the cell-wise mean
//! over the slice stack, converted to Fahrenheit.

use crate::error::ModelError;
use crate::raster::Raster;
use crate::units::kelvin_to_fahrenheit;

/// Cell-wise mean over a stack of aligned rasters.
///
/// A cell's mean ignores no-data members; it is no-data only when every
/// member is no-data there. Errors on an empty stack or a grid mismatch.
pub fn composite_mean(slices: &[Raster]) -> Result<Raster, ModelError> {
    let first = slices.first().ok_or(ModelError::EmptyStack)?;
    for s in &slices[1..] {
        if !first.same_grid(s) {
            return Err(ModelError::GridMismatch {
                left_width: first.width,
                left_height: first.height,
                right_width: s.width,
                right_height: s.height,
            });
        }
    }

    let mut out = Raster::new(first.width, first.height, first.bounds(), f32::NAN);
    for idx in 0..out.data.len() {
        let mut sum = 0.0f64;
        let mut n = 0usize;
        for s in slices {
            let v = s.data[idx];
            if !v.is_nan() {
                sum += v as f64;
                n += 1;
            }
        }
        if n > 0 {
            out.data[idx] = (sum / n as f64) as f32;
        }
    }
    Ok(out)
}

/// Convert a Kelvin raster to Fahrenheit per cell; no-data propagates.
pub fn to_fahrenheit(kelvin: &Raster) -> Raster {
    kelvin.map_values(kelvin_to_fahrenheit)
}
