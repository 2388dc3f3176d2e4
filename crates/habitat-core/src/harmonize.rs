//! Grid harmonization: resample layers onto a shared reference grid so the
//! suitability model can combine them cell by cell.
//!
//! All source layers are WGS84 degree grids, so matching is pure
//! resampling — each reference cell center is sampled from the input with
//! bilinear interpolation.

use crate::raster::Raster;

/// Resample `input` onto the exact grid of `reference`.
///
/// Reference cells outside the input's extent are no-data; a no-data cell
/// among the interpolation corners makes the resampled value no-data.
pub fn harmonize_to(reference: &Raster, input: &Raster) -> Raster {
    let mut out = Raster::new(
        reference.width,
        reference.height,
        reference.bounds(),
        f32::NAN,
    );
    for r in 0..reference.height {
        for c in 0..reference.width {
            let (lon, lat) = reference.cell_center(r, c);
            if let Some(v) = input.sample(lon, lat) {
                out.set(r, c, v);
            }
        }
    }
    out
}
