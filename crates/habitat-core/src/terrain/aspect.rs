//! Per-cell slope aspect derived from an elevation raster.
//!
//! Uses the shared Horn (1981) gradient from `super::gradient`. Aspect is
//! the downslope compass direction in degrees, clockwise from North, in
//! [0°, 360°). Border cells, cells with a no-data neighbour, and cells with
//! slope < 0.01° are no-data in the output.

use crate::raster::Raster;

use super::gradient::{cellsize_m, horn_gradient};

/// Minimum slope gradient magnitude treated as non-flat.
/// tan(0.01°) ≈ 1.745 × 10⁻⁴.
const FLAT_GRADIENT_THRESHOLD: f64 = 1.745e-4;

/// Compute the aspect raster for an elevation raster.
///
/// Aspect convention (clockwise from North, downslope direction):
///   aspect = atan2(−dz_dx, −dz_dy) × 180/π, normalised to [0°, 360°)
///
/// The output shares the input grid; grids smaller than 3×3 come back
/// entirely no-data.
pub fn compute_aspect(elevation: &Raster) -> Raster {
    let mut out = Raster::new(
        elevation.width,
        elevation.height,
        elevation.bounds(),
        f32::NAN,
    );
    if elevation.width < 3 || elevation.height < 3 {
        return out;
    }

    let cellsize = cellsize_m(elevation);

    for r in 1..elevation.height - 1 {
        for c in 1..elevation.width - 1 {
            let Some((dz_dx, dz_dy)) = horn_gradient(elevation, r, c, cellsize) else {
                continue;
            };
            let magnitude = (dz_dx * dz_dx + dz_dy * dz_dy).sqrt();
            if magnitude < FLAT_GRADIENT_THRESHOLD {
                continue;
            }

            // Downslope direction: negate the (uphill) gradient vector.
            let aspect_rad = (-dz_dx).atan2(-dz_dy);
            let mut aspect_deg = aspect_rad.to_degrees();
            if aspect_deg < 0.0 {
                aspect_deg += 360.0;
            }
            out.set(r, c, aspect_deg as f32);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Bounds;

    /// Planar ramp rising toward the east at roughly 10°, with ≈30 m cells.
    fn make_east_ramp(n: usize) -> Raster {
        let pixel_deg = 30.0 / 111_320.0;
        let extent = n as f64 * pixel_deg;
        let mut ra = Raster::new(n, n, Bounds::new(0.0, 0.0, extent, extent), 0.0);
        let cellsize_m = pixel_deg * 111_320.0;
        let rise = cellsize_m * 10.0_f64.to_radians().tan();
        for r in 0..n {
            for c in 0..n {
                ra.set(r, c, (c as f64 * rise) as f32);
            }
        }
        ra
    }

    #[test]
    fn east_ramp_faces_west() {
        let aspect = compute_aspect(&make_east_ramp(16));
        for r in 1..15 {
            for c in 1..15 {
                let a = aspect.get(r, c);
                assert!(
                    (a - 270.0).abs() < 1.0,
                    "cell ({r},{c}): expected ≈270°, got {a}"
                );
            }
        }
    }

    #[test]
    fn north_ramp_faces_south() {
        let pixel_deg = 30.0 / 111_320.0;
        let extent = 16.0 * pixel_deg;
        let mut ra = Raster::new(16, 16, Bounds::new(0.0, 0.0, extent, extent), 0.0);
        let rise = 30.0 * 10.0_f64.to_radians().tan();
        for r in 0..16 {
            for c in 0..16 {
                ra.set(r, c, (r as f64 * rise) as f32);
            }
        }
        let aspect = compute_aspect(&ra);
        let a = aspect.get(8, 8);
        assert!((a - 180.0).abs() < 1.0, "expected ≈180°, got {a}");
    }

    #[test]
    fn flat_field_is_all_nodata() {
        let ra = Raster::new(8, 8, Bounds::new(0.0, 0.0, 0.01, 0.01), 100.0);
        let aspect = compute_aspect(&ra);
        assert!(aspect.data.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn borders_are_nodata() {
        let aspect = compute_aspect(&make_east_ramp(8));
        for c in 0..8 {
            assert!(aspect.get(0, c).is_nan());
            assert!(aspect.get(7, c).is_nan());
        }
    }

    #[test]
    fn nodata_neighbour_masks_cell() {
        let mut ra = make_east_ramp(8);
        ra.set(3, 3, f32::NAN);
        let aspect = compute_aspect(&ra);
        // Every interior cell touching (3,3) loses its gradient.
        assert!(aspect.get(3, 4).is_nan());
        assert!(aspect.get(4, 4).is_nan());
        assert!(!aspect.get(5, 5).is_nan());
    }

    #[test]
    fn output_shares_input_grid() {
        let ra = make_east_ramp(8);
        let aspect = compute_aspect(&ra);
        assert!(aspect.same_grid(&ra));
    }
}
