//! Horn (1981) 3×3 gradient helpers shared by terrain derivations.
//! `pub(crate)` only — not re-exported from terrain/mod.rs.

use crate::raster::Raster;

/// Isotropic cellsize (metres) derived from the raster's geographic bounds.
/// Falls back to 30 m when bounds are degenerate (zero extent).
pub(crate) fn cellsize_m(ra: &Raster) -> f64 {
    let lat_extent = (ra.max_lat - ra.min_lat).abs();
    let lon_extent = (ra.max_lon - ra.min_lon).abs();
    let cy = if ra.height > 0 {
        lat_extent / ra.height as f64 * 111_320.0
    } else {
        0.0
    };
    let mid_lat = (ra.min_lat + ra.max_lat) / 2.0;
    let cx = if ra.width > 0 {
        lon_extent / ra.width as f64 * 111_320.0 * mid_lat.to_radians().cos()
    } else {
        0.0
    };
    let avg = (cy + cx) / 2.0;
    if avg < 1e-3 {
        30.0
    } else {
        avg
    }
}

/// Horn (1981) weighted 3×3 gradient at interior cell `(r, c)`.
///
/// Returns `(dz_dx, dz_dy)` — dimensionless rise/run values — or `None`
/// when any neighbour is a no-data cell.
///
/// `dz/dx = ((NE + 2E + SE) − (NW + 2W + SW)) / (8 · cellsize)`
/// `dz/dy = ((NW + 2N + NE) − (SW + 2S + SE)) / (8 · cellsize)`
///
/// Caller must ensure `1 ≤ r ≤ height−2` and `1 ≤ c ≤ width−2`.
pub(crate) fn horn_gradient(ra: &Raster, r: usize, c: usize, cellsize: f64) -> Option<(f64, f64)> {
    let mut vals = [0.0f64; 8];
    let offsets: [(isize, isize); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];
    for (slot, &(dr, dc)) in vals.iter_mut().zip(offsets.iter()) {
        let v = ra.get((r as isize + dr) as usize, (c as isize + dc) as usize);
        if v.is_nan() {
            return None;
        }
        *slot = v as f64;
    }
    // Rows are stored south→north, so the (r+1) neighbours are the
    // northern ones. Layout below names cells by compass direction.
    let [sw, s, se, w, e, nw, n, ne] = vals;

    let dz_dx = ((ne + 2.0 * e + se) - (nw + 2.0 * w + sw)) / (8.0 * cellsize);
    let dz_dy = ((nw + 2.0 * n + ne) - (sw + 2.0 * s + se)) / (8.0 * cellsize);
    Some((dz_dx, dz_dy))
}
