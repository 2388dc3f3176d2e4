//! POLARIS probabilistic soil-property tile addressing.
//!
//! POLARIS serves 1°×1° GeoTIFF tiles keyed by integer-degree corners, e.g.
//! `lat3738_lon-121-120.tif` for the tile spanning 37–38°N, 121–120°W.

use crate::raster::Bounds;

/// Default soil query used by the blue oak model: mean pH at 60–100 cm.
pub const DEFAULT_PROPERTY: &str = "ph";
pub const DEFAULT_STAT: &str = "mean";
pub const DEFAULT_DEPTH: &str = "60_100";

const URL_TEMPLATE: &str = "http://hydrology.cee.duke.edu/POLARIS/PROPERTIES/v1.0";

/// Tile name for the 1°×1° tile whose SW corner is (lat_sw, lon_sw).
pub fn tile_name(lat_sw: i32, lon_sw: i32) -> String {
    format!(
        "lat{}{}_lon{}{}.tif",
        lat_sw,
        lat_sw + 1,
        lon_sw,
        lon_sw + 1
    )
}

/// URLs of every tile needed to cover `bounds`, one per integer-degree cell
/// between floor(min) and ceil(max).
pub fn tile_urls(property: &str, stat: &str, depth: &str, bounds: Bounds) -> Vec<String> {
    let min_lon = bounds.min_lon.floor() as i32;
    let min_lat = bounds.min_lat.floor() as i32;
    let max_lon = bounds.max_lon.ceil() as i32;
    let max_lat = bounds.max_lat.ceil() as i32;

    let mut urls = Vec::new();
    for lon in min_lon..max_lon {
        for lat in min_lat..max_lat {
            urls.push(format!(
                "{URL_TEMPLATE}/{property}/{stat}/{depth}/{}",
                tile_name(lat, lon)
            ));
        }
    }
    urls
}

/// Parse the SW corner (lat, lon) out of a POLARIS tile filename.
///
/// The lat/lon chunks each hold two adjacent signed integers with no
/// separator (`3738`, `-121-120`); the split is resolved by requiring the
/// second value to be the first plus one.
pub fn sw_corner_from_filename(name: &str) -> Option<(i32, i32)> {
    let stem = name.strip_suffix(".tif").unwrap_or(name);
    let rest = stem.strip_prefix("lat")?;
    let (lat_chunk, lon_chunk) = rest.split_once("_lon")?;
    let (lat_sw, _) = split_adjacent_pair(lat_chunk)?;
    let (lon_sw, _) = split_adjacent_pair(lon_chunk)?;
    Some((lat_sw, lon_sw))
}

/// Split a string like "3738" or "-121-120" into (n, n + 1).
fn split_adjacent_pair(s: &str) -> Option<(i32, i32)> {
    for k in 1..s.len() {
        if !s.is_char_boundary(k) {
            continue;
        }
        let (a, b) = s.split_at(k);
        if let (Ok(a), Ok(b)) = (a.parse::<i32>(), b.parse::<i32>()) {
            if b == a + 1 {
                return Some((a, b));
            }
        }
    }
    None
}

/// Geographic bounds of the 1°×1° tile at the given SW corner.
pub fn tile_bounds(lat_sw: i32, lon_sw: i32) -> Bounds {
    Bounds::new(
        lon_sw as f64,
        lat_sw as f64,
        (lon_sw + 1) as f64,
        (lat_sw + 1) as f64,
    )
}
