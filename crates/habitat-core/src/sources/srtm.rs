//! SRTM 1 arc-second (SRTMGL1) granule addressing.
//!
//! Granules are 1°×1° and named by their SW corner, e.g. `N37W120`.

use crate::raster::Bounds;

/// SRTM Int16 no-data sentinel (voids).
pub const SRTM_NODATA_I16: i16 = -32768;
/// No-data sentinel used by Float32 DEM exports.
pub const DEM_NODATA_F32: f32 = -9999.0;

const LPDAAC_URL: &str = "https://e4ftl01.cr.usgs.gov/MEASURES/SRTMGL1.003/2000.02.11";

/// Granule id for the 1°×1° cell whose SW corner is (lat_sw, lon_sw),
/// e.g. (37, −120) → "N37W120".
pub fn granule_id(lat_sw: i32, lon_sw: i32) -> String {
    let ns = if lat_sw < 0 { 'S' } else { 'N' };
    let ew = if lon_sw < 0 { 'W' } else { 'E' };
    format!(
        "{}{:02}{}{:03}",
        ns,
        lat_sw.unsigned_abs(),
        ew,
        lon_sw.unsigned_abs()
    )
}

/// Granule ids needed to cover `bounds`.
pub fn granules_for_bounds(bounds: Bounds) -> Vec<String> {
    let min_lon = bounds.min_lon.floor() as i32;
    let min_lat = bounds.min_lat.floor() as i32;
    let max_lon = bounds.max_lon.ceil() as i32;
    let max_lat = bounds.max_lat.ceil() as i32;

    let mut ids = Vec::new();
    for lon in min_lon..max_lon {
        for lat in min_lat..max_lat {
            ids.push(granule_id(lat, lon));
        }
    }
    ids
}

/// LP DAAC download URL for a granule.
pub fn download_url(granule: &str) -> String {
    format!("{LPDAAC_URL}/{granule}.SRTMGL1.hgt.zip")
}

/// Parse the SW corner (lat_sw, lon_sw) from any string containing a
/// granule-id chunk of the form `[nsNS]\d+[ewEW]\d+`, e.g.:
///   "N37W120.tif"      → (37.0, −120.0)
///   "n37w120_dem.tif"  → (37.0, −120.0)
///   "s05e015"          → (−5.0, 15.0)
pub fn parse_coord_chunk(s: &str) -> Option<(f64, f64)> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let lat_sign = match bytes[i].to_ascii_lowercase() {
            b'n' => 1.0f64,
            b's' => -1.0,
            _ => {
                i += 1;
                continue;
            }
        };
        let mut j = i + 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j == i + 1 {
            i += 1;
            continue;
        }
        let lat_val: f64 = match s[i + 1..j].parse() {
            Ok(v) => v,
            Err(_) => {
                i += 1;
                continue;
            }
        };
        if j >= bytes.len() {
            break;
        }
        let lon_sign = match bytes[j].to_ascii_lowercase() {
            b'e' => 1.0f64,
            b'w' => -1.0,
            _ => {
                i = j;
                continue;
            }
        };
        let k = j + 1;
        let mut l = k;
        while l < bytes.len() && bytes[l].is_ascii_digit() {
            l += 1;
        }
        if l == k {
            i = j + 1;
            continue;
        }
        let lon_val: f64 = match s[k..l].parse() {
            Ok(v) => v,
            Err(_) => {
                i = l;
                continue;
            }
        };
        return Some((lat_sign * lat_val, lon_sign * lon_val));
    }
    None
}

/// Does the 1°×1° granule whose SW corner is (lat_sw, lon_sw) overlap `bounds`?
pub fn granule_overlaps(lat_sw: f64, lon_sw: f64, bounds: &Bounds) -> bool {
    let lat_ne = lat_sw + 1.0;
    let lon_ne = lon_sw + 1.0;
    lat_sw < bounds.max_lat
        && lat_ne > bounds.min_lat
        && lon_sw < bounds.max_lon
        && lon_ne > bounds.min_lon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granule_id_pads_and_signs() {
        assert_eq!(granule_id(37, -120), "N37W120");
        assert_eq!(granule_id(-5, 15), "S05E015");
        assert_eq!(granule_id(0, 0), "N00E000");
    }

    #[test]
    fn granules_for_fractional_bounds() {
        // Spans 2 lon cells × 1 lat cell.
        let bounds = Bounds::new(-120.6, 36.2, -119.1, 36.7);
        let ids = granules_for_bounds(bounds);
        assert_eq!(ids, vec!["N36W121", "N36W120"]);
    }

    #[test]
    fn parse_coord_chunk_handles_both_cases() {
        assert_eq!(parse_coord_chunk("N37W120.tif"), Some((37.0, -120.0)));
        assert_eq!(parse_coord_chunk("n37w120_dem.tif"), Some((37.0, -120.0)));
        assert_eq!(parse_coord_chunk("s05e015"), Some((-5.0, 15.0)));
        assert_eq!(parse_coord_chunk("elevation.tif"), None);
    }

    #[test]
    fn parse_coord_chunk_skips_leading_noise() {
        assert_eq!(parse_coord_chunk("srtm_N36W119.tif"), Some((36.0, -119.0)));
    }

    #[test]
    fn overlap_test_excludes_adjacent_granules() {
        let bounds = Bounds::new(-120.5, 36.2, -120.1, 36.7);
        assert!(granule_overlaps(36.0, -121.0, &bounds));
        assert!(!granule_overlaps(36.0, -120.0, &bounds));
        assert!(!granule_overlaps(37.0, -121.0, &bounds));
    }

    #[test]
    fn download_url_names_the_archive() {
        assert!(download_url("N37W120").ends_with("/N37W120.SRTMGL1.hgt.zip"));
    }
}
