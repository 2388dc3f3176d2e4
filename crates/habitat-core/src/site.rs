use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::raster::Bounds;

/// Default margin added around a site's bounds when cropping source tiles,
/// in degrees. Keeps the boundary visible at the raster edge.
pub const BOUNDS_BUFFER_DEG: f64 = 0.025;

/// A named study site: a forest administrative unit with a boundary polygon.
/// Rings are closed implicitly (last vertex connects back to the first);
/// vertices are `[lon, lat]` pairs in EPSG:4326 degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub boundary: Vec<Vec<[f64; 2]>>,
}

impl Site {
    /// Bounding box over every boundary ring.
    pub fn bounds(&self) -> Bounds {
        let mut b = Bounds::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        );
        for ring in &self.boundary {
            for &[lon, lat] in ring {
                b.min_lon = b.min_lon.min(lon);
                b.max_lon = b.max_lon.max(lon);
                b.min_lat = b.min_lat.min(lat);
                b.max_lat = b.max_lat.max(lat);
            }
        }
        b
    }

    /// Bounds expanded by `buffer_deg` on every side.
    pub fn buffered_bounds(&self, buffer_deg: f64) -> Bounds {
        self.bounds().buffered(buffer_deg)
    }

    /// Even-odd-rule point-in-polygon test over the boundary rings.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let mut inside = false;
        for ring in &self.boundary {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let [xi, yi] = ring[i];
                let [xj, yj] = ring[j];
                if (yi > lat) != (yj > lat) {
                    let x_cross = xj + (lat - yj) / (yi - yj) * (xi - xj);
                    if lon < x_cross {
                        inside = !inside;
                    }
                }
                j = i;
            }
        }
        inside
    }
}

/// The vector-boundary input document: `{ "sites": [...] }`.
#[derive(Debug, Deserialize)]
pub struct SiteFile {
    pub sites: Vec<Site>,
}

impl SiteFile {
    pub fn load(path: &Path) -> Result<SiteFile> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse site file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_site() -> Site {
        Site {
            id: "test".into(),
            name: "Test Site".into(),
            boundary: vec![vec![
                [-120.0, 35.0],
                [-119.0, 35.0],
                [-119.0, 36.0],
                [-120.0, 36.0],
            ]],
        }
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let b = square_site().bounds();
        assert_eq!(b.min_lon, -120.0);
        assert_eq!(b.max_lon, -119.0);
        assert_eq!(b.min_lat, 35.0);
        assert_eq!(b.max_lat, 36.0);
    }

    #[test]
    fn buffered_bounds_expand_every_side() {
        let b = square_site().buffered_bounds(0.025);
        assert!((b.min_lon - -120.025).abs() < 1e-12);
        assert!((b.max_lat - 36.025).abs() < 1e-12);
    }

    #[test]
    fn contains_distinguishes_inside_and_outside() {
        let site = square_site();
        assert!(site.contains(-119.5, 35.5));
        assert!(!site.contains(-118.5, 35.5));
        assert!(!site.contains(-119.5, 36.5));
    }

    #[test]
    fn contains_handles_concave_ring() {
        // L-shaped site: the notch at the upper right is outside.
        let site = Site {
            id: "l".into(),
            name: "L".into(),
            boundary: vec![vec![
                [0.0, 0.0],
                [2.0, 0.0],
                [2.0, 1.0],
                [1.0, 1.0],
                [1.0, 2.0],
                [0.0, 2.0],
            ]],
        };
        assert!(site.contains(0.5, 1.5));
        assert!(!site.contains(1.5, 1.5));
        assert!(site.contains(1.5, 0.5));
    }
}
