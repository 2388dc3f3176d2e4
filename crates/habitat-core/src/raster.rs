use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Geographic bounding box in EPSG:4326 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self { min_lon, min_lat, max_lon, max_lat }
    }

    /// Expand the box by `deg` on every side.
    pub fn buffered(&self, deg: f64) -> Self {
        Self {
            min_lon: self.min_lon - deg,
            min_lat: self.min_lat - deg,
            max_lon: self.max_lon + deg,
            max_lat: self.max_lat + deg,
        }
    }

    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_lon < other.max_lon
            && self.max_lon > other.min_lon
            && self.min_lat < other.max_lat
            && self.max_lat > other.min_lat
    }

    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// A 2D environmental raster storing cell values as f32, row-major.
/// Row 0 is the southernmost row. The no-data sentinel is `f32::NAN`;
/// coordinate math uses f64.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Raster {
    /// Row-major cell values.
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Raster {
    /// Create a new Raster filled with the given value.
    pub fn new(width: usize, height: usize, bounds: Bounds, fill: f32) -> Self {
        Self {
            data: vec![fill; width * height],
            width,
            height,
            min_lon: bounds.min_lon,
            max_lon: bounds.max_lon,
            min_lat: bounds.min_lat,
            max_lat: bounds.max_lat,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.min_lon, self.min_lat, self.max_lon, self.max_lat)
    }

    /// True when `other` lives on the identical grid (dimensions and bounds).
    pub fn same_grid(&self, other: &Raster) -> bool {
        const EPS: f64 = 1e-9;
        self.width == other.width
            && self.height == other.height
            && (self.min_lon - other.min_lon).abs() < EPS
            && (self.max_lon - other.max_lon).abs() < EPS
            && (self.min_lat - other.min_lat).abs() < EPS
            && (self.max_lat - other.max_lat).abs() < EPS
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f32) {
        self.data[row * self.width + col] = val;
    }

    /// Cell width in degrees of longitude.
    pub fn cell_width_deg(&self) -> f64 {
        (self.max_lon - self.min_lon) / self.width as f64
    }

    /// Cell height in degrees of latitude.
    pub fn cell_height_deg(&self) -> f64 {
        (self.max_lat - self.min_lat) / self.height as f64
    }

    /// Geographic coordinates of the center of cell `(row, col)`.
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        let lon = self.min_lon + (col as f64 + 0.5) * self.cell_width_deg();
        let lat = self.min_lat + (row as f64 + 0.5) * self.cell_height_deg();
        (lon, lat)
    }

    /// Sample the raster at (lon, lat) using bilinear interpolation between
    /// cell centers. Returns None outside the bounds; a no-data cell among
    /// the interpolation corners makes the result NaN.
    pub fn sample(&self, lon: f64, lat: f64) -> Option<f32> {
        if lon < self.min_lon || lon > self.max_lon || lat < self.min_lat || lat > self.max_lat {
            return None;
        }

        let fx = ((lon - self.min_lon) / (self.max_lon - self.min_lon) * self.width as f64 - 0.5)
            .clamp(0.0, (self.width - 1) as f64);
        let fy = ((lat - self.min_lat) / (self.max_lat - self.min_lat) * self.height as f64 - 0.5)
            .clamp(0.0, (self.height - 1) as f64);

        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let tx = (fx - x0 as f64) as f32;
        let ty = (fy - y0 as f64) as f32;

        let v00 = self.get(y0, x0);
        let v10 = self.get(y0, x1);
        let v01 = self.get(y1, x0);
        let v11 = self.get(y1, x1);

        let v = v00 * (1.0 - tx) * (1.0 - ty)
            + v10 * tx * (1.0 - ty)
            + v01 * (1.0 - tx) * ty
            + v11 * tx * ty;

        Some(v)
    }

    /// Clip to the cells whose extent intersects `bounds`.
    pub fn crop(&self, bounds: Bounds) -> Result<Raster, ModelError> {
        if !self.bounds().overlaps(&bounds) {
            return Err(ModelError::NoCoverage);
        }

        let cw = self.cell_width_deg();
        let ch = self.cell_height_deg();

        let col0 = (((bounds.min_lon - self.min_lon) / cw).floor().max(0.0)) as usize;
        let col1 = ((((bounds.max_lon - self.min_lon) / cw).ceil()) as usize).min(self.width);
        let row0 = (((bounds.min_lat - self.min_lat) / ch).floor().max(0.0)) as usize;
        let row1 = ((((bounds.max_lat - self.min_lat) / ch).ceil()) as usize).min(self.height);

        if col0 >= col1 || row0 >= row1 {
            return Err(ModelError::NoCoverage);
        }

        let out_bounds = Bounds::new(
            self.min_lon + col0 as f64 * cw,
            self.min_lat + row0 as f64 * ch,
            self.min_lon + col1 as f64 * cw,
            self.min_lat + row1 as f64 * ch,
        );
        let mut out = Raster::new(col1 - col0, row1 - row0, out_bounds, f32::NAN);
        for r in row0..row1 {
            for c in col0..col1 {
                out.set(r - row0, c - col0, self.get(r, c));
            }
        }
        Ok(out)
    }

    /// Merge same-resolution tiles into one grid covering `bounds`.
    /// Resolution is taken from the first tile; where tiles overlap, the
    /// first tile carrying a valid value wins. Cells covered by no tile
    /// stay no-data.
    pub fn mosaic(tiles: &[Raster], bounds: Bounds) -> Result<Raster, ModelError> {
        let first = tiles.first().ok_or(ModelError::EmptyStack)?;
        let cw = first.cell_width_deg();
        let ch = first.cell_height_deg();

        let width = ((bounds.max_lon - bounds.min_lon) / cw).round().max(1.0) as usize;
        let height = ((bounds.max_lat - bounds.min_lat) / ch).round().max(1.0) as usize;

        let mut out = Raster::new(width, height, bounds, f32::NAN);
        for r in 0..height {
            for c in 0..width {
                let (lon, lat) = out.cell_center(r, c);
                for tile in tiles {
                    let Some(v) = tile.nearest(lon, lat) else {
                        continue;
                    };
                    if !v.is_nan() {
                        out.set(r, c, v);
                        break;
                    }
                }
            }
        }
        Ok(out)
    }

    /// Nearest-neighbour lookup at (lon, lat). None outside the bounds.
    pub fn nearest(&self, lon: f64, lat: f64) -> Option<f32> {
        if lon < self.min_lon || lon > self.max_lon || lat < self.min_lat || lat > self.max_lat {
            return None;
        }
        let col = (((lon - self.min_lon) / self.cell_width_deg()) as usize).min(self.width - 1);
        let row = (((lat - self.min_lat) / self.cell_height_deg()) as usize).min(self.height - 1);
        Some(self.get(row, col))
    }

    pub fn min_value(&self) -> f32 {
        self.data
            .iter()
            .cloned()
            .filter(|v| !v.is_nan())
            .fold(f32::INFINITY, f32::min)
    }

    pub fn max_value(&self) -> f32 {
        self.data
            .iter()
            .cloned()
            .filter(|v| !v.is_nan())
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Mean over valid cells. NaN when every cell is no-data.
    pub fn mean_value(&self) -> f32 {
        let mut sum = 0.0f64;
        let mut n = 0usize;
        for &v in &self.data {
            if !v.is_nan() {
                sum += v as f64;
                n += 1;
            }
        }
        if n == 0 {
            f32::NAN
        } else {
            (sum / n as f64) as f32
        }
    }

    /// Fraction of cells carrying a valid (non-NaN) value.
    pub fn valid_fraction(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let valid = self.data.iter().filter(|v| !v.is_nan()).count();
        valid as f64 / self.data.len() as f64
    }

    /// Apply a function to every valid cell; no-data passes through.
    pub fn map_values(&self, f: impl Fn(f32) -> f32) -> Raster {
        let mut out = self.clone();
        for v in &mut out.data {
            if !v.is_nan() {
                *v = f(*v);
            }
        }
        out
    }

    pub fn from_json_file(path: &Path) -> Result<Raster> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse raster JSON: {}", path.display()))
    }

    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json).with_context(|| format!("Write failed: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_bounds() -> Bounds {
        Bounds::new(0.0, 0.0, 1.0, 1.0)
    }

    #[test]
    fn sample_cell_centers_return_exact_values() {
        let mut ra = Raster::new(4, 4, unit_bounds(), 0.0);
        ra.set(0, 0, 10.0);
        ra.set(2, 3, 40.0);

        let (lon, lat) = ra.cell_center(0, 0);
        assert!((ra.sample(lon, lat).unwrap() - 10.0).abs() < 1e-5);
        let (lon, lat) = ra.cell_center(2, 3);
        assert!((ra.sample(lon, lat).unwrap() - 40.0).abs() < 1e-5);
    }

    #[test]
    fn sample_out_of_bounds_returns_none() {
        let ra = Raster::new(4, 4, unit_bounds(), 0.0);
        assert!(ra.sample(-0.5, 0.5).is_none());
        assert!(ra.sample(0.5, 2.0).is_none());
    }

    #[test]
    fn sample_near_nodata_is_nan() {
        let mut ra = Raster::new(4, 4, unit_bounds(), 1.0);
        ra.set(1, 1, f32::NAN);
        let (lon, lat) = ra.cell_center(1, 1);
        assert!(ra.sample(lon, lat).unwrap().is_nan());
    }

    #[test]
    fn crop_keeps_values_and_shrinks_bounds() {
        let mut ra = Raster::new(10, 10, Bounds::new(0.0, 0.0, 10.0, 10.0), 0.0);
        ra.set(5, 5, 7.0);

        let cropped = ra.crop(Bounds::new(4.0, 4.0, 7.0, 7.0)).unwrap();
        assert_eq!(cropped.width, 3);
        assert_eq!(cropped.height, 3);
        assert!((cropped.min_lon - 4.0).abs() < 1e-9);
        assert!((cropped.max_lat - 7.0).abs() < 1e-9);
        assert_eq!(cropped.get(1, 1), 7.0);
    }

    #[test]
    fn crop_outside_extent_fails() {
        let ra = Raster::new(4, 4, unit_bounds(), 0.0);
        assert!(matches!(
            ra.crop(Bounds::new(5.0, 5.0, 6.0, 6.0)),
            Err(ModelError::NoCoverage)
        ));
    }

    #[test]
    fn mosaic_first_valid_tile_wins() {
        let west = Raster::new(10, 10, Bounds::new(0.0, 0.0, 1.0, 1.0), 1.0);
        let east = Raster::new(10, 10, Bounds::new(1.0, 0.0, 2.0, 1.0), 2.0);
        // Overlapping third tile should lose to the earlier tiles.
        let overlap = Raster::new(20, 10, Bounds::new(0.0, 0.0, 2.0, 1.0), 9.0);

        let merged =
            Raster::mosaic(&[west, east, overlap], Bounds::new(0.0, 0.0, 2.0, 1.0)).unwrap();
        assert_eq!(merged.width, 20);
        assert_eq!(merged.height, 10);
        assert_eq!(merged.nearest(0.5, 0.5), Some(1.0));
        assert_eq!(merged.nearest(1.5, 0.5), Some(2.0));
    }

    #[test]
    fn mosaic_uncovered_cells_are_nodata() {
        let west = Raster::new(10, 10, Bounds::new(0.0, 0.0, 1.0, 1.0), 1.0);
        let merged = Raster::mosaic(&[west], Bounds::new(0.0, 0.0, 2.0, 1.0)).unwrap();
        assert_eq!(merged.nearest(0.5, 0.5), Some(1.0));
        assert!(merged.nearest(1.5, 0.5).unwrap().is_nan());
    }

    #[test]
    fn mosaic_empty_tile_list_fails() {
        assert!(matches!(
            Raster::mosaic(&[], unit_bounds()),
            Err(ModelError::EmptyStack)
        ));
    }

    #[test]
    fn stats_ignore_nodata() {
        let mut ra = Raster::new(2, 2, unit_bounds(), 0.0);
        ra.set(0, 0, 2.0);
        ra.set(0, 1, 4.0);
        ra.set(1, 0, f32::NAN);
        ra.set(1, 1, 6.0);

        assert_eq!(ra.min_value(), 2.0);
        assert_eq!(ra.max_value(), 6.0);
        assert!((ra.mean_value() - 4.0).abs() < 1e-6);
        assert!((ra.valid_fraction() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn json_round_trip_preserves_grid() {
        let mut ra = Raster::new(3, 2, Bounds::new(-120.0, 35.0, -119.0, 36.0), 0.0);
        ra.set(1, 2, 812.5);

        let json = serde_json::to_string(&ra).unwrap();
        let back: Raster = serde_json::from_str(&json).unwrap();
        assert!(back.same_grid(&ra));
        assert_eq!(back.get(1, 2), 812.5);
    }
}
