//! On-disk raster naming scheme shared by the ingest and model tools.
//! All derived rasters are serialized `Raster` JSON documents.

use super::maca::Scenario;

pub fn elevation_raster(site_id: &str) -> String {
    format!("{site_id}_elevation.json")
}

pub fn aspect_raster(site_id: &str) -> String {
    format!("{site_id}_aspect.json")
}

pub fn soil_raster(site_id: &str, property: &str) -> String {
    format!("{site_id}_soil_{property}.json")
}

pub fn max_temp_raster(site_id: &str, scenario: Scenario, gcm: &str) -> String {
    format!("{site_id}_{}_{gcm}_max_temp.json", scenario.label())
}

pub fn suitability_raster(site_id: &str, scenario: Scenario, gcm: &str) -> String {
    format!("{site_id}_{}_{gcm}_suitability.json", scenario.label())
}

pub fn suitability_mask(site_id: &str, scenario: Scenario, gcm: &str) -> String {
    format!("{site_id}_{}_{gcm}_suitability_mask.json", scenario.label())
}

pub fn manifest(site_id: &str) -> String {
    format!("{site_id}_manifest.json")
}
