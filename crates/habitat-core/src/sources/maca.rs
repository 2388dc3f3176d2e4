//! MACAv2-METDATA downscaled climate projection addressing.
//!
//! Monthly maximum-temperature (`tasmax`) files are served from the
//! Northwest Knowledge Network THREDDS server, one file per GCM, emissions
//! scenario, and five-year time slice.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const THREDDS_URL: &str = "http://thredds.northwestknowledge.net:8080/thredds/fileServer/MACAV2";

/// Global Climate Models queried by default.
pub const DEFAULT_GCMS: &[&str] = &["CanESM2", "CNRM-CM5", "MIROC5"];

/// Late-century five-year slice starts (2076–2080 … 2096–2100).
pub const DEFAULT_TIME_SLICE_STARTS: &[u16] = &[2076, 2081, 2086, 2091, 2096];

/// Years covered by one MACA file.
pub const SLICE_SPAN_YEARS: u16 = 5;

/// Representative Concentration Pathway emissions scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    Rcp45,
    Rcp85,
}

impl Scenario {
    /// The label used in MACA file names, e.g. "rcp45".
    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Rcp45 => "rcp45",
            Scenario::Rcp85 => "rcp85",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rcp45" => Ok(Scenario::Rcp45),
            "rcp85" => Ok(Scenario::Rcp85),
            other => Err(format!("unknown emissions scenario: {other} (expected rcp45 or rcp85)")),
        }
    }
}

/// Stem shared by the remote NetCDF file and its local GeoTIFF export.
fn slice_stem(gcm: &str, scenario: Scenario, start_year: u16) -> String {
    let end_year = start_year + SLICE_SPAN_YEARS - 1;
    format!(
        "macav2metdata_tasmax_{gcm}_r1i1p1_{}_{start_year}_{end_year}_CONUS_monthly",
        scenario.label()
    )
}

/// THREDDS URL for one five-year monthly tasmax slice.
pub fn slice_url(gcm: &str, scenario: Scenario, start_year: u16) -> String {
    format!("{THREDDS_URL}/{gcm}/{}.nc", slice_stem(gcm, scenario, start_year))
}

/// Local filename of the GeoTIFF export of one slice (the slice's monthly
/// mean tasmax grid, still in Kelvin).
pub fn slice_filename(gcm: &str, scenario: Scenario, start_year: u16) -> String {
    format!("{}.tif", slice_stem(gcm, scenario, start_year))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_url_matches_thredds_layout() {
        let url = slice_url("CanESM2", Scenario::Rcp85, 2096);
        assert_eq!(
            url,
            "http://thredds.northwestknowledge.net:8080/thredds/fileServer/MACAV2/CanESM2/\
             macav2metdata_tasmax_CanESM2_r1i1p1_rcp85_2096_2100_CONUS_monthly.nc"
        );
    }

    #[test]
    fn slice_filename_swaps_extension() {
        let name = slice_filename("MIROC5", Scenario::Rcp45, 2076);
        assert_eq!(
            name,
            "macav2metdata_tasmax_MIROC5_r1i1p1_rcp45_2076_2080_CONUS_monthly.tif"
        );
    }

    #[test]
    fn scenario_parses_case_insensitively() {
        assert_eq!("rcp45".parse::<Scenario>().unwrap(), Scenario::Rcp45);
        assert_eq!("RCP85".parse::<Scenario>().unwrap(), Scenario::Rcp85);
        assert!("rcp99".parse::<Scenario>().is_err());
    }
}
