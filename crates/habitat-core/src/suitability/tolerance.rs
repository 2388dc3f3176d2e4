use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Species tolerance for one environmental variable: the ideal value μ and
/// the accepted deviation σ shaping the Gaussian membership function.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tolerance {
    pub optimal: f64,
    pub tolerance: f64,
}

impl Tolerance {
    pub fn new(optimal: f64, tolerance: f64) -> Self {
        Self { optimal, tolerance }
    }
}

/// Per-variable tolerances for one species.
///
/// Variables follow the model's layer order: elevation (m), aspect
/// (degrees clockwise from north), soil pH, projected maximum temperature
/// (°F).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesProfile {
    pub species: String,
    pub elevation: Tolerance,
    pub aspect: Tolerance,
    pub soil_ph: Tolerance,
    pub max_temp: Tolerance,
}

impl SpeciesProfile {
    /// Blue oak (*Quercus douglasii*): low-elevation foothill woodland on
    /// south-facing slopes, slightly acid soils, warm dry summers.
    pub fn blue_oak() -> Self {
        Self {
            species: "Quercus douglasii".into(),
            elevation: Tolerance::new(500.0, 400.0),
            aspect: Tolerance::new(180.0, 90.0),
            soil_ph: Tolerance::new(6.5, 0.8),
            max_temp: Tolerance::new(80.0, 10.0),
        }
    }

    pub fn load(path: &Path) -> Result<SpeciesProfile> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse species profile: {}", path.display()))
    }
}

impl Default for SpeciesProfile {
    fn default() -> Self {
        Self::blue_oak()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_round_trips_through_json() {
        let profile = SpeciesProfile::blue_oak();
        let json = serde_json::to_string(&profile).unwrap();
        let back: SpeciesProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.species, "Quercus douglasii");
        assert_eq!(back.elevation.optimal, 500.0);
        assert_eq!(back.max_temp.tolerance, 10.0);
    }
}
