//! The habitat suitability model: harmonize the environmental layers onto
//! the elevation reference grid, score each variable against the species
//! tolerances, and combine the scores multiplicatively.

use serde::Serialize;

use crate::error::ModelError;
use crate::harmonize::harmonize_to;
use crate::raster::Raster;
use crate::suitability::{combine_layers, suitability_score, threshold_mask, SpeciesProfile};

/// Environmental layers for one site × scenario × GCM run.
/// The elevation raster defines the reference grid.
pub struct SuitabilityInputs {
    pub elevation: Raster,
    pub aspect: Raster,
    pub soil_ph: Raster,
    pub max_temp: Raster,
}

/// Summary statistics for one layer, reported per run.
#[derive(Debug, Clone, Serialize)]
pub struct LayerStats {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub valid_fraction: f64,
}

impl LayerStats {
    fn of(name: &'static str, raster: &Raster) -> Self {
        Self {
            name,
            min: raster.min_value(),
            max: raster.max_value(),
            mean: raster.mean_value(),
            valid_fraction: raster.valid_fraction(),
        }
    }
}

/// Output of one model run.
pub struct SuitabilityOutput {
    /// Composite suitability, on the elevation grid, values in [0, 1].
    pub composite: Raster,
    /// Binary suitable/unsuitable mask, present when a threshold was given.
    pub mask: Option<Raster>,
    /// Per-variable score statistics, in layer order.
    pub layer_stats: Vec<LayerStats>,
    pub composite_stats: LayerStats,
}

/// Run the suitability model.
///
/// Every non-reference layer is resampled onto the elevation grid before
/// scoring, so the combination step sees aligned, no-data-consistent
/// layers.
pub fn build_suitability(
    inputs: &SuitabilityInputs,
    profile: &SpeciesProfile,
    threshold: Option<f32>,
) -> Result<SuitabilityOutput, ModelError> {
    let reference = &inputs.elevation;

    let aspect = harmonize_to(reference, &inputs.aspect);
    let soil_ph = harmonize_to(reference, &inputs.soil_ph);
    let max_temp = harmonize_to(reference, &inputs.max_temp);

    let scored = vec![
        (
            "elevation",
            suitability_score(reference, &profile.elevation),
        ),
        ("aspect", suitability_score(&aspect, &profile.aspect)),
        ("soil_ph", suitability_score(&soil_ph, &profile.soil_ph)),
        ("max_temp", suitability_score(&max_temp, &profile.max_temp)),
    ];

    let layer_stats = scored
        .iter()
        .map(|&(name, ref layer)| LayerStats::of(name, layer))
        .collect();

    let layers: Vec<Raster> = scored.into_iter().map(|(_, layer)| layer).collect();
    let composite = combine_layers(&layers)?;
    let composite_stats = LayerStats::of("suitability", &composite);
    let mask = threshold.map(|t| threshold_mask(&composite, t));

    Ok(SuitabilityOutput {
        composite,
        mask,
        layer_stats,
        composite_stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Bounds;
    use crate::suitability::Tolerance;

    fn bounds() -> Bounds {
        Bounds::new(-120.0, 36.0, -119.9, 36.1)
    }

    fn optimal_inputs(profile: &SpeciesProfile) -> SuitabilityInputs {
        SuitabilityInputs {
            elevation: Raster::new(8, 8, bounds(), profile.elevation.optimal as f32),
            aspect: Raster::new(8, 8, bounds(), profile.aspect.optimal as f32),
            soil_ph: Raster::new(8, 8, bounds(), profile.soil_ph.optimal as f32),
            max_temp: Raster::new(8, 8, bounds(), profile.max_temp.optimal as f32),
        }
    }

    #[test]
    fn optimal_site_scores_one_everywhere() {
        let profile = SpeciesProfile::blue_oak();
        let out = build_suitability(&optimal_inputs(&profile), &profile, None).unwrap();
        for &v in &out.composite.data {
            assert!((v - 1.0).abs() < 1e-5, "expected ≈1.0, got {v}");
        }
        assert!(out.mask.is_none());
    }

    #[test]
    fn composite_lives_on_the_elevation_grid() {
        let profile = SpeciesProfile::blue_oak();
        let mut inputs = optimal_inputs(&profile);
        // Coarser soil grid over the same extent still harmonizes cleanly.
        inputs.soil_ph = Raster::new(4, 4, bounds(), profile.soil_ph.optimal as f32);
        let out = build_suitability(&inputs, &profile, None).unwrap();
        assert!(out.composite.same_grid(&inputs.elevation));
    }

    #[test]
    fn off_optimum_layer_lowers_the_composite() {
        let profile = SpeciesProfile::blue_oak();
        let mut inputs = optimal_inputs(&profile);
        // One tolerance away on soil pH: composite should drop to exp(−1/2).
        inputs.soil_ph = Raster::new(
            8,
            8,
            bounds(),
            (profile.soil_ph.optimal + profile.soil_ph.tolerance) as f32,
        );
        let out = build_suitability(&inputs, &profile, None).unwrap();
        let expected = (-0.5f64).exp() as f32;
        let got = out.composite.get(4, 4);
        assert!((got - expected).abs() < 1e-4, "expected {expected}, got {got}");
    }

    #[test]
    fn nodata_in_one_layer_masks_the_cell() {
        let profile = SpeciesProfile::blue_oak();
        let mut inputs = optimal_inputs(&profile);
        inputs.max_temp.set(3, 3, f32::NAN);
        let out = build_suitability(&inputs, &profile, None).unwrap();
        assert!(out.composite.get(3, 3).is_nan());
        assert!(!out.composite.get(6, 6).is_nan());
        assert!(out.composite_stats.valid_fraction < 1.0);
    }

    #[test]
    fn threshold_produces_binary_mask() {
        let profile = SpeciesProfile {
            species: "test".into(),
            elevation: Tolerance::new(500.0, 400.0),
            aspect: Tolerance::new(180.0, 90.0),
            soil_ph: Tolerance::new(6.5, 0.8),
            max_temp: Tolerance::new(80.0, 10.0),
        };
        let mut inputs = optimal_inputs(&profile);
        // Push half the elevation cells far off the optimum.
        for r in 0..4 {
            for c in 0..8 {
                inputs.elevation.set(r, c, 3000.0);
            }
        }
        let out = build_suitability(&inputs, &profile, Some(0.5)).unwrap();
        let mask = out.mask.unwrap();
        assert_eq!(mask.get(0, 0), 0.0);
        assert_eq!(mask.get(7, 7), 1.0);
    }

    #[test]
    fn layer_stats_cover_all_four_variables() {
        let profile = SpeciesProfile::blue_oak();
        let out = build_suitability(&optimal_inputs(&profile), &profile, None).unwrap();
        let names: Vec<&str> = out.layer_stats.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["elevation", "aspect", "soil_ph", "max_temp"]);
    }
}
