//! Fuzzy Gaussian suitability scoring.

use crate::raster::Raster;

use super::tolerance::Tolerance;

/// Score every cell of `raster` against a species tolerance.
///
/// Each cell value `v` maps to `exp(−(v − μ)² / (2σ²))`, a membership score
/// in [0, 1] that peaks at 1.0 where `v == μ` and decays symmetrically with
/// distance from the optimum. No-data propagates.
pub fn suitability_score(raster: &Raster, tolerance: &Tolerance) -> Raster {
    let mu = tolerance.optimal;
    let two_sigma_sq = 2.0 * tolerance.tolerance * tolerance.tolerance;
    raster.map_values(|v| {
        let d = v as f64 - mu;
        (-(d * d) / two_sigma_sq).exp() as f32
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::raster::Bounds;

    fn value_raster(values: &[f32]) -> Raster {
        let mut ra = Raster::new(values.len(), 1, Bounds::new(0.0, 0.0, 1.0, 1.0), 0.0);
        ra.data.copy_from_slice(values);
        ra
    }

    #[test]
    fn optimal_value_scores_one() {
        let scored = suitability_score(&value_raster(&[500.0]), &Tolerance::new(500.0, 400.0));
        assert!((scored.get(0, 0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn score_is_symmetric_about_optimum() {
        let tol = Tolerance::new(6.5, 0.8);
        let scored = suitability_score(&value_raster(&[5.5, 7.5]), &tol);
        assert!((scored.get(0, 0) - scored.get(0, 1)).abs() < 1e-6);
    }

    #[test]
    fn score_decays_monotonically_with_distance() {
        let tol = Tolerance::new(0.0, 1.0);
        let scored = suitability_score(&value_raster(&[0.0, 0.5, 1.0, 2.0, 4.0]), &tol);
        for c in 1..5 {
            assert!(
                scored.get(0, c) < scored.get(0, c - 1),
                "score should decrease with |v − μ|"
            );
        }
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let tol = Tolerance::new(80.0, 10.0);
        let scored = suitability_score(&value_raster(&[-100.0, 0.0, 80.0, 300.0]), &tol);
        for &v in &scored.data {
            assert!((0.0..=1.0).contains(&v), "score {v} out of [0, 1]");
        }
    }

    #[test]
    fn one_sigma_matches_gaussian() {
        let tol = Tolerance::new(0.0, 1.0);
        let scored = suitability_score(&value_raster(&[1.0]), &tol);
        let expected = (-0.5f64).exp() as f32;
        assert_relative_eq!(scored.get(0, 0), expected, max_relative = 1e-6);
    }

    #[test]
    fn nodata_propagates() {
        let scored = suitability_score(&value_raster(&[f32::NAN, 1.0]), &Tolerance::new(1.0, 1.0));
        assert!(scored.get(0, 0).is_nan());
        assert!((scored.get(0, 1) - 1.0).abs() < 1e-6);
    }
}
