//! Fuzzy habitat suitability scoring.
//!
//! Each environmental variable is scored per cell against a species
//! tolerance (Gaussian membership), and the per-variable layers are combined
//! multiplicatively into one composite suitability raster.

pub mod combine;
pub mod score;
pub mod tolerance;

pub use combine::{combine_layers, threshold_mask};
pub use score::suitability_score;
pub use tolerance::{SpeciesProfile, Tolerance};
