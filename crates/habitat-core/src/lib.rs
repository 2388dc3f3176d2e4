pub mod climate;
pub mod error;
pub mod harmonize;
pub mod model;
pub mod raster;
pub mod site;
pub mod sources;
pub mod suitability;
pub mod terrain;
pub mod units;

pub use error::ModelError;
pub use raster::{Bounds, Raster};
pub use site::{Site, SiteFile};
pub use suitability::{SpeciesProfile, Tolerance};
