//! Remote dataset addressing and the on-disk raster naming scheme.
//!
//! The pipeline reads locally downloaded tiles; these modules generate the
//! URLs / granule ids to fetch and recognise the corresponding filenames.

pub mod maca;
pub mod naming;
pub mod polaris;
pub mod srtm;

pub use maca::Scenario;
