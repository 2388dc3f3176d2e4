use thiserror::Error;

/// Failures raised by grid algebra and the model pipeline.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Two rasters that must share a grid do not.
    #[error("raster grids do not match: {left_width}×{left_height} vs {right_width}×{right_height}")]
    GridMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },

    /// An operation over a stack of rasters received none.
    #[error("no raster layers supplied")]
    EmptyStack,

    /// Requested bounds fall entirely outside the raster extent.
    #[error("requested bounds do not intersect the raster extent")]
    NoCoverage,
}
