use std::path::PathBuf;

use crate::raster::TileWindow;

/// Error type shared by all fallible operations in this crate.
///
/// Every error is surfaced synchronously to the caller; nothing is
/// logged-and-continued, since raster correctness depends on complete,
/// accurate block coverage.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// A store could not produce a handle for the given path.
    #[error("cannot open raster '{}': {reason}", .path.display())]
    Open { path: PathBuf, reason: String },
    /// Rasters supplied to a multi-raster operation differ in size.
    ///
    /// Alignment is the caller's responsibility; see [`crate::warp::align_to`].
    #[error("raster dimensions {actual:?} do not match expected {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// A requested window extends past the raster extent.
    #[error("window {window} exceeds raster dimensions {dimensions:?}")]
    WindowOutOfBounds {
        window: TileWindow,
        dimensions: (usize, usize),
    },
    /// Reading a tile failed mid-iteration. `raster` is the zero-based
    /// position of the failing input. Aborts the aggregation; no partial
    /// result is recoverable.
    #[error("failed to read input raster {raster} at {window}: {source}")]
    TileRead {
        raster: usize,
        window: TileWindow,
        source: Box<RasterError>,
    },
    /// Writing an output tile failed. The partially-written output is left
    /// in an undefined state and must be discarded by the caller.
    #[error("failed to write output at {window}: {source}")]
    TileWrite {
        window: TileWindow,
        source: Box<RasterError>,
    },
    /// A mean-style reduction saw zero valid samples.
    #[error("reduction produced no valid samples")]
    EmptyAggregation,
    #[error("invalid argument: {0}")]
    BadArgument(String),
    #[cfg(feature = "array")]
    #[error(transparent)]
    ShapeError(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, RasterError>;
