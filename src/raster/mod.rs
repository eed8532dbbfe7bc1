//! Raster access traits and grid descriptions.
//!
//! The aggregation core never decodes file formats itself; it drives the
//! [`RasterSource`]/[`RasterSink`] interfaces, which a storage backend
//! implements. [`MemoryRaster`] is the in-crate backend; format-specific
//! backends (GeoTIFF and friends) are integration points left to callers.

mod memory;

pub use memory::{MemoryRaster, MemoryStore};

use std::fmt::{Display, Formatter};
use std::path::Path;

use crate::buffer::Buffer;
use crate::errors::Result;
use crate::geo_transform::{north_up, GeoTransform};
use crate::types::Pixel;

/// A rectangular sub-window of a raster, the unit of streamed I/O.
///
/// Offsets and sizes are in pixels, measured from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileWindow {
    pub x_off: usize,
    pub y_off: usize,
    pub width: usize,
    pub height: usize,
}

impl TileWindow {
    pub fn new(x_off: usize, y_off: usize, width: usize, height: usize) -> Self {
        TileWindow {
            x_off,
            y_off,
            width,
            height,
        }
    }

    /// Number of pixels covered by the window.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(cols, rows)` shape a tile read through this window must have.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn fits_within(&self, dimensions: (usize, usize)) -> bool {
        self.x_off + self.width <= dimensions.0 && self.y_off + self.height <= dimensions.1
    }
}

impl Display for TileWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // X geometry syntax: WxH+X+Y
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x_off, self.y_off
        )
    }
}

/// Describes a raster grid without its data: dimensions, block layout,
/// nodata sentinel and georeferencing. Used when creating output rasters
/// and as the target grid for alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSpec<T: Pixel> {
    pub width: usize,
    pub height: usize,
    pub block_size: (usize, usize),
    pub nodata: Option<T>,
    pub geo_transform: GeoTransform,
}

impl<T: Pixel> RasterSpec<T> {
    /// A spec with scanline blocks, no nodata sentinel and a unit north-up
    /// transform. Refine with the `with_*` builders.
    pub fn new(width: usize, height: usize) -> Self {
        RasterSpec {
            width,
            height,
            block_size: (width.max(1), 1),
            nodata: None,
            geo_transform: north_up(0.0, 0.0, 1.0, 1.0),
        }
    }

    pub fn with_block_size(mut self, block_width: usize, block_height: usize) -> Self {
        self.block_size = (block_width, block_height);
        self
    }

    pub fn with_nodata(mut self, nodata: T) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn with_geo_transform(mut self, geo_transform: GeoTransform) -> Self {
        self.geo_transform = geo_transform;
        self
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Whether another spec describes the same grid: equal dimensions and
    /// georeferencing. Block layout is deliberately ignored; it is a storage
    /// detail, not a property of the grid.
    pub fn same_grid(&self, other: &RasterSpec<T>) -> bool {
        self.dimensions() == other.dimensions()
            && self
                .geo_transform
                .iter()
                .zip(other.geo_transform.iter())
                .all(|(a, b)| (a - b).abs() < 1e-9)
    }
}

/// Read access to an open raster.
///
/// A handle is exclusively owned by the aggregation call that opened it;
/// concurrent aggregations over one handle are prevented by ownership.
pub trait RasterSource<T: Pixel> {
    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (usize, usize);

    /// Natural block size of the storage layout. Reading along these
    /// boundaries avoids re-decoding blocks.
    fn block_size(&self) -> (usize, usize);

    /// The declared nodata sentinel, if any.
    fn nodata(&self) -> Option<T>;

    fn geo_transform(&self) -> GeoTransform;

    /// Read the samples under `window` into a tile of exactly
    /// `window.shape()`. Fails if the window exceeds the raster extent.
    fn read_tile(&self, window: &TileWindow) -> Result<Buffer<T>>;

    fn spec(&self) -> RasterSpec<T> {
        let (width, height) = self.dimensions();
        RasterSpec {
            width,
            height,
            block_size: self.block_size(),
            nodata: self.nodata(),
            geo_transform: self.geo_transform(),
        }
    }
}

/// Write access to an open raster. Writes are randomly addressable by
/// window, so out-of-order tile completion never requires buffering.
pub trait RasterSink<T: Pixel>: RasterSource<T> {
    /// Write `tile` at `window`. The tile shape must equal the window shape.
    fn write_tile(&mut self, window: &TileWindow, tile: &Buffer<T>) -> Result<()>;
}

/// A collection of rasters addressable by path.
///
/// `open` transfers ownership of the handle to the caller, so two
/// aggregations can never share one handle; `insert` returns it.
pub trait RasterStore<T: Pixel> {
    type Handle: RasterSink<T>;

    /// Take exclusive ownership of the raster at `path`.
    fn open(&mut self, path: &Path) -> Result<Self::Handle>;

    /// Create a new raster per `spec`, filled with the nodata sentinel
    /// (zero when no sentinel is declared). The handle is returned to the
    /// caller; `insert` it once populated.
    fn create(&mut self, path: &Path, spec: RasterSpec<T>) -> Result<Self::Handle>;

    /// Put a handle (back) into the store under `path`, replacing any
    /// raster already there.
    fn insert(&mut self, path: &Path, raster: Self::Handle);
}
