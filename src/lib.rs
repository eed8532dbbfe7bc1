//! Block-wise, nodata-aware raster aggregation.
//!
//! Streams one or more aligned rasters in fixed-size tiles, applies a
//! caller-supplied per-tile function with explicit nodata handling, and
//! accumulates either a new output raster (written tile-by-tile) or a
//! scalar summary, without ever materializing a whole dataset in memory.
//!
//! File format decoding, reprojection math and plotting are deliberately
//! not here: storage backends implement [`RasterSource`]/[`RasterSink`],
//! and resampling hides behind [`warp::Reprojector`].
//!
//! ## Use
//!
//! ```
//! use rasterblocks::{summarize, MemoryRaster, RasterSpec};
//!
//! # fn main() -> rasterblocks::errors::Result<()> {
//! let spec = RasterSpec::new(4, 4).with_block_size(2, 2).with_nodata(-1);
//! let dem = MemoryRaster::from_vec(spec, vec![
//!     10, 10, 20, 20,
//!     10, 10, 20, 20,
//!     -1, -1, 30, 30,
//!     -1, -1, 30, 30,
//! ])?;
//!
//! let stats = summarize(&dem)?;
//! assert_eq!(stats.count, 12); // nodata pixels are masked before counting
//! assert_eq!(stats.mean()?, 20.0);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod blocks;
mod buffer;
pub mod errors;
mod geo_transform;
pub mod raster;
mod types;
pub mod warp;

#[cfg(test)]
mod test_utils;

pub use aggregate::{reduce, summarize, write_raster, Summary};
pub use blocks::{iter_blocks, BlockIter, BlockWindows};
pub use buffer::{Buffer, ByteBuffer};
pub use errors::RasterError;
pub use geo_transform::{north_up, GeoTransform, GeoTransformEx};
pub use raster::{
    MemoryRaster, MemoryStore, RasterSink, RasterSource, RasterSpec, RasterStore, TileWindow,
};
pub use types::{Pixel, RasterDataType};
