//! Block-wise aggregation over one or more aligned rasters.
//!
//! Two modes, mirroring the two things the block pattern is used for:
//!
//! * [`write_raster`] for raster algebra: combine input tiles into output
//!   tiles and write them to a sink, one block at a time.
//! * [`reduce`] / [`summarize`] for scalar statistics: fold every block into
//!   an accumulator without producing a raster.
//!
//! Nodata is the combine function's contract: tiles arrive unmasked, and the
//! caller compares against the sentinel (see [`crate::Pixel::is_nodata`])
//! *before* computing. Masking after the fact lets sentinel garbage leak
//! into statistics when a raster's nodata value is unset.

use crate::blocks::iter_blocks;
use crate::buffer::Buffer;
use crate::errors::{RasterError, Result};
use crate::raster::{RasterSink, RasterSource, TileWindow};
use crate::types::Pixel;

/// Order-insensitive accumulator for count/sum/min/max reductions.
///
/// `merge` is associative and commutative, so partial summaries may be
/// combined in any grouping or order: block traversal order, block size and
/// any future parallel split all produce the same result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: u64,
    pub sum: f64,
    min: f64,
    max: f64,
}

impl Summary {
    pub fn new() -> Self {
        Summary {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Fold one valid sample in.
    pub fn accumulate(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Combine two partial summaries.
    pub fn merge(self, other: Summary) -> Summary {
        Summary {
            count: self.count + other.count,
            sum: self.sum + other.sum,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn min(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.max)
    }

    /// `sum / count`, guarded: a summary over zero valid samples fails with
    /// [`RasterError::EmptyAggregation`] instead of dividing by zero.
    pub fn mean(&self) -> Result<f64> {
        if self.is_empty() {
            return Err(RasterError::EmptyAggregation);
        }
        Ok(self.sum / self.count as f64)
    }
}

impl Default for Summary {
    fn default() -> Self {
        Summary::new()
    }
}

/// Fold every block of the aligned `sources` into an accumulator.
///
/// `fold` receives the window and one tile per input raster, all of the
/// window's shape, and must be order-insensitive (associative and
/// commutative in the values it folds), since block layout varies across
/// storage backends. Read failures abort the reduction.
pub fn reduce<T, A, F>(sources: &[&dyn RasterSource<T>], init: A, fold: F) -> Result<A>
where
    T: Pixel,
    F: Fn(A, &TileWindow, &[Buffer<T>]) -> A,
{
    let mut acc = init;
    for step in iter_blocks(sources)? {
        let (window, tiles) = step?;
        acc = fold(acc, &window, &tiles);
    }
    Ok(acc)
}

/// Count/sum/min/max over the valid (non-nodata) samples of one raster.
///
/// Masks before accumulating; on a raster with no declared nodata sentinel
/// every sample is valid. `summarize(..)?.mean()` is the guarded way to get
/// a mean elevation, mean slope and so on.
pub fn summarize<T: Pixel>(source: &dyn RasterSource<T>) -> Result<Summary> {
    let nodata = source.nodata();
    let summary = reduce(&[source], Summary::new(), |mut acc, _window, tiles| {
        for &value in tiles[0].iter() {
            if !value.is_nodata(nodata) {
                acc.accumulate(value.as_f64());
            }
        }
        acc
    })?;
    tracing::debug!(
        count = summary.count,
        sum = summary.sum,
        "summarized raster"
    );
    Ok(summary)
}

/// Combine aligned `sources` tile-by-tile into `output`.
///
/// `combine` receives one tile per input and returns the output tile for the
/// same window; returning any other shape fails with
/// [`RasterError::BadArgument`]. Each window is written exactly once and the
/// windows cover the output exactly, so every pixel of `output` is produced
/// by exactly one `combine` call.
///
/// On a mid-stream failure the partially-written output is undefined and
/// must be discarded by the caller.
pub fn write_raster<T, U, S, F>(
    sources: &[&dyn RasterSource<T>],
    output: &mut S,
    combine: F,
) -> Result<()>
where
    T: Pixel,
    U: Pixel,
    S: RasterSink<U>,
    F: Fn(&TileWindow, &[Buffer<T>]) -> Result<Buffer<U>>,
{
    let expected = sources
        .first()
        .ok_or_else(|| {
            RasterError::BadArgument("at least one input raster is required".to_string())
        })?
        .dimensions();
    if output.dimensions() != expected {
        return Err(RasterError::DimensionMismatch {
            expected,
            actual: output.dimensions(),
        });
    }

    let mut blocks = 0usize;
    for step in iter_blocks(sources)? {
        let (window, tiles) = step?;
        let out_tile = combine(&window, &tiles)?;
        if out_tile.size != window.shape() {
            return Err(RasterError::BadArgument(format!(
                "combine function returned a {:?} tile for window {window}",
                out_tile.size
            )));
        }
        output
            .write_tile(&window, &out_tile)
            .map_err(|e| RasterError::TileWrite {
                window,
                source: Box::new(e),
            })?;
        blocks += 1;
    }
    tracing::debug!(blocks, "output raster written");
    Ok(())
}
