//! Stream rasters in memory-efficient blocks.
//!
//! Large rasters are stored in rectangular blocks; reading along block
//! boundaries avoids decoding the same block twice. The iterators here walk
//! the block grid of one or more aligned rasters in row-major order, yielding
//! one tile per input per step, so callers can process datasets far larger
//! than main memory.
//!
//! The sequence is lazy and forward-only. Dropping the iterator is the
//! cancellation mechanism; no block is read after the last `next` call.

use crate::buffer::Buffer;
use crate::errors::{RasterError, Result};
use crate::raster::{RasterSource, TileWindow};
use crate::types::Pixel;

/// Row-major iterator over the block windows of a `dimensions` grid.
///
/// Block rows are visited top-to-bottom, block columns left-to-right within
/// a row. Windows in the final row/column are truncated to the remaining
/// pixels when the dimensions are not an exact multiple of the block size,
/// so the union of all windows covers the grid exactly.
#[derive(Debug, Clone)]
pub struct BlockWindows {
    dimensions: (usize, usize),
    block_size: (usize, usize),
    blocks_across: usize,
    blocks_down: usize,
    next_block: usize,
}

impl BlockWindows {
    pub fn new(dimensions: (usize, usize), block_size: (usize, usize)) -> Result<Self> {
        if block_size.0 == 0 || block_size.1 == 0 {
            return Err(RasterError::BadArgument(format!(
                "block size {block_size:?} must be nonzero in both dimensions"
            )));
        }
        Ok(BlockWindows {
            dimensions,
            block_size,
            blocks_across: dimensions.0.div_ceil(block_size.0),
            blocks_down: dimensions.1.div_ceil(block_size.1),
            next_block: 0,
        })
    }

    /// Total number of windows in the grid.
    pub fn block_count(&self) -> usize {
        self.blocks_across * self.blocks_down
    }
}

impl Iterator for BlockWindows {
    type Item = TileWindow;

    fn next(&mut self) -> Option<TileWindow> {
        if self.next_block >= self.block_count() {
            return None;
        }
        let bx = self.next_block % self.blocks_across;
        let by = self.next_block / self.blocks_across;
        self.next_block += 1;

        let x_off = bx * self.block_size.0;
        let y_off = by * self.block_size.1;
        Some(TileWindow {
            x_off,
            y_off,
            width: self.block_size.0.min(self.dimensions.0 - x_off),
            height: self.block_size.1.min(self.dimensions.1 - y_off),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.block_count() - self.next_block;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BlockWindows {}

/// Lock-step block iterator over several aligned rasters.
///
/// Created by [`iter_blocks`]. Yields `(window, tiles)` with one tile per
/// input raster, all of the window's shape. A failed read yields the error
/// and fuses the iterator.
pub struct BlockIter<'a, T: Pixel> {
    sources: &'a [&'a dyn RasterSource<T>],
    windows: BlockWindows,
    failed: bool,
}

impl<T: Pixel> core::fmt::Debug for BlockIter<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BlockIter")
            .field("sources", &self.sources.len())
            .field("windows", &self.windows)
            .field("failed", &self.failed)
            .finish()
    }
}

impl<T: Pixel> Iterator for BlockIter<'_, T> {
    type Item = Result<(TileWindow, Vec<Buffer<T>>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let window = self.windows.next()?;
        let mut tiles = Vec::with_capacity(self.sources.len());
        for (raster, source) in self.sources.iter().enumerate() {
            match source.read_tile(&window) {
                Ok(tile) => tiles.push(tile),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(RasterError::TileRead {
                        raster,
                        window,
                        source: Box::new(e),
                    }));
                }
            }
        }
        Some(Ok((window, tiles)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            self.windows.size_hint()
        }
    }
}

/// Iterate one or more aligned rasters block by block.
///
/// All inputs must share the same dimensions; the traversal uses the first
/// raster's block layout and every tile is read through a window, so inputs
/// with different internal blocking still line up.
///
/// Fails up front with [`RasterError::DimensionMismatch`] when sizes differ.
pub fn iter_blocks<'a, T: Pixel>(
    sources: &'a [&'a dyn RasterSource<T>],
) -> Result<BlockIter<'a, T>> {
    let first = sources.first().ok_or_else(|| {
        RasterError::BadArgument("at least one input raster is required".to_string())
    })?;
    let dimensions = first.dimensions();
    for source in &sources[1..] {
        if source.dimensions() != dimensions {
            return Err(RasterError::DimensionMismatch {
                expected: dimensions,
                actual: source.dimensions(),
            });
        }
    }
    let windows = BlockWindows::new(dimensions, first.block_size())?;
    tracing::debug!(
        width = dimensions.0,
        height = dimensions.1,
        block_width = first.block_size().0,
        block_height = first.block_size().1,
        blocks = windows.block_count(),
        inputs = sources.len(),
        "streaming raster blocks"
    );
    Ok(BlockIter {
        sources,
        windows,
        failed: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{MemoryRaster, RasterSpec};

    fn windows(dims: (usize, usize), block: (usize, usize)) -> Vec<TileWindow> {
        BlockWindows::new(dims, block).unwrap().collect()
    }

    #[test]
    fn test_truncated_edge_windows() {
        // 10x10 with 4x4 blocks: 3x3 block grid, edges truncated
        let got = windows((10, 10), (4, 4));
        let expect = [
            (0, 0, 4, 4),
            (4, 0, 4, 4),
            (8, 0, 2, 4),
            (0, 4, 4, 4),
            (4, 4, 4, 4),
            (8, 4, 2, 4),
            (0, 8, 4, 2),
            (4, 8, 4, 2),
            (8, 8, 2, 2),
        ]
        .map(|(x, y, w, h)| TileWindow::new(x, y, w, h));
        assert_eq!(got, expect);
    }

    #[test]
    fn test_exact_multiple() {
        let got = windows((8, 4), (4, 2));
        assert_eq!(got.len(), 4);
        assert!(got.iter().all(|w| w.shape() == (4, 2)));
    }

    #[test]
    fn test_exact_coverage_no_overlap() {
        for (dims, block) in [
            ((10, 10), (4, 4)),
            ((100, 50), (16, 16)),
            ((7, 13), (3, 5)),
            ((5, 5), (8, 8)),
            ((1, 1), (1, 1)),
        ] {
            let mut hits = vec![0u8; dims.0 * dims.1];
            for w in windows(dims, block) {
                for row in w.y_off..w.y_off + w.height {
                    for col in w.x_off..w.x_off + w.width {
                        hits[row * dims.0 + col] += 1;
                    }
                }
            }
            assert!(
                hits.iter().all(|&h| h == 1),
                "coverage broken for {dims:?}/{block:?}"
            );
        }
    }

    #[test]
    fn test_empty_raster() {
        assert!(windows((0, 10), (4, 4)).is_empty());
        assert!(windows((10, 0), (4, 4)).is_empty());
    }

    #[test]
    fn test_zero_block_size() {
        assert!(BlockWindows::new((10, 10), (0, 4)).is_err());
    }

    #[test]
    fn test_exact_size() {
        let mut w = BlockWindows::new((10, 10), (4, 4)).unwrap();
        assert_eq!(w.len(), 9);
        w.next();
        w.next();
        assert_eq!(w.len(), 7);
    }

    #[test]
    fn test_lock_step_tiles() {
        let spec = RasterSpec::new(6, 4).with_block_size(4, 4);
        let a = MemoryRaster::from_vec(spec.clone(), (0..24).collect::<Vec<i32>>()).unwrap();
        let b = MemoryRaster::from_vec(spec, (100..124).collect::<Vec<i32>>()).unwrap();

        let sources: [&dyn RasterSource<i32>; 2] = [&a, &b];
        let steps = iter_blocks(&sources)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(steps.len(), 2);

        let (window, tiles) = &steps[1];
        assert_eq!(*window, TileWindow::new(4, 0, 2, 4));
        assert_eq!(tiles[0].size, (2, 4));
        assert_eq!(tiles[0].data, vec![4, 5, 10, 11, 16, 17, 22, 23]);
        assert_eq!(tiles[1].data, vec![104, 105, 110, 111, 116, 117, 122, 123]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = MemoryRaster::filled(RasterSpec::new(6, 4), 0i32);
        let b = MemoryRaster::filled(RasterSpec::new(6, 5), 0i32);
        let sources: [&dyn RasterSource<i32>; 2] = [&a, &b];
        let err = iter_blocks(&sources).unwrap_err();
        assert!(matches!(
            err,
            RasterError::DimensionMismatch {
                expected: (6, 4),
                actual: (6, 5),
            }
        ));
    }

    #[test]
    fn test_no_inputs() {
        let sources: [&dyn RasterSource<i32>; 0] = [];
        assert!(iter_blocks(&sources).is_err());
    }

    #[test]
    fn test_early_termination() {
        let raster = MemoryRaster::filled(RasterSpec::new(10, 10).with_block_size(4, 4), 0u8);
        let sources: [&dyn RasterSource<u8>; 1] = [&raster];
        let taken = iter_blocks(&sources).unwrap().take(3).count();
        assert_eq!(taken, 3);
    }

    /// Source whose reads fail everywhere, for exercising abort semantics.
    struct BrokenSource;

    impl RasterSource<i32> for BrokenSource {
        fn dimensions(&self) -> (usize, usize) {
            (8, 8)
        }
        fn block_size(&self) -> (usize, usize) {
            (4, 4)
        }
        fn nodata(&self) -> Option<i32> {
            None
        }
        fn geo_transform(&self) -> crate::GeoTransform {
            crate::north_up(0.0, 0.0, 1.0, 1.0)
        }
        fn read_tile(&self, window: &TileWindow) -> Result<Buffer<i32>> {
            Err(RasterError::WindowOutOfBounds {
                window: *window,
                dimensions: self.dimensions(),
            })
        }
    }

    #[test]
    fn test_read_failure_aborts() {
        let good = MemoryRaster::filled(RasterSpec::new(8, 8).with_block_size(4, 4), 0i32);
        let broken = BrokenSource;
        let sources: [&dyn RasterSource<i32>; 2] = [&good, &broken];
        let mut iter = iter_blocks(&sources).unwrap();

        let err = iter.next().unwrap().unwrap_err();
        match err {
            RasterError::TileRead { raster, window, .. } => {
                assert_eq!(raster, 1);
                assert_eq!(window, TileWindow::new(0, 0, 4, 4));
            }
            other => panic!("unexpected error: {other}"),
        }
        // fused after the failure
        assert!(iter.next().is_none());
    }
}
