use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::buffer::Buffer;
use crate::errors::{RasterError, Result};
use crate::geo_transform::GeoTransform;
use crate::raster::{RasterSink, RasterSource, RasterSpec, RasterStore, TileWindow};
use crate::types::Pixel;

/// An in-memory raster with row-major sample storage.
///
/// Serves as the reference backend for the aggregation core and as a test
/// double for format-specific backends.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRaster<T: Pixel> {
    spec: RasterSpec<T>,
    data: Vec<T>,
}

impl<T: Pixel> MemoryRaster<T> {
    /// A raster with every sample set to `value`.
    pub fn filled(spec: RasterSpec<T>, value: T) -> Self {
        let data = vec![value; spec.width * spec.height];
        MemoryRaster { spec, data }
    }

    /// A raster over an existing row-major sample vector.
    pub fn from_vec(spec: RasterSpec<T>, data: Vec<T>) -> Result<Self> {
        if data.len() != spec.width * spec.height {
            return Err(RasterError::BadArgument(format!(
                "expected {} samples for a {}x{} raster, got {}",
                spec.width * spec.height,
                spec.width,
                spec.height,
                data.len()
            )));
        }
        Ok(MemoryRaster { spec, data })
    }

    /// Sample at `(col, row)`, or `None` when out of range.
    pub fn pixel(&self, col: usize, row: usize) -> Option<T> {
        if col < self.spec.width && row < self.spec.height {
            Some(self.data[row * self.spec.width + col])
        } else {
            None
        }
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }
}

impl<T: Pixel> RasterSource<T> for MemoryRaster<T> {
    fn dimensions(&self) -> (usize, usize) {
        self.spec.dimensions()
    }

    fn block_size(&self) -> (usize, usize) {
        self.spec.block_size
    }

    fn nodata(&self) -> Option<T> {
        self.spec.nodata
    }

    fn geo_transform(&self) -> GeoTransform {
        self.spec.geo_transform
    }

    fn read_tile(&self, window: &TileWindow) -> Result<Buffer<T>> {
        if !window.fits_within(self.dimensions()) {
            return Err(RasterError::WindowOutOfBounds {
                window: *window,
                dimensions: self.dimensions(),
            });
        }
        let mut data = Vec::with_capacity(window.len());
        for row in window.y_off..window.y_off + window.height {
            let start = row * self.spec.width + window.x_off;
            data.extend_from_slice(&self.data[start..start + window.width]);
        }
        Ok(Buffer::new(window.shape(), data))
    }
}

impl<T: Pixel> RasterSink<T> for MemoryRaster<T> {
    fn write_tile(&mut self, window: &TileWindow, tile: &Buffer<T>) -> Result<()> {
        if tile.size != window.shape() {
            return Err(RasterError::BadArgument(format!(
                "tile shape {:?} does not match window {window}",
                tile.size
            )));
        }
        if !window.fits_within(self.dimensions()) {
            return Err(RasterError::WindowOutOfBounds {
                window: *window,
                dimensions: self.dimensions(),
            });
        }
        for row in 0..window.height {
            let src = row * window.width;
            let dst = (window.y_off + row) * self.spec.width + window.x_off;
            self.data[dst..dst + window.width].copy_from_slice(&tile.data[src..src + window.width]);
        }
        Ok(())
    }
}

/// A path-keyed collection of [`MemoryRaster`]s, playing the role an
/// in-memory filesystem plays for file-backed stores.
///
/// `open` moves the raster out of the map, which is what enforces the
/// one-handle-per-aggregation ownership rule at compile time.
#[derive(Debug)]
pub struct MemoryStore<T: Pixel> {
    rasters: HashMap<PathBuf, MemoryRaster<T>>,
}

impl<T: Pixel> Default for MemoryStore<T> {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl<T: Pixel> MemoryStore<T> {
    pub fn new() -> Self {
        MemoryStore {
            rasters: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.rasters.contains_key(path)
    }
}

impl<T: Pixel> RasterStore<T> for MemoryStore<T> {
    type Handle = MemoryRaster<T>;

    fn open(&mut self, path: &Path) -> Result<Self::Handle> {
        self.rasters
            .remove(path)
            .ok_or_else(|| RasterError::Open {
                path: path.to_path_buf(),
                reason: "no raster stored at this path".to_string(),
            })
    }

    fn create(&mut self, path: &Path, spec: RasterSpec<T>) -> Result<Self::Handle> {
        if self.rasters.contains_key(path) {
            return Err(RasterError::Open {
                path: path.to_path_buf(),
                reason: "path already in use".to_string(),
            });
        }
        tracing::debug!(
            path = %path.display(),
            width = spec.width,
            height = spec.height,
            dtype = %T::raster_type(),
            "creating raster"
        );
        let fill = spec.nodata.unwrap_or_else(T::zero);
        Ok(MemoryRaster::filled(spec, fill))
    }

    fn insert(&mut self, path: &Path, raster: Self::Handle) {
        self.rasters.insert(path.to_path_buf(), raster);
    }
}
