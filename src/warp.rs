//! Alignment seams for external reprojection.
//!
//! The aggregation core requires its inputs to share one grid, but it never
//! resamples anything itself. Reprojection and resampling are someone
//! else's math, reached through the [`Reprojector`] trait; [`align_to`]
//! drives an implementation to bring a set of rasters onto a common target
//! grid before aggregation begins.

use crate::errors::{RasterError, Result};
use crate::raster::{RasterSource, RasterSpec};
use crate::types::Pixel;

/// An external reprojection/resampling operation, treated as opaque.
///
/// Implementations warp `source` onto the grid described by `target`:
/// dimensions, georeferencing and nodata sentinel. They are free to pass a
/// source through untouched when it already sits on the target grid.
pub trait Reprojector<T: Pixel> {
    type Output: RasterSource<T>;

    fn reproject(
        &self,
        source: &dyn RasterSource<T>,
        target: &RasterSpec<T>,
    ) -> Result<Self::Output>;
}

/// Verify that rasters share one grid, as the aggregator requires.
///
/// Checks both dimensions and georeferencing; two rasters of equal size on
/// different extents would pass the aggregator's size check yet combine
/// pixels from unrelated locations.
pub fn ensure_aligned<T: Pixel>(sources: &[&dyn RasterSource<T>]) -> Result<()> {
    let Some(first) = sources.first() else {
        return Ok(());
    };
    let reference = first.spec();
    for source in &sources[1..] {
        if source.dimensions() != reference.dimensions() {
            return Err(RasterError::DimensionMismatch {
                expected: reference.dimensions(),
                actual: source.dimensions(),
            });
        }
        if !source.spec().same_grid(&reference) {
            return Err(RasterError::BadArgument(
                "rasters share dimensions but not georeferencing".to_string(),
            ));
        }
    }
    Ok(())
}

/// Map every source onto `target` through `reprojector`.
///
/// The returned handles are guaranteed to sit on the target grid (a
/// reprojector producing anything else is a contract violation), so they
/// pass [`crate::blocks::iter_blocks`]'s alignment check.
pub fn align_to<T, R>(
    reprojector: &R,
    sources: &[&dyn RasterSource<T>],
    target: &RasterSpec<T>,
) -> Result<Vec<R::Output>>
where
    T: Pixel,
    R: Reprojector<T>,
{
    tracing::debug!(
        inputs = sources.len(),
        width = target.width,
        height = target.height,
        "aligning rasters to target grid"
    );
    let mut aligned = Vec::with_capacity(sources.len());
    for source in sources {
        let output = reprojector.reproject(*source, target)?;
        if !output.spec().same_grid(target) {
            return Err(RasterError::BadArgument(
                "reprojector returned a raster off the target grid".to_string(),
            ));
        }
        aligned.push(output);
    }
    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::iter_blocks;
    use crate::geo_transform::{north_up, GeoTransformEx};
    use crate::raster::{MemoryRaster, TileWindow};

    /// Test-only nearest-neighbour resampler. Real deployments delegate to
    /// a warp library; this exists to exercise the trait contract.
    struct Nearest;

    impl<T: Pixel> Reprojector<T> for Nearest {
        type Output = MemoryRaster<T>;

        fn reproject(
            &self,
            source: &dyn RasterSource<T>,
            target: &RasterSpec<T>,
        ) -> Result<MemoryRaster<T>> {
            let inverse = source.geo_transform().invert()?;
            let (src_w, src_h) = source.dimensions();
            let full = source.read_tile(&TileWindow::new(0, 0, src_w, src_h))?;
            let fill = target.nodata.unwrap_or_else(T::zero);

            let mut data = Vec::with_capacity(target.width * target.height);
            for row in 0..target.height {
                for col in 0..target.width {
                    let (x, y) = target
                        .geo_transform
                        .apply(col as f64 + 0.5, row as f64 + 0.5);
                    let (p, l) = inverse.apply(x, y);
                    let (p, l) = (p.floor(), l.floor());
                    let value = if p >= 0.0 && l >= 0.0 {
                        full.get(p as usize, l as usize).unwrap_or(fill)
                    } else {
                        fill
                    };
                    data.push(value);
                }
            }
            MemoryRaster::from_vec(target.clone(), data)
        }
    }

    fn coarse_raster() -> MemoryRaster<i32> {
        // 2x2 pixels of 2.0 units each, origin at (0, 4)
        let spec = RasterSpec::new(2, 2)
            .with_nodata(-1)
            .with_geo_transform(north_up(0.0, 4.0, 2.0, 2.0));
        MemoryRaster::from_vec(spec, vec![1, 2, 3, 4]).unwrap()
    }

    fn fine_spec() -> RasterSpec<i32> {
        // same extent at 1.0 units per pixel
        RasterSpec::new(4, 4)
            .with_nodata(-1)
            .with_geo_transform(north_up(0.0, 4.0, 1.0, 1.0))
    }

    #[test]
    fn test_nearest_upsample() {
        let out = Nearest.reproject(&coarse_raster(), &fine_spec()).unwrap();
        #[rustfmt::skip]
        let expect = vec![
            1, 1, 2, 2,
            1, 1, 2, 2,
            3, 3, 4, 4,
            3, 3, 4, 4,
        ];
        assert_eq!(out.data(), expect.as_slice());
    }

    #[test]
    fn test_align_to_makes_rasters_aggregable() {
        let coarse = coarse_raster();
        let fine = MemoryRaster::filled(fine_spec(), 7i32);
        // differing grids are rejected up front
        let unaligned: [&dyn RasterSource<i32>; 2] = [&coarse, &fine];
        assert!(ensure_aligned(&unaligned).is_err());

        let target = fine_spec();
        let aligned = align_to(&Nearest, &unaligned, &target).unwrap();
        let sources: [&dyn RasterSource<i32>; 2] = [&aligned[0], &aligned[1]];
        ensure_aligned(&sources).unwrap();
        assert_eq!(iter_blocks(&sources).unwrap().count(), 4);
    }

    #[test]
    fn test_ensure_aligned_same_size_different_extent() {
        let a = MemoryRaster::filled(
            RasterSpec::new(4, 4).with_geo_transform(north_up(0.0, 4.0, 1.0, 1.0)),
            0i32,
        );
        let b = MemoryRaster::filled(
            RasterSpec::new(4, 4).with_geo_transform(north_up(100.0, 4.0, 1.0, 1.0)),
            0i32,
        );
        let sources: [&dyn RasterSource<i32>; 2] = [&a, &b];
        assert!(matches!(
            ensure_aligned(&sources).unwrap_err(),
            RasterError::BadArgument(_)
        ));
    }
}
