use crate::errors::{RasterError, Result};

/// An affine transform.
///
/// A six-element array storing the coefficients of an affine transform used
/// in mapping coordinates between pixel/line `(P, L)` (raster) space and
/// `(Xp, Yp)` (projection) space.
///
/// # Interpretation
///
/// A `GeoTransform`'s components have the following meanings:
///
///   * `GeoTransform[0]`: x-coordinate of the upper-left corner of the upper-left pixel.
///   * `GeoTransform[1]`: W-E pixel resolution (pixel width).
///   * `GeoTransform[2]`: row rotation (typically zero).
///   * `GeoTransform[3]`: y-coordinate of the upper-left corner of the upper-left pixel.
///   * `GeoTransform[4]`: column rotation (typically zero).
///   * `GeoTransform[5]`: N-S pixel resolution (pixel height), negative value for a North-up image.
pub type GeoTransform = [f64; 6];

/// A north-up transform with origin `(origin_x, origin_y)` and the given
/// positive cell sizes. The N-S resolution is stored negated, per convention.
pub fn north_up(origin_x: f64, origin_y: f64, cell_width: f64, cell_height: f64) -> GeoTransform {
    [origin_x, cell_width, 0.0, origin_y, 0.0, -cell_height]
}

/// Extension methods on [`GeoTransform`]
pub trait GeoTransformEx {
    /// Apply the transform to a pixel/line coordinate, producing the
    /// projected coordinate of that pixel's upper-left corner.
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64);

    /// Construct the inverse transformation coefficients for computing
    /// `(Xp, Yp) -> (P, L)` transformations.
    fn invert(&self) -> Result<GeoTransform>;

    /// Absolute pixel width and height in projected units.
    fn cell_size(&self) -> (f64, f64);
}

impl GeoTransformEx for GeoTransform {
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64) {
        (
            self[0] + pixel * self[1] + line * self[2],
            self[3] + pixel * self[4] + line * self[5],
        )
    }

    fn invert(&self) -> Result<GeoTransform> {
        let det = self[1] * self[5] - self[2] * self[4];
        if det.abs() < 1e-15 {
            return Err(RasterError::BadArgument(
                "Geo transform is uninvertible".to_string(),
            ));
        }
        let inv_det = 1.0 / det;
        Ok([
            (self[2] * self[3] - self[5] * self[0]) * inv_det,
            self[5] * inv_det,
            -self[2] * inv_det,
            (self[4] * self[0] - self[1] * self[3]) * inv_det,
            -self[4] * inv_det,
            self[1] * inv_det,
        ])
    }

    fn cell_size(&self) -> (f64, f64) {
        // Rotation terms are folded in so sheared transforms still report
        // the true cell extent.
        (
            (self[1] * self[1] + self[4] * self[4]).sqrt(),
            (self[2] * self[2] + self[5] * self[5]).sqrt(),
        )
    }
}
