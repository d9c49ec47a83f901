//! NumPy-like array operations on (n_points, 2) point matrices.

use nalgebra::DMatrix;
use crate::{Error, Result};

/// Relative tolerance used by `numpy.isclose`.
pub const ISCLOSE_RTOL: f64 = 1e-5;

/// Absolute tolerance used by `numpy.isclose`.
pub const ISCLOSE_ATOL: f64 = 1e-8;

/// Validate that points have shape (n_points, 2).
///
/// Zero rows are accepted: an empty history is a valid point set.
pub fn validate_points(points: &DMatrix<f64>) -> Result<()> {
    let (rows, cols) = points.shape();

    if cols != 2 {
        return Err(Error::InvalidPointsShape {
            expected: "(n_points, 2)".to_string(),
            got: format!("({}, {})", rows, cols),
        });
    }

    Ok(())
}

/// `numpy.isclose(a, b)` with the default tolerances.
///
/// Not symmetric: the relative term scales with `b`, as in numpy.
#[inline]
pub fn isclose(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= ISCLOSE_ATOL + ISCLOSE_RTOL * b.abs()
}

/// Check if a normalized value lies in [0, 1], tolerating values that are close to the bounds.
#[inline]
pub fn is_valid_normalized_value(value: f64) -> bool {
    let above_zero = value > 0.0 || isclose(value, 0.0);
    let below_one = value < 1.0 || isclose(value, 1.0);
    above_zero && below_one
}

/// Check, per row, that both coordinates of a normalized point lie in [0, 1].
///
/// Returns one boolean per row (`valid.all(axis=1)`).
pub fn are_valid_normalized_points(points: &DMatrix<f64>) -> Vec<bool> {
    (0..points.nrows())
        .map(|i| (0..points.ncols()).all(|j| is_valid_normalized_value(points[(i, j)])))
        .collect()
}

/// Convert normalized points to integer pixel coordinates.
///
/// Pixel coordinates are `floor(x * width)`, `floor(y * height)`; with `clip_to_image`
/// they are clamped to `[0, width - 1]` and `[0, height - 1]`.
pub fn normalized_to_pixel_coordinates(
    points: &DMatrix<f64>,
    image_size: (u32, u32),
    clip_to_image: bool,
) -> Vec<[i64; 2]> {
    let (width, height) = image_size;
    let max_x = (width as i64 - 1).max(0);
    let max_y = (height as i64 - 1).max(0);

    (0..points.nrows())
        .map(|i| {
            let mut x_px = (points[(i, 0)] * width as f64).floor() as i64;
            let mut y_px = (points[(i, 1)] * height as f64).floor() as i64;
            if clip_to_image {
                x_px = x_px.clamp(0, max_x);
                y_px = y_px.clamp(0, max_y);
            }
            [x_px, y_px]
        })
        .collect()
}

/// Append a single 2D point as a new last row.
pub fn append_row(points: DMatrix<f64>, point: [f64; 2]) -> DMatrix<f64> {
    let n = points.nrows();
    let mut result = points.insert_row(n, 0.0);
    result[(n, 0)] = point[0];
    result[(n, 1)] = point[1];
    result
}

/// An empty (0, 2) point matrix.
#[inline]
pub fn empty_points() -> DMatrix<f64> {
    DMatrix::zeros(0, 2)
}

/// Collect the rows of a (n_points, 2) matrix.
pub fn to_rows(points: &DMatrix<f64>) -> Vec<[f64; 2]> {
    (0..points.nrows())
        .map(|i| [points[(i, 0)], points[(i, 1)]])
        .collect()
}

/// Build a (n_points, 2) matrix from rows.
pub fn from_rows(rows: &[[f64; 2]]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), 2, |i, j| rows[i][j])
}
