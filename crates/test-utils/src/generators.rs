//! Test data generators for creating synthetic satellite-scene data.
//!
//! These generators create predictable, verifiable data patterns that can be
//! used across the test suite.

use ndarray::{Array1, Array2};

/// Creates a test image with predictable values.
///
/// Each pixel value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data survives a transformation intact
/// by checking that `image[[row, col]] == col * 1000 + row`.
///
/// # Example
///
/// ```
/// use test_utils::create_test_image;
///
/// let image = create_test_image(10, 5);
/// assert_eq!(image.shape(), &[5, 10]); // rows, cols
/// assert_eq!(image[[0, 0]], 0.0);
/// assert_eq!(image[[0, 1]], 1000.0);
/// assert_eq!(image[[1, 0]], 1.0);
/// ```
pub fn create_test_image(width: usize, height: usize) -> Array2<f32> {
    Array2::from_shape_fn((height, width), |(row, col)| (col * 1000 + row) as f32)
}

/// Creates a test image with brightness-temperature-like values in Kelvin.
///
/// The values range from approximately 250 K to 310 K, a gradient pattern
/// similar to real thermal imagery.
pub fn create_temperature_image(width: usize, height: usize) -> Array2<f32> {
    Array2::from_shape_fn((height, width), |(row, col)| {
        let x_factor = col as f32 / width.max(1) as f32;
        let y_factor = row as f32 / height.max(1) as f32;
        250.0 + x_factor * 30.0 + y_factor * 30.0
    })
}

/// Creates a uniformly spaced coordinate axis.
///
/// # Example
///
/// ```
/// use test_utils::create_axis;
///
/// let axis = create_axis(0.0, 1.0, 4);
/// assert_eq!(axis.len(), 4);
/// assert_eq!(axis[0], 0.0);
/// assert_eq!(axis[3], 3.0);
/// ```
pub fn create_axis(start: f64, step: f64, len: usize) -> Array1<f64> {
    Array1::from_iter((0..len).map(|i| start + i as f64 * step))
}
