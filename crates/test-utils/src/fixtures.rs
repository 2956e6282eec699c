//! Common test fixtures for writer tests.
//!
//! Pre-defined areas and labeled arrays that represent common scenarios in
//! satellite-scene processing: channels on a shared projected grid, swath
//! data with per-pixel geolocation, and timed acquisitions.

use chrono::{DateTime, TimeZone, Utc};
use labeled_array::{time_scalar, ArrayData, LabeledArray};
use ndarray::Array2;
use projection::{
    AreaExtent, Crs, GridDefinition, LambertConformal, SpatialReference, SwathDefinition,
};

use crate::generators::{create_axis, create_test_image};

/// A small CONUS-like Lambert Conformal area.
pub fn lambert_area(width: usize, height: usize) -> SpatialReference {
    let crs = Crs::LambertConformal(LambertConformal::new(-97.5, 38.5, 38.5, 38.5));
    let grid = GridDefinition::new(
        "conus_lcc",
        "CONUS Lambert Conformal test area",
        crs,
        width,
        height,
        AreaExtent::new(-1.5e6, -1.0e6, 1.5e6, 1.0e6),
    )
    .expect("fixture grid is valid");
    SpatialReference::Grid(grid)
}

/// A small global geographic area.
pub fn geographic_area(width: usize, height: usize) -> SpatialReference {
    let grid = GridDefinition::new(
        "global_ll",
        "Global geographic test area",
        Crs::geographic(),
        width,
        height,
        AreaExtent::new(-180.0, -90.0, 180.0, 90.0),
    )
    .expect("fixture grid is valid");
    SpatialReference::Grid(grid)
}

/// A small swath with synthetic per-pixel geolocation.
pub fn swath_area(width: usize, height: usize) -> SpatialReference {
    let lons = Array2::from_shape_fn((height, width), |(_, col)| col as f64);
    let lats = Array2::from_shape_fn((height, width), |(row, _)| 50.0 - row as f64);
    let swath = SwathDefinition::new(lons, lats).expect("fixture shapes match");
    SpatialReference::Swath(swath)
}

/// The acquisition start time shared by the scene fixtures.
pub fn scene_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 5, 30, 10, 0, 0).unwrap()
}

/// The acquisition end time shared by the scene fixtures.
pub fn scene_end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 5, 30, 10, 15, 0).unwrap()
}

/// A channel array on the given area, with x/y coordinates and a scalar
/// `time` coordinate.
pub fn channel(name: &str, area: SpatialReference, width: usize, height: usize) -> LabeledArray {
    let data = ArrayData::from(create_test_image(width, height).into_dyn());
    let mut array = LabeledArray::new(name, data, &["y", "x"])
        .with_coord(
            "x",
            LabeledArray::new(
                "x",
                ArrayData::from(create_axis(0.0, 1000.0, width).into_dyn()),
                &["x"],
            ),
        )
        .with_coord(
            "y",
            LabeledArray::new(
                "y",
                ArrayData::from(create_axis(0.0, -1000.0, height).into_dyn()),
                &["y"],
            ),
        )
        .with_coord(
            "time",
            LabeledArray::new("time", time_scalar(scene_start()), &[]),
        )
        .with_times(scene_start(), scene_end());
    array.area = Some(area);
    array
}

/// A pair of channels sharing one Lambert grid, the standard two-array scene.
pub fn lambert_scene(width: usize, height: usize) -> Vec<LabeledArray> {
    vec![
        channel("vis006", lambert_area(width, height), width, height),
        channel("ir_108", lambert_area(width, height), width, height),
    ]
}
