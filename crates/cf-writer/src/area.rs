//! Geolocation resolution.
//!
//! Converts an array's spatial reference into CF metadata: gridded areas
//! yield a grid-mapping descriptor variable, swaths (and strict mode) yield
//! explicit longitude/latitude coordinate arrays.

use labeled_array::{ArrayData, AttrValue, LabeledArray};
use projection::SpatialReference;

use crate::attrs::json_to_attr;

/// Resolve an array's spatial reference into CF form.
///
/// Returns the auxiliary variables to add to the container (currently at most
/// one grid-mapping descriptor) followed by the transformed array itself.
/// Arrays without a spatial reference pass through unchanged.
pub fn area_to_cf(array: &LabeledArray, strict: bool, got_lonlats: bool) -> Vec<LabeledArray> {
    let Some(area) = array.area.clone() else {
        return vec![array.clone()];
    };

    let mut array = array.clone();
    let mut result = Vec::new();

    if !got_lonlats && (area.is_swath() || strict) {
        attach_lonlats(&mut array, &area);
    }
    if let SpatialReference::Grid(grid) = &area {
        result.push(grid_mapping_variable(grid));
        array
            .attrs
            .insert("grid_mapping".to_string(), AttrValue::from(grid.area_id.clone()));
    }
    result.push(array);
    result
}

/// Attach per-pixel longitude/latitude coordinate variables.
fn attach_lonlats(array: &mut LabeledArray, area: &SpatialReference) {
    let (lons, lats) = area.derive_coordinates();
    let chunks = spatial_chunks(array);

    let mut longitude = LabeledArray::new(
        "longitude",
        ArrayData::from(lons.into_dyn()),
        &["y", "x"],
    )
    .with_attr("standard_name", "longitude")
    .with_attr("units", "degrees_east");
    longitude.chunks = chunks.clone();

    let mut latitude = LabeledArray::new(
        "latitude",
        ArrayData::from(lats.into_dyn()),
        &["y", "x"],
    )
    .with_attr("standard_name", "latitude")
    .with_attr("units", "degrees_north");
    latitude.chunks = chunks;

    array.coords.insert("longitude".to_string(), longitude);
    array.coords.insert("latitude".to_string(), latitude);
}

/// Chunk layout for the derived lon/lat arrays: the parent's chunking over
/// the two spatial axes, with every other dimension collapsed to index 0.
fn spatial_chunks(array: &LabeledArray) -> Option<Vec<usize>> {
    let chunks = array.chunks.as_ref()?;
    let iy = array.dims.iter().position(|d| d == "y")?;
    let ix = array.dims.iter().position(|d| d == "x")?;
    Some(vec![*chunks.get(iy)?, *chunks.get(ix)?])
}

/// Zero-valued auxiliary variable carrying the CF grid-mapping attributes.
fn grid_mapping_variable(grid: &projection::GridDefinition) -> LabeledArray {
    let mut variable = LabeledArray::new(
        grid.area_id.clone(),
        ArrayData::from(ndarray::ArrayD::from_elem(ndarray::IxDyn(&[]), 0_i32)),
        &[],
    );
    for (key, value) in grid.crs.to_cf() {
        variable.attrs.insert(key, json_to_attr(&value));
    }
    variable
}
