//! Per-array transformation into a CF-conformant variable.

use labeled_array::{AttrValue, LabeledArray};
use projection::SpatialReference;

use crate::attrs::{encode_attrs, flatten_attrs};
use crate::config::SaveOptions;
use crate::diagnostics::Diagnostics;

/// Attribute keys with this prefix are internal bookkeeping of the reader
/// pipeline and never reach the output.
const INTERNAL_ATTR_PREFIX: &str = "_";

/// Convert an array into a CF-conformant variable.
///
/// The input is never mutated; all work happens on a deep copy. The returned
/// variable carries only target-safe attribute values.
pub fn to_cf_variable(
    array: &LabeledArray,
    options: &SaveOptions,
    diagnostics: &mut Diagnostics,
) -> LabeledArray {
    let mut new = array.clone();

    let original_name = new.name.clone();
    new.name = sanitize_name(&original_name, options.effective_prefix(), diagnostics);

    new.attrs
        .retain(|key, _| !key.starts_with(INTERNAL_ATTR_PREFIX));
    for key in &options.exclude_attrs {
        new.attrs.remove(key);
    }

    encode_time(&mut new, &options.epoch);
    encode_spatial_coords(&mut new, diagnostics);
    new.area = None;

    if !new.ancillary.is_empty() {
        let names: Vec<&str> = new.ancillary.iter().map(|a| a.name.as_str()).collect();
        new.attrs.insert(
            "ancillary_variables".to_string(),
            AttrValue::from(names.join(" ")),
        );
    }
    new.ancillary.clear();

    new.attrs.retain(|_, value| !value.is_null());

    if !new.attrs.contains_key("long_name") && !new.attrs.contains_key("standard_name") {
        new.attrs
            .insert("long_name".to_string(), AttrValue::from(new.name.clone()));
    }

    if let Some(compression) = options.compression {
        new.encoding.zlib = Some(compression.zlib);
        new.encoding.complevel = Some(compression.complevel);
    }

    if options.include_orig_name
        && options.effective_prefix().is_some()
        && original_name != new.name
    {
        new.attrs
            .insert("original_name".to_string(), AttrValue::from(original_name));
    }

    if options.flatten_attrs {
        new.attrs = flatten_attrs(&new.attrs);
    }

    new.attrs = encode_attrs(&new.attrs)
        .into_iter()
        .map(|(key, value)| (key, AttrValue::from(value)))
        .collect();

    new
}

/// Prefix names that start with a digit; such names are not valid netCDF
/// identifiers. Without a configured prefix the name is kept and the output
/// is non-conformant.
fn sanitize_name(original: &str, prefix: Option<&str>, diagnostics: &mut Diagnostics) -> String {
    let starts_with_digit = original
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit());
    if !starts_with_digit {
        return original.to_string();
    }
    match prefix {
        Some(prefix) => format!("{prefix}{original}"),
        None => {
            diagnostics.warn(format!(
                "Invalid netCDF dataset name: {original} starts with a digit."
            ));
            original.to_string()
        }
    }
}

/// Force the storage time unit to the configured epoch and make sure `time`
/// is an explicit dimension.
fn encode_time(new: &mut LabeledArray, epoch: &str) {
    let time_len = match new.coords.get_mut("time") {
        Some(time) => {
            time.encoding.units = Some(epoch.to_string());
            time.attrs
                .insert("standard_name".to_string(), AttrValue::from("time"));
            time.attrs.remove("bounds");
            time.data.len()
        }
        None => return,
    };
    if !new.has_dim("time") && !new.shape().contains(&time_len) {
        new.expand_dims_front("time");
        if let Some(time) = new.coords.get_mut("time") {
            if time.data.ndim() == 0 {
                time.expand_dims_front("time");
            }
        }
    }
}

/// Set CF standard names and units on the spatial coordinates.
fn encode_spatial_coords(new: &mut LabeledArray, diagnostics: &mut Diagnostics) {
    let has_spatial = ["x", "y", "crs"]
        .iter()
        .any(|key| new.coords.contains_key(*key));
    if !has_spatial {
        return;
    }
    if is_projected(new, diagnostics) {
        set_coord_identity(new, "x", "projection_x_coordinate", "m");
        set_coord_identity(new, "y", "projection_y_coordinate", "m");
    } else {
        set_coord_identity(new, "x", "longitude", "degrees_east");
        set_coord_identity(new, "y", "latitude", "degrees_north");
    }
    // The CRS carrier has served its purpose.
    new.coords.remove("crs");
}

fn set_coord_identity(new: &mut LabeledArray, coord: &str, standard_name: &str, units: &str) {
    if let Some(coord) = new.coords.get_mut(coord) {
        coord
            .attrs
            .insert("standard_name".to_string(), AttrValue::from(standard_name));
        coord
            .attrs
            .insert("units".to_string(), AttrValue::from(units));
    }
}

/// Guess whether the data are projected or geographic.
///
/// Order of preference: declared grid CRS, declared swath CRS, unit string of
/// the x/y coordinates, then projected with a warning.
fn is_projected(new: &LabeledArray, diagnostics: &mut Diagnostics) -> bool {
    match &new.area {
        Some(SpatialReference::Grid(grid)) => return grid.crs.is_projected(),
        Some(SpatialReference::Swath(swath)) => {
            if let Some(crs) = &swath.crs {
                return crs.is_projected();
            }
        }
        None => {}
    }
    if let Some(units) = units_from_coords(new) {
        if units.ends_with('m') {
            return true;
        }
        if units.starts_with("degrees") {
            return false;
        }
    }
    diagnostics.warn("Failed to tell if data are projected. Assuming yes.");
    true
}

fn units_from_coords(new: &LabeledArray) -> Option<String> {
    for coord in ["x", "y"] {
        if let Some(units) = new.coords.get(coord).and_then(|c| c.str_attr("units")) {
            return Some(units.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use labeled_array::{time_scalar, ArrayData, AttrMap};
    use ndarray::{Array1, Array2};
    use projection::{AreaExtent, Crs, GridDefinition};
    use std::collections::BTreeMap;

    fn axis(name: &str, values: Vec<f64>) -> LabeledArray {
        LabeledArray::new(name, ArrayData::from(Array1::from_vec(values).into_dyn()), &[name])
    }

    fn image(name: &str) -> LabeledArray {
        LabeledArray::new(
            name,
            ArrayData::from(Array2::<f32>::zeros((2, 2)).into_dyn()),
            &["y", "x"],
        )
        .with_coord("x", axis("x", vec![1.0, 2.0]))
        .with_coord("y", axis("y", vec![3.0, 4.0]))
    }

    fn geo_area() -> SpatialReference {
        SpatialReference::Grid(
            GridDefinition::new(
                "global_ll",
                "geographic",
                Crs::geographic(),
                2,
                2,
                AreaExtent::new(-180.0, -90.0, 180.0, 90.0),
            )
            .expect("valid grid"),
        )
    }

    fn projected_area() -> SpatialReference {
        SpatialReference::Grid(
            GridDefinition::new(
                "conus_lcc",
                "projected",
                Crs::LambertConformal(projection::LambertConformal::new(-97.5, 38.5, 38.5, 38.5)),
                2,
                2,
                AreaExtent::new(-1.0e6, -1.0e6, 1.0e6, 1.0e6),
            )
            .expect("valid grid"),
        )
    }

    #[test]
    fn test_numeric_name_gets_prefix_and_original_name() {
        let mut diagnostics = Diagnostics::new();
        let array = image("1");
        let variable = to_cf_variable(&array, &SaveOptions::default(), &mut diagnostics);
        assert_eq!(variable.name, "CHANNEL_1");
        assert_eq!(variable.str_attr("original_name"), Some("1"));
    }

    #[test]
    fn test_numeric_name_without_prefix_warns() {
        let mut diagnostics = Diagnostics::new();
        let options = SaveOptions {
            numeric_name_prefix: None,
            ..Default::default()
        };
        let variable = to_cf_variable(&image("1"), &options, &mut diagnostics);
        assert_eq!(variable.name, "1");
        assert!(diagnostics.contains("starts with a digit"));
        assert_eq!(variable.str_attr("original_name"), None);
    }

    #[test]
    fn test_non_numeric_name_has_no_original_name() {
        let mut diagnostics = Diagnostics::new();
        let variable = to_cf_variable(&image("overview"), &SaveOptions::default(), &mut diagnostics);
        assert_eq!(variable.name, "overview");
        assert_eq!(variable.str_attr("original_name"), None);
    }

    #[test]
    fn test_internal_and_excluded_attrs_are_stripped() {
        let mut diagnostics = Diagnostics::new();
        let array = image("overview")
            .with_attr("_reader_state", "xyz")
            .with_attr("raw_metadata", "big blob")
            .with_attr("units", "K");
        let options = SaveOptions {
            exclude_attrs: vec!["raw_metadata".to_string()],
            ..Default::default()
        };
        let variable = to_cf_variable(&array, &options, &mut diagnostics);
        assert!(!variable.attrs.contains_key("_reader_state"));
        assert!(!variable.attrs.contains_key("raw_metadata"));
        assert_eq!(variable.str_attr("units"), Some("K"));
    }

    #[test]
    fn test_time_coordinate_is_encoded_and_dimension_added() {
        let mut diagnostics = Diagnostics::new();
        let dt = Utc.with_ymd_and_hms(2018, 5, 30, 10, 0, 0).unwrap();
        let mut time = LabeledArray::new("time", time_scalar(dt), &[]);
        time.attrs
            .insert("bounds".to_string(), AttrValue::from("stale_bnds"));
        let array = image("overview").with_coord("time", time);

        let variable = to_cf_variable(&array, &SaveOptions::default(), &mut diagnostics);
        assert_eq!(variable.dims, vec!["time", "y", "x"]);
        assert_eq!(variable.shape(), &[1, 2, 2]);

        let time = variable.coords.get("time").expect("time coord");
        assert_eq!(
            time.encoding.units.as_deref(),
            Some("seconds since 1970-01-01 00:00:00")
        );
        assert_eq!(time.str_attr("standard_name"), Some("time"));
        assert!(!time.attrs.contains_key("bounds"));
        assert_eq!(time.dims, vec!["time"]);
    }

    #[test]
    fn test_projected_coordinates_get_projection_names() {
        let mut diagnostics = Diagnostics::new();
        let array = image("overview").with_area(projected_area());
        let variable = to_cf_variable(&array, &SaveOptions::default(), &mut diagnostics);
        let x = variable.coords.get("x").expect("x coord");
        assert_eq!(x.str_attr("standard_name"), Some("projection_x_coordinate"));
        assert_eq!(x.str_attr("units"), Some("m"));
        let y = variable.coords.get("y").expect("y coord");
        assert_eq!(y.str_attr("standard_name"), Some("projection_y_coordinate"));
    }

    #[test]
    fn test_geographic_coordinates_get_lonlat_names() {
        let mut diagnostics = Diagnostics::new();
        let array = image("overview").with_area(geo_area());
        let variable = to_cf_variable(&array, &SaveOptions::default(), &mut diagnostics);
        let x = variable.coords.get("x").expect("x coord");
        assert_eq!(x.str_attr("standard_name"), Some("longitude"));
        assert_eq!(x.str_attr("units"), Some("degrees_east"));
        let y = variable.coords.get("y").expect("y coord");
        assert_eq!(y.str_attr("standard_name"), Some("latitude"));
        assert_eq!(y.str_attr("units"), Some("degrees_north"));
    }

    #[test]
    fn test_unit_heuristic_and_default_warning() {
        let mut diagnostics = Diagnostics::new();
        let mut array = image("overview");
        if let Some(x) = array.coords.get_mut("x") {
            x.attrs.insert("units".to_string(), AttrValue::from("degrees_east"));
        }
        let variable = to_cf_variable(&array, &SaveOptions::default(), &mut diagnostics);
        assert_eq!(
            variable.coords.get("x").and_then(|c| c.str_attr("standard_name")),
            Some("longitude")
        );
        assert!(diagnostics.is_empty());

        // No CRS and no units: assume projected, with a warning.
        let variable = to_cf_variable(&image("overview"), &SaveOptions::default(), &mut diagnostics);
        assert_eq!(
            variable.coords.get("x").and_then(|c| c.str_attr("standard_name")),
            Some("projection_x_coordinate")
        );
        assert!(diagnostics.contains("Assuming yes"));
    }

    #[test]
    fn test_crs_coordinate_is_dropped() {
        let mut diagnostics = Diagnostics::new();
        let crs_coord = LabeledArray::new(
            "crs",
            ArrayData::from(ndarray::ArrayD::from_elem(ndarray::IxDyn(&[]), 0_i32)),
            &[],
        );
        let array = image("overview")
            .with_area(projected_area())
            .with_coord("crs", crs_coord);
        let variable = to_cf_variable(&array, &SaveOptions::default(), &mut diagnostics);
        assert!(!variable.coords.contains_key("crs"));
    }

    #[test]
    fn test_ancillary_variables_collapse_to_names() {
        let mut diagnostics = Diagnostics::new();
        let array = image("overview")
            .with_ancillary(image("quality_flags"))
            .with_ancillary(image("uncertainty"));
        let variable = to_cf_variable(&array, &SaveOptions::default(), &mut diagnostics);
        assert_eq!(
            variable.str_attr("ancillary_variables"),
            Some("quality_flags uncertainty")
        );
        assert!(variable.ancillary.is_empty());
    }

    #[test]
    fn test_long_name_defaults_to_variable_name() {
        let mut diagnostics = Diagnostics::new();
        let variable = to_cf_variable(&image("overview"), &SaveOptions::default(), &mut diagnostics);
        assert_eq!(variable.str_attr("long_name"), Some("overview"));

        let named = image("overview").with_attr("standard_name", "toa_reflectance");
        let variable = to_cf_variable(&named, &SaveOptions::default(), &mut diagnostics);
        assert!(!variable.attrs.contains_key("long_name"));
    }

    #[test]
    fn test_null_attrs_are_dropped() {
        let mut diagnostics = Diagnostics::new();
        let array = image("overview").with_attr("wavelength", AttrValue::Null);
        let variable = to_cf_variable(&array, &SaveOptions::default(), &mut diagnostics);
        assert!(!variable.attrs.contains_key("wavelength"));
    }

    #[test]
    fn test_flatten_and_encode_attrs() {
        let mut diagnostics = Diagnostics::new();
        let mut nested = BTreeMap::new();
        nested.insert("slope".to_string(), AttrValue::Float(0.02));
        let array = image("overview")
            .with_attr("raw_metadata", AttrValue::Map(nested))
            .with_attr("is_calibrated", true);
        let options = SaveOptions {
            flatten_attrs: true,
            ..Default::default()
        };
        let variable = to_cf_variable(&array, &options, &mut diagnostics);
        assert_eq!(
            variable.attrs.get("raw_metadata_slope"),
            Some(&AttrValue::Float(0.02))
        );
        // Booleans come out as lowercase strings after encoding
        assert_eq!(variable.str_attr("is_calibrated"), Some("true"));
    }

    #[test]
    fn test_compression_shorthand_lands_on_encoding() {
        let mut diagnostics = Diagnostics::new();
        let options = SaveOptions {
            compression: Some(crate::config::Compression::default()),
            ..Default::default()
        };
        let variable = to_cf_variable(&image("overview"), &options, &mut diagnostics);
        assert_eq!(variable.encoding.zlib, Some(true));
        assert_eq!(variable.encoding.complevel, Some(4));
    }

    #[test]
    fn test_input_array_is_not_mutated() {
        let mut diagnostics = Diagnostics::new();
        let array = image("1").with_attr("_internal", "x");
        let before = array.clone();
        let _ = to_cf_variable(&array, &SaveOptions::default(), &mut diagnostics);
        assert_eq!(array, before);
    }

    #[test]
    fn test_attrs_are_target_safe_after_transform() {
        let mut diagnostics = Diagnostics::new();
        let mut nested = AttrMap::new();
        nested.insert("k".to_string(), AttrValue::from("v"));
        let array = image("overview").with_attr("raw_metadata", AttrValue::Map(nested));
        let variable = to_cf_variable(&array, &SaveOptions::default(), &mut diagnostics);
        // The nested mapping became a JSON string
        let raw = variable.str_attr("raw_metadata").expect("encoded attr");
        let parsed: serde_json::Value = serde_json::from_str(raw).expect("valid JSON");
        assert_eq!(parsed, serde_json::json!({"k": "v"}));
    }
}
