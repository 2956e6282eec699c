//! End-to-end tests: full save calls against an in-memory sink.

use std::path::Path;

use anyhow::Result;
use cf_writer::testing::RecordingSink;
use cf_writer::{
    CfWriter, CfWriterError, EncodingTable, GroupAssignment, SaveOptions, WriteMode,
};
use labeled_array::{ArrayData, FillValue, LabeledArray, VariableEncoding};
use ndarray::Array1;
use test_utils::{channel, lambert_area, lambert_scene, swath_area};

fn save(
    arrays: &[LabeledArray],
    options: &SaveOptions,
) -> cf_writer::Result<(RecordingSink, cf_writer::SaveSummary)> {
    let mut writer = CfWriter::new(RecordingSink::new());
    let summary = writer.save_arrays(arrays, Path::new("scene.nc"), options)?;
    Ok((writer.into_sink(), summary))
}

#[test]
fn test_flat_save_produces_one_conformant_container() -> Result<()> {
    let (sink, summary) = save(&lambert_scene(3, 2), &SaveOptions::default())?;

    assert_eq!(sink.calls.len(), 1);
    let call = &sink.calls[0];
    assert_eq!(call.mode, WriteMode::Write);
    assert_eq!(call.group, None);
    assert_eq!(call.path, Path::new("scene.nc"));

    let container = &call.container;
    assert!(container.data_vars.contains_key("vis006"));
    assert!(container.data_vars.contains_key("ir_108"));

    // Global attributes carry the conventions tag and a provenance line
    assert_eq!(
        container.attrs.get("Conventions").and_then(|a| a.as_str()),
        Some("CF-1.7")
    );
    let history = container
        .attrs
        .get("history")
        .and_then(|a| a.as_str())
        .expect("history attribute");
    assert!(history.contains("Created by cf-writer on 20"));

    // Projected spatial coordinates got their CF identity
    let x = container.coords.get("x").expect("x coordinate");
    assert_eq!(x.str_attr("standard_name"), Some("projection_x_coordinate"));
    assert_eq!(x.str_attr("units"), Some("m"));

    // A scalar time coordinate became an explicit leading dimension
    let vis = &container.data_vars["vis006"];
    assert_eq!(vis.dims, vec!["time", "y", "x"]);
    assert_eq!(vis.shape(), &[1, 2, 3]);

    // Time bounds span the scene and mirror onto the time coordinate
    let bounds = container.data_vars.get("time_bnds").expect("time_bnds");
    assert_eq!(bounds.dims, vec!["time", "bnds_1d"]);
    let time = container.coords.get("time").expect("time coordinate");
    assert_eq!(time.str_attr("bounds"), Some("time_bnds"));

    assert_eq!(summary.groups_written, vec![None]);
    Ok(())
}

#[test]
fn test_grouped_save_reserves_globals_for_the_root() -> Result<()> {
    let mut groups = GroupAssignment::new();
    groups.insert("visir".to_string(), vec!["vis006".to_string()]);
    groups.insert("hrv".to_string(), vec!["ir_108".to_string()]);
    let options = SaveOptions {
        groups: Some(groups),
        ..Default::default()
    };

    let (sink, summary) = save(&lambert_scene(3, 2), &options)?;

    assert_eq!(sink.calls.len(), 3);

    // Root first, in write mode, with only the global attributes
    let root = &sink.calls[0];
    assert_eq!(root.mode, WriteMode::Write);
    assert_eq!(root.group, None);
    assert!(root.container.is_empty());
    assert!(root.container.attrs.contains_key("history"));
    // Grouped output is not fully CF compliant: no conventions tag
    assert!(!root.container.attrs.contains_key("Conventions"));

    // Groups appended afterwards, unadorned
    for call in &sink.calls[1..] {
        assert_eq!(call.mode, WriteMode::Append);
        assert!(call.container.attrs.is_empty());
    }
    let visir = sink.call_for_group(Some("visir")).expect("visir group");
    assert!(visir.container.data_vars.contains_key("vis006"));
    let hrv = sink.call_for_group(Some("hrv")).expect("hrv group");
    assert!(hrv.container.data_vars.contains_key("ir_108"));

    assert_eq!(summary.groups_written.len(), 3);
    assert_eq!(summary.groups_written[0], None);
    Ok(())
}

#[test]
fn test_swath_scene_gets_lonlat_coordinates() -> Result<()> {
    let array = channel("overview", swath_area(3, 2), 3, 2);
    let (sink, _) = save(&[array], &SaveOptions::default())?;

    let container = &sink.calls[0].container;
    let longitude = container.coords.get("longitude").expect("longitude");
    assert_eq!(longitude.str_attr("units"), Some("degrees_east"));
    let latitude = container.coords.get("latitude").expect("latitude");
    assert_eq!(latitude.str_attr("units"), Some("degrees_north"));
    // Swaths have no grid mapping
    assert!(!container.data_vars.contains_key("conus_lcc"));
    Ok(())
}

#[test]
fn test_gridded_scene_gets_grid_mapping() -> Result<()> {
    let options = SaveOptions {
        include_lonlats: false,
        ..Default::default()
    };
    let (sink, _) = save(&lambert_scene(3, 2), &options)?;

    let container = &sink.calls[0].container;
    let gmapping = container
        .data_vars
        .get("conus_lcc")
        .expect("grid mapping variable");
    assert_eq!(gmapping.data.ndim(), 0);
    assert_eq!(
        gmapping.str_attr("grid_mapping_name"),
        Some("lambert_conformal_conic")
    );
    for variable in ["vis006", "ir_108"] {
        assert_eq!(
            container.data_vars[variable].str_attr("grid_mapping"),
            Some("conus_lcc")
        );
    }
    assert!(!container.coords.contains_key("longitude"));
    Ok(())
}

#[test]
fn test_numeric_names_are_prefixed_and_encoding_remapped() -> Result<()> {
    let array = channel("1", lambert_area(3, 2), 3, 2).with_chunks(vec![2, 2]);
    let mut encoding = EncodingTable::new();
    encoding.insert(
        "1".to_string(),
        VariableEncoding {
            zlib: Some(true),
            ..Default::default()
        },
    );
    let options = SaveOptions {
        encoding,
        ..Default::default()
    };

    let (sink, _) = save(&[array], &options)?;
    let call = &sink.calls[0];

    let variable = call
        .container
        .data_vars
        .get("CHANNEL_1")
        .expect("prefixed variable");
    assert_eq!(variable.str_attr("original_name"), Some("1"));

    // The user override keyed by the raw name followed the rename
    assert_eq!(call.encoding["CHANNEL_1"].zlib, Some(true));
    assert!(!call.encoding.contains_key("1"));
    Ok(())
}

#[test]
fn test_dangling_coordinate_reference_warns_but_saves() -> Result<()> {
    let array = channel("overview", lambert_area(3, 2), 3, 2).with_attr("coordinates", "lon lat");
    let (sink, summary) = save(&[array], &SaveOptions::default())?;

    let variable = &sink.calls[0].container.data_vars["overview"];
    assert!(!variable.attrs.contains_key("coordinates"));
    assert!(!variable.coords.contains_key("lon"));
    assert!(!variable.coords.contains_key("lat"));
    assert!(summary.diagnostics.contains("does not exist, dropping reference"));
    Ok(())
}

#[test]
fn test_alt_coordinates_disambiguated_across_group() -> Result<()> {
    let offset_coord = |values: Vec<f64>| {
        LabeledArray::new(
            "time_offset",
            ArrayData::from(Array1::from_vec(values).into_dyn()),
            &["y"],
        )
    };
    let mut a = channel("a", lambert_area(3, 2), 3, 2);
    a.coords
        .insert("time_offset".to_string(), offset_coord(vec![0.1, 0.2]));
    let mut b = channel("b", lambert_area(3, 2), 3, 2);
    b.coords
        .insert("time_offset".to_string(), offset_coord(vec![0.3, 0.4]));

    let options = SaveOptions {
        pretty: true,
        ..Default::default()
    };
    let (sink, _) = save(&[a.clone(), b.clone()], &options)?;
    let container = &sink.calls[0].container;
    assert!(container.coords.contains_key("a_time_offset"));
    assert!(container.coords.contains_key("b_time_offset"));
    assert!(!container.coords.contains_key("time_offset"));

    // Identical data and pretty mode keep the shared name
    b.coords
        .insert("time_offset".to_string(), offset_coord(vec![0.1, 0.2]));
    let (sink, _) = save(&[a, b], &options)?;
    let container = &sink.calls[0].container;
    assert!(container.coords.contains_key("time_offset"));
    assert!(!container.coords.contains_key("a_time_offset"));
    Ok(())
}

#[test]
fn test_inconsistent_grids_abort_before_any_write() {
    let a = channel("a", lambert_area(3, 2), 3, 2);
    let mut b = channel("b", lambert_area(3, 2), 3, 2);
    b.coords.insert(
        "y".to_string(),
        LabeledArray::new(
            "y",
            ArrayData::from(Array1::from_vec(vec![9.0, 10.0]).into_dyn()),
            &["y"],
        ),
    );

    let result = save(&[a, b], &SaveOptions::default());
    match result {
        Err(CfWriterError::InconsistentGrids) => {}
        other => panic!("expected InconsistentGrids, got {other:?}"),
    }
}

#[test]
fn test_resolved_encoding_covers_chunks_fill_and_time() -> Result<()> {
    let array = channel("overview", lambert_area(3, 2), 3, 2).with_chunks(vec![512, 512]);
    let (sink, _) = save(&[array], &SaveOptions::default())?;
    let call = &sink.calls[0];

    // Chunk sizes never exceed the actual extent; time was prepended
    assert_eq!(
        call.encoding["overview"].chunksizes,
        Some(vec![1, 2, 3])
    );

    // Coordinate variables carry no fill value
    assert_eq!(call.encoding["x"].fill_value, Some(FillValue::Disabled));
    assert_eq!(call.encoding["y"].fill_value, Some(FillValue::Disabled));

    // Time units follow the epoch and mirror onto the bounds
    assert_eq!(
        call.encoding["time"].units.as_deref(),
        Some("seconds since 1970-01-01 00:00:00")
    );
    assert_eq!(call.encoding["time_bnds"].units, call.encoding["time"].units);
    assert_eq!(
        call.encoding["time_bnds"].fill_value,
        Some(FillValue::Disabled)
    );
    Ok(())
}

#[test]
fn test_empty_input_fails_fast() {
    let result = save(&[], &SaveOptions::default());
    match result {
        Err(CfWriterError::EmptyInput) => {}
        other => panic!("expected EmptyInput, got {other:?}"),
    }
}
