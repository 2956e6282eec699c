//! Grouping and collection of arrays into output containers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use labeled_array::{datetime_to_ns, ArrayData, AttrMap, AttrValue, LabeledArray};
use ndarray::Array2;

use crate::area::area_to_cf;
use crate::attrs::{encode_attrs, flatten_attrs, EncodedAttrMap};
use crate::config::{GroupAssignment, SaveOptions, CF_VERSION};
use crate::coords::{assert_xy_unique, link_coords, make_alt_coords_unique};
use crate::dataarray::to_cf_variable;
use crate::diagnostics::Diagnostics;
use crate::error::{CfWriterError, Result};

/// One CF-compliant dataset ready for serialization.
///
/// `coords` holds the dataset-level merged coordinate variables and is
/// authoritative for coordinate metadata; the per-variable coordinate copies
/// define the dimension bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputContainer {
    pub data_vars: BTreeMap<String, LabeledArray>,
    pub coords: BTreeMap<String, LabeledArray>,
    /// Global attributes, already encoded.
    pub attrs: EncodedAttrMap,
}

impl OutputContainer {
    /// Iterate all variables: data variables first, then coordinates.
    pub fn variables(&self) -> impl Iterator<Item = (&String, &LabeledArray)> {
        self.data_vars.iter().chain(self.coords.iter())
    }

    pub fn contains_variable(&self, name: &str) -> bool {
        self.data_vars.contains_key(name) || self.coords.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.data_vars.is_empty() && self.coords.is_empty()
    }
}

/// Process arrays into one CF-compliant container per group.
///
/// Returns the containers keyed by group name (`None` for the flat case) and
/// the encoded global header attributes. With a single group the header
/// attributes are also attached to that container; with several they are
/// reserved for the root of the output file, which leaves the per-group
/// containers unadorned and the file as a whole not fully CF compliant.
pub fn collect_containers(
    arrays: &[LabeledArray],
    options: &SaveOptions,
    diagnostics: &mut Diagnostics,
) -> Result<(BTreeMap<Option<String>, OutputContainer>, EncodedAttrMap)> {
    if arrays.is_empty() {
        return Err(CfWriterError::EmptyInput);
    }

    let grouped = partition_groups(options.groups.as_ref(), arrays);
    let is_grouped = grouped.len() >= 2;

    let mut header = options.header_attrs.clone();
    if options.flatten_attrs {
        header = flatten_attrs(&header);
    }
    set_history(&mut header);
    if !is_grouped && !header.contains_key("Conventions") {
        header.insert("Conventions".to_string(), AttrValue::from(CF_VERSION));
    }
    let header = encode_attrs(&header);

    let mut containers = BTreeMap::new();
    for (group_name, group_arrays) in grouped {
        let mut container =
            collect_group(group_name.as_deref(), &group_arrays, options, diagnostics)?;
        if !is_grouped {
            container.attrs = header.clone();
        }
        containers.insert(group_name, container);
    }

    Ok((containers, header))
}

/// Partition the arrays according to the group assignment.
///
/// An array joins the first group that names it; arrays matched by no group
/// are silently dropped. Without an assignment everything lands in the one
/// unnamed group.
fn partition_groups(
    groups: Option<&GroupAssignment>,
    arrays: &[LabeledArray],
) -> BTreeMap<Option<String>, Vec<LabeledArray>> {
    let mut grouped: BTreeMap<Option<String>, Vec<LabeledArray>> = BTreeMap::new();
    match groups {
        None => {
            grouped.insert(None, arrays.to_vec());
        }
        Some(assignment) => {
            for array in arrays {
                for (group_name, members) in assignment {
                    if members.iter().any(|member| member == &array.name) {
                        grouped
                            .entry(Some(group_name.clone()))
                            .or_default()
                            .push(array.clone());
                        break;
                    }
                }
            }
        }
    }
    grouped
}

/// Collect one group of arrays into a container.
fn collect_group(
    group_name: Option<&str>,
    arrays: &[LabeledArray],
    options: &SaveOptions,
    diagnostics: &mut Diagnostics,
) -> Result<OutputContainer> {
    let mut collection: BTreeMap<String, LabeledArray> = BTreeMap::new();
    for array in arrays {
        gather_with_ancillary(array, &mut collection);
    }
    let got_lonlats = collection.values().any(LabeledArray::is_lonlat);

    let mut datas: BTreeMap<String, LabeledArray> = BTreeMap::new();
    let mut start_times: Vec<Option<DateTime<Utc>>> = Vec::new();
    let mut end_times: Vec<Option<DateTime<Utc>>> = Vec::new();
    for array in collection.values() {
        let dtype = array.data.dtype();
        if !dtype.is_cf_compatible() {
            diagnostics.warn(format!("Dtype {dtype} not compatible with {CF_VERSION}."));
        }
        for expanded in area_to_cf(array, options.include_lonlats, got_lonlats) {
            start_times.push(expanded.start_time);
            end_times.push(expanded.end_time);
            let variable = to_cf_variable(&expanded, options, diagnostics);
            datas.insert(variable.name.clone(), variable);
        }
    }

    assert_xy_unique(&datas)?;
    link_coords(&mut datas, diagnostics);
    let datas = make_alt_coords_unique(datas, options.pretty, diagnostics);

    let mut coords: BTreeMap<String, LabeledArray> = BTreeMap::new();
    for variable in datas.values() {
        for (coord_name, coord) in &variable.coords {
            coords
                .entry(coord_name.clone())
                .or_insert_with(|| coord.clone());
        }
    }

    let mut container = OutputContainer {
        data_vars: datas,
        coords,
        attrs: EncodedAttrMap::new(),
    };
    add_time_bounds(&mut container, group_name, &start_times, &end_times);
    Ok(container)
}

/// Gather an array and its ancillary variables, recursively, deduplicated by
/// name.
fn gather_with_ancillary(array: &LabeledArray, collection: &mut BTreeMap<String, LabeledArray>) {
    if collection.contains_key(&array.name) {
        return;
    }
    collection.insert(array.name.clone(), array.clone());
    for ancillary in &array.ancillary {
        gather_with_ancillary(ancillary, collection);
    }
}

/// Attach a `time_bnds` variable spanning the group's observation window.
fn add_time_bounds(
    container: &mut OutputContainer,
    group_name: Option<&str>,
    start_times: &[Option<DateTime<Utc>>],
    end_times: &[Option<DateTime<Utc>>],
) {
    if !container.coords.contains_key("time") {
        let group = group_name
            .map(|name| format!(" of group {name}"))
            .unwrap_or_default();
        tracing::warn!("No time dimension in datasets{group}, skipping time bounds creation.");
        return;
    }
    let start = start_times.iter().flatten().min();
    let end = end_times.iter().flatten().min();
    let (Some(start), Some(end)) = (start, end) else {
        tracing::warn!("No start/end times in datasets, skipping time bounds creation.");
        return;
    };

    let bounds = Array2::from_shape_vec((1, 2), vec![datetime_to_ns(*start), datetime_to_ns(*end)])
        .map(|a| ArrayData::time(a.into_dyn()));
    let Ok(bounds) = bounds else {
        return;
    };
    container.data_vars.insert(
        "time_bnds".to_string(),
        LabeledArray::new("time_bnds", bounds, &["time", "bnds_1d"]),
    );
    if let Some(time) = container.coords.get_mut("time") {
        time.attrs
            .insert("bounds".to_string(), AttrValue::from("time_bnds"));
        time.attrs
            .insert("standard_name".to_string(), AttrValue::from("time"));
    }
}

/// Add the provenance line to the `history` header attribute.
fn set_history(header: &mut AttrMap) {
    let line = format!("Created by cf-writer on {}", Utc::now());
    let history = match header.get("history") {
        Some(AttrValue::List(items)) => {
            let joined: String = items
                .iter()
                .filter_map(AttrValue::as_str)
                .collect::<Vec<_>>()
                .join("");
            format!("{joined}\n{line}")
        }
        Some(AttrValue::Str(existing)) => format!("{existing}\n{line}"),
        _ => line,
    };
    header.insert("history".to_string(), AttrValue::from(history));
}
