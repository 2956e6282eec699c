//! Per-variable storage encoding resolution.
//!
//! Merges caller-supplied overrides with defaults derived from the container:
//! chunk layouts are preserved (never exceeding the actual extent),
//! coordinate variables get their fill value suppressed, and time bounds
//! mirror the units and calendar of the time coordinate.

use std::collections::{BTreeMap, BTreeSet};

use labeled_array::{ns_to_datetime, FillValue, VariableEncoding};

use crate::collect::OutputContainer;

/// Mapping of variable name to storage options for one save call.
pub type EncodingTable = BTreeMap<String, VariableEncoding>;

/// Compute the encoding table for a container.
///
/// `user` entries take precedence over everything derived here.
pub fn resolve_encoding(
    container: &OutputContainer,
    user: &EncodingTable,
    numeric_name_prefix: Option<&str>,
) -> EncodingTable {
    let mut encoding = user.clone();
    remap_prefixed_names(&mut encoding, container, numeric_name_prefix);
    apply_variable_hints(&mut encoding, container);
    set_default_chunks(&mut encoding, container);
    set_default_fill_value(&mut encoding, container);
    set_default_time_encoding(&mut encoding, container);
    encoding
}

/// Fold encoding hints carried on the variables themselves into the table,
/// under any user-supplied fields. The table is the single source of truth
/// for the sink.
fn apply_variable_hints(encoding: &mut EncodingTable, container: &OutputContainer) {
    for (name, variable) in container.variables() {
        if variable.encoding.is_empty() {
            continue;
        }
        let mut merged = variable.encoding.clone();
        if let Some(user) = encoding.get(name) {
            merged.apply(user);
        }
        encoding.insert(name.clone(), merged);
    }
}

/// Move user overrides keyed by a pre-prefix variable name onto the prefixed
/// name actually present in the container.
fn remap_prefixed_names(
    encoding: &mut EncodingTable,
    container: &OutputContainer,
    numeric_name_prefix: Option<&str>,
) {
    let Some(prefix) = numeric_name_prefix.filter(|p| !p.is_empty()) else {
        return;
    };
    let prefixed: Vec<String> = container
        .variables()
        .map(|(name, _)| name.clone())
        .filter(|name| name.starts_with(prefix))
        .collect();
    for name in prefixed {
        let original = name.replacen(prefix, "", 1);
        if let Some(entry) = encoding.remove(&original) {
            encoding.insert(name, entry);
        }
    }
}

/// Preserve chunk layouts, capped element-wise at the variable's shape.
/// User-defined chunk sizes take precedence.
fn set_default_chunks(encoding: &mut EncodingTable, container: &OutputContainer) {
    for (name, variable) in container.variables() {
        let Some(chunks) = &variable.chunks else {
            continue;
        };
        let capped: Vec<usize> = chunks
            .iter()
            .zip(variable.shape())
            .map(|(chunk, extent)| (*chunk).min(*extent))
            .collect();
        let entry = encoding.entry(name.clone()).or_default();
        if entry.chunksizes.is_none() {
            entry.chunksizes = Some(capped);
        }
    }
}

/// Suppress fill-value metadata on coordinate variables.
fn set_default_fill_value(encoding: &mut EncodingTable, container: &OutputContainer) {
    let mut coord_vars = BTreeSet::new();
    for variable in container.data_vars.values() {
        for dim in &variable.dims {
            if variable.coords.contains_key(dim) {
                coord_vars.insert(dim.clone());
            }
        }
    }
    for name in coord_vars {
        let entry = encoding.entry(name).or_default();
        entry.fill_value = Some(FillValue::Disabled);
    }
}

/// Make sure the time coordinate and its bounds share units and calendar.
///
/// The defaults derive from the first time sample; the epoch forced onto the
/// variable's own encoding wins over them, and user overrides win over both.
fn set_default_time_encoding(encoding: &mut EncodingTable, container: &OutputContainer) {
    let Some(time) = container
        .coords
        .get("time")
        .or_else(|| container.data_vars.get("time"))
    else {
        return;
    };
    let Some(first_ns) = time.data.first_time_ns() else {
        return;
    };

    let (units, calendar) = default_time_encoding(first_ns);
    let mut time_enc = VariableEncoding {
        units: Some(units),
        calendar: Some(calendar),
        ..Default::default()
    };
    time_enc.apply(&time.encoding);
    if let Some(user) = encoding.get("time") {
        time_enc.apply(user);
    }

    let entry = encoding.entry("time".to_string()).or_default();
    entry.units = time_enc.units.clone();
    entry.calendar = time_enc.calendar.clone();

    if container.contains_variable("time_bnds") {
        let bounds = encoding.entry("time_bnds".to_string()).or_default();
        bounds.units = time_enc.units;
        bounds.calendar = time_enc.calendar;
        bounds.fill_value = Some(FillValue::Disabled);
    }
}

/// Default temporal encoding for a first time sample.
pub fn default_time_encoding(first_ns: i64) -> (String, String) {
    let first = ns_to_datetime(first_ns);
    (
        format!("seconds since {}", first.format("%Y-%m-%d %H:%M:%S")),
        "proleptic_gregorian".to_string(),
    )
}
