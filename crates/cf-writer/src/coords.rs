//! Coordinate normalization across the variables of one output container.
//!
//! Three passes run in order: the shared-grid uniqueness check, resolution of
//! `coordinates` attribute cross-references, and disambiguation of same-named
//! non-dimensional coordinates.

use std::collections::{BTreeMap, BTreeSet};

use labeled_array::{AttrValue, LabeledArray};

use crate::diagnostics::Diagnostics;
use crate::error::{CfWriterError, Result};

/// Check that all variables share the same projection coordinates x/y.
///
/// Data equality is established by content fingerprint, not by identity.
/// Fails before anything is written, so incompatible grids never produce a
/// partial file.
pub fn assert_xy_unique(datas: &BTreeMap<String, LabeledArray>) -> Result<()> {
    let mut unique_x = BTreeSet::new();
    let mut unique_y = BTreeSet::new();
    for variable in datas.values() {
        if variable.has_dim("y") {
            if let Some(coord) = variable.coords.get("y") {
                unique_y.insert(coord.fingerprint());
            }
        }
        if variable.has_dim("x") {
            if let Some(coord) = variable.coords.get("x") {
                unique_x.insert(coord.fingerprint());
            }
        }
    }
    if unique_x.len() > 1 || unique_y.len() > 1 {
        return Err(CfWriterError::InconsistentGrids);
    }
    Ok(())
}

/// Resolve `coordinates` attribute references between variables.
///
/// A variable declaring `coordinates: "lon lat"` gets the named sibling
/// variables attached as actual coordinate bindings, squeezing away
/// dimensions the referencing variable does not have. Dangling references
/// are dropped with a warning. The `coordinates` attribute itself is always
/// removed afterwards; the serialization backend re-derives it from the
/// coordinate bindings.
pub fn link_coords(datas: &mut BTreeMap<String, LabeledArray>, diagnostics: &mut Diagnostics) {
    let names: Vec<String> = datas.keys().cloned().collect();
    for name in &names {
        let declared = declared_coordinates(datas.get(name));
        for coord_name in declared {
            let already_bound = datas
                .get(name)
                .is_some_and(|v| v.coords.contains_key(&coord_name));
            if already_bound {
                continue;
            }
            let Some(coord_var) = datas.get(&coord_name).cloned() else {
                diagnostics.warn(format!(
                    "Coordinate \"{coord_name}\" referenced by dataset {name} \
                     does not exist, dropping reference."
                ));
                continue;
            };
            let target_dims = datas.get(name).map(|v| v.dims.clone()).unwrap_or_default();
            match coord_var.squeeze_dims_not_in(&target_dims) {
                Ok(squeezed) => {
                    if let Some(variable) = datas.get_mut(name) {
                        variable.coords.insert(coord_name.clone(), squeezed);
                    }
                }
                Err(_) => diagnostics.warn(format!(
                    "Coordinate \"{coord_name}\" referenced by dataset {name} \
                     cannot be aligned with its dimensions, dropping reference."
                )),
            }
        }
        if let Some(variable) = datas.get_mut(name) {
            variable.attrs.remove("coordinates");
        }
    }
}

/// The coordinate names a variable declares, from a space-separated string
/// or a list-valued attribute.
fn declared_coordinates(variable: Option<&LabeledArray>) -> Vec<String> {
    match variable.and_then(|v| v.attrs.get("coordinates")) {
        Some(AttrValue::Str(s)) => s.split_whitespace().map(str::to_string).collect(),
        Some(AttrValue::List(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Make non-dimensional coordinate names unique among all variables.
///
/// Same-named auxiliary coordinates (scanline timestamps and the like) may
/// hold different data per variable; every occurrence is renamed to
/// `{variable_name}_{coordinate_name}`. With `pretty`, a name whose data
/// agrees across the whole group is left untouched. Longitude and latitude
/// are exempt: the uniqueness check already forces them to agree.
pub fn make_alt_coords_unique(
    datas: BTreeMap<String, LabeledArray>,
    pretty: bool,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<String, LabeledArray> {
    let mut tokens: BTreeMap<String, BTreeSet<u32>> = BTreeMap::new();
    for variable in datas.values() {
        for (coord_name, coord) in &variable.coords {
            if !coord.is_lonlat() && !variable.has_dim(coord_name) {
                tokens
                    .entry(coord_name.clone())
                    .or_default()
                    .insert(coord.fingerprint());
            }
        }
    }

    let mut new_datas = datas;
    for (coord_name, fingerprints) in &tokens {
        let unique = fingerprints.len() == 1;
        if pretty && unique {
            continue;
        }
        if pretty {
            diagnostics.warn(format!(
                "Cannot pretty-format \"{coord_name}\" coordinates because they \
                 are not unique among the given datasets"
            ));
        }
        for (var_name, variable) in new_datas.iter_mut() {
            if let Some(mut coord) = variable.coords.remove(coord_name) {
                let renamed = format!("{var_name}_{coord_name}");
                coord.name = renamed.clone();
                variable.coords.insert(renamed, coord);
            }
        }
    }
    new_datas
}
