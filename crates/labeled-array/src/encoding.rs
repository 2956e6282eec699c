//! Per-variable storage encoding hints.

use serde::{Deserialize, Serialize};

/// Fill-value setting for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FillValue {
    /// Explicitly no fill value; suppresses fill-value metadata entirely.
    Disabled,
    Value(f64),
}

/// Storage options for one variable.
///
/// Unset fields are left to the serialization backend's defaults. Tables of
/// these are merged by the encoding resolver: caller-supplied entries win
/// over hints carried on the arrays, which win over derived defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableEncoding {
    /// On-disk chunk extents, one per dimension.
    pub chunksizes: Option<Vec<usize>>,
    pub fill_value: Option<FillValue>,
    /// Storage units, e.g. a time reference string.
    pub units: Option<String>,
    /// Calendar for time variables.
    pub calendar: Option<String>,
    /// Deflate compression toggle.
    pub zlib: Option<bool>,
    /// Deflate compression level.
    pub complevel: Option<u8>,
}

impl VariableEncoding {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == VariableEncoding::default()
    }

    /// Overlay `other` onto `self`; fields set in `other` win.
    pub fn apply(&mut self, other: &VariableEncoding) {
        if other.chunksizes.is_some() {
            self.chunksizes = other.chunksizes.clone();
        }
        if other.fill_value.is_some() {
            self.fill_value = other.fill_value;
        }
        if other.units.is_some() {
            self.units = other.units.clone();
        }
        if other.calendar.is_some() {
            self.calendar = other.calendar.clone();
        }
        if other.zlib.is_some() {
            self.zlib = other.zlib;
        }
        if other.complevel.is_some() {
            self.complevel = other.complevel;
        }
    }
}
