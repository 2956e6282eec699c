//! Attribute values attached to labeled arrays.
//!
//! Attributes arriving from readers carry arbitrary nested metadata: scalars,
//! byte strings, sequences, mappings and small numeric arrays (including
//! structured record arrays from raw file headers). `AttrValue` is the closed
//! sum over all of these shapes, so downstream encoders can dispatch on the
//! variant instead of reflecting on runtime types.

use std::collections::BTreeMap;

use crate::error::{LabeledArrayError, Result};

/// Map of attribute name to value, kept in sorted key order.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Absent value. Dropped entirely when an attribute set is encoded.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Raw byte string, e.g. header fields read verbatim from a file.
    Bytes(Vec<u8>),
    List(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
    /// An n-dimensional array-valued attribute.
    Array(AttrArray),
}

impl AttrValue {
    /// Whether this value is the absent marker.
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// The string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(value: Vec<AttrValue>) -> Self {
        AttrValue::List(value)
    }
}

/// An array-valued attribute: a shape plus homogeneous elements.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrArray {
    shape: Vec<usize>,
    elements: AttrElements,
}

/// Element storage for [`AttrArray`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttrElements {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    Str(Vec<String>),
    /// Structured record elements: named fields, one row per element.
    Record {
        fields: Vec<String>,
        rows: Vec<Vec<AttrValue>>,
    },
}

impl AttrElements {
    fn len(&self) -> usize {
        match self {
            AttrElements::Bool(v) => v.len(),
            AttrElements::Int(v) => v.len(),
            AttrElements::Float(v) => v.len(),
            AttrElements::Str(v) => v.len(),
            AttrElements::Record { rows, .. } => rows.len(),
        }
    }
}

impl AttrArray {
    /// Create an array with an explicit shape.
    pub fn with_shape(shape: Vec<usize>, elements: AttrElements) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != elements.len() {
            return Err(LabeledArrayError::ShapeMismatch {
                shape,
                elements: elements.len(),
            });
        }
        Ok(Self { shape, elements })
    }

    /// Create a one-dimensional boolean array.
    pub fn from_bools(values: Vec<bool>) -> Self {
        Self {
            shape: vec![values.len()],
            elements: AttrElements::Bool(values),
        }
    }

    /// Create a one-dimensional integer array.
    pub fn from_ints(values: Vec<i64>) -> Self {
        Self {
            shape: vec![values.len()],
            elements: AttrElements::Int(values),
        }
    }

    /// Create a one-dimensional float array.
    pub fn from_floats(values: Vec<f64>) -> Self {
        Self {
            shape: vec![values.len()],
            elements: AttrElements::Float(values),
        }
    }

    /// Create a one-dimensional string array.
    pub fn from_strs(values: Vec<String>) -> Self {
        Self {
            shape: vec![values.len()],
            elements: AttrElements::Str(values),
        }
    }

    /// Create a one-dimensional structured record array.
    pub fn from_records(fields: Vec<String>, rows: Vec<Vec<AttrValue>>) -> Self {
        Self {
            shape: vec![rows.len()],
            elements: AttrElements::Record { fields, rows },
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.len() == 0
    }

    pub fn elements(&self) -> &AttrElements {
        &self.elements
    }

    /// Whether the elements are structured records.
    pub fn is_record(&self) -> bool {
        matches!(self.elements, AttrElements::Record { .. })
    }
}
