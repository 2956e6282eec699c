//! Attribute encoding.
//!
//! NetCDF attributes hold numeric/string scalars and flat lists of them.
//! Everything richer (nested mappings, multi-dimensional or structured
//! arrays) is serialized to a JSON string, recursively encoded so it can be
//! parsed back into an equal structure afterwards.

use std::collections::BTreeMap;

use labeled_array::{AttrArray, AttrElements, AttrMap, AttrValue};
use serde::Serialize;
use serde_json::{Map, Value};

/// A target-format-safe attribute value.
///
/// Serializes transparently (scalars as scalars, lists as arrays) so sinks
/// can pass attribute maps straight into their own metadata format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EncodedAttr {
    Int(i64),
    Float(f64),
    Str(String),
    /// Flat list of scalar values.
    List(Vec<EncodedAttr>),
}

impl EncodedAttr {
    /// The string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EncodedAttr::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<EncodedAttr> for AttrValue {
    fn from(value: EncodedAttr) -> Self {
        match value {
            EncodedAttr::Int(i) => AttrValue::Int(i),
            EncodedAttr::Float(f) => AttrValue::Float(f),
            EncodedAttr::Str(s) => AttrValue::Str(s),
            EncodedAttr::List(items) => {
                AttrValue::List(items.into_iter().map(AttrValue::from).collect())
            }
        }
    }
}

/// Encoded global or variable attribute set.
pub type EncodedAttrMap = BTreeMap<String, EncodedAttr>;

fn bool_str(value: bool) -> String {
    if value {
        "true".to_string()
    } else {
        "false".to_string()
    }
}

/// Encode one attribute value into its closest target-safe representation.
pub fn encode_attr(value: &AttrValue) -> EncodedAttr {
    match value {
        AttrValue::Int(i) => EncodedAttr::Int(*i),
        AttrValue::Float(f) => EncodedAttr::Float(*f),
        AttrValue::Str(s) => EncodedAttr::Str(s.clone()),
        // Booleans are not representable; checked before the numeric types
        // they often masquerade as.
        AttrValue::Bool(b) => EncodedAttr::Str(bool_str(*b)),
        AttrValue::Bytes(b) => EncodedAttr::Str(String::from_utf8_lossy(b).into_owned()),
        AttrValue::Array(a) => encode_array(a),
        AttrValue::List(items) if is_flat(items) => {
            EncodedAttr::List(items.iter().map(encode_attr).collect())
        }
        other => EncodedAttr::Str(json_fallback(other)),
    }
}

fn is_flat(items: &[AttrValue]) -> bool {
    items
        .iter()
        .all(|item| !matches!(item, AttrValue::List(_) | AttrValue::Map(_)))
}

fn encode_array(array: &AttrArray) -> EncodedAttr {
    if array.ndim() > 1 || array.is_record() {
        // Only plain 1-d arrays are supported natively.
        return EncodedAttr::Str(json_fallback(&AttrValue::Array(array.clone())));
    }
    match array.elements() {
        AttrElements::Int(values) => {
            EncodedAttr::List(values.iter().map(|v| EncodedAttr::Int(*v)).collect())
        }
        AttrElements::Float(values) => {
            EncodedAttr::List(values.iter().map(|v| EncodedAttr::Float(*v)).collect())
        }
        AttrElements::Str(values) => {
            EncodedAttr::List(values.iter().map(|v| EncodedAttr::Str(v.clone())).collect())
        }
        // Boolean arrays convert to arrays of lowercase strings.
        AttrElements::Bool(values) => {
            EncodedAttr::List(values.iter().map(|v| EncodedAttr::Str(bool_str(*v))).collect())
        }
        AttrElements::Record { .. } => {
            EncodedAttr::Str(json_fallback(&AttrValue::Array(array.clone())))
        }
    }
}

/// Serialize a value to JSON and strip the surrounding quotes of a bare
/// string result, so decoding it later does not double-quote.
fn json_fallback(value: &AttrValue) -> String {
    let json = attr_to_json(value);
    serde_json::to_string(&json)
        .unwrap_or_default()
        .trim_matches('"')
        .to_string()
}

/// Recursively convert an attribute value to JSON.
///
/// Mappings are walked key-by-key and sequences element-by-element so the
/// produced document can be decoded back into an equal structure. Booleans
/// become lowercase strings, record rows become JSON arrays, and anything
/// without a numeric rendering falls back to its string representation.
pub fn attr_to_json(value: &AttrValue) -> Value {
    match value {
        AttrValue::Null => Value::Null,
        AttrValue::Bool(b) => Value::String(bool_str(*b)),
        AttrValue::Int(i) => Value::from(*i),
        AttrValue::Float(f) => float_to_json(*f),
        AttrValue::Str(s) => Value::String(s.clone()),
        AttrValue::Bytes(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
        AttrValue::List(items) => Value::Array(items.iter().map(attr_to_json).collect()),
        AttrValue::Map(map) => {
            let mut object = Map::new();
            for (key, val) in map {
                object.insert(key.clone(), attr_to_json(val));
            }
            Value::Object(object)
        }
        AttrValue::Array(array) => array_to_json(array),
    }
}

fn float_to_json(value: f64) -> Value {
    match serde_json::Number::from_f64(value) {
        Some(number) => Value::Number(number),
        // NaN and infinities have no JSON number form.
        None => Value::String(value.to_string()),
    }
}

fn array_to_json(array: &AttrArray) -> Value {
    let flat: Vec<Value> = match array.elements() {
        AttrElements::Bool(values) => values.iter().map(|v| Value::String(bool_str(*v))).collect(),
        AttrElements::Int(values) => values.iter().map(|v| Value::from(*v)).collect(),
        AttrElements::Float(values) => values.iter().map(|v| float_to_json(*v)).collect(),
        AttrElements::Str(values) => values.iter().map(|v| Value::String(v.clone())).collect(),
        // Structured record elements encode as tuples.
        AttrElements::Record { rows, .. } => rows
            .iter()
            .map(|row| Value::Array(row.iter().map(attr_to_json).collect()))
            .collect(),
    };
    nest_values(&flat, array.shape())
}

fn nest_values(values: &[Value], shape: &[usize]) -> Value {
    if shape.is_empty() {
        return values.first().cloned().unwrap_or(Value::Null);
    }
    if shape.len() == 1 {
        return Value::Array(values.to_vec());
    }
    let inner: usize = shape[1..].iter().product();
    Value::Array(
        values
            .chunks(inner.max(1))
            .map(|chunk| nest_values(chunk, &shape[1..]))
            .collect(),
    )
}

/// Encode an attribute set: sorted key order, `Null` entries dropped.
pub fn encode_attrs(attrs: &AttrMap) -> EncodedAttrMap {
    let mut encoded = EncodedAttrMap::new();
    for (key, value) in attrs {
        if value.is_null() {
            continue;
        }
        encoded.insert(key.clone(), encode_attr(value));
    }
    encoded
}

/// Flatten nested-mapping attributes into underscore-joined flat keys.
pub fn flatten_attrs(attrs: &AttrMap) -> AttrMap {
    let mut flat = AttrMap::new();
    for (key, value) in attrs {
        flatten_into(&mut flat, key, value);
    }
    flat
}

fn flatten_into(out: &mut AttrMap, key: &str, value: &AttrValue) {
    if let AttrValue::Map(map) = value {
        for (subkey, subvalue) in map {
            flatten_into(out, &format!("{key}_{subkey}"), subvalue);
        }
    } else {
        out.insert(key.to_string(), value.clone());
    }
}

/// Convert a JSON value into an attribute value.
///
/// Used to adopt grid-mapping attribute maps exported by the projection
/// layer.
pub fn json_to_attr(value: &Value) -> AttrValue {
    match value {
        Value::Null => AttrValue::Null,
        Value::Bool(b) => AttrValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                AttrValue::Int(i)
            } else {
                AttrValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => AttrValue::Str(s.clone()),
        Value::Array(items) => AttrValue::List(items.iter().map(json_to_attr).collect()),
        Value::Object(map) => AttrValue::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_attr(v)))
                .collect(),
        ),
    }
}
