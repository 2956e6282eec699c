//! Labeled n-dimensional arrays.
//!
//! [`LabeledArray`] is the unit of data handed to the writer: an n-d array
//! with named dimensions, coordinate arrays, attributes and an optional
//! spatial reference. It owns all of its parts, so a deep copy is a `clone()`
//! and transformations never touch the caller's original.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ndarray::{ArrayD, Axis};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use projection::SpatialReference;

use crate::attr::{AttrMap, AttrValue};
use crate::encoding::VariableEncoding;
use crate::error::{LabeledArrayError, Result};

/// Element type of an [`ArrayData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    Float32,
    Float64,
    /// Timestamps, nanoseconds since the Unix epoch.
    Time,
}

impl DType {
    /// Name of the element type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt8 => "uint8",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Time => "datetime64[ns]",
        }
    }

    /// Whether variables of this type are representable under CF-1.7.
    ///
    /// Unsigned and 64-bit integers only became conformant with CF-1.9;
    /// timestamps are stored as numeric offsets and are always fine.
    pub fn is_cf_compatible(&self) -> bool {
        !matches!(self, DType::Int64 | DType::UInt8)
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// N-dimensional array storage, closed over the supported element types.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Int8(ArrayD<i8>),
    Int16(ArrayD<i16>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    UInt8(ArrayD<u8>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    /// Timestamps, nanoseconds since the Unix epoch.
    Time(ArrayD<i64>),
}

macro_rules! with_data {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            ArrayData::Int8($arr) => $body,
            ArrayData::Int16($arr) => $body,
            ArrayData::Int32($arr) => $body,
            ArrayData::Int64($arr) => $body,
            ArrayData::UInt8($arr) => $body,
            ArrayData::Float32($arr) => $body,
            ArrayData::Float64($arr) => $body,
            ArrayData::Time($arr) => $body,
        }
    };
}

macro_rules! map_data {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            ArrayData::Int8($arr) => ArrayData::Int8($body),
            ArrayData::Int16($arr) => ArrayData::Int16($body),
            ArrayData::Int32($arr) => ArrayData::Int32($body),
            ArrayData::Int64($arr) => ArrayData::Int64($body),
            ArrayData::UInt8($arr) => ArrayData::UInt8($body),
            ArrayData::Float32($arr) => ArrayData::Float32($body),
            ArrayData::Float64($arr) => ArrayData::Float64($body),
            ArrayData::Time($arr) => ArrayData::Time($body),
        }
    };
}

impl ArrayData {
    /// Timestamp array from nanosecond offsets.
    pub fn time(values: ArrayD<i64>) -> Self {
        ArrayData::Time(values)
    }

    pub fn dtype(&self) -> DType {
        match self {
            ArrayData::Int8(_) => DType::Int8,
            ArrayData::Int16(_) => DType::Int16,
            ArrayData::Int32(_) => DType::Int32,
            ArrayData::Int64(_) => DType::Int64,
            ArrayData::UInt8(_) => DType::UInt8,
            ArrayData::Float32(_) => DType::Float32,
            ArrayData::Float64(_) => DType::Float64,
            ArrayData::Time(_) => DType::Time,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_data!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        with_data!(self, a => a.ndim())
    }

    pub fn len(&self) -> usize {
        with_data!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content fingerprint over element type, shape and raw element bytes.
    ///
    /// Used to test data equality across variables without element-wise
    /// comparison of the full arrays.
    pub fn fingerprint(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(self.dtype().as_str().as_bytes());
        for extent in self.shape() {
            hasher.update(&(*extent as u64).to_le_bytes());
        }
        with_data!(self, a => {
            for value in a.iter() {
                hasher.update(&value.to_le_bytes());
            }
        });
        hasher.finalize()
    }

    /// Remove a length-1 axis.
    pub fn squeeze_axis(&self, axis: usize) -> Result<ArrayData> {
        let len = self.shape().get(axis).copied().unwrap_or(0);
        if len != 1 {
            return Err(LabeledArrayError::NotSqueezable {
                dim: format!("axis {axis}"),
                len,
            });
        }
        Ok(map_data!(self, a => a.index_axis(Axis(axis), 0).to_owned()))
    }

    /// Add a new leading axis of length 1.
    pub fn insert_axis_front(&self) -> ArrayData {
        map_data!(self, a => a.clone().insert_axis(Axis(0)))
    }

    /// Iterate the elements widened to `f64`, in logical order.
    pub fn iter_f64(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        with_data!(self, a => Box::new(
            a.iter().map(|v| v.to_f64().unwrap_or(f64::NAN))
        ))
    }

    /// First timestamp in nanoseconds, when this is a time array.
    pub fn first_time_ns(&self) -> Option<i64> {
        match self {
            ArrayData::Time(a) => a.iter().next().copied(),
            _ => None,
        }
    }
}

impl From<ArrayD<i8>> for ArrayData {
    fn from(a: ArrayD<i8>) -> Self {
        ArrayData::Int8(a)
    }
}

impl From<ArrayD<i16>> for ArrayData {
    fn from(a: ArrayD<i16>) -> Self {
        ArrayData::Int16(a)
    }
}

impl From<ArrayD<i32>> for ArrayData {
    fn from(a: ArrayD<i32>) -> Self {
        ArrayData::Int32(a)
    }
}

impl From<ArrayD<i64>> for ArrayData {
    fn from(a: ArrayD<i64>) -> Self {
        ArrayData::Int64(a)
    }
}

impl From<ArrayD<u8>> for ArrayData {
    fn from(a: ArrayD<u8>) -> Self {
        ArrayData::UInt8(a)
    }
}

impl From<ArrayD<f32>> for ArrayData {
    fn from(a: ArrayD<f32>) -> Self {
        ArrayData::Float32(a)
    }
}

impl From<ArrayD<f64>> for ArrayData {
    fn from(a: ArrayD<f64>) -> Self {
        ArrayData::Float64(a)
    }
}

/// An n-dimensional array with named dimensions, coordinates and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray {
    /// Variable name. Required on every input array.
    pub name: String,
    pub data: ArrayData,
    /// Dimension names, one per axis of `data`.
    pub dims: Vec<String>,
    /// Coordinate variables, keyed by coordinate name.
    pub coords: BTreeMap<String, LabeledArray>,
    pub attrs: AttrMap,
    /// Spatial reference describing how pixels map to the Earth.
    pub area: Option<SpatialReference>,
    /// Ancillary variables attached to this one (quality flags etc.).
    pub ancillary: Vec<LabeledArray>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Chunked storage layout, one chunk extent per dimension.
    pub chunks: Option<Vec<usize>>,
    /// Per-variable storage encoding hints.
    pub encoding: VariableEncoding,
}

impl LabeledArray {
    /// Create an array with the given name, data and dimension names.
    pub fn new(name: impl Into<String>, data: ArrayData, dims: &[&str]) -> Self {
        Self {
            name: name.into(),
            data,
            dims: dims.iter().map(|d| d.to_string()).collect(),
            coords: BTreeMap::new(),
            attrs: AttrMap::new(),
            area: None,
            ancillary: Vec::new(),
            start_time: None,
            end_time: None,
            chunks: None,
            encoding: VariableEncoding::default(),
        }
    }

    pub fn with_coord(mut self, name: impl Into<String>, coord: LabeledArray) -> Self {
        self.coords.insert(name.into(), coord);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_area(mut self, area: SpatialReference) -> Self {
        self.area = Some(area);
        self
    }

    pub fn with_ancillary(mut self, ancillary: LabeledArray) -> Self {
        self.ancillary.push(ancillary);
        self
    }

    pub fn with_times(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    pub fn with_chunks(mut self, chunks: Vec<usize>) -> Self {
        self.chunks = Some(chunks);
        self
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn has_dim(&self, name: &str) -> bool {
        self.dims.iter().any(|d| d == name)
    }

    /// Content fingerprint of the data.
    pub fn fingerprint(&self) -> u32 {
        self.data.fingerprint()
    }

    /// String attribute lookup.
    pub fn str_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(AttrValue::as_str)
    }

    /// Whether this variable is itself a longitude or latitude array.
    pub fn is_lonlat(&self) -> bool {
        matches!(self.str_attr("standard_name"), Some("longitude" | "latitude"))
    }

    /// Copy with every dimension outside `keep` squeezed away.
    ///
    /// Coordinates bound to a removed dimension are dropped along with it.
    /// Fails if a removed dimension has more than one element.
    pub fn squeeze_dims_not_in(&self, keep: &[String]) -> Result<LabeledArray> {
        let mut out = self.clone();
        let mut axis = out.dims.len();
        while axis > 0 {
            axis -= 1;
            let dim = out.dims[axis].clone();
            if keep.contains(&dim) {
                continue;
            }
            let len = out.data.shape()[axis];
            if len != 1 {
                return Err(LabeledArrayError::NotSqueezable { dim, len });
            }
            out.data = out.data.squeeze_axis(axis)?;
            out.dims.remove(axis);
            out.coords.remove(&dim);
        }
        Ok(out)
    }

    /// Prepend a length-1 dimension.
    pub fn expand_dims_front(&mut self, dim: impl Into<String>) {
        self.data = self.data.insert_axis_front();
        self.dims.insert(0, dim.into());
        if let Some(chunks) = &mut self.chunks {
            chunks.insert(0, 1);
        }
    }
}
