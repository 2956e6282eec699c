//! Labeled n-dimensional arrays for satellite imagery pipelines.
//!
//! This crate provides the in-memory data model shared by the writer stack:
//!
//! - [`LabeledArray`]: an n-d array with named dimensions, coordinate arrays,
//!   attributes, an optional spatial reference and ancillary variables
//! - [`ArrayData`]: closed sum over the supported element types, backed by
//!   `ndarray`
//! - [`AttrValue`]: tagged-variant attribute values covering scalars, byte
//!   strings, sequences, mappings and small n-d arrays
//! - content fingerprints for cheap data-equality tests across variables
//!
//! # Example
//!
//! ```
//! use labeled_array::{ArrayData, LabeledArray};
//! use ndarray::Array2;
//!
//! let data = ArrayData::from(Array2::<f32>::zeros((2, 3)).into_dyn());
//! let array = LabeledArray::new("overview", data, &["y", "x"])
//!     .with_attr("units", "K");
//! assert_eq!(array.shape(), &[2, 3]);
//! ```

pub mod array;
pub mod attr;
pub mod encoding;
pub mod error;
pub mod time;

// Re-export commonly used types at the crate root
pub use array::{ArrayData, DType, LabeledArray};
pub use attr::{AttrArray, AttrElements, AttrMap, AttrValue};
pub use encoding::{FillValue, VariableEncoding};
pub use error::{LabeledArrayError, Result};
pub use time::{datetime_to_ns, ns_to_datetime, time_array, time_scalar};
