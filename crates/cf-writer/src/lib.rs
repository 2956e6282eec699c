//! CF-compliant netCDF container preparation for labeled satellite imagery
//! arrays.
//!
//! This crate turns in-memory [`LabeledArray`]s into standards-conformant
//! containers and hands them to an external serialization backend. The work
//! is metadata normalization: reconciling per-dataset coordinate systems,
//! attribute schemas and naming rules into one consistent CF-1.7 dataset,
//! while arbitrary nested attribute structures survive the trip as JSON.
//!
//! # Architecture
//!
//! ```text
//! save_arrays(arrays, path, options)
//!      │
//!      ├─► partition into groups (or one flat container)
//!      │
//!      ├─► per group:
//!      │     gather ancillary variables
//!      │     resolve geolocation (grid mapping or lon/lat arrays)
//!      │     transform each array (names, time, coords, attributes)
//!      │     normalize coordinates (shared grid, links, disambiguation)
//!      │     assemble container + time bounds
//!      │
//!      ├─► resolve per-variable encoding (chunks, fill values, time units)
//!      │
//!      └─► ContainerSink::write_container (root first, then groups)
//! ```
//!
//! # Example
//!
//! ```
//! use cf_writer::{CfWriter, SaveOptions};
//! use cf_writer::testing::RecordingSink;
//! use labeled_array::{ArrayData, LabeledArray};
//! use ndarray::Array2;
//! use std::path::Path;
//!
//! let data = ArrayData::from(Array2::<f32>::zeros((2, 2)).into_dyn());
//! let array = LabeledArray::new("overview", data, &["y", "x"]);
//!
//! let mut writer = CfWriter::new(RecordingSink::new());
//! let summary = writer
//!     .save_array(&array, Path::new("overview.nc"), &SaveOptions::default())
//!     .unwrap();
//! assert_eq!(summary.groups_written, vec![None]);
//! ```
//!
//! Grouped output (`SaveOptions::groups`) writes a root container carrying
//! the global attributes first and appends one sub-container per group; the
//! result is not fully CF compliant and is documented as such.

pub mod area;
pub mod attrs;
pub mod collect;
pub mod config;
pub mod coords;
pub mod dataarray;
pub mod diagnostics;
pub mod encoding;
pub mod error;
pub mod testing;
pub mod writer;

// Re-export commonly used types at the crate root
pub use collect::{collect_containers, OutputContainer};
pub use config::{Compression, GroupAssignment, SaveOptions, CF_VERSION, EPOCH};
pub use diagnostics::Diagnostics;
pub use encoding::{resolve_encoding, EncodingTable};
pub use error::{CfWriterError, Result};
pub use writer::{CfWriter, ContainerSink, SaveSummary, WriteMode};

pub use labeled_array::LabeledArray;
