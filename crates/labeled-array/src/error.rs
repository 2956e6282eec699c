//! Error types for labeled-array operations.

use thiserror::Error;

/// Errors raised by shape-changing operations on labeled arrays.
#[derive(Error, Debug)]
pub enum LabeledArrayError {
    /// A dimension that was asked to be squeezed away has more than one element.
    #[error("cannot squeeze dimension '{dim}' of length {len}")]
    NotSqueezable { dim: String, len: usize },

    /// The number of dimension names does not match the array rank.
    #[error("array of rank {rank} was given {names} dimension names")]
    DimensionMismatch { rank: usize, names: usize },

    /// An attribute array's shape does not match its element count.
    #[error("attribute array shape {shape:?} does not hold {elements} elements")]
    ShapeMismatch { shape: Vec<usize>, elements: usize },
}

/// Result type for labeled-array operations.
pub type Result<T> = std::result::Result<T, LabeledArrayError>;
