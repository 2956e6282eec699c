//! Error types for spatial references.

use thiserror::Error;

/// Errors raised when constructing spatial references.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// Invalid grid geometry (empty extent, zero-sized axes, ...).
    #[error("invalid grid definition: {0}")]
    InvalidGrid(String),

    /// Swath longitude and latitude arrays disagree in shape.
    #[error("swath longitude shape {lons:?} does not match latitude shape {lats:?}")]
    SwathShapeMismatch { lons: Vec<usize>, lats: Vec<usize> },
}

/// Result type for spatial-reference operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
