//! Error types for the CF writer.

use thiserror::Error;

/// Errors that abort a save call.
///
/// Only precondition and consistency failures are fatal; everything else is
/// recovered locally and reported through [`crate::Diagnostics`].
#[derive(Error, Debug)]
pub enum CfWriterError {
    /// No input arrays were provided.
    #[error("none of the requested datasets have been provided; nothing to save")]
    EmptyInput,

    /// Arrays destined for one container disagree on their spatial grid.
    #[error(
        "datasets to be saved in one file (or one group) must have identical \
         projection coordinates; group them by area or save them to separate files"
    )]
    InconsistentGrids,

    /// Invalid save options.
    #[error("invalid save options: {0}")]
    Config(String),

    /// Spatial-reference construction or derivation failed.
    #[error("projection error: {0}")]
    Projection(#[from] projection::ProjectionError),

    /// Array shape manipulation failed.
    #[error("array error: {0}")]
    Array(#[from] labeled_array::LabeledArrayError),

    /// The serialization backend reported a failure.
    #[error("serialization backend error: {0}")]
    Sink(String),
}

/// Result type for CF writer operations.
pub type Result<T> = std::result::Result<T, CfWriterError>;
