//! Error types for the slicer.

use thiserror::Error;

use crate::object::ObjectId;

/// Errors that can occur during slicing.
#[derive(Error, Debug)]
pub enum SlicerError {
    /// Input rejected before any slicing began: malformed meshes, invalid
    /// settings (global or effective per-object), or an object set with
    /// nothing to print.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No printable layers survived slicing and merging.
    #[error("model produced no printable layers")]
    EmptyModel,

    /// The caller requested cancellation at a checkpoint.
    ///
    /// Distinct from failure: retrying with the same input is pointless,
    /// the caller asked the pipeline to stop.
    #[error("slicing cancelled")]
    Cancelled,
}

/// Result type for slicer operations.
pub type Result<T> = std::result::Result<T, SlicerError>;

/// Non-fatal conditions reported alongside a successful slice.
///
/// The affected object is dropped from the output; the overall call still
/// succeeds as long as at least one layer survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceWarning {
    /// The object's Z range lies entirely above the configured max Z ceiling.
    AboveZLimit {
        /// Object that was dropped.
        object: ObjectId,
    },
    /// The object yielded no layers with any intersection segments.
    NoLayers {
        /// Object that was dropped.
        object: ObjectId,
    },
}
