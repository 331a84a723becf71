//! Error types for G-code generation.

use thiserror::Error;

use strata_slicer::SlicerError;

/// Errors from the slice-to-gcode pipeline.
#[derive(Error, Debug)]
pub enum GcodeError {
    /// The slicing stage failed.
    #[error(transparent)]
    Slicer(#[from] SlicerError),

    /// The caller requested cancellation during emission.
    #[error("g-code emission cancelled")]
    Cancelled,
}

impl GcodeError {
    /// Was this a cooperative cancellation rather than a failure?
    ///
    /// Covers cancellation observed in either stage of the pipeline.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            GcodeError::Cancelled | GcodeError::Slicer(SlicerError::Cancelled)
        )
    }
}

/// Result type for G-code operations.
pub type Result<T> = std::result::Result<T, GcodeError>;
