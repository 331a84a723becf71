//! G-code generation for the strata slicing engine.
//!
//! Consumes a [`SlicedModel`](strata_slicer::SlicedModel) and writes
//! printer-ready G-code, or drives the whole mesh-to-gcode pipeline in one
//! call.
//!
//! # Example
//!
//! ```ignore
//! use strata_slicer::{ObjectEntry, ObjectId, SliceSettings};
//! use strata_gcode::slice_to_gcode;
//!
//! let objects = [ObjectEntry::additive(ObjectId(1), mesh)];
//! let result = slice_to_gcode(&objects, &SliceSettings::default())?;
//! std::fs::write("output.gcode", &result.gcode)?;
//! println!("{:.1}g of filament", result.stats.filament_g);
//! ```

#![warn(missing_docs)]

pub mod emit;
pub mod error;
pub mod stats;

pub use emit::{generate_gcode, generate_gcode_with, RETRACTION_TRAVEL_THRESHOLD};
pub use error::{GcodeError, Result};
pub use stats::{PrintStats, FILAMENT_DENSITY_G_CM3};

use strata_slicer::{
    slice_objects_with, CancelToken, Layer, ObjectEntry, ProgressFn, SliceSettings,
    SliceWarning,
};

/// Everything produced by a full slice-to-gcode run.
#[derive(Debug, Clone)]
pub struct SliceResult {
    /// The emitted G-code text.
    pub gcode: String,
    /// The sliced layers the G-code was emitted from.
    pub layers: Vec<Layer>,
    /// Non-fatal conditions from the slicing stage.
    pub warnings: Vec<SliceWarning>,
    /// Statistics scanned from the emitted text.
    pub stats: PrintStats,
}

/// Run the whole pipeline: slice, emit, and summarize.
pub fn slice_to_gcode(
    objects: &[ObjectEntry],
    settings: &SliceSettings,
) -> Result<SliceResult> {
    slice_to_gcode_with(objects, settings, &CancelToken::new(), None)
}

/// Run the whole pipeline with cancellation and progress reporting.
///
/// Cancellation observed during slicing surfaces as
/// [`GcodeError::Slicer`]; during emission as [`GcodeError::Cancelled`].
/// [`GcodeError::is_cancelled`] covers both.
pub fn slice_to_gcode_with(
    objects: &[ObjectEntry],
    settings: &SliceSettings,
    cancel: &CancelToken,
    progress: Option<ProgressFn<'_>>,
) -> Result<SliceResult> {
    let model = slice_objects_with(objects, settings, cancel, progress)?;
    let gcode = generate_gcode_with(&model, settings, cancel, progress)?;
    let stats = PrintStats::from_gcode(&gcode, settings.filament_diameter);
    Ok(SliceResult {
        gcode,
        layers: model.layers,
        warnings: model.warnings,
        stats,
    })
}
