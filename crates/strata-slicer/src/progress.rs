//! Cooperative cancellation and progress reporting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag, checked between pipeline units of work.
///
/// Cloning yields a handle to the same flag, so a caller can keep one
/// clone and hand another to a long-running slice. Cancellation is
/// cooperative: it is observed at object and layer boundaries, never
/// mid-computation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Irrevocable for this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Has cancellation been requested?
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Coarse pipeline progress, delivered to an optional callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Plane slicing of one object is starting.
    SlicingObject {
        /// Zero-based object position.
        index: usize,
        /// Total number of objects.
        total: usize,
    },
    /// Per-object layers are being merged into one stack.
    MergingLayers,
    /// Perimeters and infill are being generated.
    GeneratingPaths {
        /// Current layer index.
        layer: usize,
        /// Total layer count.
        total: usize,
    },
    /// G-code lines are being written.
    EmittingGcode {
        /// Current layer index.
        layer: usize,
        /// Total layer count.
        total: usize,
    },
}

/// Progress callback signature.
pub type ProgressFn<'a> = &'a (dyn Fn(ProgressEvent) + Sync);
