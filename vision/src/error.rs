use crate::frame::Rect;

/// Detection-engine failure classes.
///
/// `ElementNotFound` is the only *expected* variant: callers routinely branch
/// on it ("is the toggle already enabled?"). Everything else is an
/// infrastructure fault and should propagate to the task boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No location in the frame cleared the threshold. Carries the best score
    /// seen so operators can judge how close the match came.
    #[error("element not found: {key} (best score {best:.3})")]
    ElementNotFound { key: String, best: f32 },

    /// Capture, template decode, or text extraction infrastructure failure.
    /// Distinct from a mere non-match; not retriable.
    #[error("recognition failed: {reason}")]
    Recognition { reason: String },

    /// A crop rectangle fell outside its source frame.
    #[error("crop {rect} exceeds frame bounds {width}x{height}")]
    OutOfBounds {
        rect: Rect,
        width: u32,
        height: u32,
    },

    /// A required asset (template file, model file) is missing.
    #[error("configuration error: {name}")]
    Configuration { name: String },
}

impl Error {
    pub fn recognition(reason: impl Into<String>) -> Self {
        Self::Recognition {
            reason: reason.into(),
        }
    }

    /// Expected-absence check, used for branching at step granularity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }
}
