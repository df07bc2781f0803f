/// Driver-level failure classes.
///
/// `ElementNotFound` (via `Vision`) and `OperationFailed` are caught at step
/// granularity to drive retry/skip/poll decisions; everything else
/// propagates unchanged to the task boundary. There is no rollback of
/// target-side effects — the target's own state cannot be undone from here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Vision(#[from] vision::Error),

    /// The display session is unavailable or the capture itself failed.
    #[error("capture failed: {reason}")]
    Capture { reason: String },

    /// An injected action was undeliverable, or a derived computation
    /// (digit parse, cycle division) failed.
    #[error("operation failed: {action}")]
    OperationFailed { action: String },

    /// A required asset or directory is missing at startup.
    #[error("configuration error: {name}")]
    Configuration { name: String },
}

impl Error {
    pub fn capture(reason: impl Into<String>) -> Self {
        Self::Capture {
            reason: reason.into(),
        }
    }

    pub fn operation(action: impl Into<String>) -> Self {
        Self::OperationFailed {
            action: action.into(),
        }
    }

    /// Expected absence, the one failure class that is legitimate branching
    /// material inside a step.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Vision(err) if err.is_not_found())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
