//! Diagnostic sink.
//!
//! Orchestrators and the numeric reader receive an explicit sink instead of
//! reaching for a global: severity-tagged progress lines go to tracing, and
//! intermediate frames are persisted as timestamped PNGs when enabled.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use vision::Frame;

pub struct DiagnosticSink {
    frame_dir: Option<PathBuf>,
}

impl DiagnosticSink {
    /// A sink that persists frame snapshots into `frame_dir`.
    pub fn with_frames(frame_dir: impl Into<PathBuf>) -> Self {
        Self {
            frame_dir: Some(frame_dir.into()),
        }
    }

    /// A sink that only forwards log lines; snapshots are dropped.
    pub fn disabled() -> Self {
        Self { frame_dir: None }
    }

    pub fn note(&self, message: &str) {
        tracing::info!("{message}");
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    /// Persist `frame` under `label` if frame persistence is enabled.
    ///
    /// Snapshot failures are logged and swallowed; diagnostics must never
    /// fail a task.
    pub fn snapshot(&self, frame: &Frame, label: &str) {
        let Some(dir) = &self.frame_dir else { return };

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = dir.join(format!("{label}_{stamp}.png"));

        if let Err(err) = std::fs::create_dir_all(dir) {
            tracing::warn!(error = %err, "cannot create frame dir");
            return;
        }
        match frame.save_png(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "saved diagnostic frame"),
            Err(err) => tracing::warn!(error = %err, "failed to save diagnostic frame"),
        }
    }
}
