//! The capability interface between orchestrators and the target surface.
//!
//! One session owns one exclusive interactive surface: one display, one
//! pointer, one keyboard. All steps run serially against it; concurrent
//! workflow executions against the same session are disallowed by
//! construction (`&mut self` everywhere).
//!
//! Routing `sleep` through the session gives tasks an injectable clock: the
//! scripted test session skips real time entirely.

use std::time::Duration;

use vision::{Detector, Frame, Match, Ocr, TextToken};

use crate::error::Result;
use crate::input::ActionExecutor;

/// Interval between repeated clicks of a multi-click action.
pub const CLICK_INTERVAL: Duration = Duration::from_millis(200);

pub trait Session {
    /// Capture the full target surface. Each step captures afresh; frames
    /// are never carried across steps.
    fn capture(&mut self) -> Result<Frame>;

    /// Locate a template; absence is `Ok(None)`.
    fn try_locate(&mut self, frame: &Frame, key: &str, threshold: f32) -> Result<Option<Match>>;

    /// Locate a template; absence is `Error::ElementNotFound`.
    fn locate(&mut self, frame: &Frame, key: &str, threshold: f32) -> Result<Match>;

    fn click(&mut self, x: i32, y: i32) -> Result<()> {
        self.click_times(x, y, 1, CLICK_INTERVAL)
    }

    fn click_times(&mut self, x: i32, y: i32, clicks: u32, interval: Duration) -> Result<()>;

    /// Recognize text tokens (with geometry) in a frame.
    fn tokens(&mut self, frame: &Frame) -> Result<Vec<TextToken>>;

    /// Recognize text as one concatenated string.
    fn read_text(&mut self, frame: &Frame) -> Result<String>;

    /// Digit-tuned recognition pass for numeric counters.
    fn read_text_digits(&mut self, frame: &Frame) -> Result<String>;

    /// Settle/wait. Tasks must use this instead of `std::thread::sleep`.
    fn sleep(&mut self, duration: Duration);
}

/// Production session: xcap capture + vision detector + enigo executor.
pub struct LiveSession {
    detector: Detector,
    ocr: Ocr,
    executor: ActionExecutor,
}

impl LiveSession {
    pub fn new(detector: Detector, ocr: Ocr, executor: ActionExecutor) -> Self {
        Self {
            detector,
            ocr,
            executor,
        }
    }
}

impl Session for LiveSession {
    fn capture(&mut self) -> Result<Frame> {
        crate::capture::capture_primary()
    }

    fn try_locate(&mut self, frame: &Frame, key: &str, threshold: f32) -> Result<Option<Match>> {
        Ok(self.detector.try_locate(frame, key, threshold)?)
    }

    fn locate(&mut self, frame: &Frame, key: &str, threshold: f32) -> Result<Match> {
        Ok(self.detector.locate(frame, key, threshold)?)
    }

    fn click_times(&mut self, x: i32, y: i32, clicks: u32, interval: Duration) -> Result<()> {
        self.executor.click(x, y, clicks, interval)
    }

    fn tokens(&mut self, frame: &Frame) -> Result<Vec<TextToken>> {
        Ok(self.ocr.tokens(frame)?)
    }

    fn read_text(&mut self, frame: &Frame) -> Result<String> {
        Ok(self.ocr.text(frame)?)
    }

    fn read_text_digits(&mut self, frame: &Frame) -> Result<String> {
        Ok(self.ocr.text_digit_tuned(frame)?)
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
