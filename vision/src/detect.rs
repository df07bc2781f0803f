//! Template matching.
//!
//! Matching runs normalized cross-correlation of a grayscale template over
//! the whole grayscale frame and takes the single global maximum. A match is
//! accepted iff its score clears the caller's threshold; there is exactly one
//! threshold per detection.

use imageproc::template_matching::{MatchTemplateMethod, find_extremes, match_template};

use crate::error::Error;
use crate::frame::{Frame, Point};
use crate::template::TemplateStore;

/// An accepted template match. Absence is never represented as a zeroed
/// match — a failed detection is `None` (or `Error::ElementNotFound`), which
/// keeps default coordinates from ever being clicked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub center: Point,
    pub width: u32,
    pub height: u32,
    /// Normalized correlation score in [0, 1].
    pub score: f32,
}

pub struct Detector {
    store: TemplateStore,
}

impl Detector {
    pub fn new(store: TemplateStore) -> Self {
        Self { store }
    }

    /// Global-maximum correlation of `key` over `frame`, threshold aside.
    fn best_match(&self, frame: &Frame, key: &str) -> Result<Match, Error> {
        let template = self.store.get(key)?;
        if template.width() > frame.width() || template.height() > frame.height() {
            return Err(Error::recognition(format!(
                "template {key} ({}x{}) larger than frame ({}x{})",
                template.width(),
                template.height(),
                frame.width(),
                frame.height()
            )));
        }

        let gray = frame.to_gray_image();
        let scores = match_template(
            &gray,
            &template.gray,
            MatchTemplateMethod::CrossCorrelationNormalized,
        );
        let extremes = find_extremes(&scores);

        let (x, y) = extremes.max_value_location;
        Ok(Match {
            center: Point::new(
                (x + template.width() / 2) as i32,
                (y + template.height() / 2) as i32,
            ),
            width: template.width(),
            height: template.height(),
            score: extremes.max_value,
        })
    }

    /// Locate `key` in `frame`, treating absence as a first-class outcome.
    ///
    /// `Ok(None)` means no location cleared `threshold` — the common,
    /// branch-worthy case. `Err` is reserved for infrastructure faults
    /// (missing or undecodable template, frame smaller than the template).
    pub fn try_locate(
        &self,
        frame: &Frame,
        key: &str,
        threshold: f32,
    ) -> Result<Option<Match>, Error> {
        let best = self.best_match(frame, key)?;
        Ok((best.score >= threshold).then_some(best))
    }

    /// Locate `key`, turning absence into `Error::ElementNotFound`.
    ///
    /// For callers that require presence to continue; the error carries the
    /// best score observed so the log names how close the match came.
    pub fn locate(&self, frame: &Frame, key: &str, threshold: f32) -> Result<Match, Error> {
        let best = self.best_match(frame, key)?;
        if best.score >= threshold {
            Ok(best)
        } else {
            Err(Error::ElementNotFound {
                key: key.to_string(),
                best: best.score,
            })
        }
    }
}
