//! Numeric resource reader.
//!
//! The remaining-sanity counter sits at a fixed offset right of an anchor
//! template. The anchor is located per read; when it is missing the reader
//! degrades to a last-known default region and says so, because a stale
//! region still beats no reading at all.

use vision::util::extract_digits;
use vision::{Match, Rect};

use crate::diag::DiagnosticSink;
use crate::error::{Error, Result};
use crate::session::Session;

pub const SANITY_ANCHOR: &str = "remaining_sanity.png";

/// Counter region when the anchor cannot be found.
pub const DEFAULT_REGION: Rect = Rect::new(0, 0, 135, 40);

/// Counter region relative to the anchor's center: 255..400 px to the
/// right, anchor-height/3 above to anchor-height/2 below.
fn region_from_anchor(anchor: &Match) -> Option<Rect> {
    let h = anchor.height as i32;
    let x0 = anchor.center.x + 255;
    let x1 = anchor.center.x + 400;
    let y0 = anchor.center.y - h / 3;
    let y1 = anchor.center.y + h / 2;

    (x0 >= 0 && y0 >= 0 && y1 > y0)
        .then(|| Rect::new(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

/// Read the remaining sanity counter off the current screen.
///
/// Digit-tuned OCR first; a broader plain pass only when that yields no
/// digits. No digits after both passes is `OperationFailed`.
pub fn read_remaining_sanity<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<u32> {
    let frame = session.capture()?;

    let region = match session.try_locate(&frame, SANITY_ANCHOR, threshold)? {
        Some(anchor) => match region_from_anchor(&anchor) {
            Some(region) => region,
            None => {
                diag.warn("sanity anchor too close to the frame edge; using default region");
                DEFAULT_REGION
            }
        },
        None => {
            diag.warn("sanity anchor not found; using default region");
            DEFAULT_REGION
        }
    };

    let counter = match frame.crop(region) {
        Ok(counter) => counter,
        Err(err) => {
            diag.warn(&format!("sanity region {region} unusable ({err}); using default region"));
            frame.crop(DEFAULT_REGION)?
        }
    };
    diag.snapshot(&counter, "remaining_sanity");

    let text = session.read_text_digits(&counter)?;
    if let Some(value) = extract_digits(&text) {
        diag.note(&format!("remaining sanity: {value} (read {text:?})"));
        return Ok(value);
    }

    let text = session.read_text(&counter)?;
    match extract_digits(&text) {
        Some(value) => {
            diag.note(&format!("remaining sanity: {value} (fallback read {text:?})"));
            Ok(value)
        }
        None => Err(Error::operation(format!(
            "read remaining sanity: no digits in {text:?}"
        ))),
    }
}

/// Whole cycles executable with `remaining` resource at `per_cycle` each.
pub fn executable_cycles(remaining: u32, per_cycle: u32) -> Result<u32> {
    if per_cycle == 0 {
        return Err(Error::operation("sanity cost per cycle is zero"));
    }
    Ok(remaining / per_cycle)
}
