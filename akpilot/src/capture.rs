//! Frame source: reads the current on-screen raster.
//!
//! Captures the full primary display, or exactly one rectangle of it. A
//! capture is a pure read; the returned frame is a snapshot and must not be
//! reused as detection input in a later step.

use xcap::image::EncodableLayout;

use vision::{Frame, Rect};

use crate::error::Error;

fn primary_monitor() -> Result<xcap::Monitor, Error> {
    let monitors =
        xcap::Monitor::all().map_err(|err| Error::capture(format!("enumerate monitors: {err}")))?;

    monitors
        .iter()
        .find(|m| m.is_primary().unwrap_or(false))
        .cloned()
        .or_else(|| monitors.into_iter().next())
        .ok_or_else(|| Error::capture("no display available"))
}

/// Capture the full primary display.
pub fn capture_primary() -> Result<Frame, Error> {
    let monitor = primary_monitor()?;
    let img = monitor
        .capture_image()
        .map_err(|err| Error::capture(format!("capture display: {err}")))?;
    Ok(Frame::from_rgba(img.width() as usize, img.as_bytes()))
}

/// Capture exactly `region` of the primary display.
///
/// A region outside the display fails with the frame's bounds error rather
/// than being clamped.
pub fn capture_region(region: Rect) -> Result<Frame, Error> {
    let full = capture_primary()?;
    Ok(full.crop(region)?)
}
