//! Base workflows: entering the base, clearing the notification panel,
//! exiting back to the home screen.

use std::time::Duration;

use crate::diag::DiagnosticSink;
use crate::error::Result;
use crate::session::Session;
use crate::task::{Step, keys, run_step};

/// Notification entries are collected by clicking a fixed distance right of
/// the panel title, once per entry.
const NOTIFICATION_CLICKS: u32 = 5;
const NOTIFICATION_CLICK_INTERVAL: Duration = Duration::from_millis(500);

pub fn navigate_to_base<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    run_step(session, diag, &Step::new(keys::BASE_BTN, threshold))?;
    Ok(())
}

pub fn navigate_back_from_base<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    run_step(session, diag, &Step::new(keys::BACK_BTN, threshold))?;
    Ok(())
}

/// Open the notification panel and collect everything in it.
///
/// The entries have no templates of their own; they stack at a fixed offset
/// right of the panel title, so the title anchors both the collect clicks
/// and the close click. Both offsets are local to the title located here.
pub fn collect_notifications<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    run_step(session, diag, &Step::new(keys::BASE_NOTIFICATION, threshold))?;

    let frame = session.capture()?;
    let title = session.locate(&frame, keys::BASE_NOTIFICATION_TITLE, threshold)?;

    let collect_x = title.center.x + title.width as i32 + 75;
    session.click_times(
        collect_x,
        title.center.y,
        NOTIFICATION_CLICKS,
        NOTIFICATION_CLICK_INTERVAL,
    )?;
    diag.note("collected base notifications");

    session.click(title.center.x, title.center.y - 100)?;
    session.sleep(Duration::from_secs(1));
    diag.note("closed notification panel");
    Ok(())
}

/// Leave the base for the home screen: top bar, home button, then the
/// confirmation dialog. All three are required here; a missing element
/// fails the task.
pub fn exit_to_home<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    run_step(session, diag, &Step::new(keys::TOP_BAR, threshold))?;
    run_step(session, diag, &Step::new(keys::HOME_BTN, threshold))?;
    run_step(session, diag, &Step::new(keys::TRUE_BTN, threshold))?;
    Ok(())
}

/// Whole base pass: enter, collect, leave.
pub fn run_base_routine<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    navigate_to_base(session, diag, threshold)?;
    session.sleep(Duration::from_secs(2));
    collect_notifications(session, diag, threshold)?;
    exit_to_home(session, diag, threshold)
}
