//! Reward collection: the daily and weekly task tabs.
//!
//! Each tab is optional; a missing tab is skipped and logged, never fatal.
//! The claim-all button doubles as the dismiss target for the reward popup,
//! so it is clicked once more at the same spot after claiming.

use std::time::Duration;

use crate::diag::DiagnosticSink;
use crate::error::Result;
use crate::session::Session;
use crate::task::{Step, StepOutcome, StepPolicy, keys, return_home_best_effort, run_step};

/// Claim one tab: open it, click claim-all if present, dismiss the popup
/// with a second click at the same spot. Returns whether the tab existed.
fn claim_tab<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    tab_key: &'static str,
    threshold: f32,
) -> Result<bool> {
    let opened = run_step(
        session,
        diag,
        &Step::new(tab_key, threshold)
            .policy(StepPolicy::Skip)
            .settle(Duration::from_secs(4)),
    )?;
    if opened == StepOutcome::Skipped {
        return Ok(false);
    }

    let claimed = run_step(
        session,
        diag,
        &Step::new(keys::GET_ALL_BTN, threshold)
            .policy(StepPolicy::Skip)
            .settle(Duration::from_secs(3)),
    )?;
    if let StepOutcome::Clicked(at) = claimed {
        // Same-spot click dismisses the reward popup.
        session.click(at.x, at.y)?;
        session.sleep(Duration::from_secs(2));
    } else {
        diag.note(&format!("nothing to claim on {tab_key}"));
    }
    Ok(true)
}

/// Claim all task rewards: open the task screen, claim the daily and weekly
/// tabs, then return home best-effort. The task screen itself is required;
/// everything after it degrades per tab.
pub fn claim_all_rewards<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    run_step(
        session,
        diag,
        &Step::new(keys::MAIN_TASK_BTN, threshold).settle(Duration::from_secs(2)),
    )?;

    if !claim_tab(session, diag, keys::DAILY_BTN, threshold)? {
        diag.warn("daily tab not found; skipping");
    }
    if !claim_tab(session, diag, keys::WEEKLY_BTN, threshold)? {
        diag.warn("weekly tab not found; skipping");
    }

    return_home_best_effort(session, diag, threshold)
}
