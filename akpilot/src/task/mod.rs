//! Task orchestrators.
//!
//! Every workflow is a serial sequence of steps against one session:
//! capture, locate, click (with an optional anchor offset), settle. A step's
//! failure policy decides what absence of its template means; any other
//! failure propagates and fails the whole task. There is no task-level
//! retry and no rollback.

use std::time::Duration;

use vision::Point;

use crate::diag::DiagnosticSink;
use crate::error::Result;
use crate::session::Session;

pub mod base;
pub mod combat;
pub mod recruit;
pub mod rewards;

/// Template keys, named after the on-disk reference images.
pub mod keys {
    pub const MISSION_BTN: &str = "main_menu_mission_btn.png";
    pub const BACK_BTN: &str = "back_btn.png";
    pub const NORMAL_AFFAIRS_BTN: &str = "normal_affairs_btn.png";
    pub const EXTERMINATE_ICON: &str = "exterminated_icon.png";
    pub const OUTER_AREA_ENTRY: &str = "longmen_01.png";
    pub const LUNGMEN_OUTSKIRTS: &str = "longmen_02.png";
    pub const LUNGMEN_DOWNTOWN: &str = "longmen_03.png";
    pub const CURRENT_COMMISSION_BTN: &str = "current_commission_btn.png";
    pub const ACTING_COMMANDER_ON: &str = "acting_commander_on.png";
    pub const ACTING_COMMANDER_OFF: &str = "acting_commander_off.png";
    pub const MISSION_START_BTN: &str = "mission_start_btn.png";
    pub const OPERATION_START_BTN: &str = "OPERATION_START_btn.png";
    pub const COMBAT_BRIEFING: &str = "combat_briefing.png";
    pub const MISSION_RESULTS: &str = "MISSION_RESULTS.png";
    pub const TOP_BAR: &str = "top_bar.png";
    pub const HOME_BTN: &str = "home_btn.png";
    pub const TRUE_BTN: &str = "true_btn.png";
    pub const BASE_BTN: &str = "main_menu_base_btn.png";
    pub const BASE_NOTIFICATION: &str = "base_notification.png";
    pub const BASE_NOTIFICATION_TITLE: &str = "base_notification_title.png";
    pub const MAIN_TASK_BTN: &str = "main_task_btn.png";
    pub const DAILY_BTN: &str = "daily_btn.png";
    pub const WEEKLY_BTN: &str = "weekly_btn.png";
    pub const GET_ALL_BTN: &str = "get_all_btn.png";
    pub const RECRUIT_BTN: &str = "main_recruit_button.png";
    pub const RECRUIT_SLOTS: [&str; 4] = [
        "recruit_1.png",
        "recruit_2.png",
        "recruit_3.png",
        "recruit_4.png",
    ];
    pub const RECRUIT_DETAIL_TITLE: &str = "recruit_detail_title.png";
    pub const RECRUIT_TIME_BTN: &str = "recruit_time_btn.png";
    pub const RECRUIT_REFRESH_TAGS: &str = "recruit_refresh_tags.png";
    pub const RECRUIT_RIGHT_BTN: &str = "recruit_right_btn.png";
}

pub const DEFAULT_THRESHOLD: f32 = 0.8;
/// Lenient threshold for low-contrast or frequently restyled elements.
pub const LENIENT_THRESHOLD: f32 = 0.6;
pub const RECRUIT_THRESHOLD: f32 = 0.7;

/// What absence of a step's template means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Absence fails the step (and the task).
    Abort,
    /// Absence skips the step, logged.
    Skip,
    /// Re-capture and retry up to `n` more times, then abort.
    Retry(u32),
}

/// One capture-locate-click unit of a workflow.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub key: &'static str,
    pub threshold: f32,
    pub offset: (i32, i32),
    pub settle: Duration,
    pub policy: StepPolicy,
}

impl Step {
    pub const fn new(key: &'static str, threshold: f32) -> Self {
        Self {
            key,
            threshold,
            offset: (0, 0),
            settle: Duration::from_secs(1),
            policy: StepPolicy::Abort,
        }
    }

    pub const fn offset(mut self, dx: i32, dy: i32) -> Self {
        self.offset = (dx, dy);
        self
    }

    pub const fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub const fn policy(mut self, policy: StepPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Clicked(Point),
    Skipped,
}

/// Run one step: fresh capture, locate, click at center + offset, settle.
pub fn run_step<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    step: &Step,
) -> Result<StepOutcome> {
    let mut attempts_left = match step.policy {
        StepPolicy::Retry(n) => n,
        _ => 0,
    };

    loop {
        let frame = session.capture()?;
        match session.locate(&frame, step.key, step.threshold) {
            Ok(found) => {
                let target = found.center.offset(step.offset.0, step.offset.1);
                session.click(target.x, target.y)?;
                session.sleep(step.settle);
                diag.note(&format!("clicked {} at ({}, {})", step.key, target.x, target.y));
                return Ok(StepOutcome::Clicked(target));
            }
            Err(err) if err.is_not_found() => match step.policy {
                StepPolicy::Skip => {
                    diag.note(&format!("{} not on screen; skipping", step.key));
                    return Ok(StepOutcome::Skipped);
                }
                StepPolicy::Retry(_) if attempts_left > 0 => {
                    attempts_left -= 1;
                    session.sleep(step.settle);
                }
                _ => return Err(err),
            },
            Err(err) => return Err(err),
        }
    }
}

pub fn run_steps<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    steps: &[Step],
) -> Result<()> {
    for step in steps {
        run_step(session, diag, step)?;
    }
    Ok(())
}

/// Return to the home screen via the top bar, skipping anything that is not
/// on screen. Combat and rewards call this at the end of a task where a
/// missed return should not undo an otherwise completed run.
pub fn return_home_best_effort<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    run_step(session, diag, &Step::new(keys::TOP_BAR, threshold).policy(StepPolicy::Skip))?;
    run_step(session, diag, &Step::new(keys::HOME_BTN, threshold).policy(StepPolicy::Skip))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::ScriptedSession;

    #[test]
    fn step_clicks_at_center_plus_offset() {
        let mut session = ScriptedSession::new();
        session.always(keys::EXTERMINATE_ICON, ScriptedSession::hit(500, 200));

        let outcome = run_step(
            &mut session,
            &DiagnosticSink::disabled(),
            &Step::new(keys::EXTERMINATE_ICON, 0.8).offset(0, 430),
        )
        .unwrap();

        assert_eq!(outcome, StepOutcome::Clicked(Point::new(500, 630)));
        assert_eq!(session.clicks, vec![(500, 630)]);
    }

    #[test]
    fn skip_policy_returns_without_clicking() {
        let mut session = ScriptedSession::new();
        let outcome = run_step(
            &mut session,
            &DiagnosticSink::disabled(),
            &Step::new(keys::DAILY_BTN, 0.6).policy(StepPolicy::Skip),
        )
        .unwrap();

        assert_eq!(outcome, StepOutcome::Skipped);
        assert!(session.clicks.is_empty());
    }

    #[test]
    fn retry_policy_recaptures_until_the_template_appears() {
        let mut session = ScriptedSession::new();
        session
            .on_next(keys::TRUE_BTN, None)
            .on_next(keys::TRUE_BTN, None)
            .on_next(keys::TRUE_BTN, Some(ScriptedSession::hit(960, 700)));

        let outcome = run_step(
            &mut session,
            &DiagnosticSink::disabled(),
            &Step::new(keys::TRUE_BTN, 0.8).policy(StepPolicy::Retry(3)),
        )
        .unwrap();

        assert_eq!(outcome, StepOutcome::Clicked(Point::new(960, 700)));
        assert_eq!(session.captures, 3);
    }

    #[test]
    fn retry_exhaustion_aborts_with_the_detection_error() {
        let mut session = ScriptedSession::new();
        let err = run_step(
            &mut session,
            &DiagnosticSink::disabled(),
            &Step::new(keys::TRUE_BTN, 0.8).policy(StepPolicy::Retry(2)),
        )
        .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(session.captures, 3);
        assert!(session.clicks.is_empty());
    }

    #[test]
    fn abort_policy_stops_a_sequence_at_the_failed_step() {
        let mut session = ScriptedSession::new();
        session.always(keys::TOP_BAR, ScriptedSession::hit(960, 20));
        // HOME_BTN never appears; TRUE_BTN would, but must not be reached.
        session.always(keys::TRUE_BTN, ScriptedSession::hit(960, 700));

        let err = run_steps(
            &mut session,
            &DiagnosticSink::disabled(),
            &[
                Step::new(keys::TOP_BAR, 0.8),
                Step::new(keys::HOME_BTN, 0.8),
                Step::new(keys::TRUE_BTN, 0.8),
            ],
        )
        .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(session.clicks, vec![(960, 20)]);
    }
}
