//! Combat workflows: navigation into the mission screens, the acting
//! commander toggle, and the bounded auto-combat loop.
//!
//! The cycle count is decided up front from the sanity counter. A plan that
//! cannot run a single cycle is refused before anything is clicked, so a
//! misread counter never burns resources.

use std::time::Duration;

use crate::diag::DiagnosticSink;
use crate::error::{Error, Result};
use crate::poll::poll_for_template;
use crate::sanity;
use crate::session::Session;
use crate::task::{Step, StepPolicy, keys, return_home_best_effort, run_step};

/// Outer-area destinations reachable from the area entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OuterArea {
    LungmenOutskirts,
    LungmenDowntown,
}

impl OuterArea {
    fn waypoint_key(self) -> &'static str {
        match self {
            Self::LungmenOutskirts => keys::LUNGMEN_OUTSKIRTS,
            Self::LungmenDowntown => keys::LUNGMEN_DOWNTOWN,
        }
    }
}

/// Requested cycle count, clamped later against the sanity budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleCount {
    Exact(u32),
    /// Every cycle the remaining sanity affords.
    Max,
}

#[derive(Debug, Clone, Copy)]
pub struct CombatPlan {
    pub cycles: CycleCount,
    pub threshold: f32,
    pub sanity_cost_per_cycle: u32,
    /// Start from the operation screen: no navigation, no commander check.
    pub combat_only: bool,
}

const BRIEFING_POLL_ATTEMPTS: u32 = 600;
const BRIEFING_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Last known toggle position when neither commander template matches.
const COMMANDER_FALLBACK: (i32, i32) = (1700, 950);

pub fn navigate_to_mission<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    run_step(session, diag, &Step::new(keys::MISSION_BTN, threshold))?;
    Ok(())
}

pub fn navigate_back_from_mission<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    run_step(session, diag, &Step::new(keys::BACK_BTN, threshold))?;
    Ok(())
}

pub fn navigate_to_normal_affairs<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    run_step(session, diag, &Step::new(keys::NORMAL_AFFAIRS_BTN, threshold))?;
    Ok(())
}

/// The elimination entry is an icon; the actual stage button sits a fixed
/// distance below it.
pub fn navigate_to_eliminate<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    run_step(
        session,
        diag,
        &Step::new(keys::EXTERMINATE_ICON, threshold).offset(0, 430),
    )?;
    Ok(())
}

/// Enter the area selector, then pan to the destination: click 425 px right
/// of the waypoint to scroll it into place, then click 100 px above the
/// waypoint's original position to open the stage. Both offsets are applied
/// to the waypoint located in this step; nothing is carried across steps.
pub fn navigate_to_outer_area<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    area: OuterArea,
    threshold: f32,
) -> Result<()> {
    run_step(
        session,
        diag,
        &Step::new(keys::OUTER_AREA_ENTRY, threshold).settle(Duration::from_secs(2)),
    )?;

    let frame = session.capture()?;
    let waypoint = session.locate(&frame, area.waypoint_key(), threshold)?;

    session.click(waypoint.center.x + 425, waypoint.center.y)?;
    session.sleep(Duration::from_secs(2));
    session.click(waypoint.center.x, waypoint.center.y - 100)?;
    session.sleep(Duration::from_secs(1));

    diag.note(&format!("entered outer area {area:?}"));
    Ok(())
}

pub fn navigate_to_current_commission<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    run_step(
        session,
        diag,
        &Step::new(keys::OUTER_AREA_ENTRY, threshold).settle(Duration::from_secs(2)),
    )?;
    run_step(session, diag, &Step::new(keys::CURRENT_COMMISSION_BTN, threshold))?;
    Ok(())
}

/// Make sure the acting commander toggle is on.
///
/// Already-on is detected first and is a no-op. When neither toggle state
/// matches (the templates are low-contrast), the last known position is
/// clicked and the degradation logged.
pub fn enable_acting_commander<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    let frame = session.capture()?;

    if session
        .try_locate(&frame, keys::ACTING_COMMANDER_ON, threshold)?
        .is_some()
    {
        diag.note("acting commander already enabled");
        return Ok(());
    }

    if let Some(toggle) = session.try_locate(&frame, keys::ACTING_COMMANDER_OFF, threshold)? {
        session.click(toggle.center.x, toggle.center.y)?;
        session.sleep(Duration::from_secs(1));
        diag.note("acting commander enabled");
        return Ok(());
    }

    diag.warn("commander toggle not detected; clicking its last known position");
    session.click(COMMANDER_FALLBACK.0, COMMANDER_FALLBACK.1)?;
    session.sleep(Duration::from_secs(1));
    Ok(())
}

/// Run `cycles` combat cycles, then return home best-effort.
///
/// Per cycle: stage entry, operation start, then a long poll for the
/// briefing screen (the fight itself). Briefing exhaustion is proceed-anyway;
/// the results screen is clicked away only if present. A missing stage or
/// start button aborts the remaining cycles.
pub fn run_combat_cycles<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    cycles: u32,
    threshold: f32,
) -> Result<()> {
    for cycle in 1..=cycles {
        diag.note(&format!("combat cycle {cycle}/{cycles}"));

        run_step(session, diag, &Step::new(keys::MISSION_START_BTN, threshold))?;
        run_step(
            session,
            diag,
            &Step::new(keys::OPERATION_START_BTN, threshold).settle(Duration::from_secs(2)),
        )?;

        match poll_for_template(
            session,
            keys::COMBAT_BRIEFING,
            threshold,
            BRIEFING_POLL_INTERVAL,
            BRIEFING_POLL_ATTEMPTS,
        )? {
            Some(briefing) => {
                session.click(briefing.center.x, briefing.center.y)?;
                session.sleep(Duration::from_secs(1));
            }
            None => diag.warn("briefing screen never appeared; proceeding anyway"),
        }

        session.sleep(Duration::from_secs(5));
        run_step(
            session,
            diag,
            &Step::new(keys::MISSION_RESULTS, threshold)
                .policy(StepPolicy::Skip)
                .settle(Duration::from_secs(5)),
        )?;

        diag.note(&format!("combat cycle {cycle}/{cycles} done"));
    }

    session.sleep(Duration::from_secs(5));
    return_home_best_effort(session, diag, threshold)
}

/// Full auto-combat: navigate, enable the commander, size the run off the
/// sanity counter, then loop. Returns the number of cycles actually run.
pub fn auto_combat<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    plan: &CombatPlan,
) -> Result<u32> {
    if !plan.combat_only {
        navigate_to_mission(session, diag, plan.threshold)?;
        session.sleep(Duration::from_secs(2));
        enable_acting_commander(session, diag, super::LENIENT_THRESHOLD)?;
    }

    let remaining = sanity::read_remaining_sanity(session, diag, plan.threshold)?;
    let budget = sanity::executable_cycles(remaining, plan.sanity_cost_per_cycle)?;

    let cycles = match plan.cycles {
        CycleCount::Max => budget,
        CycleCount::Exact(requested) => {
            if requested > budget {
                diag.warn(&format!(
                    "requested {requested} cycles, sanity affords {budget}; clamping"
                ));
            }
            requested.min(budget)
        }
    };

    if cycles == 0 {
        return Err(Error::operation(format!(
            "insufficient sanity: {remaining} remaining, {} per cycle",
            plan.sanity_cost_per_cycle
        )));
    }

    run_combat_cycles(session, diag, cycles, plan.threshold)?;
    Ok(cycles)
}
