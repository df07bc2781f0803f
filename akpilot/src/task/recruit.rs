//! Recruitment workflows.
//!
//! Tags are fixed-vocabulary chips, so a catalog template match is preferred
//! over free-text OCR; OCR is the fallback and tolerates one edit of noise.
//! A senior operator tag always hands the slot to a human. The confirm
//! button is never clicked on that path.

use std::collections::HashMap;
use std::time::Duration;

use vision::{Frame, Point, Rect};

use crate::diag::DiagnosticSink;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::task::{Step, keys, run_step};

/// Tags that must never be spent by automation.
pub const SENIOR_TAGS: [&str; 2] = ["资深干员", "高级资深干员"];

/// Default target tags when the caller names none.
pub const DEFAULT_TARGET_TAGS: [&str; 2] = ["快速复活", "输出"];

const MAX_REFRESHES: u32 = 5;

/// Fixed tag-name to template-key map.
pub struct TagCatalog {
    templates: HashMap<String, String>,
}

impl TagCatalog {
    /// Catalog of the tags we ship reference images for.
    pub fn standard() -> Self {
        let mut catalog = Self::empty();
        for (tag, key) in [
            ("快速复活", "tag_fast_redeploy.png"),
            ("输出", "tag_dps.png"),
            ("治疗", "tag_healing.png"),
            ("费用回复", "tag_dp_recovery.png"),
            ("群攻", "tag_aoe.png"),
        ] {
            catalog.insert(tag, key);
        }
        catalog
    }

    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn insert(&mut self, tag: &str, template_key: &str) {
        self.templates.insert(tag.to_string(), template_key.to_string());
    }

    pub fn template_for(&self, tag: &str) -> Option<&str> {
        self.templates.get(tag).map(String::as_str)
    }
}

/// Per-slot result of one recruitment pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    /// Slot locked, absent, or its detail view did not open.
    Locked,
    /// A target tag was selected and the recruitment confirmed.
    Confirmed { tag: String },
    /// No target tag after refreshing; best-effort pick, still confirmed.
    Fallback { tag: Option<String> },
    /// A senior tag appeared; nothing was confirmed.
    NeedsHuman { tag: String },
}

pub fn navigate_to_recruit<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<()> {
    run_step(
        session,
        diag,
        &Step::new(keys::RECRUIT_BTN, threshold).settle(Duration::from_secs(2)),
    )?;
    Ok(())
}

/// The tag chips, cropped out of the current frame. `origin` maps crop
/// coordinates back to the screen.
struct TagRegion {
    origin: Point,
    crop: Frame,
    tokens: Vec<vision::TextToken>,
}

impl TagRegion {
    fn names(&self) -> Vec<String> {
        self.tokens
            .iter()
            .map(|t| t.content.trim().to_string())
            .collect()
    }
}

/// Crop the tag area right of the detail title and read its tokens.
///
/// When the title is not found the screen center stands in as the anchor,
/// logged as degraded; the chips sit near the center on every layout seen
/// so far.
fn read_tag_region<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    threshold: f32,
) -> Result<TagRegion> {
    let frame = session.capture()?;

    let base = match session.try_locate(&frame, keys::RECRUIT_DETAIL_TITLE, threshold)? {
        Some(title) => title.center,
        None => {
            diag.warn("recruit detail title not found; anchoring tag region on screen center");
            Point::new(frame.width() as i32 / 2, frame.height() as i32 / 2)
        }
    };

    let fw = frame.width() as i32;
    let fh = frame.height() as i32;
    let x0 = base.x + 150;
    let x1 = (base.x + 780).min(fw);
    let y0 = (base.y - 150).max(0);
    let y1 = (base.y + 150).min(fh);
    if x0 < 0 || x0 >= x1 || y0 >= y1 {
        return Err(Error::operation("recruit tag region lies off screen"));
    }

    let region = Rect::new(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32);
    let crop = frame.crop(region)?;
    diag.snapshot(&crop, "recruit_tags");

    let tokens = session.tokens(&crop)?;
    let origin = Point::new(x0, y0);
    Ok(TagRegion { origin, crop, tokens })
}

/// One OCR edit of slack absorbs the usual glyph confusions.
fn token_matches(content: &str, tag: &str) -> bool {
    let content = content.trim();
    content.contains(tag) || levenshtein::levenshtein(content, tag) <= 1
}

/// Find a target tag in the region: catalog template first, then tokens.
fn find_target<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    region: &TagRegion,
    catalog: &TagCatalog,
    targets: &[String],
    threshold: f32,
) -> Result<Option<(String, Point)>> {
    for tag in targets {
        let Some(key) = catalog.template_for(tag) else {
            continue;
        };
        match session.try_locate(&region.crop, key, threshold) {
            Ok(Some(found)) => {
                let at = region.origin.offset(found.center.x, found.center.y);
                return Ok(Some((tag.clone(), at)));
            }
            Ok(None) => {}
            // A catalog entry without its image on disk falls through to OCR.
            Err(Error::Vision(vision::Error::Configuration { .. })) => {
                diag.warn(&format!("no reference image for tag {tag}; using OCR"));
            }
            Err(err) => return Err(err),
        }
    }

    for token in &region.tokens {
        for tag in targets {
            if token_matches(&token.content, tag) {
                let at = region.origin.offset(token.center.x, token.center.y);
                return Ok(Some((tag.clone(), at)));
            }
        }
    }
    Ok(None)
}

/// No target tag is left: take the first available tag (if any) and confirm.
fn fallback_confirm<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    region: &TagRegion,
    threshold: f32,
) -> Result<SlotOutcome> {
    let tag = match region.tokens.first() {
        Some(token) => {
            let at = region.origin.offset(token.center.x, token.center.y);
            diag.warn(&format!("no target tag; taking {:?}", token.content.trim()));
            session.click(at.x, at.y)?;
            session.sleep(Duration::from_millis(500));
            Some(token.content.trim().to_string())
        }
        None => {
            diag.warn("no tags recognized at all; confirming as-is");
            None
        }
    };
    run_step(session, diag, &Step::new(keys::RECRUIT_RIGHT_BTN, threshold))?;
    Ok(SlotOutcome::Fallback { tag })
}

/// Drive one open slot to an outcome.
///
/// Sets the duration, then loops: read the tag region, bail to a human on a
/// senior tag, confirm on a target tag, otherwise refresh. Refreshing stops
/// after `MAX_REFRESHES` or as soon as the tag set stops changing, and the
/// slot is then filled best-effort.
pub fn resolve_slot<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    catalog: &TagCatalog,
    targets: &[String],
    threshold: f32,
) -> Result<SlotOutcome> {
    run_step(session, diag, &Step::new(keys::RECRUIT_TIME_BTN, threshold))?;

    let mut previous_names: Option<Vec<String>> = None;
    let mut refreshes = 0u32;

    loop {
        let region = read_tag_region(session, diag, threshold)?;
        let names = region.names();
        diag.note(&format!("recruit tags: {names:?}"));

        for token in &region.tokens {
            if SENIOR_TAGS.iter().any(|senior| token.content.contains(senior)) {
                diag.warn(&format!(
                    "senior tag {:?} present; leaving this slot to a human",
                    token.content.trim()
                ));
                return Ok(SlotOutcome::NeedsHuman {
                    tag: token.content.trim().to_string(),
                });
            }
        }

        if let Some((tag, at)) = find_target(session, diag, &region, catalog, targets, threshold)? {
            session.click(at.x, at.y)?;
            session.sleep(Duration::from_millis(500));
            diag.note(&format!("selected target tag {tag} at ({}, {})", at.x, at.y));
            run_step(session, diag, &Step::new(keys::RECRUIT_RIGHT_BTN, threshold))?;
            return Ok(SlotOutcome::Confirmed { tag });
        }

        if previous_names.as_ref() == Some(&names) {
            diag.warn("tag set unchanged after refresh");
            return fallback_confirm(session, diag, &region, threshold);
        }
        previous_names = Some(names);

        if refreshes == MAX_REFRESHES {
            diag.warn(&format!("no target tag after {MAX_REFRESHES} refreshes"));
            return fallback_confirm(session, diag, &region, threshold);
        }
        refreshes += 1;
        diag.note(&format!("refreshing tags ({refreshes}/{MAX_REFRESHES})"));
        run_step(session, diag, &Step::new(keys::RECRUIT_REFRESH_TAGS, threshold))?;
        run_step(
            session,
            diag,
            &Step::new(keys::TRUE_BTN, threshold).settle(Duration::from_millis(1500)),
        )?;
    }
}

/// Work through the recruitment slots.
///
/// `slot` limits the pass to one slot (1-4); anything else runs all four.
/// A slot whose entry template is absent is locked (or does not exist) and
/// is skipped, as is one whose detail view fails to open.
pub fn run_recruit_slots<S: Session + ?Sized>(
    session: &mut S,
    diag: &DiagnosticSink,
    catalog: &TagCatalog,
    slot: Option<u8>,
    targets: &[String],
    threshold: f32,
) -> Result<Vec<(usize, SlotOutcome)>> {
    let all: Vec<(usize, &str)> = keys::RECRUIT_SLOTS
        .iter()
        .enumerate()
        .map(|(i, key)| (i + 1, *key))
        .collect();
    let slots = match slot {
        Some(n) if (1..=4).contains(&n) => vec![all[n as usize - 1]],
        Some(n) => {
            diag.warn(&format!("invalid slot {n}; running all slots"));
            all
        }
        None => all,
    };

    let mut outcomes = Vec::new();
    for (index, key) in slots {
        let frame = session.capture()?;
        let Some(entry) = session.try_locate(&frame, key, threshold)? else {
            diag.note(&format!("slot {index} locked or absent; skipping"));
            outcomes.push((index, SlotOutcome::Locked));
            continue;
        };

        session.click(entry.center.x, entry.center.y)?;
        session.sleep(Duration::from_millis(1500));

        let frame = session.capture()?;
        if session
            .try_locate(&frame, keys::RECRUIT_DETAIL_TITLE, threshold)?
            .is_none()
        {
            diag.warn(&format!("slot {index}: detail view did not open; skipping"));
            outcomes.push((index, SlotOutcome::Locked));
            continue;
        }

        let outcome = resolve_slot(session, diag, catalog, targets, threshold)?;
        diag.note(&format!("slot {index}: {outcome:?}"));
        outcomes.push((index, outcome));
        session.sleep(Duration::from_secs(1));
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::ScriptedSession;

    fn targets(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    /// Detail title centered at (560, 540): tag region origin is (710, 390).
    fn script_detail(session: &mut ScriptedSession) {
        session.always(keys::RECRUIT_TIME_BTN, ScriptedSession::hit(700, 700));
        session.always(
            keys::RECRUIT_DETAIL_TITLE,
            ScriptedSession::hit_sized(560, 540, 180, 40),
        );
        session.always(keys::RECRUIT_RIGHT_BTN, ScriptedSession::hit(1500, 800));
    }

    #[test]
    fn senior_tag_hands_over_without_confirming() {
        let mut session = ScriptedSession::new();
        script_detail(&mut session);
        session.push_tokens(vec![ScriptedSession::token(
            "高级资深干员",
            Point::new(100, 50),
        )]);

        let outcome = resolve_slot(
            &mut session,
            &DiagnosticSink::disabled(),
            &TagCatalog::empty(),
            &targets(&["快速复活"]),
            0.7,
        )
        .unwrap();

        assert_eq!(
            outcome,
            SlotOutcome::NeedsHuman {
                tag: "高级资深干员".to_string()
            }
        );
        // Only the duration button; the confirm button was never touched.
        assert_eq!(session.clicks, vec![(700, 700)]);
    }

    #[test]
    fn target_tag_is_clicked_at_its_absolute_position() {
        let mut session = ScriptedSession::new();
        script_detail(&mut session);
        session.push_tokens(vec![
            ScriptedSession::token("先锋干员", Point::new(60, 30)),
            ScriptedSession::token("快速复活", Point::new(120, 60)),
        ]);

        let outcome = resolve_slot(
            &mut session,
            &DiagnosticSink::disabled(),
            &TagCatalog::empty(),
            &targets(&["快速复活"]),
            0.7,
        )
        .unwrap();

        assert_eq!(
            outcome,
            SlotOutcome::Confirmed {
                tag: "快速复活".to_string()
            }
        );
        // Duration, tag at region origin + token center, confirm.
        assert_eq!(session.clicks, vec![(700, 700), (830, 450), (1500, 800)]);
    }

    #[test]
    fn one_edit_of_ocr_noise_still_matches() {
        assert!(token_matches("快速复沽", "快速复活"));
        assert!(token_matches(" 快速复活 ", "快速复活"));
        assert!(token_matches("高级资深干员", "资深干员"));
        assert!(!token_matches("先锋干员", "快速复活"));
    }

    #[test]
    fn catalog_template_beats_token_text() {
        let mut session = ScriptedSession::new();
        script_detail(&mut session);
        let mut catalog = TagCatalog::empty();
        catalog.insert("快速复活", "tag_fast_redeploy.png");
        // Template found inside the crop at (80, 40); the token would have
        // pointed somewhere else.
        session.on_next("tag_fast_redeploy.png", Some(ScriptedSession::hit(80, 40)));
        session.push_tokens(vec![ScriptedSession::token("快速复活", Point::new(300, 120))]);

        let outcome = resolve_slot(
            &mut session,
            &DiagnosticSink::disabled(),
            &catalog,
            &targets(&["快速复活"]),
            0.7,
        )
        .unwrap();

        assert_eq!(
            outcome,
            SlotOutcome::Confirmed {
                tag: "快速复活".to_string()
            }
        );
        assert_eq!(session.clicks, vec![(700, 700), (790, 430), (1500, 800)]);
    }

    #[test]
    fn refreshes_until_a_target_appears() {
        let mut session = ScriptedSession::new();
        script_detail(&mut session);
        session.always(keys::RECRUIT_REFRESH_TAGS, ScriptedSession::hit(1000, 600));
        session.always(keys::TRUE_BTN, ScriptedSession::hit(960, 700));
        session.push_tokens(vec![ScriptedSession::token("先锋干员", Point::new(60, 30))]);
        session.push_tokens(vec![ScriptedSession::token("重装干员", Point::new(60, 30))]);
        session.push_tokens(vec![ScriptedSession::token("快速复活", Point::new(120, 60))]);

        let outcome = resolve_slot(
            &mut session,
            &DiagnosticSink::disabled(),
            &TagCatalog::empty(),
            &targets(&["快速复活"]),
            0.7,
        )
        .unwrap();

        assert_eq!(
            outcome,
            SlotOutcome::Confirmed {
                tag: "快速复活".to_string()
            }
        );
        // Two refresh rounds: refresh + confirm each, then the target pick.
        let refresh_clicks = session.clicks.iter().filter(|c| **c == (1000, 600)).count();
        assert_eq!(refresh_clicks, 2);
        assert!(session.clicks.contains(&(830, 450)));
    }

    #[test]
    fn an_unchanged_tag_set_stops_refreshing_early() {
        let mut session = ScriptedSession::new();
        script_detail(&mut session);
        session.always(keys::RECRUIT_REFRESH_TAGS, ScriptedSession::hit(1000, 600));
        session.always(keys::TRUE_BTN, ScriptedSession::hit(960, 700));
        session.push_tokens(vec![ScriptedSession::token("先锋干员", Point::new(60, 30))]);
        session.push_tokens(vec![ScriptedSession::token("先锋干员", Point::new(60, 30))]);

        let outcome = resolve_slot(
            &mut session,
            &DiagnosticSink::disabled(),
            &TagCatalog::empty(),
            &targets(&["快速复活"]),
            0.7,
        )
        .unwrap();

        assert_eq!(
            outcome,
            SlotOutcome::Fallback {
                tag: Some("先锋干员".to_string())
            }
        );
        // Exactly one refresh round before the set repeated.
        let refresh_clicks = session.clicks.iter().filter(|c| **c == (1000, 600)).count();
        assert_eq!(refresh_clicks, 1);
        // Best-effort pick at the first tag, then confirm.
        assert!(session.clicks.contains(&(770, 420)));
        assert_eq!(*session.clicks.last().unwrap(), (1500, 800));
    }

    #[test]
    fn locked_slots_are_skipped_without_clicks() {
        let mut session = ScriptedSession::new();

        let outcomes = run_recruit_slots(
            &mut session,
            &DiagnosticSink::disabled(),
            &TagCatalog::empty(),
            None,
            &targets(&["快速复活"]),
            0.7,
        )
        .unwrap();

        assert_eq!(
            outcomes,
            vec![
                (1, SlotOutcome::Locked),
                (2, SlotOutcome::Locked),
                (3, SlotOutcome::Locked),
                (4, SlotOutcome::Locked),
            ]
        );
        assert!(session.clicks.is_empty());
    }
}
