//! Bounded blocking poll.
//!
//! The one concurrency-adjacent construct in the driver: probe, sleep,
//! repeat, up to a fixed attempt count. Exhaustion is `Ok(None)`, never an
//! error, so callers decide whether to proceed best-effort or abort.

use std::time::Duration;

use vision::Match;

use crate::error::Result;
use crate::session::Session;

/// Run `probe` up to `max_attempts` times, sleeping `interval` between
/// attempts. Returns at the first `Ok(Some(_))`; a probe error aborts the
/// loop immediately.
pub fn poll_until<S, T, F>(
    session: &mut S,
    interval: Duration,
    max_attempts: u32,
    mut probe: F,
) -> Result<Option<T>>
where
    S: Session + ?Sized,
    F: FnMut(&mut S) -> Result<Option<T>>,
{
    let max_attempts = max_attempts.max(1);
    for attempt in 1..=max_attempts {
        if let Some(found) = probe(session)? {
            return Ok(Some(found));
        }
        if attempt < max_attempts {
            session.sleep(interval);
        }
    }
    Ok(None)
}

/// Poll for a template appearing on screen, one fresh capture per attempt.
pub fn poll_for_template<S: Session + ?Sized>(
    session: &mut S,
    key: &str,
    threshold: f32,
    interval: Duration,
    max_attempts: u32,
) -> Result<Option<Match>> {
    poll_until(session, interval, max_attempts, |s| {
        let frame = s.capture()?;
        s.try_locate(&frame, key, threshold)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testkit::ScriptedSession;

    #[test]
    fn returns_at_the_successful_attempt() {
        let mut session = ScriptedSession::new();
        let mut attempts = 0;
        let found = poll_until(&mut session, Duration::from_secs(3), 10, |_| {
            attempts += 1;
            Ok((attempts == 4).then_some(attempts))
        })
        .unwrap();

        assert_eq!(found, Some(4));
        // Sleeps only between attempts, so three before the fourth probe.
        assert_eq!(session.sleeps.len(), 3);
        assert!(session.sleeps.iter().all(|d| *d == Duration::from_secs(3)));
    }

    #[test]
    fn exhaustion_is_ok_none() {
        let mut session = ScriptedSession::new();
        let mut attempts = 0u32;
        let found: Option<()> = poll_until(&mut session, Duration::from_secs(1), 5, |_| {
            attempts += 1;
            Ok(None)
        })
        .unwrap();

        assert_eq!(found, None);
        assert_eq!(attempts, 5);
        // No trailing sleep after the final attempt.
        assert_eq!(session.sleeps.len(), 4);
    }

    #[test]
    fn probe_error_aborts_immediately() {
        let mut session = ScriptedSession::new();
        let mut attempts = 0u32;
        let err = poll_until::<_, (), _>(&mut session, Duration::from_secs(1), 5, |_| {
            attempts += 1;
            Err(Error::operation("probe blew up"))
        })
        .unwrap_err();

        assert!(matches!(err, Error::OperationFailed { .. }));
        assert_eq!(attempts, 1);
        assert!(session.sleeps.is_empty());
    }

    #[test]
    fn template_poll_sees_a_late_appearance() {
        let mut session = ScriptedSession::new();
        session
            .on_next("popup.png", None)
            .on_next("popup.png", None)
            .on_next("popup.png", Some(ScriptedSession::hit(640, 360)));

        let found = poll_for_template(
            &mut session,
            "popup.png",
            0.8,
            Duration::from_millis(100),
            10,
        )
        .unwrap();
        assert_eq!(found.unwrap().center, vision::Point::new(640, 360));
        assert_eq!(session.captures, 3);
    }
}
