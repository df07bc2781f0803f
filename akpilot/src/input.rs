//! Action executor: synthetic pointer/keyboard injection.
//!
//! Every action performs a short eased pointer pre-move before the discrete
//! action (abrupt warps are swallowed by some targets), then waits a fixed
//! settle delay before returning so the application has time to react before
//! the next detection. Any injection failure is fatal to the current step.

use std::thread::sleep;
use std::time::Duration;

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Keyboard, Mouse};

use crate::error::Error;

pub use enigo::Key;

/// Duration of the eased pre-move preceding each pointer action.
const PRE_MOVE: Duration = Duration::from_millis(200);
const PRE_MOVE_STEPS: u32 = 12;

pub struct ActionExecutor {
    enigo: Enigo,
    settle_delay: Duration,
}

impl ActionExecutor {
    pub fn new(settle_delay: Duration) -> Result<Self, Error> {
        let enigo = Enigo::new(&enigo::Settings::default())
            .map_err(|err| Error::operation(format!("initialize input backend: {err}")))?;
        Ok(Self {
            enigo,
            settle_delay,
        })
    }

    fn settle(&self) {
        sleep(self.settle_delay);
    }

    /// Eased absolute move to `(x, y)`.
    fn pre_move(&mut self, x: i32, y: i32) -> Result<(), Error> {
        let from = match self.enigo.location() {
            Ok(pos) => pos,
            // Unknown cursor position: jump directly.
            Err(_) => (x, y),
        };

        let step_pause = PRE_MOVE / PRE_MOVE_STEPS;
        for (px, py) in eased_path(from, (x, y), PRE_MOVE_STEPS) {
            self.enigo
                .move_mouse(px, py, Coordinate::Abs)
                .map_err(|err| Error::operation(format!("move pointer: {err}")))?;
            sleep(step_pause);
        }
        Ok(())
    }

    /// Click at `(x, y)`, `clicks` times with `interval` between repeats.
    pub fn click(&mut self, x: i32, y: i32, clicks: u32, interval: Duration) -> Result<(), Error> {
        self.pre_move(x, y)?;
        for i in 0..clicks.max(1) {
            if i > 0 {
                sleep(interval);
            }
            self.enigo
                .button(Button::Left, Direction::Click)
                .map_err(|err| Error::operation(format!("click at ({x}, {y}): {err}")))?;
        }
        self.settle();
        Ok(())
    }

    /// Press `key`, `presses` times with `interval` between repeats.
    pub fn key_press(&mut self, key: Key, presses: u32, interval: Duration) -> Result<(), Error> {
        for i in 0..presses.max(1) {
            if i > 0 {
                sleep(interval);
            }
            self.enigo
                .key(key, Direction::Click)
                .map_err(|err| Error::operation(format!("press key {key:?}: {err}")))?;
        }
        self.settle();
        Ok(())
    }

    /// Press at `from`, drag to `to` over `duration`, release.
    pub fn drag(&mut self, from: (i32, i32), to: (i32, i32), duration: Duration) -> Result<(), Error> {
        self.pre_move(from.0, from.1)?;
        self.enigo
            .button(Button::Left, Direction::Press)
            .map_err(|err| Error::operation(format!("press for drag: {err}")))?;

        let steps = 24u32;
        let step_pause = duration / steps;
        for (px, py) in eased_path(from, to, steps) {
            self.enigo
                .move_mouse(px, py, Coordinate::Abs)
                .map_err(|err| Error::operation(format!("drag pointer: {err}")))?;
            sleep(step_pause);
        }

        self.enigo
            .button(Button::Left, Direction::Release)
            .map_err(|err| Error::operation(format!("release drag: {err}")))?;
        self.settle();
        Ok(())
    }

    /// Scroll `amount` notches (positive = down), optionally at a position.
    pub fn scroll(&mut self, amount: i32, at: Option<(i32, i32)>) -> Result<(), Error> {
        if let Some((x, y)) = at {
            self.pre_move(x, y)?;
        }
        self.enigo
            .scroll(amount, Axis::Vertical)
            .map_err(|err| Error::operation(format!("scroll: {err}")))?;
        self.settle();
        Ok(())
    }
}

/// Interpolated pointer path from `from` to `to` with smoothstep easing.
///
/// The path always ends exactly at `to`; the starting position itself is not
/// emitted (the pointer is already there).
fn eased_path(from: (i32, i32), to: (i32, i32), steps: u32) -> Vec<(i32, i32)> {
    let steps = steps.max(1);
    (1..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let eased = t * t * (3.0 - 2.0 * t);
            (
                from.0 + ((to.0 - from.0) as f64 * eased).round() as i32,
                from.1 + ((to.1 - from.1) as f64 * eased).round() as i32,
            )
        })
        .collect()
}
