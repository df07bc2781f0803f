//! Scripted session for orchestrator tests.
//!
//! Detections and OCR results are fed from queues, clicks and sleeps are
//! recorded, and `sleep` never blocks, so bounded polls run instantly.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use vision::{Frame, Match, Point, TextToken};

use crate::error::Result;
use crate::session::Session;

pub struct ScriptedSession {
    width: u32,
    height: u32,
    locate_queue: HashMap<String, VecDeque<Option<Match>>>,
    locate_always: HashMap<String, Match>,
    texts: VecDeque<String>,
    digit_texts: VecDeque<String>,
    token_sets: VecDeque<Vec<TextToken>>,
    pub clicks: Vec<(i32, i32)>,
    pub sleeps: Vec<Duration>,
    pub captures: usize,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::with_size(1920, 1080)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            locate_queue: HashMap::new(),
            locate_always: HashMap::new(),
            texts: VecDeque::new(),
            digit_texts: VecDeque::new(),
            token_sets: VecDeque::new(),
            clicks: Vec::new(),
            sleeps: Vec::new(),
            captures: 0,
        }
    }

    /// A plausible match centered at `(x, y)`.
    pub fn hit(x: i32, y: i32) -> Match {
        Self::hit_sized(x, y, 120, 48)
    }

    pub fn hit_sized(x: i32, y: i32, width: u32, height: u32) -> Match {
        Match {
            center: Point::new(x, y),
            width,
            height,
            score: 0.95,
        }
    }

    /// A token whose click target is `center`.
    pub fn token(content: &str, center: Point) -> TextToken {
        TextToken {
            content: content.to_string(),
            polygon: [
                center.offset(-20, -8),
                center.offset(20, -8),
                center.offset(20, 8),
                center.offset(-20, 8),
            ],
            center,
            confidence: 1.0,
        }
    }

    /// Script the next detection of `key`. Queued results are consumed in
    /// order; once the queue is empty, `always` results (if any) apply, then
    /// absence.
    pub fn on_next(&mut self, key: &str, result: Option<Match>) -> &mut Self {
        self.locate_queue
            .entry(key.to_string())
            .or_default()
            .push_back(result);
        self
    }

    /// Make every detection of `key` succeed with `m`.
    pub fn always(&mut self, key: &str, m: Match) -> &mut Self {
        self.locate_always.insert(key.to_string(), m);
        self
    }

    pub fn push_text(&mut self, text: &str) -> &mut Self {
        self.texts.push_back(text.to_string());
        self
    }

    pub fn push_digit_text(&mut self, text: &str) -> &mut Self {
        self.digit_texts.push_back(text.to_string());
        self
    }

    pub fn push_tokens(&mut self, tokens: Vec<TextToken>) -> &mut Self {
        self.token_sets.push_back(tokens);
        self
    }

    fn next_locate(&mut self, key: &str) -> Option<Match> {
        if let Some(queue) = self.locate_queue.get_mut(key) {
            if let Some(result) = queue.pop_front() {
                return result;
            }
        }
        self.locate_always.get(key).copied()
    }
}

impl Session for ScriptedSession {
    fn capture(&mut self) -> Result<Frame> {
        self.captures += 1;
        let bytes = vec![0u8; (self.width * self.height * 4) as usize];
        Ok(Frame::from_rgba(self.width as usize, &bytes))
    }

    fn try_locate(&mut self, _frame: &Frame, key: &str, _threshold: f32) -> Result<Option<Match>> {
        Ok(self.next_locate(key))
    }

    fn locate(&mut self, _frame: &Frame, key: &str, threshold: f32) -> Result<Match> {
        self.next_locate(key).ok_or_else(|| {
            vision::Error::ElementNotFound {
                key: key.to_string(),
                best: threshold - 0.2,
            }
            .into()
        })
    }

    fn click_times(&mut self, x: i32, y: i32, clicks: u32, _interval: Duration) -> Result<()> {
        for _ in 0..clicks.max(1) {
            self.clicks.push((x, y));
        }
        Ok(())
    }

    fn tokens(&mut self, _frame: &Frame) -> Result<Vec<TextToken>> {
        Ok(self.token_sets.pop_front().unwrap_or_default())
    }

    fn read_text(&mut self, _frame: &Frame) -> Result<String> {
        Ok(self.texts.pop_front().unwrap_or_default())
    }

    fn read_text_digits(&mut self, _frame: &Frame) -> Result<String> {
        Ok(self.digit_texts.pop_front().unwrap_or_default())
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}
