//! Text extraction.
//!
//! The recognizer is treated as a black box: one frame in, zero or more
//! tokens out in reading order. Engines are sensitive to input quality, so
//! the digit-tuned entry point tries several preprocessing strategies and
//! keeps the one with the best digit yield.

use std::path::Path;

use imageproc::contrast::{
    ThresholdType, adaptive_threshold, equalize_histogram, otsu_level, threshold,
};
use ocrs::{ImageSource, OcrEngine, OcrEngineParams, TextItem};
use rten::Model;

use crate::error::Error;
use crate::frame::{Frame, Point};
use crate::util::digit_count;

/// One recognized line of text with its geometry in frame coordinates.
#[derive(Debug, Clone)]
pub struct TextToken {
    pub content: String,
    /// Bounding quad, axis-aligned, clockwise from the top-left corner.
    pub polygon: [Point; 4],
    /// Midpoint of the bounding quad.
    pub center: Point,
    /// The engine does not expose per-line scores; tokens that survive its
    /// internal filtering report 1.0.
    pub confidence: f32,
}

pub struct Ocr {
    engine: OcrEngine,
}

impl Ocr {
    /// Initialize the OCR engine from detection + recognition model files.
    ///
    /// A missing or invalid model is an infrastructure fault, distinct from
    /// any later non-match.
    pub fn try_new(detection: impl AsRef<Path>, recognition: impl AsRef<Path>) -> Result<Self, Error> {
        let detection = Model::load_file(detection)
            .map_err(|err| Error::recognition(format!("load detection model: {err}")))?;
        let recognition = Model::load_file(recognition)
            .map_err(|err| Error::recognition(format!("load recognition model: {err}")))?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection),
            recognition_model: Some(recognition),
            ..Default::default()
        })
        .map_err(|err| Error::recognition(format!("initialize OCR engine: {err}")))?;

        Ok(Self { engine })
    }

    /// Recognize text, one token per line, in reading order.
    ///
    /// The order is whatever the detector produces and is not guaranteed
    /// stable across ambiguous layouts.
    pub fn tokens(&self, frame: &Frame) -> Result<Vec<TextToken>, Error> {
        let bytes = frame.rgb_bytes();
        let source = ImageSource::from_bytes(&bytes, (frame.width(), frame.height()))
            .map_err(|err| Error::recognition(format!("build OCR input: {err}")))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| Error::recognition(format!("prepare OCR input: {err}")))?;

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|err| Error::recognition(format!("detect words: {err}")))?;
        let line_rects = self.engine.find_text_lines(&input, &word_rects);
        let lines = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|err| Error::recognition(format!("recognize text: {err}")))?;

        let mut tokens = Vec::new();
        for line in lines.into_iter().flatten() {
            let content = line.to_string();
            if content.trim().is_empty() {
                continue;
            }

            let corners = line.rotated_rect().corners();
            let corners: Vec<(f32, f32)> = corners.iter().map(|c| (c.x, c.y)).collect();
            let (polygon, center) = quad_from_corners(&corners);

            tokens.push(TextToken {
                content,
                polygon,
                center,
                confidence: 1.0,
            });
        }
        Ok(tokens)
    }

    /// Recognize text and join all tokens with spaces.
    pub fn text(&self, frame: &Frame) -> Result<String, Error> {
        let tokens = self.tokens(frame)?;
        Ok(tokens
            .into_iter()
            .map(|t| t.content)
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// Digit-tuned pass for numeric counters.
    ///
    /// Upscales small crops, then tries adaptive and Otsu binarization on top
    /// of the raw crop and keeps the candidate with the highest digit yield.
    pub fn text_digit_tuned(&self, frame: &Frame) -> Result<String, Error> {
        const MIN_H: u32 = 80;
        let base = if frame.height() < MIN_H {
            frame.resized_to_height(MIN_H)
        } else {
            frame.clone()
        };

        let adaptive = {
            let gray = equalize_histogram(&base.to_gray_image());
            let bin = adaptive_threshold(&gray, 7, 10);
            Frame::from_gray(&ensure_dark_text_on_light(bin))
        };

        let otsu = {
            let gray = equalize_histogram(&base.to_gray_image());
            let level = otsu_level(&gray);
            let bin = threshold(&gray, level, ThresholdType::Binary);
            Frame::from_gray(&ensure_dark_text_on_light(bin))
        };

        let mut best = String::new();
        let mut best_score = 0usize;
        for cand in [adaptive, otsu, base] {
            let text = self.text(&cand)?;
            let score = digit_count(&text);
            if score > best_score || (best.is_empty() && !text.is_empty()) {
                best_score = score;
                best = text;
            }
        }
        Ok(best)
    }
}

/// Axis-aligned quad + midpoint over a set of corner points.
fn quad_from_corners(corners: &[(f32, f32)]) -> ([Point; 4], Point) {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for &(x, y) in corners {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    let (x1, y1) = (min_x.round() as i32, min_y.round() as i32);
    let (x2, y2) = (max_x.round() as i32, max_y.round() as i32);
    let polygon = [
        Point::new(x1, y1),
        Point::new(x2, y1),
        Point::new(x2, y2),
        Point::new(x1, y2),
    ];
    let center = Point::new((x1 + x2) / 2, (y1 + y2) / 2);
    (polygon, center)
}

fn ensure_dark_text_on_light(mut bin: image::GrayImage) -> image::GrayImage {
    // If the image is mostly black, invert it so background becomes light.
    let mut white = 0u64;
    let mut black = 0u64;
    for p in bin.pixels() {
        if p.0[0] > 0 {
            white += 1;
        } else {
            black += 1;
        }
    }
    if black > white {
        for p in bin.pixels_mut() {
            p.0[0] = 255u8.saturating_sub(p.0[0]);
        }
    }
    bin
}
