//! Screen-state detection engine.
//!
//! Everything the driver knows about the target application comes from
//! pixels: template matching against named reference images, color-blob
//! search, and OCR with per-token geometry. This crate owns those
//! primitives; it knows nothing about input injection or task sequencing.

mod frame;
pub use frame::*;

mod error;
pub use error::Error;

mod template;
pub use template::{Template, TemplateStore};

mod detect;
pub use detect::{Detector, Match};

mod color;
pub use color::find_color_regions;

mod ocr;
pub use ocr::{Ocr, TextToken};

pub mod util;
