//! Persistent application configuration.
//!
//! Stored as JSON in a platform-appropriate config directory. These are
//! opaque knobs: no orchestrator branch depends on their absence.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Read-only directory of named reference images.
    pub template_dir: PathBuf,

    /// OCR model files (rten format).
    pub ocr_detection_model: PathBuf,
    pub ocr_recognition_model: PathBuf,

    /// Delay after every injected action, giving the target time to react
    /// before the next detection.
    pub settle_delay_s: f32,

    /// Default template match threshold; individual tasks may override.
    pub match_threshold: f32,

    /// Sanity consumed by one combat cycle.
    pub sanity_cost_per_cycle: u32,

    /// Persist intermediate frames for diagnostics.
    pub save_frames: bool,
    /// Where diagnostic frames go when `save_frames` is set.
    pub frame_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("templates"),
            ocr_detection_model: PathBuf::from("models/text-detection.rten"),
            ocr_recognition_model: PathBuf::from("models/text-recognition.rten"),
            settle_delay_s: 0.5,
            match_threshold: 0.8,
            sanity_cost_per_cycle: 25,
            save_frames: false,
            frame_dir: PathBuf::from("logs"),
        }
    }
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("akpilot.json"))
    }

    /// Load configuration from disk, falling back to defaults on missing file.
    pub fn load_or_default() -> Self {
        match Self::try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load config; using defaults");
                Self::default()
            }
        }
    }

    /// Try to load configuration from disk.
    pub fn try_load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(&path).with_context(|| format!("read {:?}", path))?;
        let cfg = serde_json::from_str(&json).with_context(|| format!("parse {:?}", path))?;
        Ok(cfg)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(&path, json).with_context(|| format!("write {:?}", path))?;
        Ok(())
    }

    /// Fail fast on required assets. Missing templates or models surface
    /// here, at startup, instead of mid-task.
    pub fn validate(&self) -> Result<(), crate::error::Error> {
        if !self.template_dir.is_dir() {
            return Err(crate::error::Error::Configuration {
                name: format!("template_dir {}", self.template_dir.display()),
            });
        }
        for (name, path) in [
            ("ocr_detection_model", &self.ocr_detection_model),
            ("ocr_recognition_model", &self.ocr_recognition_model),
        ] {
            if !path.is_file() {
                return Err(crate::error::Error::Configuration {
                    name: format!("{name} {}", path.display()),
                });
            }
        }
        Ok(())
    }
}
