// src/config.rs - Tunable thresholds for classification, timing and pointer mapping
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::landmarks::FrameSize;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidThreshold { field: &'static str, value: f64 },
    #[error("smoothing_factor must be in [0, 1) (got {0})")]
    InvalidSmoothing(f64),
    #[error("{field} must be at most {max} seconds (got {value})")]
    DurationOutOfRange {
        field: &'static str,
        value: f64,
        max: f64,
    },
    #[error("scroll_step must be positive (got {0})")]
    InvalidScrollStep(i32),
    #[error("frame size must be non-zero (got {width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
}

/// Upper bound for every cooldown and activation delay.
pub const MAX_DURATION_SECS: f64 = 3600.0;

fn seconds(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    if value > MAX_DURATION_SECS {
        return Err(ConfigError::DurationOutOfRange {
            field,
            value,
            max: MAX_DURATION_SECS,
        });
    }
    Duration::try_from_secs_f64(value)
        .map_err(|_| ConfigError::InvalidThreshold { field, value })
}

/// Distances are in the tracker's normalized landmark units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub pinch_threshold: f64,
    pub fist_threshold: f64,
    /// Thumb and index must each be closer than this to count as a fist.
    pub fist_finger_bound: f64,
    pub index_extended: f64,
    pub finger_curled: f64,
    pub thumb_open_extended: f64,
    pub index_open_extended: f64,
    pub open_thumb_extended: f64,
    pub open_index_extended: f64,
    /// Middle, ring and pinky bound for an open hand.
    pub open_finger_extended: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.05,
            fist_threshold: 0.08,
            fist_finger_bound: 0.10,
            index_extended: 0.14,
            finger_curled: 0.12,
            thumb_open_extended: 0.12,
            index_open_extended: 0.15,
            open_thumb_extended: 0.13,
            open_index_extended: 0.15,
            open_finger_extended: 0.14,
        }
    }
}

/// Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub click_cooldown: f64,
    pub scroll_cooldown: f64,
    pub drag_activation: f64,
    /// Palm travel, as a fraction of frame height, that counts as one swipe step.
    pub swipe_threshold: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            click_cooldown: 0.15,
            scroll_cooldown: 0.05,
            drag_activation: 1.0,
            swipe_threshold: 0.04,
        }
    }
}

impl TimingConfig {
    pub fn click_cooldown(&self) -> Result<Duration, ConfigError> {
        seconds("click_cooldown", self.click_cooldown)
    }

    pub fn scroll_cooldown(&self) -> Result<Duration, ConfigError> {
        seconds("scroll_cooldown", self.scroll_cooldown)
    }

    pub fn drag_activation(&self) -> Result<Duration, ConfigError> {
        seconds("drag_activation", self.drag_activation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    pub smoothing_factor: f64,
    pub edge_padding: u32,
    /// Wheel clicks sent per scroll command.
    pub scroll_step: i32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.5,
            edge_padding: 50,
            scroll_step: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Stop when the pointer lands in a screen corner.
    pub corner_guard: bool,
    pub corner_margin: u32,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            corner_guard: true,
            corner_margin: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub classifier: ClassifierConfig,
    pub timing: TimingConfig,
    pub pointer: PointerConfig,
    pub safety: SafetyConfig,
    pub frame: FrameSize,
}

impl GestureConfig {
    /// Per-user config location, e.g. `~/.config/gesture-pointer/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "gesture-pointer")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the explicit path if given, otherwise the per-user file when it exists,
    /// otherwise the built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.classifier;
        let t = &self.timing;
        let fields = [
            ("pinch_threshold", c.pinch_threshold),
            ("fist_threshold", c.fist_threshold),
            ("fist_finger_bound", c.fist_finger_bound),
            ("index_extended", c.index_extended),
            ("finger_curled", c.finger_curled),
            ("thumb_open_extended", c.thumb_open_extended),
            ("index_open_extended", c.index_open_extended),
            ("open_thumb_extended", c.open_thumb_extended),
            ("open_index_extended", c.open_index_extended),
            ("open_finger_extended", c.open_finger_extended),
            ("click_cooldown", t.click_cooldown),
            ("scroll_cooldown", t.scroll_cooldown),
            ("drag_activation", t.drag_activation),
            ("swipe_threshold", t.swipe_threshold),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { field, value });
            }
        }
        t.click_cooldown()?;
        t.scroll_cooldown()?;
        t.drag_activation()?;

        if self.pointer.scroll_step <= 0 {
            return Err(ConfigError::InvalidScrollStep(self.pointer.scroll_step));
        }

        let s = self.pointer.smoothing_factor;
        if !(0.0..1.0).contains(&s) {
            return Err(ConfigError::InvalidSmoothing(s));
        }

        if self.frame.is_empty() {
            return Err(ConfigError::EmptyFrame {
                width: self.frame.width,
                height: self.frame.height,
            });
        }

        Ok(())
    }
}
