// src/config.rs
// Clip and physics parameters. Defaults reproduce the stock clips; an optional JSON file and
// CLI flags override them. Validation runs once, before anything is integrated.

use crate::error::{ClipError, Result};
use crate::logic::{frame_count, Method, MAX_SAMPLES};
use crate::math::{DoublePendulum, Lorenz};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Widest accepted frame (8K portrait is 4320 × 7680).
pub const MAX_WIDTH: u32 = 4320;

/// Container format written by the video stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp4,
    Gif,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Gif => "gif",
        }
    }
}

/// Settings shared by every clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipSettings {
    pub duration_s: f64,
    pub fps: u32,
    /// Frame width in pixels; the height follows from the 9:16 aspect ratio.
    pub width: u32,
    pub format: OutputFormat,
    /// Write a GIF when the MP4 encoder cannot be started.
    pub gif_fallback: bool,
    /// Encoder executable.
    pub encoder: String,
    pub bitrate_kbps: u32,
    /// Draw titles, equations and watermark.
    pub captions: bool,
    pub watermark: String,
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self {
            duration_s: 30.0,
            fps: 30,
            width: 540,
            format: OutputFormat::Mp4,
            gif_fallback: true,
            encoder: "ffmpeg".to_string(),
            bitrate_kbps: 2000,
            captions: true,
            watermark: "ScienceInMotion".to_string(),
        }
    }
}

impl ClipSettings {
    /// Frame height: 16/9 of the width, rounded to an even number for yuv420p.
    pub fn height(&self) -> u32 {
        let h = (f64::from(self.width) * 16.0 / 9.0).round() as u64; // Wide enough for any u32 width.
        let even = h + h % 2;
        u32::try_from(even).unwrap_or(u32::MAX - 1)
    }

    /// Frame count for the configured duration and rate.
    pub fn frames(&self) -> Result<usize> {
        frame_count(self.duration_s, self.fps)
    }

    /// Bytes in one RGB24 frame.
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height() as usize * 3
    }

    pub fn validate(&self) -> Result<()> {
        self.frames()?;
        if self.width < 36 || self.width > MAX_WIDTH || self.width % 2 != 0 {
            return Err(ClipError::Config(format!(
                "width must be an even number between 36 and {MAX_WIDTH} pixels, got {}",
                self.width
            )));
        }
        if self.encoder.trim().is_empty() {
            return Err(ClipError::Config("encoder program must not be empty".into()));
        }
        Ok(())
    }
}

/// Double-pendulum clip parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumParams {
    pub system: DoublePendulum,
    pub theta1_deg: f64,
    pub theta2_deg: f64,
    pub omega1: f64,
    pub omega2: f64,
    pub method: Method,
    /// Integration steps between frames; dt = 1 / (fps · steps_per_frame).
    pub steps_per_frame: usize,
    /// Trace length in samples; `None` keeps the whole history.
    pub trail: Option<usize>,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            system: DoublePendulum::default(),
            theta1_deg: 120.0,
            theta2_deg: 60.0,
            omega1: 0.0,
            omega2: 0.0,
            method: Method::Rk4,
            steps_per_frame: 10,
            trail: None,
        }
    }
}

impl PendulumParams {
    /// Initial state [θ1, ω1, θ2, ω2] in radians.
    pub fn initial_state(&self) -> [f64; 4] {
        [
            self.theta1_deg.to_radians(),
            self.omega1,
            self.theta2_deg.to_radians(),
            self.omega2,
        ]
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.system;
        for (name, v) in [("l1", s.l1), ("l2", s.l2), ("m1", s.m1), ("m2", s.m2)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ClipError::Config(format!("pendulum {name} must be positive, got {v}")));
            }
        }
        if !s.g.is_finite() {
            return Err(ClipError::Config(format!("gravity must be finite, got {}", s.g)));
        }
        if self.steps_per_frame == 0 {
            return Err(ClipError::Config("pendulum steps_per_frame must be at least 1".into()));
        }
        Ok(())
    }
}

/// Lorenz clip parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LorenzParams {
    pub system: Lorenz,
    pub initial: [f64; 3],
    pub dt: f64,
    pub method: Method,
    /// Points on the finished path. Independent of the frame count; the clip reveals them
    /// progressively.
    pub samples: usize,
}

impl Default for LorenzParams {
    fn default() -> Self {
        Self {
            system: Lorenz::default(),
            initial: [0.1, 0.0, 0.0],
            dt: 0.01,
            method: Method::Rk4,
            samples: 8000,
        }
    }
}

impl LorenzParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ClipError::Config(format!("lorenz dt must be positive, got {}", self.dt)));
        }
        if !(2..=MAX_SAMPLES).contains(&self.samples) {
            return Err(ClipError::Config(format!(
                "lorenz samples must be between 2 and {MAX_SAMPLES}, got {}",
                self.samples
            )));
        }
        Ok(())
    }
}

/// Everything a run needs; the shape of the optional JSON parameter file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub clip: ClipSettings,
    pub pendulum: PendulumParams,
    pub lorenz: LorenzParams,
}

impl Config {
    /// Reads a JSON parameter file; missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.clip.validate()?;
        self.pendulum.validate()?;
        self.lorenz.validate()
    }
}
