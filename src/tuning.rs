//! Data-driven game balance
//!
//! Balance knobs load from a JSON file so tweaks don't need a recompile.
//! Missing fields fall back to their defaults, which match the classic feel.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Balance knobs for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Per-axis speed of every ball
    pub ball_speed: f32,
    pub paddle_speed: f32,
    pub brick_rows: u32,
    pub bricks_per_row: u32,
    pub start_lives: u8,
    pub max_lives: u8,
    /// Downward speed of dropped hearts
    pub heart_fall_speed: f32,
    /// Mini balls are this fraction of the main ball's size
    pub mini_ball_scale: f32,
    /// Ball hits an extra paddle soaks before despawning
    pub extra_paddle_max_hits: u8,
    /// Bounces past the activation baseline before the camera lets go
    pub camera_follow_hit_span: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ball_speed: 250.0,
            paddle_speed: 300.0,
            brick_rows: 7,
            bricks_per_row: 8,
            start_lives: 3,
            max_lives: 4,
            heart_fall_speed: 100.0,
            mini_ball_scale: 0.75,
            extra_paddle_max_hits: 4,
            camera_follow_hit_span: 4,
        }
    }
}

impl Tuning {
    /// Load from a JSON file; unspecified fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load, falling back to defaults (with a log line) on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("loaded tuning from {}", path.display());
                tuning
            }
            Err(err) => {
                log::warn!("using default tuning: {err}");
                Self::default()
            }
        }
    }
}
