//! Stage settings
//!
//! Loaded from a JSON file next to the levels; anything missing falls back
//! to the defaults below.

use std::fs;
use std::path::Path;

use anyhow::Context;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY;

/// Default bound on trajectory samples per actor
pub const DEFAULT_TRAIL_CAPACITY: usize = 512;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Simulation ===
    /// World gravity (simulation units/s²)
    pub gravity: Vec2,
    /// Seed for spawn jitter, throw spin and sound selection
    pub seed: u64,
    /// Trajectory samples kept per actor (`None` = unbounded)
    pub trail_capacity: Option<usize>,

    // === Debug ===
    /// Outline every fixture after the scene is drawn
    pub debug_info: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Paths ===
    /// Directory level names are resolved against
    pub levels_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: Vec2::from_array(GRAVITY),
            seed: 0x5eed,
            trail_capacity: Some(DEFAULT_TRAIL_CAPACITY),

            debug_info: false,

            master_volume: 0.8,
            sfx_volume: 1.0,

            levels_path: "levels".to_string(),
        }
    }
}

impl Settings {
    /// Volume applied to sound effects
    pub fn effective_sfx_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Resolve a level name against `levels_path`
    pub fn level_path(&self, name: &str) -> std::path::PathBuf {
        Path::new(&self.levels_path).join(name)
    }

    /// Read settings from a JSON file
    pub fn read(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("invalid settings {}", path.display()))
    }

    /// Read settings, falling back to defaults if the file is absent or bad
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({e:#})");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed to write settings {}", path.display()))?;
        log::info!("Settings saved");
        Ok(())
    }
}
