//! Audio output interface
//!
//! The core only ever asks to play a preloaded sound at some volume.

use crate::assets::AssetHandle;

pub trait AudioSink {
    /// Play `sound` once; `volume` is in 0.0 - 1.0
    fn play(&mut self, sound: &AssetHandle, volume: f32);
}

/// Discards everything
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _sound: &AssetHandle, _volume: f32) {}
}

/// Remembers what was played (headless runs, tests)
#[derive(Debug, Default)]
pub struct AudioLog {
    pub played: Vec<(String, f32)>,
    muted: bool,
}

impl AudioLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn count(&self, path: &str) -> usize {
        self.played.iter().filter(|(p, _)| p == path).count()
    }
}

impl AudioSink for AudioLog {
    fn play(&mut self, sound: &AssetHandle, volume: f32) {
        if self.muted {
            return;
        }
        log::trace!("play {} at {:.2}", sound.path(), volume);
        self.played.push((sound.path().to_string(), volume));
    }
}
