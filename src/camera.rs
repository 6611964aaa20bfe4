//! Camera follow
//!
//! Tracks one actor through the stage's position getter with exponential
//! smoothing. Zoom follows the usual 2D convention: larger values show more
//! of the world.

use glam::Vec2;

use crate::actor::ActorKey;
use crate::stage::Stage;

pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 4.0;

#[derive(Debug, Clone)]
pub struct CameraController {
    /// Camera center in display units
    pub position: Vec2,
    pub zoom: f32,
    /// Added to the target position (e.g. look slightly ahead)
    pub offset: Vec2,
    /// Catch-up rate in 1/s; higher is snappier
    pub smoothing: f32,
    target: Option<ActorKey>,
    target_zoom: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            offset: Vec2::ZERO,
            smoothing: 5.0,
            target: None,
            target_zoom: 1.0,
        }
    }
}

impl CameraController {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn follow(&mut self, target: ActorKey) {
        self.target = Some(target);
    }

    pub fn unfollow(&mut self) {
        self.target = None;
    }

    pub fn target(&self) -> Option<ActorKey> {
        self.target
    }

    pub fn zoom_to(&mut self, zoom: f32) {
        self.target_zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Move toward the target. A target that no longer exists is dropped and
    /// the camera stays where it is.
    pub fn update(&mut self, stage: &Stage, dt: f32) {
        let t = 1.0 - (-self.smoothing * dt.max(0.0)).exp();

        if let Some(key) = self.target {
            match stage.position(key) {
                Some(position) => self.position = self.position.lerp(position + self.offset, t),
                None => {
                    log::debug!("camera target {key:?} is gone");
                    self.target = None;
                }
            }
        }
        self.zoom += (self.target_zoom - self.zoom) * t;
    }
}
