//! Paper Toss - a 2D physics paper-ball toss game
//!
//! Core modules:
//! - `sim`: Fixed-step clock, rigid-body world, contact dispatch
//! - `actor`: Polymorphic game objects bound to physics bodies
//! - `scene`: Layered update/draw ordering
//! - `level`: Prop descriptors, level files, type -> actor mapping
//! - `stage`: The running stage context that ties everything together
//! - `camera`: Smoothed camera follow driven by actor positions
//! - `assets`, `render`, `audio`: Narrow interfaces to external collaborators

pub mod actor;
pub mod assets;
pub mod audio;
pub mod camera;
pub mod level;
pub mod render;
pub mod scene;
pub mod settings;
pub mod sim;
pub mod stage;

pub use settings::Settings;
pub use stage::Stage;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const FIXED_STEP: f32 = 1.0 / 60.0;
    /// Largest frame delta fed into the accumulator (prevents spiral of death)
    pub const MAX_FRAME_DELTA: f32 = 0.25;

    /// Display units -> simulation units
    pub const SCALE: f32 = 0.01;
    /// Simulation units -> display units
    pub const SCALE_INV: f32 = 1.0 / SCALE;

    /// Display distance travelled before a new trajectory sample is recorded
    pub const TRACE_THRESHOLD: f32 = 25.0;
    /// Length of a drawn trajectory tick (display units)
    pub const TRACE_LENGTH: f32 = 10.0;

    /// Default world gravity (simulation units/s²)
    pub const GRAVITY: [f32; 2] = [0.0, -10.0];
}

/// Convert a simulation-space vector to display units
#[inline]
pub fn to_display(v: Vec2) -> Vec2 {
    v * consts::SCALE_INV
}

/// Convert a display-space vector to simulation units
#[inline]
pub fn to_simulation(v: Vec2) -> Vec2 {
    v * consts::SCALE
}

/// Angle of a vector in degrees, in [0, 360)
#[inline]
pub fn angle_degrees(v: Vec2) -> f32 {
    let deg = v.y.atan2(v.x).to_degrees();
    if deg < 0.0 { deg + 360.0 } else { deg }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_round_trip() {
        let display = Vec2::new(250.0, -40.0);
        let sim = to_simulation(display);
        assert!((sim.x - 2.5).abs() < 1e-6);
        assert!((sim.y + 0.4).abs() < 1e-6);
        assert!((to_display(sim) - display).length() < 1e-3);
    }

    #[test]
    fn test_angle_degrees() {
        assert!((angle_degrees(Vec2::X) - 0.0).abs() < 1e-4);
        assert!((angle_degrees(Vec2::Y) - 90.0).abs() < 1e-4);
        assert!((angle_degrees(-Vec2::Y) - 270.0).abs() < 1e-4);
    }
}
