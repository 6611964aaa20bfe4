//! Typed payloads of the built-in prop types
//!
//! Positions and sizes are display units. Every field has a default so
//! sparse records still load.

use serde::{Deserialize, Serialize};

/// Default background texture
pub const BG_DESERT: &str = "assets/desert_a.png";
/// Alternate stock background
pub const BG_DESERT_B: &str = "assets/desert_b.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundProp {
    pub background: String,
    pub offset_x: f32,
    pub offset_y: f32,
    /// How strongly the layer follows the camera (0 = fixed to screen, 1 = world)
    pub parallax_x: f32,
    pub parallax_y: f32,
    pub scaled: f32,
    /// How much camera zoom affects this background (0 = none, 1 = fully)
    pub zoomed: f32,
}

impl Default for BackgroundProp {
    fn default() -> Self {
        Self {
            background: BG_DESERT.to_string(),
            offset_x: 0.0,
            offset_y: 0.0,
            parallax_x: 1.0,
            parallax_y: 1.0,
            scaled: 1.0,
            zoomed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundProp {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DustbinProp {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretProp {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Aim in degrees, counter-clockwise from +x
    pub angle: f32,
    /// Launch force in simulation units
    pub power: f32,
}

impl Default for TurretProp {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            radius: 40.0,
            angle: 45.0,
            power: 600.0,
        }
    }
}

/// `None` position means "drop near the world origin"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperBallProp {
    pub x: Option<f32>,
    pub y: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameLogoProp {
    pub x: f32,
    pub y: f32,
}
