//! Renderer interface
//!
//! The core emits one sprite call per drawable actor plus line primitives
//! for trajectory and debug gizmos. Everything is in display units; pixel
//! formats, batching and shaders belong to the implementation.

use glam::{Vec2, Vec4};

use crate::assets::AssetHandle;
use crate::scene::Layer;

/// Half-transparent white used for trajectory ticks
pub const TRAIL_COLOR: Vec4 = Vec4::new(1.0, 1.0, 1.0, 0.5);
/// Fixture outlines in the debug pass
pub const DEBUG_COLOR: Vec4 = Vec4::new(0.2, 1.0, 0.3, 1.0);

/// A textured quad
#[derive(Debug, Clone)]
pub struct Sprite<'a> {
    pub texture: &'a AssetHandle,
    pub center: Vec2,
    /// Explicit size; `None` uses the texture's natural size
    pub size: Option<Vec2>,
    pub scale: f32,
    /// Rotation in degrees, counter-clockwise
    pub rotation: f32,
    pub tint: Vec4,
}

impl<'a> Sprite<'a> {
    pub fn new(texture: &'a AssetHandle, center: Vec2) -> Self {
        Self {
            texture,
            center,
            size: None,
            scale: 1.0,
            rotation: 0.0,
            tint: Vec4::ONE,
        }
    }

    pub fn sized(mut self, size: Vec2) -> Self {
        self.size = Some(size);
        self
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }
}

pub trait Renderer {
    /// Called before the actors of `layer` are drawn
    fn begin_layer(&mut self, _layer: Layer) {}

    fn draw_sprite(&mut self, sprite: &Sprite<'_>);

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Vec4);
}

/// Per-frame draw state handed to actors
pub struct DrawContext<'a> {
    pub renderer: &'a mut dyn Renderer,
    /// Camera center in display units
    pub camera: Vec2,
    pub zoom: f32,
}

impl<'a> DrawContext<'a> {
    pub fn new(renderer: &'a mut dyn Renderer, camera: Vec2, zoom: f32) -> Self {
        Self {
            renderer,
            camera,
            zoom,
        }
    }

    /// Closed polyline through `points`
    pub fn outline(&mut self, points: &[Vec2], color: Vec4) {
        for (i, &from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            self.renderer.draw_line(from, to, color);
        }
    }

    /// Circle approximated by `segments` lines
    pub fn circle(&mut self, center: Vec2, radius: f32, segments: usize, color: Vec4) {
        let points: Vec<Vec2> = (0..segments)
            .map(|i| {
                let theta = i as f32 / segments as f32 * std::f32::consts::TAU;
                center + Vec2::new(theta.cos(), theta.sin()) * radius
            })
            .collect();
        self.outline(&points, color);
    }
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Layer(Layer),
    Sprite {
        texture: String,
        center: Vec2,
        rotation: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
    },
}

/// Renderer that records calls instead of drawing (headless runs, tests)
#[derive(Debug, Default)]
pub struct CommandRecorder {
    pub commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sprites(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Sprite { texture, .. } => Some(texture.as_str()),
            _ => None,
        })
    }

    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Renderer for CommandRecorder {
    fn begin_layer(&mut self, layer: Layer) {
        self.commands.push(DrawCommand::Layer(layer));
    }

    fn draw_sprite(&mut self, sprite: &Sprite<'_>) {
        self.commands.push(DrawCommand::Sprite {
            texture: sprite.texture.path().to_string(),
            center: sprite.center,
            rotation: sprite.rotation,
        });
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, _color: Vec4) {
        self.commands.push(DrawCommand::Line { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_closes_polygon() {
        let mut recorder = CommandRecorder::new();
        let mut ctx = DrawContext::new(&mut recorder, Vec2::ZERO, 1.0);
        ctx.outline(&[Vec2::ZERO, Vec2::X, Vec2::Y], DEBUG_COLOR);
        assert_eq!(recorder.line_count(), 3);
        assert_eq!(
            recorder.commands[2],
            DrawCommand::Line {
                from: Vec2::Y,
                to: Vec2::ZERO
            }
        );
    }

    #[test]
    fn test_circle_segments() {
        let mut recorder = CommandRecorder::new();
        let mut ctx = DrawContext::new(&mut recorder, Vec2::ZERO, 1.0);
        ctx.circle(Vec2::new(5.0, 5.0), 2.0, 12, DEBUG_COLOR);
        assert_eq!(recorder.line_count(), 12);
    }
}
