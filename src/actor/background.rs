//! Parallax background
//!
//! No physics body. The texture is placed relative to the camera so distant
//! layers scroll slower than the world.

use glam::Vec2;

use super::{Actor, ActorKey, ActorKind, DrawContext, HitPeer, Lifecycle, Reactions};
use crate::assets::{AssetError, AssetHandle, AssetKind, AssetProvider};
use crate::level::props::{BG_DESERT, BG_DESERT_B};
use crate::level::{BackgroundProp, BuildContext, PropDescriptor, PropError};
use crate::render::Sprite;
use crate::sim::{Contact, SimulationWorld};

pub struct BackgroundActor {
    id: i32,
    prop: Option<PropDescriptor>,
    texture: AssetHandle,
    offset: Vec2,
    parallax: Vec2,
    scaled: f32,
    zoomed: f32,
    lifecycle: Lifecycle,
}

impl BackgroundActor {
    /// Only the stock backgrounds are known ahead of time; custom textures
    /// are queued by whoever wrote the level
    pub fn preload(assets: &mut dyn AssetProvider) {
        for texture in [BG_DESERT, BG_DESERT_B] {
            assets.load(texture, AssetKind::Texture);
        }
    }

    pub fn new(id: i32, settings: &BackgroundProp, assets: &dyn AssetProvider) -> Result<Self, AssetError> {
        Ok(Self {
            id,
            prop: None,
            texture: assets.get(&settings.background, AssetKind::Texture)?,
            offset: Vec2::new(settings.offset_x, settings.offset_y),
            parallax: Vec2::new(settings.parallax_x, settings.parallax_y),
            scaled: settings.scaled,
            zoomed: settings.zoomed,
            lifecycle: Lifecycle::Created,
        })
    }

    pub fn from_prop(prop: &PropDescriptor, ctx: &mut BuildContext<'_>) -> Result<Box<dyn Actor>, PropError> {
        let payload: BackgroundProp = ctx.payload(prop)?;
        let mut bg = Self::new(prop.id, &payload, ctx.assets)?;
        bg.prop = Some(prop.clone());
        Ok(Box::new(bg))
    }

    /// Where the texture is centered for a camera at `camera`
    pub fn placement(&self, camera: Vec2) -> Vec2 {
        self.offset + camera * (Vec2::ONE - self.parallax)
    }

    /// World-space scale at camera `zoom`. With `zoomed` = 0 the background
    /// keeps its on-screen size whatever the zoom.
    pub fn scale_at(&self, zoom: f32) -> f32 {
        self.scaled * (zoom + (1.0 - zoom) * self.zoomed)
    }
}

impl Actor for BackgroundActor {
    fn id(&self) -> i32 {
        self.id
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Background
    }

    fn prop(&self) -> Option<&PropDescriptor> {
        self.prop.as_ref()
    }

    fn attach(&mut self, _key: ActorKey, _world: &mut SimulationWorld) {
        self.lifecycle.activate();
    }

    fn update(&mut self, _world: &SimulationWorld, _dt: f32) {}

    fn draw(&self, _world: &SimulationWorld, ctx: &mut DrawContext<'_>) {
        let sprite = Sprite::new(&self.texture, self.placement(ctx.camera)).scaled(self.scale_at(ctx.zoom));
        ctx.renderer.draw_sprite(&sprite);
    }

    fn on_hit(&mut self, _other: Option<&HitPeer>, _contact: &Contact, _reactions: &mut Reactions) {}

    fn dispose(&mut self, _world: &mut SimulationWorld) {
        self.lifecycle.dispose("background");
    }

    fn position(&self, _world: &SimulationWorld) -> Vec2 {
        self.offset
    }

    fn set_position(&mut self, _world: &mut SimulationWorld, position: Vec2) {
        self.offset = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::PreloadedAssets;
    use crate::render::CommandRecorder;

    fn background(settings: &BackgroundProp) -> BackgroundActor {
        let mut assets = PreloadedAssets::new();
        BackgroundActor::preload(&mut assets);
        BackgroundActor::new(1, settings, &assets).unwrap()
    }

    #[test]
    fn test_parallax_placement() {
        let world_fixed = background(&BackgroundProp::default());
        assert_eq!(world_fixed.placement(Vec2::new(500.0, 100.0)), Vec2::ZERO);

        let distant = background(&BackgroundProp {
            offset_x: 10.0,
            parallax_x: 0.25,
            parallax_y: 0.0,
            ..Default::default()
        });
        assert_eq!(distant.placement(Vec2::new(400.0, 100.0)), Vec2::new(310.0, 100.0));
    }

    #[test]
    fn test_zoom_scaling() {
        let world_scaled = background(&BackgroundProp::default());
        assert!((world_scaled.scale_at(2.0) - 1.0).abs() < 1e-6);

        let screen_scaled = background(&BackgroundProp {
            scaled: 2.0,
            zoomed: 0.0,
            ..Default::default()
        });
        assert!((screen_scaled.scale_at(2.0) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_texture_is_error() {
        let assets = PreloadedAssets::new();
        let settings = BackgroundProp {
            background: "assets/forest.png".to_string(),
            ..Default::default()
        };
        assert!(BackgroundActor::new(1, &settings, &assets).is_err());
    }

    #[test]
    fn test_stock_backgrounds_are_preloaded() {
        for texture in [BG_DESERT, BG_DESERT_B] {
            let bg = background(&BackgroundProp {
                background: texture.to_string(),
                ..Default::default()
            });
            let mut recorder = CommandRecorder::new();
            bg.draw(&SimulationWorld::new(Vec2::ZERO), &mut DrawContext::new(&mut recorder, Vec2::ZERO, 1.0));
            assert_eq!(recorder.sprites().collect::<Vec<_>>(), vec![texture]);
        }
    }

    #[test]
    fn test_position_is_offset() {
        let mut world = SimulationWorld::new(Vec2::ZERO);
        let mut bg = background(&BackgroundProp::default());
        bg.set_position(&mut world, Vec2::new(3.0, 4.0));
        assert_eq!(bg.position(&world), Vec2::new(3.0, 4.0));
        bg.dispose(&mut world);
        bg.dispose(&mut world);
    }
}
