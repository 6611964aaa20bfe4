//! Title logo: decorative, gently bobbing, no body

use std::f32::consts::TAU;

use glam::Vec2;

use super::{Actor, ActorKey, ActorKind, DrawContext, HitPeer, Lifecycle, Reactions};
use crate::assets::{AssetError, AssetHandle, AssetKind, AssetProvider};
use crate::level::{BuildContext, GameLogoProp, PropDescriptor, PropError};
use crate::render::Sprite;
use crate::sim::{Contact, SimulationWorld};

pub const LOGO_TEXTURE: &str = "assets/logo.png";

/// Bob amplitude (display units) and period (seconds)
const BOB_AMPLITUDE: f32 = 6.0;
const BOB_PERIOD: f32 = 2.5;

pub struct GameLogoActor {
    id: i32,
    prop: Option<PropDescriptor>,
    texture: AssetHandle,
    anchor: Vec2,
    elapsed: f32,
    lifecycle: Lifecycle,
}

impl GameLogoActor {
    pub fn preload(assets: &mut dyn AssetProvider) {
        assets.load(LOGO_TEXTURE, AssetKind::Texture);
    }

    pub fn new(id: i32, anchor: Vec2, assets: &dyn AssetProvider) -> Result<Self, AssetError> {
        Ok(Self {
            id,
            prop: None,
            texture: assets.get(LOGO_TEXTURE, AssetKind::Texture)?,
            anchor,
            elapsed: 0.0,
            lifecycle: Lifecycle::Created,
        })
    }

    pub fn from_prop(prop: &PropDescriptor, ctx: &mut BuildContext<'_>) -> Result<Box<dyn Actor>, PropError> {
        let payload: GameLogoProp = ctx.payload(prop)?;
        let mut logo = Self::new(prop.id, Vec2::new(payload.x, payload.y), ctx.assets)?;
        logo.prop = Some(prop.clone());
        Ok(Box::new(logo))
    }

    fn bob(&self) -> f32 {
        (self.elapsed / BOB_PERIOD * TAU).sin() * BOB_AMPLITUDE
    }
}

impl Actor for GameLogoActor {
    fn id(&self) -> i32 {
        self.id
    }

    fn kind(&self) -> ActorKind {
        ActorKind::GameLogo
    }

    fn prop(&self) -> Option<&PropDescriptor> {
        self.prop.as_ref()
    }

    fn attach(&mut self, _key: ActorKey, _world: &mut SimulationWorld) {
        self.lifecycle.activate();
    }

    fn update(&mut self, _world: &SimulationWorld, dt: f32) {
        self.elapsed = (self.elapsed + dt) % BOB_PERIOD;
    }

    fn draw(&self, _world: &SimulationWorld, ctx: &mut DrawContext<'_>) {
        let center = self.anchor + Vec2::new(0.0, self.bob());
        ctx.renderer.draw_sprite(&Sprite::new(&self.texture, center));
    }

    fn on_hit(&mut self, _other: Option<&HitPeer>, _contact: &Contact, _reactions: &mut Reactions) {}

    fn dispose(&mut self, _world: &mut SimulationWorld) {
        self.lifecycle.dispose("game logo");
    }

    fn position(&self, _world: &SimulationWorld) -> Vec2 {
        self.anchor
    }

    fn set_position(&mut self, _world: &mut SimulationWorld, position: Vec2) {
        self.anchor = position;
    }
}
