//! Static ground strip the rest of the level stands on

use glam::Vec2;

use super::{Actor, ActorKey, ActorKind, BodyBinding, DrawContext, HitPeer, Reactions};
use crate::assets::{AssetError, AssetHandle, AssetKind, AssetProvider};
use crate::level::{BuildContext, GroundProp, PropDescriptor, PropError};
use crate::render::Sprite;
use crate::sim::{BodyDef, Contact, FixtureDef, Material, Shape, SimulationWorld};
use crate::to_display;

pub const HILL_TEXTURE: &str = "assets/hill.png";
pub const SOUND_WOOD_BOUNCE: &str = "assets/sounds/woodbounce.ogg";

/// Half extents of the ground box (simulation units)
pub const HALF_EXTENTS: Vec2 = Vec2::new(100.0, 0.2);
/// Center of the ground box (simulation units); its top edge sits at y = -1.6
pub const CENTER: Vec2 = Vec2::new(0.0, -1.8);

const MATERIAL: Material = Material {
    density: 0.0,
    friction: 0.6,
    restitution: 0.1,
};

pub struct GroundActor {
    id: i32,
    prop: Option<PropDescriptor>,
    body: BodyBinding,
    hill: AssetHandle,
    impact_sounds: Vec<AssetHandle>,
}

impl GroundActor {
    pub fn preload(assets: &mut dyn AssetProvider) {
        assets.load(HILL_TEXTURE, AssetKind::Texture);
        assets.load(SOUND_WOOD_BOUNCE, AssetKind::Sound);
    }

    pub fn new(id: i32, world: &mut SimulationWorld, assets: &dyn AssetProvider) -> Result<Self, AssetError> {
        let hill = assets.get(HILL_TEXTURE, AssetKind::Texture)?;
        let impact_sounds = vec![assets.get(SOUND_WOOD_BOUNCE, AssetKind::Sound)?];
        let body = BodyBinding::build(
            world,
            &BodyDef::fixed().at(CENTER),
            &[FixtureDef::new(Shape::rect(HALF_EXTENTS.x, HALF_EXTENTS.y), MATERIAL)],
        );
        Ok(Self {
            id,
            prop: None,
            body,
            hill,
            impact_sounds,
        })
    }

    pub fn from_prop(prop: &PropDescriptor, ctx: &mut BuildContext<'_>) -> Result<Box<dyn Actor>, PropError> {
        let _: GroundProp = ctx.payload(prop)?;
        let mut ground = Self::new(prop.id, ctx.world, ctx.assets)?;
        ground.prop = Some(prop.clone());
        Ok(Box::new(ground))
    }

    /// Top edge of the ground in display units
    pub fn surface(&self, world: &SimulationWorld) -> f32 {
        to_display(world.position(self.body.body()) + Vec2::new(0.0, HALF_EXTENTS.y)).y
    }
}

impl Actor for GroundActor {
    fn id(&self) -> i32 {
        self.id
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Ground
    }

    fn prop(&self) -> Option<&PropDescriptor> {
        self.prop.as_ref()
    }

    fn attach(&mut self, key: ActorKey, world: &mut SimulationWorld) {
        self.body.attach(key, world);
    }

    fn update(&mut self, _world: &SimulationWorld, _dt: f32) {}

    fn draw(&self, world: &SimulationWorld, ctx: &mut DrawContext<'_>) {
        // The hill sits on the surface, centered under the camera
        let surface = self.surface(world);
        let sprite = Sprite::new(&self.hill, Vec2::new(ctx.camera.x, surface));
        ctx.renderer.draw_sprite(&sprite);
    }

    fn on_hit(&mut self, _other: Option<&HitPeer>, _contact: &Contact, reactions: &mut Reactions) {
        reactions.play_own_impact_sound();
    }

    fn dispose(&mut self, world: &mut SimulationWorld) {
        self.body.release(world, "ground");
    }

    fn position(&self, world: &SimulationWorld) -> Vec2 {
        self.body.position(world)
    }

    fn set_position(&mut self, world: &mut SimulationWorld, position: Vec2) {
        self.body.set_position(world, position);
    }

    fn impact_sounds(&self) -> &[AssetHandle] {
        &self.impact_sounds
    }
}
