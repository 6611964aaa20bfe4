//! Turret: a static launcher paper balls are thrown from

use glam::Vec2;

use super::paper_ball::RADIUS as BALL_RADIUS;
use super::{Actor, ActorKey, ActorKind, BodyBinding, DrawContext, HitPeer, Launch, Reactions};
use crate::assets::{AssetError, AssetHandle, AssetKind, AssetProvider};
use crate::consts::SCALE;
use crate::level::{BuildContext, PropDescriptor, PropError, TurretProp};
use crate::render::Sprite;
use crate::sim::{BodyDef, Contact, FixtureDef, Material, Shape, SimulationWorld};
use crate::to_simulation;

pub const TURRET_TEXTURE: &str = "assets/turret.png";
pub const SOUND_METAL_HIT: &str = "assets/sounds/metalhit.ogg";

/// Gap between the turret rim and a freshly spawned ball (display units)
const MUZZLE_GAP: f32 = 5.0;

pub struct TurretActor {
    id: i32,
    prop: Option<PropDescriptor>,
    body: BodyBinding,
    texture: AssetHandle,
    impact_sounds: Vec<AssetHandle>,
    /// Display units
    radius: f32,
    /// Degrees, counter-clockwise from +x
    angle: f32,
    power: f32,
}

impl TurretActor {
    pub fn preload(assets: &mut dyn AssetProvider) {
        assets.load(TURRET_TEXTURE, AssetKind::Texture);
        assets.load(SOUND_METAL_HIT, AssetKind::Sound);
    }

    pub fn new(
        id: i32,
        settings: &TurretProp,
        world: &mut SimulationWorld,
        assets: &dyn AssetProvider,
    ) -> Result<Self, AssetError> {
        let texture = assets.get(TURRET_TEXTURE, AssetKind::Texture)?;
        let impact_sounds = vec![assets.get(SOUND_METAL_HIT, AssetKind::Sound)?];
        let radius = settings.radius.max(1.0);
        let body = BodyBinding::build(
            world,
            &BodyDef::fixed().at(to_simulation(Vec2::new(settings.x, settings.y))),
            &[FixtureDef::new(
                Shape::circle(radius * SCALE),
                Material {
                    density: 0.0,
                    friction: 0.4,
                    restitution: 0.3,
                },
            )],
        );
        Ok(Self {
            id,
            prop: None,
            body,
            texture,
            impact_sounds,
            radius,
            angle: settings.angle,
            power: settings.power,
        })
    }

    pub fn from_prop(prop: &PropDescriptor, ctx: &mut BuildContext<'_>) -> Result<Box<dyn Actor>, PropError> {
        let payload: TurretProp = ctx.payload(prop)?;
        let mut turret = Self::new(prop.id, &payload, ctx.world, ctx.assets)?;
        turret.prop = Some(prop.clone());
        Ok(Box::new(turret))
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Point the barrel at `degrees`
    pub fn aim(&mut self, degrees: f32) {
        self.angle = degrees.rem_euclid(360.0);
    }

    pub fn set_power(&mut self, power: f32) {
        self.power = power.max(0.0);
    }

    fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.angle.to_radians())
    }
}

impl Actor for TurretActor {
    fn id(&self) -> i32 {
        self.id
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Turret
    }

    fn prop(&self) -> Option<&PropDescriptor> {
        self.prop.as_ref()
    }

    fn attach(&mut self, key: ActorKey, world: &mut SimulationWorld) {
        self.body.attach(key, world);
    }

    fn update(&mut self, _world: &SimulationWorld, _dt: f32) {}

    fn draw(&self, world: &SimulationWorld, ctx: &mut DrawContext<'_>) {
        let sprite = Sprite::new(&self.texture, self.body.position(world))
            .sized(Vec2::splat(self.radius * 2.0))
            .rotated(self.angle);
        ctx.renderer.draw_sprite(&sprite);
    }

    fn on_hit(&mut self, _other: Option<&HitPeer>, _contact: &Contact, reactions: &mut Reactions) {
        reactions.play_own_impact_sound();
    }

    fn dispose(&mut self, world: &mut SimulationWorld) {
        self.body.release(world, "turret");
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

    fn launch(&self, world: &SimulationWorld) -> Option<Launch> {
        if self.body.is_disposed() {
            return None;
        }
        let direction = self.direction();
        let reach = self.radius + BALL_RADIUS + MUZZLE_GAP;
        Some(Launch {
            origin: self.body.position(world) + direction * reach,
            force: direction * self.power,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::PreloadedAssets;
    use slotmap::SlotMap;

    fn turret(world: &mut SimulationWorld, prop: &TurretProp) -> TurretActor {
        let mut assets = PreloadedAssets::new();
        TurretActor::preload(&mut assets);
        TurretActor::new(4, prop, world, &assets).unwrap()
    }

    #[test]
    fn test_launch_clears_the_barrel() {
        let mut world = SimulationWorld::new(Vec2::ZERO);
        let prop = TurretProp {
            x: 100.0,
            y: 50.0,
            radius: 40.0,
            angle: 0.0,
            power: 300.0,
        };
        let t = turret(&mut world, &prop);
        let launch = t.launch(&world).unwrap();
        assert!((launch.origin - Vec2::new(165.0, 50.0)).length() < 1e-3);
        assert!((launch.force - Vec2::new(300.0, 0.0)).length() < 1e-3);
        // Spawned ball must not overlap the turret
        assert!(launch.origin.distance(t.position(&world)) > prop.radius + BALL_RADIUS);
    }

    #[test]
    fn test_aim_wraps() {
        let mut world = SimulationWorld::new(Vec2::ZERO);
        let mut t = turret(&mut world, &TurretProp::default());
        t.aim(450.0);
        assert!((t.angle() - 90.0).abs() < 1e-4);
        let force = t.launch(&world).unwrap().force;
        assert!(force.x.abs() < 1e-3 && force.y > 0.0);
        t.aim(-90.0);
        assert!((t.angle() - 270.0).abs() < 1e-4);
    }

    #[test]
    fn test_struck_turret_plays_its_sound() {
        let mut keys: SlotMap<ActorKey, ()> = SlotMap::with_key();
        let own_key = keys.insert(());
        let ball = HitPeer {
            key: keys.insert(()),
            id: -1,
            kind: ActorKind::PaperBall,
            trigger: None,
        };
        let mut world = SimulationWorld::new(Vec2::ZERO);
        let mut t = turret(&mut world, &TurretProp::default());
        let fixture = t.body.fixture(0).unwrap();

        let mut reactions = Reactions::default();
        reactions.bind(own_key);
        t.on_hit(Some(&ball), &Contact::new(fixture, fixture, false), &mut reactions);
        assert_eq!(reactions.impact_sounds(), &[own_key]);
    }

    #[test]
    fn test_disposed_turret_cannot_launch() {
        let mut world = SimulationWorld::new(Vec2::ZERO);
        let mut t = turret(&mut world, &TurretProp::default());
        t.dispose(&mut world);
        assert!(t.launch(&world).is_none());
    }
}
