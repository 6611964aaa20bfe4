//! Dustbin: the target
//!
//! Three solid walls around a sensor region. Balls bounce off the walls; a
//! ball that touches the sensor is inside the bin.

use glam::Vec2;

use super::{Actor, ActorKey, ActorKind, BodyBinding, DrawContext, HitPeer, Reactions};
use crate::assets::{AssetError, AssetHandle, AssetKind, AssetProvider};
use crate::level::{BuildContext, DustbinProp, PropDescriptor, PropError};
use crate::render::Sprite;
use crate::sim::{BodyDef, Contact, FixtureDef, FixtureHandle, Material, Shape, SimulationWorld};
use crate::to_simulation;

pub const BIN_TEXTURE: &str = "assets/dbin.png";
pub const BIN_BACK_TEXTURE: &str = "assets/dbinbg.png";

/// Bin hit variations, one picked at random per impact
pub const BIN_SOUNDS: [&str; 5] = [
    "assets/sounds/binhit1.ogg",
    "assets/sounds/binhit2.ogg",
    "assets/sounds/binhit3.ogg",
    "assets/sounds/binhit4.ogg",
    "assets/sounds/binhit5.ogg",
];

// Simulation units
const HALF_WIDTH: f32 = 0.3;
const HALF_HEIGHT: f32 = 0.4;
const WALL: f32 = 0.03;

const MATERIAL: Material = Material {
    density: 0.0,
    friction: 0.5,
    restitution: 0.2,
};

/// Index of the sensor among the bin's fixtures
const TRIGGER: usize = 3;

pub struct DustbinActor {
    id: i32,
    prop: Option<PropDescriptor>,
    body: BodyBinding,
    front: AssetHandle,
    back: AssetHandle,
    impact_sounds: Vec<AssetHandle>,
    swallowed: u32,
}

impl DustbinActor {
    pub fn preload(assets: &mut dyn AssetProvider) {
        assets.load(BIN_TEXTURE, AssetKind::Texture);
        assets.load(BIN_BACK_TEXTURE, AssetKind::Texture);
        for sound in BIN_SOUNDS {
            assets.load(sound, AssetKind::Sound);
        }
    }

    /// Build a bin whose body origin is at `position` (display units)
    pub fn new(
        id: i32,
        position: Vec2,
        world: &mut SimulationWorld,
        assets: &dyn AssetProvider,
    ) -> Result<Self, AssetError> {
        let front = assets.get(BIN_TEXTURE, AssetKind::Texture)?;
        let back = assets.get(BIN_BACK_TEXTURE, AssetKind::Texture)?;
        let impact_sounds = assets.get_all(&BIN_SOUNDS, AssetKind::Sound)?;

        let wall_x = HALF_WIDTH - WALL;
        let floor_y = -HALF_HEIGHT + WALL;
        let fixtures = [
            FixtureDef::new(Shape::rect_at(WALL, HALF_HEIGHT, Vec2::new(-wall_x, 0.0)), MATERIAL),
            FixtureDef::new(Shape::rect_at(WALL, HALF_HEIGHT, Vec2::new(wall_x, 0.0)), MATERIAL),
            FixtureDef::new(Shape::rect_at(HALF_WIDTH, WALL, Vec2::new(0.0, floor_y)), MATERIAL),
            // Lower half of the opening, so grazing the rim doesn't count
            FixtureDef::new(
                Shape::rect_at(wall_x - WALL, HALF_HEIGHT * 0.4, Vec2::new(0.0, -HALF_HEIGHT * 0.4)),
                Material::default(),
            )
            .sensor(),
        ];
        let body = BodyBinding::build(world, &BodyDef::fixed().at(to_simulation(position)), &fixtures);

        Ok(Self {
            id,
            prop: None,
            body,
            front,
            back,
            impact_sounds,
            swallowed: 0,
        })
    }

    pub fn from_prop(prop: &PropDescriptor, ctx: &mut BuildContext<'_>) -> Result<Box<dyn Actor>, PropError> {
        let payload: DustbinProp = ctx.payload(prop)?;
        let mut bin = Self::new(prop.id, Vec2::new(payload.x, payload.y), ctx.world, ctx.assets)?;
        bin.prop = Some(prop.clone());
        Ok(Box::new(bin))
    }

    /// Projectiles that have entered the trigger region so far
    pub fn swallowed(&self) -> u32 {
        self.swallowed
    }
}

impl Actor for DustbinActor {
    fn id(&self) -> i32 {
        self.id
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Dustbin
    }

    fn prop(&self) -> Option<&PropDescriptor> {
        self.prop.as_ref()
    }

    fn attach(&mut self, key: ActorKey, world: &mut SimulationWorld) {
        self.body.attach(key, world);
    }

    fn update(&mut self, _world: &SimulationWorld, _dt: f32) {}

    fn draw(&self, world: &SimulationWorld, ctx: &mut DrawContext<'_>) {
        let center = self.body.position(world);
        ctx.renderer.draw_sprite(&Sprite::new(&self.back, center));
        ctx.renderer.draw_sprite(&Sprite::new(&self.front, center));
    }

    fn on_hit(&mut self, other: Option<&HitPeer>, contact: &Contact, reactions: &mut Reactions) {
        reactions.play_own_impact_sound();
        let Some(other) = other else {
            return;
        };
        if other.kind.is_projectile() && self.trigger_fixture().is_some_and(|f| contact.involves(f)) {
            self.swallowed += 1;
            log::info!("bin {} caught paper ball {} ({} total)", self.id, other.id, self.swallowed);
        }
    }

    fn dispose(&mut self, world: &mut SimulationWorld) {
        self.body.release(world, "dustbin");
    }

    fn position(&self, world: &SimulationWorld) -> Vec2 {
        self.body.position(world)
    }

    fn set_position(&mut self, world: &mut SimulationWorld, position: Vec2) {
        self.body.set_position(world, position);
    }

    fn trigger_fixture(&self) -> Option<FixtureHandle> {
        if self.body.is_disposed() {
            return None;
        }
        self.body.fixture(TRIGGER)
    }

    fn impact_sounds(&self) -> &[AssetHandle] {
        &self.impact_sounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::PreloadedAssets;
    use crate::sim::ContactPhase;
    use slotmap::SlotMap;

    fn bin(world: &mut SimulationWorld, position: Vec2) -> DustbinActor {
        let mut assets = PreloadedAssets::new();
        DustbinActor::preload(&mut assets);
        DustbinActor::new(3, position, world, &assets).unwrap()
    }

    #[test]
    fn test_all_hit_sounds_loaded() {
        let mut world = SimulationWorld::new(Vec2::ZERO);
        let b = bin(&mut world, Vec2::ZERO);
        assert_eq!(b.impact_sounds().len(), BIN_SOUNDS.len());
        assert_eq!(world.fixture_count(), 4);
    }

    #[test]
    fn test_missing_sound_is_error() {
        let mut world = SimulationWorld::new(Vec2::ZERO);
        let mut assets = PreloadedAssets::new();
        assets.load(BIN_TEXTURE, AssetKind::Texture);
        assets.load(BIN_BACK_TEXTURE, AssetKind::Texture);
        assert!(DustbinActor::new(1, Vec2::ZERO, &mut world, &assets).is_err());
    }

    #[test]
    fn test_ball_dropped_in_reaches_trigger() {
        let mut world = SimulationWorld::new(Vec2::new(0.0, -10.0));
        let b = bin(&mut world, Vec2::new(200.0, 0.0));
        let trigger = b.trigger_fixture().unwrap();

        let ball = world.create_body(&BodyDef::dynamic().at(Vec2::new(2.0, 0.6)));
        world.create_fixture(ball, &FixtureDef::new(Shape::circle(0.1), Material::default()));

        let mut entered = false;
        for _ in 0..120 {
            entered |= world
                .step(1.0 / 60.0)
                .iter()
                .any(|e| e.phase == ContactPhase::Begin && e.contact.involves(trigger));
        }
        assert!(entered);
        // Resting on the floor, inside the walls
        let rest = world.position(ball);
        assert!((rest.x - 2.0).abs() < HALF_WIDTH);
        assert!(rest.y < 0.0);
    }

    #[test]
    fn test_caught_ball_is_counted_and_heard() {
        let mut keys: SlotMap<ActorKey, ()> = SlotMap::with_key();
        let own_key = keys.insert(());
        let ball = HitPeer {
            key: keys.insert(()),
            id: -1,
            kind: ActorKind::PaperBall,
            trigger: None,
        };
        let mut world = SimulationWorld::new(Vec2::ZERO);
        let mut b = bin(&mut world, Vec2::ZERO);
        let trigger = b.trigger_fixture().unwrap();
        let wall = b.body.fixture(0).unwrap();

        let mut reactions = Reactions::default();
        reactions.bind(own_key);
        b.on_hit(Some(&ball), &Contact::new(wall, wall, false), &mut reactions);
        assert_eq!(b.swallowed(), 0);
        b.on_hit(Some(&ball), &Contact::new(trigger, trigger, true), &mut reactions);
        assert_eq!(b.swallowed(), 1);
        assert_eq!(reactions.impact_sounds(), &[own_key]);

        // Unowned geometry still makes the bin ring
        let mut reactions = Reactions::default();
        reactions.bind(own_key);
        b.on_hit(None, &Contact::new(wall, wall, false), &mut reactions);
        assert_eq!(reactions.impact_sounds(), &[own_key]);
        assert_eq!(b.swallowed(), 1);
    }

    #[test]
    fn test_disposed_bin_has_no_trigger() {
        let mut world = SimulationWorld::new(Vec2::ZERO);
        let mut b = bin(&mut world, Vec2::ZERO);
        assert!(b.trigger_fixture().is_some());
        b.dispose(&mut world);
        assert!(b.trigger_fixture().is_none());
    }
}
