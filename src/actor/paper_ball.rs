//! Paper ball projectile
//!
//! A dynamic circle that records its flight path, vanishes when it lands in
//! a dustbin's trigger region and knocks a sound out of whatever obstacle it
//! hits.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{
    Actor, ActorKey, ActorKind, BodyBinding, DrawContext, HitPeer, Reactions, Trajectory,
};
use crate::assets::{AssetError, AssetHandle, AssetKind, AssetProvider};
use crate::consts::{SCALE, TRACE_THRESHOLD};
use crate::level::{BuildContext, PaperBallProp, PropDescriptor, PropError};
use crate::render::Sprite;
use crate::sim::{BodyDef, Contact, FixtureDef, Material, Shape, SimulationWorld};
use crate::to_simulation;

pub const PAPERBALL_TEXTURE: &str = "assets/paperball.png";
pub const SOUND_PAPERHIT: &str = "assets/sounds/paperhit.ogg";

/// Collision radius (display units)
pub const RADIUS: f32 = 20.0;
/// Drawn sprite edge (display units)
pub const SPRITE_SIZE: f32 = 50.0;

pub const MATERIAL: Material = Material {
    density: 5.0,
    friction: 0.35,
    restitution: 0.4,
};

pub struct PaperBallActor {
    id: i32,
    prop: Option<PropDescriptor>,
    body: BodyBinding,
    sprite: AssetHandle,
    impact_sounds: Vec<AssetHandle>,
    trajectory: Trajectory,
}

impl PaperBallActor {
    pub fn preload(assets: &mut dyn AssetProvider) {
        assets.load(PAPERBALL_TEXTURE, AssetKind::Texture);
        assets.load(SOUND_PAPERHIT, AssetKind::Sound);
    }

    /// Create a ball. Without a position it is dropped at a random spot in
    /// the unit square around the simulation origin.
    pub fn new(
        id: i32,
        position: Option<Vec2>,
        world: &mut SimulationWorld,
        assets: &dyn AssetProvider,
        rng: &mut Pcg32,
        trail_capacity: Option<usize>,
    ) -> Result<Self, AssetError> {
        let sprite = assets.get(PAPERBALL_TEXTURE, AssetKind::Texture)?;
        let impact_sounds = vec![assets.get(SOUND_PAPERHIT, AssetKind::Sound)?];

        let start = match position {
            Some(display) => to_simulation(display),
            None => Vec2::new(rng.random::<f32>(), rng.random::<f32>()),
        };
        let body = BodyBinding::build(
            world,
            &BodyDef::dynamic()
                .at(start)
                .with_fixed_rotation(true)
                .with_bullet(true),
            &[FixtureDef::new(Shape::circle(RADIUS * SCALE), MATERIAL)],
        );

        Ok(Self {
            id,
            prop: None,
            body,
            sprite,
            impact_sounds,
            trajectory: Trajectory::new(TRACE_THRESHOLD, trail_capacity),
        })
    }

    pub fn from_prop(prop: &PropDescriptor, ctx: &mut BuildContext<'_>) -> Result<Box<dyn Actor>, PropError> {
        let payload: PaperBallProp = ctx.payload(prop)?;
        let position = match (payload.x, payload.y) {
            (Some(x), Some(y)) => Some(Vec2::new(x, y)),
            _ => None,
        };
        let mut ball = Self::new(
            prop.id,
            position,
            ctx.world,
            ctx.assets,
            ctx.rng,
            ctx.settings.trail_capacity,
        )?;
        ball.prop = Some(prop.clone());
        Ok(Box::new(ball))
    }

    /// Throw the ball: spin it to a random angle, then push it through its
    /// center of mass for one step
    pub fn apply_force(&mut self, world: &mut SimulationWorld, rng: &mut Pcg32, force: Vec2) {
        if self.body.is_disposed() {
            return;
        }
        let body = self.body.body();
        let spin = rng.random_range(0.0..TAU);
        world.set_transform(body, world.position(body), spin);
        world.apply_force_to_center(body, force);
    }

    pub fn body(&self) -> &BodyBinding {
        &self.body
    }
}

impl Actor for PaperBallActor {
    fn id(&self) -> i32 {
        self.id
    }

    fn kind(&self) -> ActorKind {
        ActorKind::PaperBall
    }

    fn prop(&self) -> Option<&PropDescriptor> {
        self.prop.as_ref()
    }

    fn attach(&mut self, key: ActorKey, world: &mut SimulationWorld) {
        self.body.attach(key, world);
    }

    fn update(&mut self, world: &SimulationWorld, _dt: f32) {
        if self.body.is_disposed() {
            return;
        }
        self.trajectory
            .record(self.body.position(world), self.body.heading_degrees(world));
    }

    fn draw(&self, world: &SimulationWorld, ctx: &mut DrawContext<'_>) {
        self.trajectory.draw(ctx);
        let sprite = Sprite::new(&self.sprite, self.body.position(world))
            .sized(Vec2::splat(SPRITE_SIZE))
            .rotated(self.body.rotation_degrees(world));
        ctx.renderer.draw_sprite(&sprite);
    }

    fn on_hit(&mut self, other: Option<&HitPeer>, contact: &Contact, reactions: &mut Reactions) {
        let Some(other) = other else {
            return;
        };

        // Only the bin's trigger region swallows the ball, not its walls
        if other.kind.is_sink() && other.trigger.is_some_and(|f| contact.involves(f)) {
            log::debug!("paper ball {} landed in bin {}", self.id, other.id);
            reactions.remove_self();
        }

        if other.kind.is_obstacle() {
            reactions.play_impact_sound(other.key);
        }
    }

    fn dispose(&mut self, world: &mut SimulationWorld) {
        self.body.release(world, "paper ball");
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

    fn trajectory(&self) -> Option<&Trajectory> {
        Some(&self.trajectory)
    }
}
