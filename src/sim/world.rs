//! Rigid-body simulation world
//!
//! Wraps the rapier2d pipeline. Bodies and fixtures are referred to by
//! copyable handles; every fixture may carry the `ActorKey` of the actor that
//! owns it, which is how contact events find their way back to game objects.

use std::sync::Mutex;

use glam::Vec2;
use rapier2d::na::{Isometry2, Point2, Vector2};
use rapier2d::prelude::*;
use slotmap::{Key, KeyData};

use super::contact::{Contact, ContactEvent, ContactPhase};
use crate::actor::ActorKey;

fn to_na(v: Vec2) -> Vector2<f32> {
    Vector2::new(v.x, v.y)
}

fn from_na(v: &Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Actor keys are stored in collider user data; zero means "no actor"
fn encode_owner(owner: Option<ActorKey>) -> u128 {
    owner.map_or(0, |key| u128::from(key.data().as_ffi()))
}

fn decode_owner(user_data: u128) -> Option<ActorKey> {
    if user_data == 0 {
        return None;
    }
    let key = ActorKey::from(KeyData::from_ffi(user_data as u64));
    (!key.is_null()).then_some(key)
}

/// Handle to a rigid body owned by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// Handle to a fixture (collider) attached to a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixtureHandle(ColliderHandle);

/// Body simulation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Static,
    Dynamic,
}

/// Rigid body definition (simulation units, radians)
#[derive(Debug, Clone)]
pub struct BodyDef {
    pub body_type: BodyType,
    pub position: Vec2,
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub fixed_rotation: bool,
    pub bullet: bool,
}

impl BodyDef {
    pub fn dynamic() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            fixed_rotation: false,
            bullet: false,
        }
    }

    pub fn fixed() -> Self {
        Self {
            body_type: BodyType::Static,
            ..Self::dynamic()
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_bullet(mut self, bullet: bool) -> Self {
        self.bullet = bullet;
        self
    }
}

/// Collision shape in body-local simulation units
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Box { half_extents: Vec2, center: Vec2 },
    Polygon { points: Vec<Vec2> },
}

impl Shape {
    /// Circle centered on the body origin
    pub fn circle(radius: f32) -> Self {
        assert!(radius > 0.0, "circle radius must be positive, got {radius}");
        Shape::Circle { radius }
    }

    /// Axis-aligned box centered on the body origin
    pub fn rect(half_width: f32, half_height: f32) -> Self {
        Self::rect_at(half_width, half_height, Vec2::ZERO)
    }

    /// Axis-aligned box offset from the body origin
    pub fn rect_at(half_width: f32, half_height: f32, center: Vec2) -> Self {
        assert!(
            half_width > 0.0 && half_height > 0.0,
            "box extents must be positive, got {half_width}x{half_height}"
        );
        Shape::Box {
            half_extents: Vec2::new(half_width, half_height),
            center,
        }
    }

    /// Convex polygon; at least three points are required
    pub fn polygon(points: Vec<Vec2>) -> Self {
        assert!(points.len() >= 3, "polygon needs at least 3 points, got {}", points.len());
        Shape::Polygon { points }
    }

    fn builder(&self) -> ColliderBuilder {
        match self {
            Shape::Circle { radius } => ColliderBuilder::ball(*radius),
            Shape::Box { half_extents, center } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y)
                    .translation(to_na(*center))
            }
            Shape::Polygon { points } => {
                let hull: Vec<Point2<f32>> = points.iter().map(|p| Point2::new(p.x, p.y)).collect();
                match ColliderBuilder::convex_hull(&hull) {
                    Some(builder) => builder,
                    None => panic!("degenerate polygon: {points:?}"),
                }
            }
        }
    }
}

/// Physical surface material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.2,
            restitution: 0.0,
        }
    }
}

/// Fixture definition
#[derive(Debug, Clone)]
pub struct FixtureDef {
    pub shape: Shape,
    pub material: Material,
    /// Sensors report contacts but produce no physical response
    pub sensor: bool,
    pub owner: Option<ActorKey>,
}

impl FixtureDef {
    pub fn new(shape: Shape, material: Material) -> Self {
        Self {
            shape,
            material,
            sensor: false,
            owner: None,
        }
    }

    pub fn sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    pub fn owned_by(mut self, owner: ActorKey) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// World-space outline of a fixture, for debug drawing
#[derive(Debug, Clone)]
pub enum FixtureOutline {
    Circle { center: Vec2, radius: f32 },
    Polygon { points: Vec<Vec2> },
}

/// Collects collision events raised during a pipeline step
struct EventCollector {
    events: Mutex<Vec<CollisionEvent>>,
}

impl EventCollector {
    fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn drain(&self) -> Vec<CollisionEvent> {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *events)
    }
}

impl EventHandler for EventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

/// Owns every rigid body and fixture in the running stage
pub struct SimulationWorld {
    gravity: Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    collector: EventCollector,
    /// Bodies with a one-step force applied; cleared after the next step
    pending_forces: Vec<RigidBodyHandle>,
}

impl SimulationWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            collector: EventCollector::new(),
            pending_forces: Vec::new(),
        }
    }

    pub fn gravity(&self) -> Vec2 {
        from_na(&self.gravity)
    }

    pub fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let body_type = match def.body_type {
            BodyType::Static => RigidBodyType::Fixed,
            BodyType::Dynamic => RigidBodyType::Dynamic,
        };
        let mut builder = RigidBodyBuilder::new(body_type)
            .translation(to_na(def.position))
            .rotation(def.angle)
            .linvel(to_na(def.linear_velocity))
            .ccd_enabled(def.bullet);
        if def.fixed_rotation {
            builder = builder.lock_rotations();
        }
        BodyHandle(self.bodies.insert(builder.build()))
    }

    /// Attach a fixture to an existing body.
    ///
    /// Panics if the body was already destroyed.
    pub fn create_fixture(&mut self, body: BodyHandle, def: &FixtureDef) -> FixtureHandle {
        assert!(self.bodies.contains(body.0), "fixture attached to a destroyed body");
        let collider = def
            .shape
            .builder()
            .density(def.material.density)
            .friction(def.material.friction)
            .restitution(def.material.restitution)
            .sensor(def.sensor)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .user_data(encode_owner(def.owner))
            .build();
        FixtureHandle(
            self.colliders
                .insert_with_parent(collider, body.0, &mut self.bodies),
        )
    }

    /// Remove a body and all of its fixtures. Returns false if it was already gone.
    pub fn destroy_body(&mut self, body: BodyHandle) -> bool {
        self.pending_forces.retain(|h| *h != body.0);
        self.bodies
            .remove(
                body.0,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn contains_body(&self, body: BodyHandle) -> bool {
        self.bodies.contains(body.0)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn fixture_count(&self) -> usize {
        self.colliders.len()
    }

    /// Actor that owns a fixture, if any
    pub fn fixture_owner(&self, fixture: FixtureHandle) -> Option<ActorKey> {
        self.colliders
            .get(fixture.0)
            .and_then(|c| decode_owner(c.user_data))
    }

    /// Re-point a fixture at a different owner (used when an actor is
    /// registered after its body was built)
    pub fn set_fixture_owner(&mut self, fixture: FixtureHandle, owner: Option<ActorKey>) {
        if let Some(collider) = self.colliders.get_mut(fixture.0) {
            collider.user_data = encode_owner(owner);
        }
    }

    /// Advance the simulation by `dt` and return the contact events it produced
    pub fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &self.collector,
        );

        for handle in self.pending_forces.drain(..) {
            if let Some(rb) = self.bodies.get_mut(handle) {
                rb.reset_forces(false);
            }
        }

        self.collector
            .drain()
            .into_iter()
            .map(|event| {
                let (a, b, phase) = match event {
                    CollisionEvent::Started(a, b, _) => (a, b, ContactPhase::Begin),
                    CollisionEvent::Stopped(a, b, _) => (a, b, ContactPhase::End),
                };
                ContactEvent {
                    phase,
                    contact: Contact::new(FixtureHandle(a), FixtureHandle(b), event.sensor()),
                    // Owners are resolved now: a removed fixture can't be looked up later
                    owner_a: self.fixture_owner(FixtureHandle(a)),
                    owner_b: self.fixture_owner(FixtureHandle(b)),
                }
            })
            .collect()
    }

    /// Body position in simulation units
    pub fn position(&self, body: BodyHandle) -> Vec2 {
        self.bodies
            .get(body.0)
            .map(|rb| from_na(rb.translation()))
            .unwrap_or(Vec2::ZERO)
    }

    /// Body rotation in radians
    pub fn angle(&self, body: BodyHandle) -> f32 {
        self.bodies
            .get(body.0)
            .map(|rb| rb.rotation().angle())
            .unwrap_or(0.0)
    }

    pub fn linear_velocity(&self, body: BodyHandle) -> Vec2 {
        self.bodies
            .get(body.0)
            .map(|rb| from_na(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.0) {
            rb.set_linvel(to_na(velocity), true);
        }
    }

    /// Teleport a body (simulation units, radians)
    pub fn set_transform(&mut self, body: BodyHandle, position: Vec2, angle: f32) {
        if let Some(rb) = self.bodies.get_mut(body.0) {
            rb.set_position(Isometry2::new(to_na(position), angle), true);
        }
    }

    /// Apply a force at the center of mass for the next step only
    pub fn apply_force_to_center(&mut self, body: BodyHandle, force: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.0) {
            rb.add_force(to_na(force), true);
            self.pending_forces.push(body.0);
        }
    }

    pub fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.0) {
            rb.apply_impulse(to_na(impulse), true);
        }
    }

    /// World-space outlines of every fixture, in simulation units
    pub fn fixture_outlines(&self) -> Vec<FixtureOutline> {
        self.colliders
            .iter()
            .filter_map(|(_, collider)| {
                let iso = collider.position();
                let shape = collider.shape();
                if let Some(ball) = shape.as_ball() {
                    Some(FixtureOutline::Circle {
                        center: from_na(&iso.translation.vector),
                        radius: ball.radius,
                    })
                } else if let Some(cuboid) = shape.as_cuboid() {
                    let he = cuboid.half_extents;
                    let corners = [(-he.x, -he.y), (he.x, -he.y), (he.x, he.y), (-he.x, he.y)];
                    let points = corners
                        .iter()
                        .map(|&(x, y)| {
                            let p = iso * Point2::new(x, y);
                            Vec2::new(p.x, p.y)
                        })
                        .collect();
                    Some(FixtureOutline::Polygon { points })
                } else {
                    shape.as_convex_polygon().map(|poly| FixtureOutline::Polygon {
                        points: poly
                            .points()
                            .iter()
                            .map(|p| {
                                let p = iso * p;
                                Vec2::new(p.x, p.y)
                            })
                            .collect(),
                    })
                }
            })
            .collect()
    }
}
