//! Physics body owned on behalf of an actor
//!
//! Converts between display and simulation units and guarantees the body is
//! destroyed exactly once.

use glam::Vec2;

use super::{ActorKey, Lifecycle};
use crate::sim::{BodyDef, BodyHandle, FixtureDef, FixtureHandle, SimulationWorld};
use crate::{angle_degrees, to_display, to_simulation};

#[derive(Debug)]
pub struct BodyBinding {
    body: BodyHandle,
    fixtures: Vec<FixtureHandle>,
    lifecycle: Lifecycle,
}

impl BodyBinding {
    /// Create a body and its fixtures. Fixtures stay ownerless until `attach`.
    pub fn build(world: &mut SimulationWorld, def: &BodyDef, fixtures: &[FixtureDef]) -> Self {
        let body = world.create_body(def);
        let fixtures = fixtures
            .iter()
            .map(|fixture| world.create_fixture(body, fixture))
            .collect();
        Self {
            body,
            fixtures,
            lifecycle: Lifecycle::Created,
        }
    }

    /// Point every fixture back at `key`
    pub fn attach(&mut self, key: ActorKey, world: &mut SimulationWorld) {
        if self.lifecycle.is_disposed() {
            return;
        }
        for fixture in &self.fixtures {
            world.set_fixture_owner(*fixture, Some(key));
        }
        self.lifecycle.activate();
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn fixture(&self, index: usize) -> Option<FixtureHandle> {
        self.fixtures.get(index).copied()
    }

    pub fn fixtures(&self) -> &[FixtureHandle] {
        &self.fixtures
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Body position in display units
    pub fn position(&self, world: &SimulationWorld) -> Vec2 {
        to_display(world.position(self.body))
    }

    /// Move the body to a display-space position, keeping its rotation
    pub fn set_position(&self, world: &mut SimulationWorld, position: Vec2) {
        if self.lifecycle.is_disposed() {
            return;
        }
        let angle = world.angle(self.body);
        world.set_transform(self.body, to_simulation(position), angle);
    }

    /// Body rotation in degrees
    pub fn rotation_degrees(&self, world: &SimulationWorld) -> f32 {
        world.angle(self.body).to_degrees()
    }

    /// Direction of travel in degrees
    pub fn heading_degrees(&self, world: &SimulationWorld) -> f32 {
        angle_degrees(world.linear_velocity(self.body))
    }

    /// Destroy the body. Second and later calls do nothing.
    pub fn release(&mut self, world: &mut SimulationWorld, what: &str) -> bool {
        if !self.lifecycle.dispose(what) {
            return false;
        }
        world.destroy_body(self.body)
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Material, Shape};
    use slotmap::SlotMap;

    fn binding(world: &mut SimulationWorld) -> BodyBinding {
        BodyBinding::build(
            world,
            &BodyDef::dynamic().at(Vec2::new(1.0, 2.0)),
            &[FixtureDef::new(Shape::circle(0.2), Material::default())],
        )
    }

    #[test]
    fn test_position_in_display_units() {
        let mut world = SimulationWorld::new(Vec2::ZERO);
        let body = binding(&mut world);
        assert!((body.position(&world) - Vec2::new(100.0, 200.0)).length() < 1e-3);

        body.set_position(&mut world, Vec2::new(-50.0, 25.0));
        assert!((world.position(body.body()) - Vec2::new(-0.5, 0.25)).length() < 1e-6);
    }

    #[test]
    fn test_attach_tags_fixtures() {
        let mut keys: SlotMap<ActorKey, ()> = SlotMap::with_key();
        let key = keys.insert(());
        let mut world = SimulationWorld::new(Vec2::ZERO);
        let mut body = binding(&mut world);

        let fixture = body.fixture(0).unwrap();
        assert_eq!(world.fixture_owner(fixture), None);
        body.attach(key, &mut world);
        assert_eq!(world.fixture_owner(fixture), Some(key));
        assert_eq!(body.lifecycle(), Lifecycle::Active);
    }

    #[test]
    fn test_release_once() {
        let mut world = SimulationWorld::new(Vec2::ZERO);
        let mut body = binding(&mut world);
        let _other = binding(&mut world);
        assert_eq!(world.body_count(), 2);

        assert!(body.release(&mut world, "test body"));
        assert!(!body.release(&mut world, "test body"));
        assert_eq!(world.body_count(), 1);
        assert!(body.is_disposed());
    }
}
