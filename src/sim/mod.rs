//! Physics simulation module
//!
//! - Fixed timestep only: frame time goes through `FixedStepClock`
//! - The world never calls into actors; contact events come back from
//!   `SimulationWorld::step` and are dispatched once the step is done
//! - No rendering or platform dependencies

pub mod clock;
pub mod contact;
pub mod world;

pub use clock::FixedStepClock;
pub use contact::{Contact, ContactDispatcher, ContactEvent, ContactPhase};
pub use world::{
    BodyDef, BodyHandle, BodyType, FixtureDef, FixtureHandle, FixtureOutline, Material, Shape,
    SimulationWorld,
};
