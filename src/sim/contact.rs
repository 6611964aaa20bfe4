//! Contact events and their dispatch to actors
//!
//! The world reports each touching fixture pair with the owning actors
//! already resolved. The dispatcher double-dispatches the event: each side
//! that belongs to a live actor gets its own callback with the other side as
//! counterpart. Missing owners mean "non-actor geometry" and are passed as
//! `None`, never treated as an error.

use super::world::FixtureHandle;
use crate::actor::{ActorKey, ActorRegistry, HitPeer, Reactions};

/// The two fixtures of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub fixture_a: FixtureHandle,
    pub fixture_b: FixtureHandle,
    /// At least one side is a sensor (trigger region)
    pub sensor: bool,
}

impl Contact {
    pub fn new(fixture_a: FixtureHandle, fixture_b: FixtureHandle, sensor: bool) -> Self {
        Self {
            fixture_a,
            fixture_b,
            sensor,
        }
    }

    /// Does `fixture` participate in this contact?
    pub fn involves(&self, fixture: FixtureHandle) -> bool {
        self.fixture_a == fixture || self.fixture_b == fixture
    }

    /// The fixture on the other side of `fixture`, if it participates
    pub fn other(&self, fixture: FixtureHandle) -> Option<FixtureHandle> {
        if self.fixture_a == fixture {
            Some(self.fixture_b)
        } else if self.fixture_b == fixture {
            Some(self.fixture_a)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Begin,
    End,
}

/// A contact reported by one physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub phase: ContactPhase,
    pub contact: Contact,
    pub owner_a: Option<ActorKey>,
    pub owner_b: Option<ActorKey>,
}

/// Routes contact events to actor callbacks
#[derive(Debug, Default)]
pub struct ContactDispatcher {
    /// Callbacks delivered since creation
    delivered: u64,
}

impl ContactDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Deliver every event to both actor sides. Must run after the physics
    /// step has returned; actors only record their reactions here.
    pub fn dispatch(
        &mut self,
        events: &[ContactEvent],
        actors: &mut ActorRegistry,
        reactions: &mut Reactions,
    ) {
        for event in events {
            // Peers are snapshotted first so neither callback observes the
            // other's mutations for this event
            let peer_a = event.owner_a.and_then(|key| actors.peer(key));
            let peer_b = event.owner_b.and_then(|key| actors.peer(key));

            if let Some(a) = &peer_a {
                self.deliver(actors, reactions, a.key, peer_b.as_ref(), event);
            }
            if let Some(b) = &peer_b {
                self.deliver(actors, reactions, b.key, peer_a.as_ref(), event);
            }
        }
    }

    fn deliver(
        &mut self,
        actors: &mut ActorRegistry,
        reactions: &mut Reactions,
        key: ActorKey,
        other: Option<&HitPeer>,
        event: &ContactEvent,
    ) {
        let Some(actor) = actors.get_mut(key) else {
            return;
        };
        reactions.bind(key);
        match event.phase {
            ContactPhase::Begin => actor.on_hit(other, &event.contact, reactions),
            ContactPhase::End => actor.on_release(other, &event.contact, reactions),
        }
        self.delivered += 1;
    }
}
