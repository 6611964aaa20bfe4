//! Game actors
//!
//! An actor is a polymorphic game object, usually bound to one rigid body.
//! Actors live in an `ActorRegistry` and are referred to everywhere else by
//! `ActorKey`, including from fixture user data. Keys are generational: a key
//! of a removed actor never resolves to a newer one.
//!
//! Lifecycle: `Created` (constructed, body built) -> `Active` (registered and
//! placed in the scene) -> `Disposed` (body destroyed, terminal).

pub mod background;
pub mod body;
pub mod dustbin;
pub mod ground;
pub mod logo;
pub mod paper_ball;
pub mod trajectory;
pub mod turret;

pub use background::BackgroundActor;
pub use body::BodyBinding;
pub use dustbin::DustbinActor;
pub use ground::GroundActor;
pub use logo::GameLogoActor;
pub use paper_ball::PaperBallActor;
pub use trajectory::{PathTrace, Trajectory};
pub use turret::TurretActor;

pub use crate::render::DrawContext;

use glam::Vec2;
use slotmap::{SlotMap, new_key_type};

use crate::assets::AssetHandle;
use crate::level::PropDescriptor;
use crate::sim::{Contact, FixtureHandle, SimulationWorld};

new_key_type! {
    /// Stable handle to an actor in the registry
    pub struct ActorKey;
}

/// Concrete actor variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
    PaperBall,
    Ground,
    Dustbin,
    Turret,
    Background,
    GameLogo,
}

impl ActorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorKind::PaperBall => "PaperBall",
            ActorKind::Ground => "Ground",
            ActorKind::Dustbin => "Dustbin",
            ActorKind::Turret => "Turret",
            ActorKind::Background => "Background",
            ActorKind::GameLogo => "GameLogo",
        }
    }

    /// Solid things that make a sound when struck
    pub fn is_obstacle(&self) -> bool {
        matches!(
            self,
            ActorKind::PaperBall | ActorKind::Ground | ActorKind::Dustbin | ActorKind::Turret
        )
    }

    /// Actors whose trigger region swallows projectiles
    pub fn is_sink(&self) -> bool {
        matches!(self, ActorKind::Dustbin)
    }

    pub fn is_projectile(&self) -> bool {
        matches!(self, ActorKind::PaperBall)
    }
}

/// Lifecycle state of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Created,
    Active,
    Disposed,
}

impl Lifecycle {
    /// Move to `Active`; no-op once disposed
    pub fn activate(&mut self) {
        if *self == Lifecycle::Created {
            *self = Lifecycle::Active;
        }
    }

    /// Move to `Disposed`. Returns false if already disposed, so callers can
    /// skip releasing anything a second time.
    pub fn dispose(&mut self, what: &str) -> bool {
        if *self == Lifecycle::Disposed {
            log::warn!("{what} disposed twice; ignoring");
            return false;
        }
        *self = Lifecycle::Disposed;
        true
    }

    pub fn is_disposed(&self) -> bool {
        *self == Lifecycle::Disposed
    }
}

/// What one actor sees of the other side of a contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitPeer {
    pub key: ActorKey,
    pub id: i32,
    pub kind: ActorKind,
    /// The peer's trigger region, if it has one
    pub trigger: Option<FixtureHandle>,
}

/// Where a launcher wants a projectile to appear, and how hard to push it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    /// Display units
    pub origin: Vec2,
    /// Simulation units (N)
    pub force: Vec2,
}

/// Side effects requested from contact callbacks.
///
/// Callbacks run while a step's events are being dispatched, so nothing is
/// destroyed here; the stage applies these once dispatch is over.
#[derive(Debug, Default)]
pub struct Reactions {
    current: Option<ActorKey>,
    removals: Vec<ActorKey>,
    impact_sounds: Vec<ActorKey>,
}

impl Reactions {
    /// Set the actor whose callback is about to run
    pub fn bind(&mut self, key: ActorKey) {
        self.current = Some(key);
    }

    /// Mark the current actor for removal after the step
    pub fn remove_self(&mut self) {
        if let Some(key) = self.current {
            self.remove(key);
        }
    }

    pub fn remove(&mut self, key: ActorKey) {
        if !self.removals.contains(&key) {
            self.removals.push(key);
        }
    }

    /// Ask `key` to play one of its impact sounds
    pub fn play_impact_sound(&mut self, key: ActorKey) {
        if !self.impact_sounds.contains(&key) {
            self.impact_sounds.push(key);
        }
    }

    /// Queue the current actor's own impact sound
    pub fn play_own_impact_sound(&mut self) {
        if let Some(key) = self.current {
            self.play_impact_sound(key);
        }
    }

    pub fn removals(&self) -> &[ActorKey] {
        &self.removals
    }

    pub fn impact_sounds(&self) -> &[ActorKey] {
        &self.impact_sounds
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.impact_sounds.is_empty()
    }

    /// Take the queued removals and sounds, leaving the queue empty
    pub fn take(&mut self) -> (Vec<ActorKey>, Vec<ActorKey>) {
        self.current = None;
        (
            std::mem::take(&mut self.removals),
            std::mem::take(&mut self.impact_sounds),
        )
    }
}

/// Behavior shared by every actor
pub trait Actor {
    /// Level-assigned identity (runtime spawns get negative ids)
    fn id(&self) -> i32;

    fn kind(&self) -> ActorKind;

    /// Descriptor this actor was built from, if it came from a level
    fn prop(&self) -> Option<&PropDescriptor> {
        None
    }

    /// Called once the actor has a key; body-bound actors tag their fixtures
    fn attach(&mut self, _key: ActorKey, _world: &mut SimulationWorld) {}

    /// Refresh derived state from physics after the frame's steps
    fn update(&mut self, world: &SimulationWorld, dt: f32);

    fn draw(&self, world: &SimulationWorld, ctx: &mut DrawContext<'_>);

    /// A contact began. `other` is `None` for non-actor geometry.
    fn on_hit(&mut self, other: Option<&HitPeer>, contact: &Contact, reactions: &mut Reactions);

    /// A contact ended
    fn on_release(&mut self, _other: Option<&HitPeer>, _contact: &Contact, _reactions: &mut Reactions) {}

    /// Release the physics body. Safe to call more than once.
    fn dispose(&mut self, world: &mut SimulationWorld);

    /// Position in display units
    fn position(&self, world: &SimulationWorld) -> Vec2;

    fn set_position(&mut self, world: &mut SimulationWorld, position: Vec2);

    fn trigger_fixture(&self) -> Option<FixtureHandle> {
        None
    }

    /// Sounds played when this actor is struck
    fn impact_sounds(&self) -> &[AssetHandle] {
        &[]
    }

    fn trajectory(&self) -> Option<&Trajectory> {
        None
    }

    /// Launchers report where and how to throw a projectile
    fn launch(&self, _world: &SimulationWorld) -> Option<Launch> {
        None
    }
}

/// Owns every live actor
#[derive(Default)]
pub struct ActorRegistry {
    actors: SlotMap<ActorKey, Box<dyn Actor>>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, actor: Box<dyn Actor>) -> ActorKey {
        self.actors.insert(actor)
    }

    pub fn remove(&mut self, key: ActorKey) -> Option<Box<dyn Actor>> {
        self.actors.remove(key)
    }

    pub fn get(&self, key: ActorKey) -> Option<&dyn Actor> {
        self.actors.get(key).map(|a| a.as_ref())
    }

    pub fn get_mut(&mut self, key: ActorKey) -> Option<&mut (dyn Actor + 'static)> {
        self.actors.get_mut(key).map(|a| a.as_mut())
    }

    pub fn contains(&self, key: ActorKey) -> bool {
        self.actors.contains_key(key)
    }

    /// Snapshot of what a contact counterpart needs to know about `key`
    pub fn peer(&self, key: ActorKey) -> Option<HitPeer> {
        self.actors.get(key).map(|actor| HitPeer {
            key,
            id: actor.id(),
            kind: actor.kind(),
            trigger: actor.trigger_fixture(),
        })
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = ActorKey> + '_ {
        self.actors.keys()
    }

    pub fn drain(&mut self) -> Vec<(ActorKey, Box<dyn Actor>)> {
        self.actors.drain().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_capabilities() {
        assert!(ActorKind::PaperBall.is_obstacle());
        assert!(ActorKind::PaperBall.is_projectile());
        assert!(ActorKind::Dustbin.is_sink());
        assert!(ActorKind::Dustbin.is_obstacle());
        assert!(!ActorKind::Ground.is_sink());
        assert!(!ActorKind::Background.is_obstacle());
        assert!(!ActorKind::GameLogo.is_obstacle());
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut state = Lifecycle::default();
        assert_eq!(state, Lifecycle::Created);
        state.activate();
        assert_eq!(state, Lifecycle::Active);
        assert!(state.dispose("marker"));
        assert!(!state.dispose("marker"));
        state.activate();
        assert!(state.is_disposed());
    }

    #[test]
    fn test_reactions_dedupe_and_take() {
        let mut keys: SlotMap<ActorKey, ()> = SlotMap::with_key();
        let a = keys.insert(());
        let b = keys.insert(());

        let mut reactions = Reactions::default();
        reactions.remove_self();
        assert!(reactions.is_empty());

        reactions.bind(a);
        reactions.remove_self();
        reactions.remove_self();
        reactions.play_impact_sound(b);
        reactions.play_impact_sound(b);
        assert_eq!(reactions.removals(), &[a]);
        assert_eq!(reactions.impact_sounds(), &[b]);

        let (removals, sounds) = reactions.take();
        assert_eq!(removals, vec![a]);
        assert_eq!(sounds, vec![b]);
        assert!(reactions.is_empty());

        // Unbound after take: nothing to play
        reactions.play_own_impact_sound();
        assert!(reactions.is_empty());
        reactions.bind(b);
        reactions.play_own_impact_sound();
        reactions.play_impact_sound(b);
        assert_eq!(reactions.impact_sounds(), &[b]);
    }
}
