//! Running stage
//!
//! Owns everything a loaded level needs: the physics world, the actor
//! registry, the scene, the fixed-step clock and the RNG. One frame is
//!
//! 1. the clock turns the frame delta into zero or more fixed steps,
//! 2. each step advances the world, dispatches its contacts, plays the
//!    impact sounds they asked for and reaps the actors they removed,
//! 3. every actor updates in scene order.
//!
//! Drawing is separate and read-only.

use std::path::Path;

use anyhow::Context;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::actor::{Actor, ActorKey, ActorRegistry, DrawContext, PaperBallActor, Reactions};
use crate::assets::{AssetError, AssetProvider};
use crate::audio::AudioSink;
use crate::level::{self, BuildContext, PropDescriptor, PropError, PropRegistry};
use crate::render::{DEBUG_COLOR, Renderer};
use crate::scene::{Layer, Scene};
use crate::settings::Settings;
use crate::sim::{ContactDispatcher, FixedStepClock, FixtureOutline, SimulationWorld};
use crate::to_display;

/// Layer runtime-thrown balls are placed in
pub const THROW_LAYER: Layer = Layer::Action2;

/// Segments used for debug circles
const DEBUG_CIRCLE_SEGMENTS: usize = 16;

pub struct Stage {
    settings: Settings,
    world: SimulationWorld,
    scene: Scene,
    actors: ActorRegistry,
    clock: FixedStepClock,
    dispatcher: ContactDispatcher,
    reactions: Reactions,
    rng: Pcg32,
    /// Next id handed to a runtime spawn; counts down from -1
    next_runtime_id: i32,
}

impl Stage {
    pub fn new(settings: Settings) -> Self {
        Self {
            world: SimulationWorld::new(settings.gravity),
            scene: Scene::new(),
            actors: ActorRegistry::new(),
            clock: FixedStepClock::default(),
            dispatcher: ContactDispatcher::new(),
            reactions: Reactions::default(),
            rng: Pcg32::seed_from_u64(settings.seed),
            next_runtime_id: -1,
            settings,
        }
    }

    /// Load a level file and populate the stage from it
    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        registry: &PropRegistry,
        assets: &dyn AssetProvider,
    ) -> anyhow::Result<Vec<ActorKey>> {
        let path = path.as_ref();
        let props = level::load(path)?;
        self.populate(props, registry, assets)
            .with_context(|| format!("failed to build level {}", path.display()))
    }

    /// Instantiate props in ascending id order and place each actor in the
    /// layer its descriptor names. Props that can't be built are skipped; a
    /// missing asset aborts the load and removes whatever this call spawned.
    pub fn populate(
        &mut self,
        mut props: Vec<PropDescriptor>,
        registry: &PropRegistry,
        assets: &dyn AssetProvider,
    ) -> Result<Vec<ActorKey>, PropError> {
        level::sort_props(&mut props);

        let mut keys = Vec::with_capacity(props.len());
        for prop in &props {
            let mut ctx = BuildContext {
                world: &mut self.world,
                assets,
                rng: &mut self.rng,
                settings: &self.settings,
            };
            match registry.instantiate(prop, &mut ctx) {
                Ok(actor) => keys.push(self.spawn(actor, prop.scene_layer())),
                Err(e) if e.is_fatal() => {
                    log::debug!("prop {} aborted the load; tearing down {} actors", prop.id, keys.len());
                    self.reap(&keys);
                    return Err(e);
                }
                Err(e) => log::warn!("skipping prop {} ({}): {e}", prop.id, prop.kind),
            }
        }

        log::info!(
            "Stage populated: {} of {} props, {} bodies",
            keys.len(),
            props.len(),
            self.world.body_count()
        );
        Ok(keys)
    }

    /// Register an actor, hand it its key and place it in `layer`
    pub fn spawn(&mut self, actor: Box<dyn Actor>, layer: Layer) -> ActorKey {
        let id = actor.id();
        let kind = actor.kind();
        let key = self.actors.insert(actor);
        if let Some(actor) = self.actors.get_mut(key) {
            actor.attach(key, &mut self.world);
        }
        self.scene.add(key, layer);
        log::debug!("spawned {} {id} into {}", kind.as_str(), layer.name());
        key
    }

    /// Spawn a paper ball at `origin` (display units) and throw it with
    /// `force` (simulation units)
    pub fn throw_paper_ball(
        &mut self,
        origin: Vec2,
        force: Vec2,
        assets: &dyn AssetProvider,
    ) -> Result<ActorKey, AssetError> {
        let id = self.next_runtime_id;
        let mut ball = PaperBallActor::new(
            id,
            Some(origin),
            &mut self.world,
            assets,
            &mut self.rng,
            self.settings.trail_capacity,
        )?;
        self.next_runtime_id -= 1;
        ball.apply_force(&mut self.world, &mut self.rng, force);
        Ok(self.spawn(Box::new(ball), THROW_LAYER))
    }

    /// Throw a paper ball from a launcher actor. `Ok(None)` if `launcher`
    /// is gone or can't launch.
    pub fn fire(&mut self, launcher: ActorKey, assets: &dyn AssetProvider) -> Result<Option<ActorKey>, AssetError> {
        let Some(launch) = self.actors.get(launcher).and_then(|a| a.launch(&self.world)) else {
            return Ok(None);
        };
        self.throw_paper_ball(launch.origin, launch.force, assets).map(Some)
    }

    /// Remove an actor after the next physics step (or at the end of the
    /// next frame if no step runs)
    pub fn remove(&mut self, key: ActorKey) {
        if self.actors.contains(key) {
            self.reactions.remove(key);
        }
    }

    /// Advance the stage by one render frame. Returns the number of physics
    /// steps taken.
    pub fn frame(&mut self, dt: f32, audio: &mut dyn AudioSink) -> u32 {
        let steps = self.clock.advance(dt, |_| {});
        for _ in 0..steps {
            self.physics_step(audio);
        }
        // Removals requested outside a step
        let (removals, _) = self.reactions.take();
        self.reap(&removals);

        for (_, key) in self.scene.iter() {
            if let Some(actor) = self.actors.get_mut(key) {
                actor.update(&self.world, dt);
            }
        }
        steps
    }

    fn physics_step(&mut self, audio: &mut dyn AudioSink) {
        let events = self.world.step(self.clock.step());
        self.dispatcher.dispatch(&events, &mut self.actors, &mut self.reactions);

        let (removals, sounds) = self.reactions.take();
        self.play_impact_sounds(&sounds, audio);
        self.reap(&removals);
    }

    fn play_impact_sounds(&mut self, keys: &[ActorKey], audio: &mut dyn AudioSink) {
        let volume = self.settings.effective_sfx_volume();
        for &key in keys {
            let Some(actor) = self.actors.get(key) else {
                continue;
            };
            let sounds = actor.impact_sounds();
            if sounds.is_empty() {
                continue;
            }
            let pick = self.rng.random_range(0..sounds.len());
            audio.play(&sounds[pick], volume);
        }
    }

    fn reap(&mut self, keys: &[ActorKey]) {
        for &key in keys {
            self.scene.remove(key);
            if let Some(mut actor) = self.actors.remove(key) {
                actor.dispose(&mut self.world);
                log::debug!("removed {} {}", actor.kind().as_str(), actor.id());
            }
        }
    }

    /// Draw every layer back to front, then fixture outlines if enabled
    pub fn draw(&self, renderer: &mut dyn Renderer, camera: Vec2, zoom: f32) {
        for layer in Layer::ALL {
            renderer.begin_layer(layer);
            let mut ctx = DrawContext::new(&mut *renderer, camera, zoom);
            for &key in self.scene.actors(layer) {
                if let Some(actor) = self.actors.get(key) {
                    actor.draw(&self.world, &mut ctx);
                }
            }
            if layer == Layer::Debug && self.settings.debug_info {
                self.draw_fixtures(&mut ctx);
            }
        }
    }

    fn draw_fixtures(&self, ctx: &mut DrawContext<'_>) {
        for outline in self.world.fixture_outlines() {
            match outline {
                FixtureOutline::Circle { center, radius } => ctx.circle(
                    to_display(center),
                    radius * crate::consts::SCALE_INV,
                    DEBUG_CIRCLE_SEGMENTS,
                    DEBUG_COLOR,
                ),
                FixtureOutline::Polygon { points } => {
                    let points: Vec<Vec2> = points.into_iter().map(to_display).collect();
                    ctx.outline(&points, DEBUG_COLOR);
                }
            }
        }
    }

    /// Dispose every actor exactly once and empty the scene. Returns how
    /// many actors were torn down.
    pub fn unload(&mut self) -> usize {
        let mut keys = self.scene.clear();
        // Anything registered but never placed
        let unplaced: Vec<ActorKey> = self.actors.keys().filter(|k| !keys.contains(k)).collect();
        keys.extend(unplaced);

        let count = keys.len();
        self.reap(&keys);
        self.reactions.take();
        self.clock.reset();
        log::info!("Stage unloaded: {count} actors, {} bodies left", self.world.body_count());
        count
    }

    /// Descriptors of every level-built actor, sorted by id
    pub fn props(&self) -> Vec<PropDescriptor> {
        let mut props: Vec<PropDescriptor> = self
            .scene
            .iter()
            .filter_map(|(_, key)| self.actors.get(key)?.prop().cloned())
            .collect();
        level::sort_props(&mut props);
        props
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn world(&self) -> &SimulationWorld {
        &self.world
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn actors(&self) -> &ActorRegistry {
        &self.actors
    }

    pub fn actor(&self, key: ActorKey) -> Option<&dyn Actor> {
        self.actors.get(key)
    }

    pub fn clock(&self) -> &FixedStepClock {
        &self.clock
    }

    pub fn contacts_delivered(&self) -> u64 {
        self.dispatcher.delivered()
    }

    /// Actor position in display units
    pub fn position(&self, key: ActorKey) -> Option<Vec2> {
        self.actors.get(key).map(|a| a.position(&self.world))
    }

    pub fn set_position(&mut self, key: ActorKey, position: Vec2) -> bool {
        match self.actors.get_mut(key) {
            Some(actor) => {
                actor.set_position(&mut self.world, position);
                true
            }
            None => false,
        }
    }
}
