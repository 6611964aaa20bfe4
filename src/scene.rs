//! Layered scene
//!
//! Seven fixed layers, drawn and updated back to front. Each layer keeps its
//! actors in insertion order; an actor lives in at most one layer.

use serde::{Deserialize, Serialize};

use crate::actor::ActorKey;

/// Named scene layers, in draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    Background,
    Action1,
    Action2,
    Action3,
    Foreground,
    Gui,
    Debug,
}

impl Layer {
    pub const ALL: [Layer; 7] = [
        Layer::Background,
        Layer::Action1,
        Layer::Action2,
        Layer::Action3,
        Layer::Foreground,
        Layer::Gui,
        Layer::Debug,
    ];

    /// Layer for a serialized index; anything outside 0-6 is BACKGROUND
    pub fn from_index(index: i32) -> Layer {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(Layer::Background)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Layer::Background => "BACKGROUND",
            Layer::Action1 => "ACTION_1",
            Layer::Action2 => "ACTION_2",
            Layer::Action3 => "ACTION_3",
            Layer::Foreground => "FOREGROUND",
            Layer::Gui => "GUI",
            Layer::Debug => "DEBUG",
        }
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    layers: [Vec<ActorKey>; 7],
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an actor to a layer. Returns false (and changes nothing) if the
    /// actor is already placed somewhere.
    pub fn add(&mut self, key: ActorKey, layer: Layer) -> bool {
        if let Some(existing) = self.layer_of(key) {
            log::warn!(
                "actor {key:?} is already in {}; not adding to {}",
                existing.name(),
                layer.name()
            );
            return false;
        }
        self.layers[layer.index()].push(key);
        true
    }

    /// Remove an actor from whichever layer holds it
    pub fn remove(&mut self, key: ActorKey) -> Option<Layer> {
        for layer in Layer::ALL {
            let actors = &mut self.layers[layer.index()];
            if let Some(pos) = actors.iter().position(|k| *k == key) {
                // `remove`, not `swap_remove`: draw order must survive
                actors.remove(pos);
                return Some(layer);
            }
        }
        None
    }

    pub fn layer_of(&self, key: ActorKey) -> Option<Layer> {
        Layer::ALL
            .into_iter()
            .find(|layer| self.layers[layer.index()].contains(&key))
    }

    pub fn actors(&self, layer: Layer) -> &[ActorKey] {
        &self.layers[layer.index()]
    }

    /// Every actor, back layer first, insertion order within a layer
    pub fn iter(&self) -> impl Iterator<Item = (Layer, ActorKey)> + '_ {
        Layer::ALL
            .into_iter()
            .flat_map(move |layer| self.layers[layer.index()].iter().map(move |k| (layer, *k)))
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every placement, returning the keys in scene order
    pub fn clear(&mut self) -> Vec<ActorKey> {
        let keys = self.iter().map(|(_, k)| k).collect();
        for layer in &mut self.layers {
            layer.clear();
        }
        keys
    }
}
