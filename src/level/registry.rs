//! Prop type -> actor constructor mapping

use std::collections::BTreeMap;

use rand_pcg::Pcg32;
use thiserror::Error;

use super::PropDescriptor;
use crate::actor::{
    Actor, BackgroundActor, DustbinActor, GameLogoActor, GroundActor, PaperBallActor, TurretActor,
};
use crate::assets::{AssetError, AssetProvider};
use crate::scene::Layer;
use crate::settings::Settings;
use crate::sim::SimulationWorld;

#[derive(Debug, Error)]
pub enum PropError {
    #[error("no actor registered for prop type `{0}`")]
    UnknownType(String),
    #[error("prop {id} ({kind}) has malformed fields: {source}")]
    Malformed {
        id: i32,
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    MissingAsset(#[from] AssetError),
}

impl PropError {
    /// Fatal errors abort the stage load; everything else skips the prop
    pub fn is_fatal(&self) -> bool {
        matches!(self, PropError::MissingAsset(_))
    }
}

/// Everything a constructor may touch while building an actor
pub struct BuildContext<'a> {
    pub world: &'a mut SimulationWorld,
    pub assets: &'a dyn AssetProvider,
    pub rng: &'a mut Pcg32,
    pub settings: &'a Settings,
}

impl BuildContext<'_> {
    /// Decode a descriptor's payload, tagging failures with the prop identity
    pub fn payload<T: serde::de::DeserializeOwned>(&self, prop: &PropDescriptor) -> Result<T, PropError> {
        prop.payload().map_err(|source| PropError::Malformed {
            id: prop.id,
            kind: prop.kind.clone(),
            source,
        })
    }
}

pub type PropFactory = fn(&PropDescriptor, &mut BuildContext<'_>) -> Result<Box<dyn Actor>, PropError>;

/// Registers textures and sounds an actor type needs
pub type Preloader = fn(&mut dyn AssetProvider);

struct PropType {
    factory: PropFactory,
    preload: Preloader,
    default_layer: Layer,
}

pub struct PropRegistry {
    types: BTreeMap<String, PropType>,
}

impl Default for PropRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("Background", Layer::Background, BackgroundActor::from_prop, BackgroundActor::preload);
        registry.register("Ground", Layer::Action1, GroundActor::from_prop, GroundActor::preload);
        registry.register("Dustbin", Layer::Action2, DustbinActor::from_prop, DustbinActor::preload);
        registry.register("Turret", Layer::Action2, TurretActor::from_prop, TurretActor::preload);
        registry.register("PaperBall", Layer::Action2, PaperBallActor::from_prop, PaperBallActor::preload);
        registry.register("GameLogo", Layer::Gui, GameLogoActor::from_prop, GameLogoActor::preload);
        registry
    }
}

impl PropRegistry {
    pub fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// Register (or replace) a prop type
    pub fn register(&mut self, kind: &str, default_layer: Layer, factory: PropFactory, preload: Preloader) {
        if self
            .types
            .insert(
                kind.to_string(),
                PropType {
                    factory,
                    preload,
                    default_layer,
                },
            )
            .is_some()
        {
            log::debug!("prop type {kind} re-registered");
        }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.types.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Queue the assets of every registered type
    pub fn preload(&self, assets: &mut dyn AssetProvider) {
        for prop_type in self.types.values() {
            (prop_type.preload)(assets);
        }
    }

    /// A fresh descriptor for placing a new prop in the editor
    pub fn blank(&self, kind: &str, id: i32) -> Option<PropDescriptor> {
        let prop_type = self.types.get(kind)?;
        Some(PropDescriptor::new(id, prop_type.default_layer.index() as i32, kind))
    }

    /// Build the actor a descriptor describes
    pub fn instantiate(
        &self,
        prop: &PropDescriptor,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Box<dyn Actor>, PropError> {
        let prop_type = self
            .types
            .get(&prop.kind)
            .ok_or_else(|| PropError::UnknownType(prop.kind.clone()))?;
        (prop_type.factory)(prop, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorKind;
    use crate::assets::{AssetKind, PreloadedAssets};
    use glam::Vec2;
    use rand::SeedableRng;

    fn with_ctx<R>(assets: &PreloadedAssets, f: impl FnOnce(&mut BuildContext<'_>) -> R) -> R {
        let mut world = SimulationWorld::new(Vec2::new(0.0, -10.0));
        let mut rng = Pcg32::seed_from_u64(1);
        let settings = Settings::default();
        let mut ctx = BuildContext {
            world: &mut world,
            assets,
            rng: &mut rng,
            settings: &settings,
        };
        f(&mut ctx)
    }

    fn preloaded(registry: &PropRegistry) -> PreloadedAssets {
        let mut assets = PreloadedAssets::new();
        registry.preload(&mut assets);
        assets
    }

    #[test]
    fn test_default_registry_builds_every_type() {
        let registry = PropRegistry::default();
        let assets = preloaded(&registry);
        let kinds: Vec<String> = registry.kinds().map(str::to_string).collect();
        assert_eq!(kinds.len(), 6);
        for (i, kind) in kinds.iter().enumerate() {
            let prop = registry.blank(kind, i as i32).unwrap();
            let actor = with_ctx(&assets, |ctx| registry.instantiate(&prop, ctx)).unwrap();
            assert_eq!(actor.kind().as_str(), kind);
            assert_eq!(actor.id(), i as i32);
            assert_eq!(actor.prop(), Some(&prop));
        }
    }

    #[test]
    fn test_blank_uses_default_layer() {
        let registry = PropRegistry::default();
        assert_eq!(registry.blank("Background", 1).unwrap().layer, 0);
        assert_eq!(registry.blank("Ground", 2).unwrap().layer, 1);
        assert_eq!(registry.blank("GameLogo", 3).unwrap().layer, 5);
        assert!(registry.blank("Hand", 4).is_none());
    }

    #[test]
    fn test_unknown_type_is_not_fatal() {
        let registry = PropRegistry::default();
        let assets = preloaded(&registry);
        let prop = PropDescriptor::new(1, 0, "Hand");
        let err = with_ctx(&assets, |ctx| registry.instantiate(&prop, ctx)).err().unwrap();
        assert!(matches!(err, PropError::UnknownType(ref k) if k == "Hand"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_missing_asset_is_fatal() {
        let registry = PropRegistry::default();
        let assets = PreloadedAssets::new();
        let prop = PropDescriptor::new(1, 1, "Ground");
        let err = with_ctx(&assets, |ctx| registry.instantiate(&prop, ctx)).err().unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_custom_type_registration() {
        fn fake_logo(prop: &PropDescriptor, ctx: &mut BuildContext<'_>) -> Result<Box<dyn Actor>, PropError> {
            GameLogoActor::from_prop(prop, ctx)
        }
        fn no_assets(_: &mut dyn AssetProvider) {}

        let mut registry = PropRegistry::empty();
        registry.register("Sign", Layer::Foreground, fake_logo, no_assets);
        let mut assets = PreloadedAssets::new();
        GameLogoActor::preload(&mut assets);
        assets.load("unused.png", AssetKind::Texture);

        let prop = registry.blank("Sign", 9).unwrap();
        assert_eq!(prop.scene_layer(), Layer::Foreground);
        let actor = with_ctx(&assets, |ctx| registry.instantiate(&prop, ctx)).unwrap();
        assert_eq!(actor.kind(), ActorKind::GameLogo);
    }
}
