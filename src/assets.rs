//! Asset provider interface
//!
//! Actors ask for textures and sounds by path. Loading, caching and eviction
//! belong to the provider; the core only needs to know whether a path was
//! preloaded. Requesting an asset that was never queued is a startup bug and
//! surfaces as `AssetError::NotLoaded`.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Asset category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Texture,
    Sound,
}

/// Cheap, clonable reference to a loaded asset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetHandle {
    path: Arc<str>,
    kind: AssetKind,
}

impl AssetHandle {
    pub fn new(path: &str, kind: AssetKind) -> Self {
        Self {
            path: Arc::from(path),
            kind,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.path)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("{kind:?} `{path}` was requested but never preloaded")]
    NotLoaded { path: String, kind: AssetKind },
}

/// Source of textures and sounds
pub trait AssetProvider {
    /// Queue an asset for loading
    fn load(&mut self, path: &str, kind: AssetKind);

    /// Fetch a previously loaded asset
    fn get(&self, path: &str, kind: AssetKind) -> Result<AssetHandle, AssetError>;

    /// Fetch several assets of the same kind
    fn get_all(&self, paths: &[&str], kind: AssetKind) -> Result<Vec<AssetHandle>, AssetError> {
        paths.iter().map(|path| self.get(path, kind)).collect()
    }
}

/// Provider that treats every queued path as immediately available.
/// Used by the headless runner and tests.
#[derive(Debug, Default)]
pub struct PreloadedAssets {
    loaded: HashSet<(String, AssetKind)>,
}

impl PreloadedAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}

impl AssetProvider for PreloadedAssets {
    fn load(&mut self, path: &str, kind: AssetKind) {
        if self.loaded.insert((path.to_string(), kind)) {
            log::debug!("queued {kind:?} {path}");
        }
    }

    fn get(&self, path: &str, kind: AssetKind) -> Result<AssetHandle, AssetError> {
        if self.loaded.contains(&(path.to_string(), kind)) {
            Ok(AssetHandle::new(path, kind))
        } else {
            Err(AssetError::NotLoaded {
                path: path.to_string(),
                kind,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_requires_load() {
        let mut assets = PreloadedAssets::new();
        assert!(assets.get("a.png", AssetKind::Texture).is_err());

        assets.load("a.png", AssetKind::Texture);
        let handle = assets.get("a.png", AssetKind::Texture).unwrap();
        assert_eq!(handle.path(), "a.png");
        assert_eq!(handle.kind(), AssetKind::Texture);
    }

    #[test]
    fn test_kind_is_part_of_identity() {
        let mut assets = PreloadedAssets::new();
        assets.load("hit.ogg", AssetKind::Sound);
        assert_eq!(
            assets.get("hit.ogg", AssetKind::Texture),
            Err(AssetError::NotLoaded {
                path: "hit.ogg".to_string(),
                kind: AssetKind::Texture
            })
        );
    }

    #[test]
    fn test_get_all_fails_on_first_missing() {
        let mut assets = PreloadedAssets::new();
        assets.load("a.ogg", AssetKind::Sound);
        assert_eq!(assets.get_all(&["a.ogg"], AssetKind::Sound).unwrap().len(), 1);
        assert!(assets.get_all(&["a.ogg", "b.ogg"], AssetKind::Sound).is_err());
        assets.load("a.ogg", AssetKind::Sound);
        assert_eq!(assets.len(), 1);
    }
}
