//! Level files and prop descriptors
//!
//! A level is a JSON document holding a list of props. Every prop carries an
//! `id`, a `layer` (0-6) and a `type`; the remaining keys belong to that
//! type and are decoded by the prop's constructor. Records that can't be
//! read are skipped with a warning so one bad entry never sinks a level.

pub mod props;
pub mod registry;

pub use props::{BackgroundProp, DustbinProp, GameLogoProp, GroundProp, PaperBallProp, TurretProp};
pub use registry::{BuildContext, PropError, PropFactory, PropRegistry};

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::scene::Layer;

/// Current level file format version
pub const LEVEL_VERSION: u32 = 1;

/// One serialized level entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropDescriptor {
    pub id: i32,
    #[serde(default, deserialize_with = "lenient_layer")]
    pub layer: i32,
    #[serde(rename = "type")]
    pub kind: String,
    /// Type-specific fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PropDescriptor {
    pub fn new(id: i32, layer: i32, kind: &str) -> Self {
        Self {
            id,
            layer,
            kind: kind.to_string(),
            fields: Map::new(),
        }
    }

    /// Scene layer this prop is placed into
    pub fn scene_layer(&self) -> Layer {
        Layer::from_index(self.layer)
    }

    /// Decode the type-specific fields
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.fields.clone()))
    }

    /// Replace the type-specific fields with a typed payload
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.fields = match serde_json::to_value(payload)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Ok(self)
    }
}

/// Anything that isn't an `i32` becomes layer 0 rather than sinking the record
fn lenient_layer<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let layer = value.as_ref().and_then(Value::as_i64).and_then(|i| i32::try_from(i).ok());
    if layer.is_none() && value.as_ref().is_some_and(|v| !v.is_null()) {
        log::debug!("unreadable layer {value:?}; using 0");
    }
    Ok(layer.unwrap_or(0))
}

/// On-disk level document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LevelFile<T> {
    #[serde(default = "default_version")]
    version: u32,
    props: Vec<T>,
}

fn default_version() -> u32 {
    LEVEL_VERSION
}

/// Parse level JSON. Unreadable records are skipped; a document that isn't
/// a level at all is an error.
pub fn parse(json: &str) -> anyhow::Result<Vec<PropDescriptor>> {
    let file: LevelFile<Value> = serde_json::from_str(json).context("level is not valid JSON")?;
    if file.version > LEVEL_VERSION {
        log::warn!(
            "level format version {} is newer than supported {}; loading anyway",
            file.version,
            LEVEL_VERSION
        );
    }

    let mut props = Vec::with_capacity(file.props.len());
    for (index, record) in file.props.into_iter().enumerate() {
        match serde_json::from_value::<PropDescriptor>(record) {
            Ok(prop) => props.push(prop),
            Err(e) => log::warn!("skipping level record #{index}: {e}"),
        }
    }
    Ok(props)
}

/// Read a level file in file order (not yet sorted)
pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Vec<PropDescriptor>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read level {}", path.display()))?;
    let props = parse(&json).with_context(|| format!("failed to parse level {}", path.display()))?;
    log::info!("Loaded {} props from {}", props.len(), path.display());
    Ok(props)
}

pub fn to_json(props: &[PropDescriptor]) -> anyhow::Result<String> {
    let file = LevelFile {
        version: LEVEL_VERSION,
        props: props.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

pub fn save(path: impl AsRef<Path>, props: &[PropDescriptor]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = to_json(props)?;
    fs::write(path, json).with_context(|| format!("failed to write level {}", path.display()))?;
    log::info!("Saved {} props to {}", props.len(), path.display());
    Ok(())
}

/// Stable sort by ascending id; equal ids keep file order
pub fn sort_props(props: &mut [PropDescriptor]) {
    props.sort_by_key(|p| p.id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_records() {
        let props = parse(
            r#"{"version":1,"props":[
                {"id":2,"layer":1,"type":"Ground"},
                {"id":1,"layer":0,"type":"Background","background":"assets/bg.png","parallax_x":0.5}
            ]}"#,
        )
        .unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].kind, "Ground");
        assert_eq!(props[1].fields.get("parallax_x"), Some(&json!(0.5)));
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let props = parse(
            r#"{"props":[
                {"layer":1,"type":"Ground"},
                {"id":"seven","type":"Ground"},
                {"id":3,"type":"Turret"},
                42
            ]}"#,
        )
        .unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].id, 3);
        assert_eq!(props[0].layer, 0);
    }

    #[test]
    fn test_unreadable_layer_keeps_record() {
        let props = parse(
            r#"{"props":[
                {"id":1,"layer":4294967296,"type":"Ground"},
                {"id":2,"layer":"9","type":"GameLogo"},
                {"id":3,"layer":null,"type":"Turret"},
                {"id":4,"layer":2.5,"type":"Dustbin"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(props.len(), 4);
        for prop in &props {
            assert_eq!(prop.layer, 0);
            assert_eq!(prop.scene_layer(), Layer::Background);
            assert!(!prop.fields.contains_key("layer"));
        }
    }

    #[test]
    fn test_not_a_level_is_error() {
        assert!(parse("[1, 2, 3]").is_err());
        assert!(parse("not json").is_err());
    }

    #[test]
    fn test_sort_is_stable() {
        let mut props = vec![
            PropDescriptor::new(5, 0, "A"),
            PropDescriptor::new(1, 0, "B"),
            PropDescriptor::new(5, 0, "C"),
            PropDescriptor::new(3, 0, "D"),
        ];
        sort_props(&mut props);
        let kinds: Vec<&str> = props.iter().map(|p| p.kind.as_str()).collect();
        assert_eq!(kinds, vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.json");
        let props = vec![
            PropDescriptor::new(1, 0, "Background")
                .with_payload(&BackgroundProp::default())
                .unwrap(),
            PropDescriptor::new(2, 1, "Ground"),
        ];
        save(&path, &props).unwrap();
        assert_eq!(load(&path).unwrap(), props);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_scene_layer_fallback() {
        assert_eq!(PropDescriptor::new(1, 9, "Ground").scene_layer(), Layer::Background);
        assert_eq!(PropDescriptor::new(1, 3, "Ground").scene_layer(), Layer::Action3);
    }
}
