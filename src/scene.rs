use std::{collections::HashMap, path::PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

/// Label returned for inputs that have no entry in the scene map.
pub const UNCONFIGURED_SCENE: &str = "scene not configured";

/// Read-only view over the scene map file.
///
/// The file is maintained by an operator and read again on every lookup, so
/// edits show up without a restart.
#[derive(Debug, Clone)]
pub struct SceneDirectory {
    path: PathBuf,
}

impl SceneDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn lookup(&self, input_name: &str) -> String {
        let mut scenes = self.load().await;
        scenes
            .remove(input_name)
            .unwrap_or_else(|| UNCONFIGURED_SCENE.to_string())
    }

    /// Loads the whole map. Any failure yields an empty map.
    pub async fn load(&self) -> HashMap<String, String> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Scene map {:?} does not exist", self.path);
                return HashMap::new();
            }
            Err(e) => {
                warn!("Failed to read scene map {:?}: {}", self.path, e);
                return HashMap::new();
            }
        };
        parse_scene_map(&text).unwrap_or_else(|| {
            warn!("Scene map {:?} is not a JSON object, ignoring it", self.path);
            HashMap::new()
        })
    }
}

fn parse_scene_map(text: &str) -> Option<HashMap<String, String>> {
    let Value::Object(entries) = serde_json::from_str::<Value>(text).ok()? else {
        return None;
    };
    Some(
        entries
            .into_iter()
            // Labels are always strings in responses; other JSON values keep
            // their JSON text, so `3` becomes "3".
            .map(|(name, scene)| match scene {
                Value::String(scene) => (name, scene),
                other => (name, other.to_string()),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn directory_with(contents: &str) -> (TempDir, SceneDirectory) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene_map.json");
        std::fs::write(&path, contents).unwrap();
        (dir, SceneDirectory::new(path))
    }

    #[tokio::test]
    async fn returns_configured_scene() {
        let (_dir, scenes) =
            directory_with(r#"{"input1.jpg": "heavy rain", "input2.png": "night"}"#);
        assert_eq!(scenes.lookup("input1.jpg").await, "heavy rain");
        assert_eq!(scenes.lookup("input2.png").await, "night");
    }

    #[tokio::test]
    async fn missing_entry_yields_sentinel() {
        let (_dir, scenes) = directory_with(r#"{"input1.jpg": "heavy rain"}"#);
        assert_eq!(scenes.lookup("input9.jpg").await, UNCONFIGURED_SCENE);
    }

    #[tokio::test]
    async fn missing_file_yields_sentinel() {
        let dir = TempDir::new().unwrap();
        let scenes = SceneDirectory::new(dir.path().join("absent.json"));
        assert_eq!(scenes.lookup("input1.jpg").await, UNCONFIGURED_SCENE);
    }

    #[tokio::test]
    async fn malformed_file_yields_sentinel() {
        let (_dir, scenes) = directory_with("{ not json");
        assert_eq!(scenes.lookup("input1.jpg").await, UNCONFIGURED_SCENE);

        let (_dir, scenes) = directory_with(r#"["input1.jpg"]"#);
        assert_eq!(scenes.lookup("input1.jpg").await, UNCONFIGURED_SCENE);
    }

    #[tokio::test]
    async fn rereads_file_on_every_lookup() {
        let (dir, scenes) = directory_with(r#"{"input1.jpg": "tunnel"}"#);
        assert_eq!(scenes.lookup("input1.jpg").await, "tunnel");

        std::fs::write(dir.path().join("scene_map.json"), r#"{"input1.jpg": "curve"}"#).unwrap();
        assert_eq!(scenes.lookup("input1.jpg").await, "curve");
    }

    #[test]
    fn non_string_values_are_rendered_as_json() {
        let scenes = parse_scene_map(r#"{"input1.jpg": 3, "input2.jpg": ["a"]}"#).unwrap();
        assert_eq!(scenes["input1.jpg"], "3");
        assert_eq!(scenes["input2.jpg"], r#"["a"]"#);
    }
}
