use std::path::PathBuf;

use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const CONFIG_PATH_VAR: &str = "LANE_BACKEND_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "lane-backend";
pub const ENV_PREFIX: &str = "LANE_BACKEND";

/// Local development frontends allowed to call the API from a browser.
pub const DEV_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://localhost:5174",
    "http://localhost:5175",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub host: String,
    pub port: u16,
    pub uploads_dir: PathBuf,
    pub outputs_dir: PathBuf,
    pub scene_map_path: PathBuf,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub log_level: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            uploads_dir: PathBuf::from("uploads"),
            outputs_dir: PathBuf::from("outputs"),
            scene_map_path: PathBuf::from("scene_map.json"),
            allowed_origins: DEV_ORIGINS.iter().map(|o| o.to_string()).collect(),
            max_upload_bytes: 50 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

impl Configuration {
    /// Layers an optional config file and `LANE_BACKEND__*` variables over the
    /// defaults. The file defaults to `lane-backend.{toml,json,yaml}` in the
    /// working directory and can be moved with `LANE_BACKEND_CONFIG`.
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        Self::load_from(&file, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(file: &str, environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(
                environment
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_origins"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
