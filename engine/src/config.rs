//! Plugin configuration.
//!
//! Defaults come from the `default` fields of `_conf_schema.json`. A `config.json`
//! next to it may override any of the four keys. If either file can't be read or
//! parsed, the whole config falls back to [`Config::fallback`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{error, info};
use serde::{Deserialize, de::DeserializeOwned};

use crate::error::DrawError;

pub const SCHEMA_FILE: &str = "_conf_schema.json";
pub const OVERRIDE_FILE: &str = "config.json";

pub const FALLBACK_API_URL: &str = "https://api-inference.modelscope.cn/v1/images/generations";
pub const FALLBACK_MODEL: &str = "MusePublic/14_ckpt_SD_XL";
pub const FALLBACK_OUTPUT_DIR: &str = "generated_images";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub output_dir: PathBuf,
}

impl Config {
    /// Used when the schema or override file is unusable. Ships without a key.
    pub fn fallback() -> Self {
        Self {
            api_url: FALLBACK_API_URL.into(),
            api_key: String::new(),
            model: FALLBACK_MODEL.into(),
            output_dir: FALLBACK_OUTPUT_DIR.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct Schema {
    api_url: SchemaEntry,
    api_key: SchemaEntry,
    model: SchemaEntry,
    output_dir: SchemaEntry,
}

#[derive(Debug, Deserialize)]
struct SchemaEntry {
    default: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct Overrides {
    api_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: plugin_dir.into(),
        }
    }

    pub fn schema_path(&self) -> PathBuf {
        self.dir.join(SCHEMA_FILE)
    }

    pub fn override_path(&self) -> PathBuf {
        self.dir.join(OVERRIDE_FILE)
    }

    /// Never fails: read errors are logged and replaced by [`Config::fallback`].
    /// Also makes sure the output directory exists.
    pub fn load(&self) -> Config {
        let config = self.try_load().unwrap_or_else(|e| {
            error!("Failed to load config, using built-in defaults: {e}");
            Config::fallback()
        });

        if let Err(e) = fs::create_dir_all(&config.output_dir) {
            error!(
                "Couldn't create output dir {}: {e}",
                config.output_dir.display()
            );
        }

        config
    }

    fn try_load(&self) -> Result<Config, DrawError> {
        let schema: Schema = load_json_file(&self.schema_path())?;
        let mut config = Config {
            api_url: schema.api_url.default,
            api_key: schema.api_key.default,
            model: schema.model.default,
            output_dir: schema.output_dir.default.into(),
        };

        let override_path = self.override_path();
        if override_path.exists() {
            let overrides: Overrides = load_json_file(&override_path)?;
            overrides.apply(&mut config);
            info!("Loaded user config from {}", override_path.display());
        } else {
            info!("No user config found, using schema defaults");
        }

        Ok(config)
    }
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        let Overrides {
            api_url,
            api_key,
            model,
            output_dir,
        } = self;

        if let Some(v) = api_url {
            config.api_url = v;
        }
        if let Some(v) = api_key {
            config.api_key = v;
        }
        if let Some(v) = model {
            config.model = v;
        }
        if let Some(v) = output_dir {
            config.output_dir = v;
        }
    }
}

fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, DrawError> {
    let src = fs::read_to_string(path).map_err(|e| DrawError::config_load(path, e))?;
    serde_json::from_str(&src).map_err(|e| DrawError::config_load(path, e))
}
