use std::path::PathBuf;

use anyhow::{bail, Result};

pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";
pub const DEFAULT_STORAGE_DIR: &str = ".resumecraft";

/// Builder configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderConfig {
    pub api_base: String,
    /// When false, every save goes straight to local storage.
    pub use_api: bool,
    pub storage_dir: PathBuf,
    /// Directory of `<id>.json` templates; the built-in set when unset.
    pub templates_dir: Option<PathBuf>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            use_api: true,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            templates_dir: None,
        }
    }
}

impl BuilderConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Ok(BuilderConfig {
            api_base: std::env::var("RESUMECRAFT_API_BASE").unwrap_or(defaults.api_base),
            use_api: match std::env::var("RESUMECRAFT_USE_API") {
                Ok(raw) => parse_flag("RESUMECRAFT_USE_API", &raw)?,
                Err(_) => defaults.use_api,
            },
            storage_dir: std::env::var("RESUMECRAFT_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            templates_dir: std::env::var("RESUMECRAFT_TEMPLATES_DIR")
                .ok()
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key} must be a boolean, got '{other}'"),
    }
}
