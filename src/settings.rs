use crate::params::ParamsPatch;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Optional user configuration, merged under CLI flags.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub params: ParamsPatch,
    /// Wait time between trees in infinite mode (seconds)
    pub wait: Option<f64>,
}

impl Settings {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("treeart")
            .join("config.toml")
    }
}
