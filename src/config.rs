//! Engine configuration. The built-in defaults are compiled in from
//! `data/engine_config.json`; overrides come from a JSON string or file.

#[cfg(not(target_arch = "wasm32"))]
use std::{fs, path::Path};

use serde::Deserialize;

#[cfg(not(target_arch = "wasm32"))]
use crate::error::ConfigError;

pub const BUILTIN_ENGINE_CONFIG: &str = include_str!("data/engine_config.json");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Period of the autosave task. 0 disables autosave.
    pub autosave_interval_ms: u64,
    /// Entries kept in the message log.
    pub message_log_capacity: usize,
    /// Save slot used by the save/load actions and autosave.
    pub save_slot: String,
    /// Largest wall-clock gap fed to the engine per frame.
    pub max_frame_delta_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autosave_interval_ms: 30_000,
            message_log_capacity: 50,
            save_slot: "cat-save".into(),
            max_frame_delta_ms: 500,
        }
    }
}

impl EngineConfig {
    /// The compiled-in configuration, falling back to defaults if it fails to parse.
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_ENGINE_CONFIG).unwrap_or_default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config = EngineConfig::from_json_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_matches_defaults() {
        assert_eq!(EngineConfig::builtin(), EngineConfig::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "save_slot": "slot-2" }"#).unwrap();
        assert_eq!(config.save_slot, "slot-2");
        assert_eq!(config.autosave_interval_ms, 30_000);
        assert_eq!(config.message_log_capacity, 50);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(EngineConfig::from_json_str("{ nope").is_err());
    }

    #[test]
    fn from_file_reads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{ "autosave_interval_ms": 0 }"#).unwrap();
        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.autosave_interval_ms, 0);
    }

    #[test]
    fn from_file_missing_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = EngineConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed { .. }));
        assert!(err.to_string().contains("absent.json"));
    }
}
