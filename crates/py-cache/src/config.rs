//! Configuración de la capa de cache.

use serde::{Deserialize, Serialize};

use crate::key::{HashAlgorithm, DEFAULT_KEY_DELIMITER};

/// Capa que se decora con cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheLevel {
    File,
    Resolver,
    Executor,
    Processor,
}

impl CacheLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "file" => Some(Self::File),
            "resolver" => Some(Self::Resolver),
            "executor" => Some(Self::Executor),
            "processor" => Some(Self::Processor),
            _ => None,
        }
    }
}

/// Nombres de región por capa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheNames {
    pub file_paths: String,
    pub file_bodies: String,
    pub resolver: String,
    pub executor: String,
    pub processor: String,
}

impl Default for CacheNames {
    fn default() -> Self {
        Self { file_paths: "py_file_paths".into(),
               file_bodies: "py_file_bodies".into(),
               resolver: "py_resolver".into(),
               executor: "py_executor".into(),
               processor: "py_processor".into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub algorithm: HashAlgorithm,
    pub delimiter: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self { algorithm: HashAlgorithm::default(),
               delimiter: DEFAULT_KEY_DELIMITER.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub levels: Vec<CacheLevel>,
    pub names: CacheNames,
    pub key: KeyConfig,
    pub single_flight: bool,
}

impl CacheConfig {
    pub fn caches(&self, level: CacheLevel) -> bool {
        self.enabled && self.levels.contains(&level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_caches_nothing() {
        let cfg = CacheConfig { levels: vec![CacheLevel::Processor],
                                ..CacheConfig::default() };
        assert!(!cfg.caches(CacheLevel::Processor));
    }

    #[test]
    fn deserializes_levels_in_snake_case() {
        let cfg: CacheConfig =
            serde_json::from_str(r#"{"enabled": true, "levels": ["file", "executor"]}"#).unwrap();
        assert!(cfg.caches(CacheLevel::File));
        assert!(cfg.caches(CacheLevel::Executor));
        assert!(!cfg.caches(CacheLevel::Resolver));
        assert_eq!(cfg.names.file_bodies, "py_file_bodies");
    }
}
