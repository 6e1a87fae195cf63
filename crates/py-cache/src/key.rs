//! Generación de claves de cache.
//!
//! Formato: `[prefix<delim>]hex(digest(payload))[<delim>suffix]`. Con
//! argumentos, el payload es el script seguido del JSON canónico de los
//! argumentos ordenados por clave.

use std::fmt::Debug;

use py_core::hashing::{canonical_arguments, hash_str, sha256_hex};
use py_core::{Arguments, ScriptError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_KEY_DELIMITER: &str = "_";

pub trait CacheKeyGenerator: Send + Sync + Debug {
    fn generate(&self, body: &str, prefix: Option<&str>, suffix: Option<&str>) -> Result<String, ScriptError>;

    fn generate_with_arguments(&self, body: &str, arguments: &Arguments, prefix: Option<&str>,
                               suffix: Option<&str>)
                               -> Result<String, ScriptError> {
        let payload = format!("{body}{}", canonical_arguments(arguments));
        self.generate(&payload, prefix, suffix)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl HashAlgorithm {
    pub fn parse(raw: &str) -> Result<Self, ScriptError> {
        match raw.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(ScriptError::Config(format!("unknown hash algorithm '{other}'"))),
        }
    }

    fn digest(self, payload: &str) -> String {
        match self {
            Self::Sha256 => sha256_hex(payload),
            Self::Blake3 => hash_str(payload),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HashKeyGenerator {
    algorithm: HashAlgorithm,
    delimiter: String,
}

impl HashKeyGenerator {
    pub fn new(algorithm: HashAlgorithm, delimiter: impl Into<String>) -> Result<Self, ScriptError> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(ScriptError::Config("cache key delimiter cannot be empty".into()));
        }
        Ok(Self { algorithm, delimiter })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn checked<'a>(&self, part: Option<&'a str>, what: &str) -> Result<Option<&'a str>, ScriptError> {
        match part {
            Some(p) if p.contains(self.delimiter.as_str()) => {
                Err(ScriptError::CacheKeyGeneration(format!("{what} '{p}' contains the key delimiter '{}'",
                                                            self.delimiter)))
            }
            Some("") | None => Ok(None),
            Some(p) => Ok(Some(p)),
        }
    }
}

impl Default for HashKeyGenerator {
    fn default() -> Self {
        Self { algorithm: HashAlgorithm::default(),
               delimiter: DEFAULT_KEY_DELIMITER.to_string() }
    }
}

impl CacheKeyGenerator for HashKeyGenerator {
    fn generate(&self, body: &str, prefix: Option<&str>, suffix: Option<&str>) -> Result<String, ScriptError> {
        let prefix = self.checked(prefix, "prefix")?;
        let suffix = self.checked(suffix, "suffix")?;
        let mut key = String::new();
        if let Some(p) = prefix {
            key.push_str(p);
            key.push_str(&self.delimiter);
        }
        key.push_str(&self.algorithm.digest(body));
        if let Some(s) = suffix {
            key.push_str(&self.delimiter);
            key.push_str(s);
        }
        Ok(key)
    }
}
