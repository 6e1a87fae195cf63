//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) con prefijo `PYFLOW_` y expone una
//! estructura inmutable (`CONFIG`). Las variables ausentes dejan el valor por
//! defecto de cada sección.
use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use log::warn;
use once_cell::sync::Lazy;
use py_cache::{CacheConfig, CacheLevel, HashAlgorithm};
use py_core::constants::PYTHON_FILE_EXTENSION;
use py_core::executor::ExecutorConfig;
use py_core::trigger::TriggerPhase;
use py_core::{DeclaredResolver, ExecutorKind, ResolverConfig, ScriptError};

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Instancia global perezosa. Si el entorno es inválido se usan los defaults.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    AppConfig::from_env().unwrap_or_else(|e| {
                             warn!("invalid PYFLOW_* environment, using defaults: {e}");
                             AppConfig::default()
                         })
});

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directorio base de las referencias a fichero.
    pub scripts_dir: PathBuf,
    /// Extensión que marca un script como referencia a fichero.
    pub script_extension: String,
    pub resolvers: ResolverConfig,
    pub executor: ExecutorConfig,
    pub cache: CacheConfig,
    /// Perfiles activos para los triggers.
    pub profiles: Vec<String>,
    /// Fases de trigger que se evalúan en otro hilo.
    pub detached_phases: Vec<TriggerPhase>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { scripts_dir: PathBuf::from("."),
               script_extension: PYTHON_FILE_EXTENSION.to_string(),
               resolvers: ResolverConfig::default(),
               executor: ExecutorConfig::default(),
               cache: CacheConfig::default(),
               profiles: Vec::new(),
               detached_phases: Vec::new() }
    }
}

fn list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn flag(key: &str, raw: &str) -> Result<bool, ScriptError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ScriptError::Config(format!("{key}: expected a boolean, got '{other}'"))),
    }
}

fn millis(key: &str, raw: &str) -> Result<u64, ScriptError> {
    raw.trim()
       .parse()
       .map_err(|_| ScriptError::Config(format!("{key}: expected milliseconds, got '{raw}'")))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ScriptError> {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración leyendo cada variable con `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScriptError>
        where F: Fn(&str) -> Option<String>
    {
        let mut cfg = Self::default();

        if let Some(dir) = lookup("PYFLOW_SCRIPTS_DIR") {
            cfg.scripts_dir = PathBuf::from(dir);
        }
        if let Some(ext) = lookup("PYFLOW_SCRIPT_EXTENSION") {
            cfg.script_extension = ext;
        }
        if let Some(raw) = lookup("PYFLOW_RESOLVERS") {
            cfg.resolvers.declared = list(&raw).map(|name| {
                                                   DeclaredResolver::parse(name).ok_or_else(|| {
                                                       ScriptError::Config(format!("unknown resolver '{name}'"))
                                                   })
                                               })
                                               .collect::<Result<_, _>>()?;
        }

        if let Some(raw) = lookup("PYFLOW_EXECUTOR") {
            cfg.executor.kind = ExecutorKind::parse(&raw)?;
        }
        let local = &mut cfg.executor.local;
        if let Some(cmd) = lookup("PYFLOW_START_COMMAND") {
            local.start_command = cmd;
        }
        if let Some(raw) = lookup("PYFLOW_LOGGABLE") {
            local.loggable = flag("PYFLOW_LOGGABLE", &raw)?;
        }
        if let Some(raw) = lookup("PYFLOW_FAIL_ON_EXIT") {
            local.fail_on_non_zero_exit = flag("PYFLOW_FAIL_ON_EXIT", &raw)?;
        }
        if let Some(raw) = lookup("PYFLOW_TIMEOUT_MS") {
            let timeout = millis("PYFLOW_TIMEOUT_MS", &raw)?;
            cfg.executor.local.timeout_ms = Some(timeout);
            cfg.executor.http.timeout_ms = Some(timeout);
            cfg.executor.rpc.timeout_ms = Some(timeout);
        }

        let http = &mut cfg.executor.http;
        if let Some(uri) = lookup("PYFLOW_HTTP_URI") {
            http.uri = uri;
        }
        http.token = lookup("PYFLOW_HTTP_TOKEN").or(http.token.take());
        http.username = lookup("PYFLOW_HTTP_USERNAME").or(http.username.take());
        http.password = lookup("PYFLOW_HTTP_PASSWORD").or(http.password.take());

        let rpc = &mut cfg.executor.rpc;
        if let Some(uri) = lookup("PYFLOW_RPC_URI") {
            rpc.uri = uri;
        }
        if let Some(method) = lookup("PYFLOW_RPC_METHOD") {
            rpc.method = method;
        }
        rpc.token = lookup("PYFLOW_RPC_TOKEN").or(rpc.token.take());

        if let Some(raw) = lookup("PYFLOW_CACHE_ENABLED") {
            cfg.cache.enabled = flag("PYFLOW_CACHE_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("PYFLOW_CACHE_LEVELS") {
            cfg.cache.levels = list(&raw).map(|name| {
                                             CacheLevel::parse(name).ok_or_else(|| {
                                                 ScriptError::Config(format!("unknown cache level '{name}'"))
                                             })
                                         })
                                         .collect::<Result<_, _>>()?;
        }
        if let Some(raw) = lookup("PYFLOW_CACHE_ALGORITHM") {
            cfg.cache.key.algorithm = HashAlgorithm::parse(&raw)?;
        }
        if let Some(raw) = lookup("PYFLOW_CACHE_DELIMITER") {
            cfg.cache.key.delimiter = raw;
        }
        if let Some(raw) = lookup("PYFLOW_CACHE_SINGLE_FLIGHT") {
            cfg.cache.single_flight = flag("PYFLOW_CACHE_SINGLE_FLIGHT", &raw)?;
        }

        if let Some(raw) = lookup("PYFLOW_PROFILES") {
            cfg.profiles = list(&raw).map(str::to_string).collect();
        }
        if let Some(raw) = lookup("PYFLOW_DETACHED_PHASES") {
            cfg.detached_phases = list(&raw).map(|name| match name.to_ascii_lowercase().as_str() {
                                                "before" => Ok(TriggerPhase::Before),
                                                "after" => Ok(TriggerPhase::After),
                                                other => {
                                                    Err(ScriptError::Config(format!("unknown trigger phase '{other}'")))
                                                }
                                            })
                                            .collect::<Result<_, _>>()?;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.resolvers.declared, vec![DeclaredResolver::Expression, DeclaredResolver::Result]);
        assert_eq!(cfg.executor.kind, ExecutorKind::Local);
        assert!(!cfg.cache.enabled);
        assert_eq!(cfg.script_extension, ".py");
    }

    #[test]
    fn script_extension_is_configurable() {
        let cfg = AppConfig::from_lookup(lookup(&[("PYFLOW_SCRIPT_EXTENSION", ".pyw")])).unwrap();
        assert_eq!(cfg.script_extension, ".pyw");
    }

    #[test]
    fn reads_resolvers_executor_and_cache() {
        let cfg = AppConfig::from_lookup(lookup(&[("PYFLOW_RESOLVERS", "result, printed_result, spelython"),
                                                  ("PYFLOW_EXECUTOR", "rest"),
                                                  ("PYFLOW_HTTP_TOKEN", "secret"),
                                                  ("PYFLOW_TIMEOUT_MS", "1500"),
                                                  ("PYFLOW_CACHE_ENABLED", "true"),
                                                  ("PYFLOW_CACHE_LEVELS", "file,processor"),
                                                  ("PYFLOW_DETACHED_PHASES", "after")])).unwrap();
        assert_eq!(cfg.resolvers.declared.len(), 3);
        assert_eq!(cfg.executor.kind, ExecutorKind::Http);
        assert_eq!(cfg.executor.http.token.as_deref(), Some("secret"));
        assert_eq!(cfg.executor.local.timeout_ms, Some(1500));
        assert!(cfg.cache.caches(CacheLevel::File));
        assert!(!cfg.cache.caches(CacheLevel::Executor));
        assert_eq!(cfg.detached_phases, vec![TriggerPhase::After]);
    }

    #[test]
    fn unknown_values_are_config_errors() {
        assert!(matches!(AppConfig::from_lookup(lookup(&[("PYFLOW_RESOLVERS", "nope")])),
                         Err(ScriptError::Config(_))));
        assert!(matches!(AppConfig::from_lookup(lookup(&[("PYFLOW_EXECUTOR", "ssh")])),
                         Err(ScriptError::Config(_))));
        assert!(matches!(AppConfig::from_lookup(lookup(&[("PYFLOW_CACHE_ENABLED", "maybe")])),
                         Err(ScriptError::Config(_))));
    }
}
