//! PyFlow Rust Library
//!
//! Este crate une las piezas del workspace:
//! - `config` lee la configuración `PYFLOW_*` del entorno.
//! - `wiring` ensambla files, resolvers, executor y processor (con cache
//!   opcional por capa).
//!
//! Los tipos de `py_core` y `py_cache` se re-exportan para clientes que solo
//! dependan de este crate.

pub mod config;
pub mod wiring;

pub use config::{AppConfig, CONFIG};
pub use py_cache;
pub use py_core;
pub use wiring::{build_executor, build_stack, build_trigger_evaluator, effective_resolvers, ScriptStack};

/// Inicializa el subscriber de logs (`RUST_LOG`, por defecto `info`).
/// Los registros del facade `log` se reenvían al subscriber.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
