//! Resolvers: transformaciones de texto aplicadas al script antes de
//! ejecutarlo. Ninguno falla porque falte su marcador.

pub mod bridge;
pub mod chain;
pub mod config;
pub mod expression;
pub mod printed;
pub mod result;
pub mod sandbox;

use std::fmt::Debug;

use crate::errors::ScriptError;
use crate::Arguments;

pub trait ScriptResolver: Send + Sync + Debug {
    fn name(&self) -> &'static str;
    fn resolve(&self, script: &str, arguments: &Arguments) -> Result<String, ScriptError>;
}

pub use bridge::BridgeSetupResolver;
pub use chain::{OrderedResolverChain, ResolverChain};
pub use config::{BridgeConfig, DeclaredResolver, ExpressionConfig, ResolverConfig, ResultConfig, SandboxConfig};
pub use expression::{ArgumentPathEvaluator, ExpressionEvaluator, ExpressionResolver};
pub use printed::PrintedResultResolver;
pub use result::ResultCaptureResolver;
pub use sandbox::SandboxResolver;
