//! Cadena de resolvers aplicada en orden explícito.

use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

use log::{debug, info};

use super::bridge::BridgeSetupResolver;
use super::config::{DeclaredResolver, ResolverConfig};
use super::expression::{ExpressionEvaluator, ExpressionResolver};
use super::printed::PrintedResultResolver;
use super::result::ResultCaptureResolver;
use super::sandbox::SandboxResolver;
use super::ScriptResolver;
use crate::errors::ScriptError;
use crate::Arguments;

/// Aplica todos los resolvers configurados al script.
pub trait ResolverChain: Send + Sync + Debug {
    fn resolve_all(&self, script: &str, arguments: &Arguments) -> Result<String, ScriptError>;
}

#[derive(Debug)]
pub struct OrderedResolverChain {
    resolvers: Vec<Box<dyn ScriptResolver>>,
}

impl OrderedResolverChain {
    /// Usa los resolvers tal cual, en el orden recibido.
    pub fn new(resolvers: Vec<Box<dyn ScriptResolver>>) -> Self {
        Self { resolvers }
    }

    /// Construye los resolvers declarados en orden canónico
    /// (expression → bridge → sandbox → result → printed_result).
    ///
    /// El sandbox va antes que `result` porque, si ambos están declarados,
    /// captura los marcadores dentro del código restringido y `result` ya no
    /// encuentra nada que sustituir.
    pub fn from_config(config: &ResolverConfig, evaluator: Arc<dyn ExpressionEvaluator>) -> Result<Self, ScriptError> {
        let mut seen = HashSet::new();
        for declared in &config.declared {
            if !seen.insert(*declared) {
                return Err(ScriptError::Config(format!("resolver '{declared:?}' declared more than once")));
            }
        }
        let mut ordered = config.declared.clone();
        ordered.sort();
        if ordered != config.declared {
            info!("resolvers reordered to canonical order: {:?}", ordered);
        }

        let mut resolvers: Vec<Box<dyn ScriptResolver>> = Vec::with_capacity(ordered.len());
        for declared in ordered {
            let resolver: Box<dyn ScriptResolver> = match declared {
                DeclaredResolver::Expression => Box::new(ExpressionResolver::new(&config.expression, evaluator.clone())?),
                DeclaredResolver::Bridge => Box::new(BridgeSetupResolver::new(config)?),
                DeclaredResolver::Sandbox => Box::new(SandboxResolver::new(config)?),
                DeclaredResolver::Result => Box::new(ResultCaptureResolver::new(&config.result)?),
                DeclaredResolver::PrintedResult => Box::new(PrintedResultResolver::new(&config.result)),
            };
            resolvers.push(resolver);
        }
        Ok(Self::new(resolvers))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }
}

impl ResolverChain for OrderedResolverChain {
    fn resolve_all(&self, script: &str, arguments: &Arguments) -> Result<String, ScriptError> {
        if script.trim().is_empty() {
            return Err(ScriptError::EmptyScript);
        }
        let mut resolved = script.to_string();
        for resolver in &self.resolvers {
            resolved = resolver.resolve(&resolved, arguments)?;
            debug!("resolver '{}' applied", resolver.name());
        }
        Ok(resolved)
    }
}
