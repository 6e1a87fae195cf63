//! Ensamblado del stack a partir de `AppConfig`.
//!
//! files → (cache) → resolvers → (cache) → executor → (cache) → processor →
//! (cache). Cada capa solo se decora si su nivel está habilitado.

use std::sync::Arc;

use log::{info, warn};
use py_cache::{in_memory_context, CacheContext, CacheLevel, CachingExecutor, CachingFileHandler,
               CachingProcessor, CachingResolverChain};
use py_core::executor::ExecutorConfig;
use py_core::trigger::DetachedTriggerEvaluator;
use py_core::{BasicProcessor, DeclaredResolver, ExecutorKind, ExpressionEvaluator, HttpExecutor, LocalFileHandler,
              LocalProcessExecutor, OrderedResolverChain, ProfileGate, ResolverChain, ResolverConfig, RpcExecutor, ScriptError,
              ScriptExecutor, ScriptFileHandler, ScriptProcessor, TriggerEvaluator};

use crate::config::AppConfig;

/// Las cuatro capas ya ensambladas.
#[derive(Debug, Clone)]
pub struct ScriptStack {
    pub files: Arc<dyn ScriptFileHandler>,
    pub resolvers: Arc<dyn ResolverChain>,
    pub executor: Arc<dyn ScriptExecutor>,
    pub processor: Arc<dyn ScriptProcessor>,
}

pub fn build_executor(config: &ExecutorConfig, files: Arc<dyn ScriptFileHandler>)
                      -> Result<Arc<dyn ScriptExecutor>, ScriptError> {
    Ok(match config.kind {
        ExecutorKind::Local => Arc::new(LocalProcessExecutor::new(config.local.clone(), files)),
        ExecutorKind::Http => Arc::new(HttpExecutor::new(config.http.clone())?),
        ExecutorKind::Rpc => Arc::new(RpcExecutor::new(config.rpc.clone())?),
    })
}

/// Resolvers efectivos para el executor configurado.
///
/// El executor local solo ve stdout: si se captura el resultado sin
/// imprimirlo, se añade `PrintedResult`.
pub fn effective_resolvers(config: &AppConfig) -> ResolverConfig {
    let mut resolvers = config.resolvers.clone();
    if config.executor.kind == ExecutorKind::Local
       && resolvers.is_declared(DeclaredResolver::Result)
       && !resolvers.is_declared(DeclaredResolver::PrintedResult)
    {
        warn!("local executor reads results from stdout, adding printed_result resolver");
        resolvers.declared.push(DeclaredResolver::PrintedResult);
    }
    resolvers
}

pub fn build_stack(config: &AppConfig, evaluator: Arc<dyn ExpressionEvaluator>) -> Result<ScriptStack, ScriptError> {
    let cache = &config.cache;
    let ctx: Option<CacheContext> = if cache.enabled { Some(in_memory_context(cache)?) } else { None };
    let layer = |level: CacheLevel| ctx.as_ref().filter(|_| cache.caches(level));

    let mut files: Arc<dyn ScriptFileHandler> =
        Arc::new(LocalFileHandler::new(config.scripts_dir.clone()).with_extension(config.script_extension.clone()));
    if let Some(ctx) = layer(CacheLevel::File) {
        files = Arc::new(CachingFileHandler::new(files, ctx, &cache.names.file_paths, &cache.names.file_bodies)?);
    }

    let chain = OrderedResolverChain::from_config(&effective_resolvers(config), evaluator)?;
    info!("resolver chain: {:?}", chain.names());
    let mut resolvers: Arc<dyn ResolverChain> = Arc::new(chain);
    if let Some(ctx) = layer(CacheLevel::Resolver) {
        resolvers = Arc::new(CachingResolverChain::new(resolvers, ctx, &cache.names.resolver)?);
    }

    let mut executor = build_executor(&config.executor, Arc::clone(&files))?;
    info!("executor: {:?}", config.executor.kind);
    if let Some(ctx) = layer(CacheLevel::Executor) {
        executor = Arc::new(CachingExecutor::new(executor, ctx, &cache.names.executor)?);
    }

    let mut processor: Arc<dyn ScriptProcessor> =
        Arc::new(BasicProcessor::new(Arc::clone(&files), Arc::clone(&resolvers), Arc::clone(&executor)));
    if let Some(ctx) = layer(CacheLevel::Processor) {
        processor = Arc::new(CachingProcessor::new(processor, ctx, &cache.names.processor)?);
    }

    Ok(ScriptStack { files,
                     resolvers,
                     executor,
                     processor })
}

/// Evaluador de triggers con los perfiles y fases desacopladas configurados.
pub fn build_trigger_evaluator(config: &AppConfig, processor: Arc<dyn ScriptProcessor>) -> DetachedTriggerEvaluator {
    let gate = ProfileGate::new(config.profiles.iter().cloned());
    let inner = TriggerEvaluator::with_default_extractors(gate, processor);
    DetachedTriggerEvaluator::new(Arc::new(inner), config.detached_phases.iter().copied())
}
