//! Evaluación de triggers: metadata → filtro de perfiles → processor.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error};

use super::chain::ExtractorChain;
use super::merge::merge_arguments;
use super::site::{PrimaryDeclarationExtractor, RepeatedDeclarationExtractor, TriggerPhase, TriggerSite};
use crate::errors::ScriptError;
use crate::processor::ScriptProcessor;
use crate::Arguments;

/// Decide si un script aplica según los perfiles activos del host.
#[derive(Debug, Clone, Default)]
pub struct ProfileGate {
    active: HashSet<String>,
}

impl ProfileGate {
    pub fn new<I, P>(active: I) -> Self
        where I: IntoIterator<Item = P>,
              P: Into<String>
    {
        Self { active: active.into_iter().map(Into::into).collect() }
    }

    /// Sin perfiles declarados el script siempre se ejecuta.
    pub fn allows(&self, profiles: &[String]) -> bool {
        profiles.is_empty() || profiles.iter().any(|p| self.active.contains(p))
    }
}

#[derive(Debug)]
pub struct TriggerEvaluator {
    chain: ExtractorChain<TriggerSite>,
    gate: ProfileGate,
    processor: Arc<dyn ScriptProcessor>,
}

impl TriggerEvaluator {
    pub fn new(chain: ExtractorChain<TriggerSite>, gate: ProfileGate, processor: Arc<dyn ScriptProcessor>) -> Self {
        Self { chain,
               gate,
               processor }
    }

    /// Cadena con los extractores de declaración principal y repetida.
    pub fn with_default_extractors(gate: ProfileGate, processor: Arc<dyn ScriptProcessor>) -> Self {
        let chain = ExtractorChain::with_extractors(vec![Box::new(PrimaryDeclarationExtractor),
                                                         Box::new(RepeatedDeclarationExtractor)]);
        Self::new(chain, gate, processor)
    }

    /// Ejecuta los scripts del sitio que pasen el filtro de perfiles y
    /// devuelve cuántos se ejecutaron. El primer error aborta.
    pub fn evaluate(&self, site: &TriggerSite, additional: &Arguments) -> Result<usize, ScriptError> {
        let metadata = self.chain.extract(site)?;
        let arguments = merge_arguments(&site.arguments(), additional);
        let mut executed = 0;
        for (script, profiles) in &metadata {
            if !self.gate.allows(profiles) {
                debug!("script '{script}' on '{}' skipped by profiles {:?}", site.name, profiles);
                continue;
            }
            self.processor.process(script, None, &arguments)?;
            executed += 1;
        }
        Ok(executed)
    }
}

/// Ejecuta en un hilo propio los triggers de las fases configuradas; el
/// resto se evalúa en el hilo del caller.
#[derive(Debug, Clone)]
pub struct DetachedTriggerEvaluator {
    inner: Arc<TriggerEvaluator>,
    detached: HashSet<TriggerPhase>,
}

impl DetachedTriggerEvaluator {
    pub fn new<I>(inner: Arc<TriggerEvaluator>, detached: I) -> Self
        where I: IntoIterator<Item = TriggerPhase>
    {
        Self { inner,
               detached: detached.into_iter().collect() }
    }

    pub fn is_detached(&self, phase: TriggerPhase) -> bool {
        self.detached.contains(&phase)
    }

    /// En fases desacopladas devuelve el handle del hilo (los errores solo se
    /// loguean); en las demás propaga el error al caller.
    pub fn dispatch(&self, site: TriggerSite, additional: Arguments) -> Result<Option<JoinHandle<()>>, ScriptError> {
        if !self.is_detached(site.phase) {
            self.inner.evaluate(&site, &additional)?;
            return Ok(None);
        }
        let inner = Arc::clone(&self.inner);
        let handle = thread::Builder::new().name(format!("trigger-{}", site.name))
                                           .spawn(move || {
                                               if let Err(e) = inner.evaluate(&site, &additional) {
                                                   error!("detached trigger '{}' failed: {e}", site.name);
                                               }
                                           })
                                           .map_err(|e| ScriptError::execution(format!("cannot spawn trigger thread: {e}")))?;
        Ok(Some(handle))
    }
}
