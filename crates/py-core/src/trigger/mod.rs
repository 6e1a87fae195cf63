//! Capa de triggers: qué scripts declara un punto de disparo, en qué
//! perfiles aplican y con qué argumentos se llama al processor.

pub mod chain;
pub mod evaluator;
pub mod merge;
pub mod site;

use indexmap::IndexMap;

/// `script → perfiles` en orden de declaración.
pub type TriggerMetadata = IndexMap<String, Vec<String>>;

pub use chain::{ExtractorChain, MetadataExtractor};
pub use evaluator::{DetachedTriggerEvaluator, ProfileGate, TriggerEvaluator};
pub use merge::{merge_arguments, merge_metadata};
pub use site::{CallParameter, PrimaryDeclarationExtractor, RepeatedDeclarationExtractor, ScriptDeclaration,
               TriggerPhase, TriggerSite};
