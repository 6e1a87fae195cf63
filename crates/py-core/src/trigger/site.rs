//! Descripción de un punto de disparo (la llamada interceptada) y los
//! extractores que leen sus declaraciones de script.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::chain::MetadataExtractor;
use super::TriggerMetadata;
use crate::constants::RESULT_ARGUMENT_KEY;
use crate::errors::ScriptError;
use crate::Arguments;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerPhase {
    Before,
    After,
}

/// Script declarado por el sitio y perfiles en los que aplica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptDeclaration {
    pub script: String,
    #[serde(default)]
    pub active_profiles: Vec<String>,
}

impl ScriptDeclaration {
    pub fn new(script: impl Into<String>) -> Self {
        Self { script: script.into(),
               active_profiles: Vec::new() }
    }

    pub fn with_profiles<I, P>(mut self, profiles: I) -> Self
        where I: IntoIterator<Item = P>,
              P: Into<String>
    {
        self.active_profiles = profiles.into_iter().map(Into::into).collect();
        self
    }
}

/// Parámetro de la llamada. `alias` sustituye al nombre como clave del
/// argumento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallParameter {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerSite {
    pub name: String,
    pub phase: TriggerPhase,
    #[serde(default)]
    pub primary: Option<ScriptDeclaration>,
    #[serde(default)]
    pub repeated: Vec<ScriptDeclaration>,
    #[serde(default)]
    pub parameters: Vec<CallParameter>,
    /// Valor devuelto por la llamada (solo en `After`).
    #[serde(default)]
    pub return_value: Option<Value>,
}

impl TriggerSite {
    pub fn new(name: impl Into<String>, phase: TriggerPhase) -> Self {
        Self { name: name.into(),
               phase,
               primary: None,
               repeated: Vec::new(),
               parameters: Vec::new(),
               return_value: None }
    }

    pub fn with_primary(mut self, declaration: ScriptDeclaration) -> Self {
        self.primary = Some(declaration);
        self
    }

    pub fn with_repeated(mut self, declaration: ScriptDeclaration) -> Self {
        self.repeated.push(declaration);
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, alias: Option<&str>, value: Value) -> Self {
        self.parameters.push(CallParameter { name: name.into(),
                                             alias: alias.map(str::to_string),
                                             value });
        self
    }

    pub fn with_return_value(mut self, value: Value) -> Self {
        self.return_value = Some(value);
        self
    }

    /// Argumentos de la llamada; en `After` el valor devuelto va bajo `result`.
    pub fn arguments(&self) -> Arguments {
        let mut args: Arguments = self.parameters
                                      .iter()
                                      .map(|p| (p.alias.clone().unwrap_or_else(|| p.name.clone()), p.value.clone()))
                                      .collect();
        if self.phase == TriggerPhase::After {
            args.insert(RESULT_ARGUMENT_KEY.to_string(), self.return_value.clone().unwrap_or(Value::Null));
        }
        args
    }
}

fn declarations_to_metadata<'a, I>(declarations: I) -> TriggerMetadata
    where I: IntoIterator<Item = &'a ScriptDeclaration>
{
    declarations.into_iter()
                .map(|d| (d.script.clone(), d.active_profiles.clone()))
                .collect()
}

/// Lee la declaración principal del sitio.
#[derive(Debug, Default)]
pub struct PrimaryDeclarationExtractor;

impl MetadataExtractor<TriggerSite> for PrimaryDeclarationExtractor {
    fn name(&self) -> &str {
        "primary"
    }

    fn extract(&self, site: &TriggerSite) -> Result<TriggerMetadata, ScriptError> {
        let declaration = site.primary
                              .as_ref()
                              .ok_or_else(|| ScriptError::Extraction(format!("'{}' has no primary script", site.name)))?;
        if declaration.script.trim().is_empty() {
            return Err(ScriptError::Extraction(format!("'{}' declares an empty script", site.name)));
        }
        Ok(declarations_to_metadata([declaration]))
    }
}

/// Lee las declaraciones repetidas del sitio.
#[derive(Debug, Default)]
pub struct RepeatedDeclarationExtractor;

impl MetadataExtractor<TriggerSite> for RepeatedDeclarationExtractor {
    fn name(&self) -> &str {
        "repeated"
    }

    fn extract(&self, site: &TriggerSite) -> Result<TriggerMetadata, ScriptError> {
        if site.repeated.is_empty() {
            return Err(ScriptError::Extraction(format!("'{}' has no repeated scripts", site.name)));
        }
        Ok(declarations_to_metadata(site.repeated.iter().filter(|d| !d.script.trim().is_empty())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aliases_replace_parameter_names() {
        let site = TriggerSite::new("save", TriggerPhase::Before).with_parameter("user_id", Some("id"), json!(5))
                                                                 .with_parameter("name", None, json!("n"));
        let args = site.arguments();
        assert_eq!(args["id"], json!(5));
        assert_eq!(args["name"], json!("n"));
        assert!(!args.contains_key("user_id"));
        assert!(!args.contains_key("result"));
    }

    #[test]
    fn after_phase_exposes_return_value() {
        let site = TriggerSite::new("load", TriggerPhase::After).with_return_value(json!({"ok": true}));
        assert_eq!(site.arguments()["result"], json!({"ok": true}));
    }

    #[test]
    fn extractors_read_their_declarations() {
        let site = TriggerSite::new("m", TriggerPhase::Before)
            .with_primary(ScriptDeclaration::new("a.py").with_profiles(["dev"]))
            .with_repeated(ScriptDeclaration::new("b.py"))
            .with_repeated(ScriptDeclaration::new("c.py").with_profiles(["prod", "qa"]));
        let primary = PrimaryDeclarationExtractor.extract(&site).unwrap();
        assert_eq!(primary["a.py"], vec!["dev".to_string()]);
        let repeated = RepeatedDeclarationExtractor.extract(&site).unwrap();
        assert_eq!(repeated.len(), 2);
        assert_eq!(repeated["c.py"].len(), 2);
    }

    #[test]
    fn missing_declarations_fail_extraction() {
        let site = TriggerSite::new("m", TriggerPhase::Before);
        assert!(matches!(PrimaryDeclarationExtractor.extract(&site), Err(ScriptError::Extraction(_))));
        assert!(matches!(RepeatedDeclarationExtractor.extract(&site), Err(ScriptError::Extraction(_))));
    }
}
