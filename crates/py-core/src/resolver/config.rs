//! Configuración de los resolvers.
//!
//! Todas las estructuras son deserializables con `serde` y sus `Default`
//! reproducen las convenciones de marcadores que esperan los scripts.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Resolvers que se pueden declarar. El orden de las variantes es el orden
/// canónico de aplicación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredResolver {
    Expression,
    Bridge,
    Sandbox,
    Result,
    PrintedResult,
}

impl DeclaredResolver {
    /// Parsea un nombre de configuración (`expression`, `printed-result`, ...).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "expression" | "spelython" => Some(Self::Expression),
            "bridge" | "py4j" => Some(Self::Bridge),
            "sandbox" | "restricted_python" => Some(Self::Sandbox),
            "result" => Some(Self::Result),
            "printed_result" => Some(Self::PrintedResult),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub declared: Vec<DeclaredResolver>,
    /// Regex que reconoce una línea de import completa.
    pub script_imports_regex: String,
    pub expression: ExpressionConfig,
    pub bridge: BridgeConfig,
    pub sandbox: SandboxConfig,
    pub result: ResultConfig,
}

impl ResolverConfig {
    pub fn is_declared(&self, resolver: DeclaredResolver) -> bool {
        self.declared.contains(&resolver)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { declared: vec![DeclaredResolver::Expression, DeclaredResolver::Result],
               script_imports_regex: SCRIPT_IMPORTS_REGEX.to_string(),
               expression: ExpressionConfig::default(),
               bridge: BridgeConfig::default(),
               sandbox: SandboxConfig::default(),
               result: ResultConfig::default() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    pub regex: String,
    pub start_trim: usize,
    pub end_trim: usize,
    pub variable_prefix: String,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self { regex: EXPRESSION_REGEX.to_string(),
               start_trim: EXPRESSION_TRIM_START,
               end_trim: EXPRESSION_TRIM_END,
               variable_prefix: EXPRESSION_VARIABLE_PREFIX.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub import_line: String,
    /// Plantilla de la línea del gateway; `{params}` se sustituye por los
    /// parámetros unidos con `BRIDGE_PARAMS_SEPARATOR`.
    pub gateway_template: String,
    pub gateway_params: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self { import_line: BRIDGE_IMPORT_LINE.to_string(),
               gateway_template: BRIDGE_GATEWAY_TEMPLATE.to_string(),
               gateway_params: vec!["address=\"127.0.0.1\"".to_string(), "port=25333".to_string()] }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub import_line: String,
    pub code_variable: String,
    pub locals_variable: String,
    pub safe_result: String,
    pub globals_variable: String,
    pub print_enabled: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self { import_line: SANDBOX_IMPORT_LINE.to_string(),
               code_variable: SANDBOX_CODE_VARIABLE.to_string(),
               locals_variable: SANDBOX_LOCALS_VARIABLE.to_string(),
               safe_result: SANDBOX_SAFE_RESULT.to_string(),
               globals_variable: SANDBOX_GLOBALS.to_string(),
               print_enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultConfig {
    pub regex: String,
    pub start_trim: usize,
    pub end_trim: usize,
    /// Variable visible del resultado y prefijo de la línea en stdout.
    pub appearance: String,
}

impl Default for ResultConfig {
    fn default() -> Self {
        Self { regex: RESULT_REGEX.to_string(),
               start_trim: RESULT_TRIM_START,
               end_trim: RESULT_TRIM_END,
               appearance: RESULT_APPEARANCE.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(DeclaredResolver::parse("py4j"), Some(DeclaredResolver::Bridge));
        assert_eq!(DeclaredResolver::parse(" Printed-Result "), Some(DeclaredResolver::PrintedResult));
        assert_eq!(DeclaredResolver::parse("restricted_python"), Some(DeclaredResolver::Sandbox));
        assert_eq!(DeclaredResolver::parse("nope"), None);
    }

    #[test]
    fn deserialize_partial_config_keeps_defaults() {
        let cfg: ResolverConfig = serde_json::from_str(r#"{"declared": ["result", "printed_result"]}"#).unwrap();
        assert_eq!(cfg.declared, vec![DeclaredResolver::Result, DeclaredResolver::PrintedResult]);
        assert_eq!(cfg.result.appearance, "r4java");
        assert_eq!(cfg.expression.start_trim, 5);
    }
}
