//! `ExpressionResolver`: sustituye marcadores `spel{<expr>}` por el valor de
//! la expresión convertido a literal Python.
//!
//! La evaluación se delega en un `ExpressionEvaluator` inyectado. El crate
//! incluye `ArgumentPathEvaluator`, que resuelve rutas sobre los argumentos
//! (`#user.name`, `#items[0]`) y literales simples.

use std::fmt::Debug;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use super::config::ExpressionConfig;
use super::ScriptResolver;
use crate::constants::IMPORT_JSON;
use crate::errors::ScriptError;
use crate::fragment::{compile_pattern, insert_unique_line_at_start, replace_fragments};
use crate::Arguments;

/// Capacidad de evaluar una expresión con los argumentos como variables.
pub trait ExpressionEvaluator: Send + Sync + Debug {
    fn evaluate(&self, expression: &str, arguments: &Arguments) -> Result<Value, ScriptError>;
}

#[derive(Debug)]
pub struct ExpressionResolver {
    pattern: Regex,
    start_trim: usize,
    end_trim: usize,
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl ExpressionResolver {
    pub fn new(config: &ExpressionConfig, evaluator: Arc<dyn ExpressionEvaluator>) -> Result<Self, ScriptError> {
        Ok(Self { pattern: compile_pattern(&config.regex)?,
                  start_trim: config.start_trim,
                  end_trim: config.end_trim,
                  evaluator })
    }
}

impl ScriptResolver for ExpressionResolver {
    fn name(&self) -> &'static str {
        "expression"
    }

    fn resolve(&self, script: &str, arguments: &Arguments) -> Result<String, ScriptError> {
        let mut buffer = script.to_string();
        insert_unique_line_at_start(&mut buffer, IMPORT_JSON);
        replace_fragments(&mut buffer, &self.pattern, self.start_trim, self.end_trim, |_, expression, out| {
            let value = self.evaluator.evaluate(expression, arguments)?;
            out.push_str(&to_python_literal(expression, &value)?);
            Ok(())
        })?;
        Ok(buffer)
    }
}

/// Convierte un valor JSON en texto Python.
///
/// Los strings se emiten como literal nativo (`'hola'`) para no acabar con
/// comillas dobles anidadas; el resto pasa por `json.loads('<json>')`.
pub fn to_python_literal(expression: &str, value: &Value) -> Result<String, ScriptError> {
    let json = serde_json::to_string(value).map_err(|e| ScriptError::expression(expression, e))?;
    match value {
        Value::String(_) => {
            let inner = &json[1..json.len() - 1];
            Ok(format!("'{}'", inner.replace('\'', "\\'")))
        }
        _ => Ok(format!("json.loads('{}')", json.replace('\\', "\\\\").replace('\'', "\\'"))),
    }
}

/// Evaluador por defecto: rutas sobre argumentos y literales.
///
/// Gramática: `#name`, `#name.field`, `#name[0]`, `#name['key']` encadenados;
/// literales `'texto'`, números, `true`, `false` y `null`.
#[derive(Debug, Clone)]
pub struct ArgumentPathEvaluator {
    prefix: String,
}

impl ArgumentPathEvaluator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn from_config(config: &ExpressionConfig) -> Self {
        Self::new(config.variable_prefix.clone())
    }

    fn literal(expression: &str) -> Option<Value> {
        if let Some(text) = expression.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
            return Some(Value::String(text.replace("''", "'")));
        }
        match expression {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            "null" => Some(Value::Null),
            _ => serde_json::from_str::<serde_json::Number>(expression).ok().map(Value::Number),
        }
    }

    fn walk(&self, expression: &str, path: &str, arguments: &Arguments) -> Result<Value, ScriptError> {
        let name_end = path.find(|c: char| c == '.' || c == '[').unwrap_or(path.len());
        let name = &path[..name_end];
        if name.is_empty() {
            return Err(ScriptError::expression(expression, "missing variable name"));
        }
        let mut current = arguments.get(name)
                                   .ok_or_else(|| ScriptError::expression(expression, format!("unknown variable '{name}'")))?;
        let mut rest = &path[name_end..];
        while !rest.is_empty() {
            if let Some(after_dot) = rest.strip_prefix('.') {
                let end = after_dot.find(|c: char| c == '.' || c == '[').unwrap_or(after_dot.len());
                let field = &after_dot[..end];
                current = current.get(field)
                                 .ok_or_else(|| ScriptError::expression(expression, format!("no field '{field}'")))?;
                rest = &after_dot[end..];
            } else if let Some(after_bracket) = rest.strip_prefix('[') {
                let close = after_bracket.find(']')
                                         .ok_or_else(|| ScriptError::expression(expression, "unclosed '['"))?;
                let key = after_bracket[..close].trim();
                current = Self::index(expression, current, key)?;
                rest = &after_bracket[close + 1..];
            } else {
                return Err(ScriptError::expression(expression, format!("unexpected token in '{rest}'")));
            }
        }
        Ok(current.clone())
    }

    fn index<'a>(expression: &str, value: &'a Value, key: &str) -> Result<&'a Value, ScriptError> {
        let found = match key.strip_prefix('\'').and_then(|k| k.strip_suffix('\'')) {
            Some(field) => value.get(field),
            None => {
                let idx: usize = key.parse()
                                    .map_err(|_| ScriptError::expression(expression, format!("invalid index '{key}'")))?;
                value.get(idx)
            }
        };
        found.ok_or_else(|| ScriptError::expression(expression, format!("nothing at [{key}]")))
    }
}

impl Default for ArgumentPathEvaluator {
    fn default() -> Self {
        Self::from_config(&ExpressionConfig::default())
    }
}

impl ExpressionEvaluator for ArgumentPathEvaluator {
    fn evaluate(&self, expression: &str, arguments: &Arguments) -> Result<Value, ScriptError> {
        let trimmed = expression.trim();
        if let Some(path) = trimmed.strip_prefix(self.prefix.as_str()) {
            return self.walk(expression, path, arguments);
        }
        Self::literal(trimmed).ok_or_else(|| ScriptError::expression(expression, "unsupported expression"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolver() -> ExpressionResolver {
        ExpressionResolver::new(&ExpressionConfig::default(), Arc::new(ArgumentPathEvaluator::default())).unwrap()
    }

    fn args() -> Arguments {
        let mut a = Arguments::new();
        a.insert("name".into(), json!("hi"));
        a.insert("user".into(), json!({"tags": ["a", "b"], "age": 3, "quote": "it's"}));
        a
    }

    #[test]
    fn string_value_is_native_literal() {
        let out = resolver().resolve("x = spel{#name}", &args()).unwrap();
        assert_eq!(out, "import json\nx = 'hi'");
        assert!(!out.contains("\"hi\""));
    }

    #[test]
    fn object_value_goes_through_json_loads() {
        let out = resolver().resolve("x = spel{#user.tags}", &args()).unwrap();
        assert!(out.ends_with("x = json.loads('[\"a\",\"b\"]')"));
    }

    #[test]
    fn single_quotes_are_escaped() {
        let out = resolver().resolve("q = spel{#user['quote']}", &args()).unwrap();
        assert!(out.ends_with("q = 'it\\'s'"));
    }

    #[test]
    fn indexes_and_literals() {
        let ev = ArgumentPathEvaluator::default();
        assert_eq!(ev.evaluate("#user.tags[1]", &args()).unwrap(), json!("b"));
        assert_eq!(ev.evaluate("42", &args()).unwrap(), json!(42));
        assert_eq!(ev.evaluate("'txt'", &args()).unwrap(), json!("txt"));
        assert_eq!(ev.evaluate("null", &args()).unwrap(), Value::Null);
    }

    #[test]
    fn unknown_variable_fails() {
        let err = resolver().resolve("x = spel{#missing}", &args()).unwrap_err();
        assert!(matches!(err, ScriptError::ExpressionEvaluation { .. }));
    }

    #[test]
    fn no_markers_only_adds_import() {
        let out = resolver().resolve("print(1)", &Arguments::new()).unwrap();
        assert_eq!(out, "import json\nprint(1)");
    }

    #[test]
    fn backslashes_survive_json_loads() {
        let lit = to_python_literal("x", &json!({"p": "a\nb"})).unwrap();
        assert_eq!(lit, "json.loads('{\"p\":\"a\\\\nb\"}')");
    }
}
