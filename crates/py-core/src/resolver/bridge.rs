//! `BridgeSetupResolver`: prepara el gateway hacia el host antes del código
//! del script.
//!
//! Orden final: import del bridge, imports originales, línea del gateway,
//! cuerpo.

use regex::Regex;

use super::config::{BridgeConfig, ResolverConfig};
use super::ScriptResolver;
use crate::constants::BRIDGE_PARAMS_SEPARATOR;
use crate::errors::ScriptError;
use crate::fragment::{compile_pattern, insert_unique_line_at_start, remove_lines};
use crate::Arguments;

#[derive(Debug)]
pub struct BridgeSetupResolver {
    imports: Regex,
    import_line: String,
    gateway_line: String,
}

impl BridgeSetupResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self, ScriptError> {
        let BridgeConfig { import_line, gateway_template, gateway_params } = &config.bridge;
        if !gateway_template.contains("{params}") {
            return Err(ScriptError::Config("bridge gateway template must contain '{params}'".into()));
        }
        let gateway_line = gateway_template.replace("{params}", &gateway_params.join(BRIDGE_PARAMS_SEPARATOR));
        Ok(Self { imports: compile_pattern(&config.script_imports_regex)?,
                  import_line: import_line.clone(),
                  gateway_line })
    }
}

impl ScriptResolver for BridgeSetupResolver {
    fn name(&self) -> &'static str {
        "bridge"
    }

    fn resolve(&self, script: &str, _arguments: &Arguments) -> Result<String, ScriptError> {
        let mut buffer = script.to_string();
        let mut imports = Vec::new();
        remove_lines(&mut buffer, &self.imports, |line| imports.push(line.to_string()));
        insert_unique_line_at_start(&mut buffer, &self.gateway_line);
        for line in imports.iter().rev() {
            insert_unique_line_at_start(&mut buffer, line);
        }
        insert_unique_line_at_start(&mut buffer, &self.import_line);
        Ok(buffer)
    }
}
