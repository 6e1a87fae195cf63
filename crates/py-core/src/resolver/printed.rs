//! Publica el resultado por stdout para transportes que solo ven la salida
//! estándar (executor local).

use super::config::ResultConfig;
use super::ScriptResolver;
use crate::constants::IMPORT_JSON;
use crate::errors::ScriptError;
use crate::fragment::{append_line, insert_unique_line_at_start};
use crate::Arguments;

#[derive(Debug)]
pub struct PrintedResultResolver {
    appearance: String,
}

impl PrintedResultResolver {
    pub fn new(config: &ResultConfig) -> Self {
        Self { appearance: config.appearance.clone() }
    }
}

impl ScriptResolver for PrintedResultResolver {
    fn name(&self) -> &'static str {
        "printed_result"
    }

    fn resolve(&self, script: &str, _arguments: &Arguments) -> Result<String, ScriptError> {
        let mut buffer = script.to_string();
        insert_unique_line_at_start(&mut buffer, IMPORT_JSON);
        if buffer.contains(&self.appearance) {
            append_line(&mut buffer, &format!("print('{0}' + json.dumps({0}))", self.appearance));
        }
        Ok(buffer)
    }
}
