//! Captura de resultado para código que corre fuera del sandbox.

use regex::Regex;

use super::config::ResultConfig;
use super::ScriptResolver;
use crate::constants::IMPORT_JSON;
use crate::errors::ScriptError;
use crate::fragment::{compile_pattern, insert_unique_line_at_start, replace_fragments};
use crate::Arguments;

/// Sustituye `o4java{<expr>}` por `<appearance> = json.loads(json.dumps(<expr>))`.
#[derive(Debug)]
pub struct ResultCaptureResolver {
    pattern: Regex,
    start_trim: usize,
    end_trim: usize,
    appearance: String,
}

impl ResultCaptureResolver {
    pub fn new(config: &ResultConfig) -> Result<Self, ScriptError> {
        Ok(Self { pattern: compile_pattern(&config.regex)?,
                  start_trim: config.start_trim,
                  end_trim: config.end_trim,
                  appearance: config.appearance.clone() })
    }
}

impl ScriptResolver for ResultCaptureResolver {
    fn name(&self) -> &'static str {
        "result"
    }

    fn resolve(&self, script: &str, _arguments: &Arguments) -> Result<String, ScriptError> {
        let mut buffer = script.to_string();
        insert_unique_line_at_start(&mut buffer, IMPORT_JSON);
        replace_fragments(&mut buffer, &self.pattern, self.start_trim, self.end_trim, |_, expr, out| {
            out.push_str(&format!("{} = json.loads(json.dumps({expr}))\n", self.appearance));
            Ok(())
        })?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_becomes_json_round_trip_assignment() {
        let resolver = ResultCaptureResolver::new(&ResultConfig::default()).unwrap();
        let out = resolver.resolve("test_var = 2 + 2\no4java{test_var}", &Arguments::new()).unwrap();
        assert_eq!(out, "import json\ntest_var = 2 + 2\nr4java = json.loads(json.dumps(test_var))\n");
    }

    #[test]
    fn existing_json_import_is_not_duplicated() {
        let resolver = ResultCaptureResolver::new(&ResultConfig::default()).unwrap();
        let out = resolver.resolve("import json\no4java{[1, 2]}", &Arguments::new()).unwrap();
        assert_eq!(out.matches("import json").count(), 1);
        assert!(out.contains("r4java = json.loads(json.dumps([1, 2]))"));
    }
}
