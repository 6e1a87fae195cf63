//! `SandboxResolver`: envuelve el script en una ejecución RestrictedPython.
//!
//! El cuerpo queda como string triple-quoted, se compila con
//! `compile_restricted` y se ejecuta contra una copia de `safe_globals` en la
//! que se registran los nombres importados por el script original.

use regex::Regex;

use super::config::{DeclaredResolver, ResolverConfig, SandboxConfig};
use super::ScriptResolver;
use crate::constants::IMPORT_JSON;
use crate::errors::ScriptError;
use crate::fragment::{append_line, compile_pattern, find_import_names, insert_unique_line_at_start, remove_lines,
                      replace_fragments};
use crate::Arguments;

#[derive(Debug)]
struct ResultCapture {
    pattern: Regex,
    start_trim: usize,
    end_trim: usize,
    appearance: String,
}

#[derive(Debug)]
pub struct SandboxResolver {
    imports: Regex,
    config: SandboxConfig,
    capture: Option<ResultCapture>,
}

impl SandboxResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self, ScriptError> {
        let capture = if config.is_declared(DeclaredResolver::Result) {
            Some(ResultCapture { pattern: compile_pattern(&config.result.regex)?,
                                 start_trim: config.result.start_trim,
                                 end_trim: config.result.end_trim,
                                 appearance: config.result.appearance.clone() })
        } else {
            None
        };
        Ok(Self { imports: compile_pattern(&config.script_imports_regex)?,
                  config: config.sandbox.clone(),
                  capture })
    }
}

fn escape_triple_quoted(body: &str) -> String {
    body.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"")
}

impl ScriptResolver for SandboxResolver {
    fn name(&self) -> &'static str {
        "sandbox"
    }

    fn resolve(&self, script: &str, _arguments: &Arguments) -> Result<String, ScriptError> {
        let cfg = &self.config;
        let mut body = script.to_string();
        let mut import_lines = Vec::new();
        let mut names: Vec<String> = Vec::new();
        remove_lines(&mut body, &self.imports, |line| {
            import_lines.push(line.to_string());
            names.extend(find_import_names(line));
        });

        if let Some(capture) = &self.capture {
            replace_fragments(&mut body, &capture.pattern, capture.start_trim, capture.end_trim, |_, expr, out| {
                out.push_str(&format!("{} = json.loads(json.dumps({expr}))\n", cfg.safe_result));
                Ok(())
            })?;
            if !names.iter().any(|n| n == "json") {
                names.push("json".to_string());
            }
        }

        let mut buffer = format!("{} = \"\"\"\n{}\n\"\"\"\n", cfg.code_variable, escape_triple_quoted(&body));
        append_line(&mut buffer, &format!("{} = {{}}", cfg.locals_variable));
        append_line(&mut buffer,
                    &format!("restricted_byte_code = compile_restricted({}, '<inline>', 'exec')", cfg.code_variable));
        append_line(&mut buffer,
                    &format!("exec(restricted_byte_code, {}, {})", cfg.globals_variable, cfg.locals_variable));
        if let Some(capture) = &self.capture {
            append_line(&mut buffer,
                        &format!("{} = {}.get('{}', '')", capture.appearance, cfg.locals_variable, cfg.safe_result));
        }

        for name in names.iter().rev() {
            insert_unique_line_at_start(&mut buffer, &format!("{}['{name}'] = {name}", cfg.globals_variable));
        }
        if cfg.print_enabled {
            insert_unique_line_at_start(&mut buffer, &format!("{}['_getattr_'] = _getattr_", cfg.globals_variable));
            insert_unique_line_at_start(&mut buffer, &format!("{}['_print_'] = _print_", cfg.globals_variable));
        }
        insert_unique_line_at_start(&mut buffer, &format!("{} = dict(safe_globals)", cfg.globals_variable));
        if cfg.print_enabled {
            insert_unique_line_at_start(&mut buffer, "_getattr_ = getattr");
            insert_unique_line_at_start(&mut buffer, "_print_ = PrintCollector");
            insert_unique_line_at_start(&mut buffer, "from RestrictedPython.PrintCollector import PrintCollector");
        }
        for line in import_lines.iter().rev() {
            insert_unique_line_at_start(&mut buffer, line);
        }
        insert_unique_line_at_start(&mut buffer, IMPORT_JSON);
        insert_unique_line_at_start(&mut buffer, &cfg.import_line);
        Ok(buffer)
    }
}
