use std::sync::Arc;

use log::debug;
use py_core::{ArgumentPathEvaluator, Arguments, ResultType, ScriptError};
use pyflow_rust::{build_stack, init_logging, AppConfig};
use serde_json::Value;

const USAGE: &str = "Uso: pyflow-cli run (--code <SCRIPT> | --file <REF>) [--arg <NOMBRE>=<JSON>]... [--type <TIPO>] \
                     [--no-result]";

/// Parámetros de `run`.
#[derive(Debug, Default)]
struct RunArgs {
    script: Option<String>,
    arguments: Arguments,
    result_type: Option<String>,
    no_result: bool,
}

fn parse_argument(raw: &str) -> Option<(String, Value)> {
    let (name, value) = raw.split_once('=')?;
    // Lo que no es JSON válido se pasa como string.
    let parsed = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Some((name.trim().to_string(), parsed))
}

fn parse_run(args: &[String]) -> Result<RunArgs, String> {
    let mut run = RunArgs::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--code" | "--file" => {
                i += 1;
                if i < args.len() { run.script = Some(args[i].clone()); }
            }
            "--arg" => {
                i += 1;
                if i < args.len() {
                    let (name, value) = parse_argument(&args[i]).ok_or_else(|| format!("argumento inválido: {}", args[i]))?;
                    run.arguments.insert(name, value);
                }
            }
            "--type" => {
                i += 1;
                if i < args.len() { run.result_type = Some(args[i].clone()); }
            }
            "--no-result" => run.no_result = true,
            other => return Err(format!("opción desconocida: {other}")),
        }
        i += 1;
    }
    Ok(run)
}

fn run(config: &AppConfig, run: RunArgs) -> Result<Option<Value>, ScriptError> {
    let script = run.script.ok_or(ScriptError::EmptyScript)?;
    let evaluator = Arc::new(ArgumentPathEvaluator::from_config(&config.resolvers.expression));
    let stack = build_stack(config, evaluator)?;
    let result_type = if run.no_result {
        None
    } else {
        Some(ResultType::named(run.result_type.unwrap_or_else(|| "json".to_string())))
    };
    debug!("running script with {} argument(s)", run.arguments.len());
    stack.processor.process(&script, result_type.as_ref(), &run.arguments)
}

fn main() {
    // Cargar .env si existe para obtener las variables PYFLOW_*
    let _ = dotenvy::dotenv();
    init_logging();
    // CLI mínima: `pyflow-cli run --code <SCRIPT> [--arg k=v]`
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1] != "run" {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }
    let parsed = match parse_run(&args[2..]) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[pyflow run] {e}\n{USAGE}");
            std::process::exit(2);
        }
    };
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[pyflow run] configuración inválida: {e}");
            std::process::exit(3);
        }
    };
    match run(&config, parsed) {
        Ok(Some(value)) => println!("{value}"),
        Ok(None) => println!("null"),
        Err(ScriptError::EmptyScript) => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("[pyflow run] error: {e}");
            std::process::exit(5);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_code_arguments_and_type() {
        let run = parse_run(&strings(&["--code", "o4java{x}", "--arg", "x=[1,2]", "--arg", "name=ana", "--type",
                                       "list"])).unwrap();
        assert_eq!(run.script.as_deref(), Some("o4java{x}"));
        assert_eq!(run.arguments.get("x"), Some(&json!([1, 2])));
        assert_eq!(run.arguments.get("name"), Some(&json!("ana")));
        assert_eq!(run.result_type.as_deref(), Some("list"));
    }

    #[test]
    fn rejects_unknown_flags_and_bad_arguments() {
        assert!(parse_run(&strings(&["--bogus"])).is_err());
        assert!(parse_run(&strings(&["--arg", "no-equals-sign"])).is_err());
    }

    #[test]
    fn missing_script_is_empty_script() {
        let err = run(&AppConfig::default(), RunArgs::default()).unwrap_err();
        assert!(matches!(err, ScriptError::EmptyScript));
    }
}
