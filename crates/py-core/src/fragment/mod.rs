//! Operaciones de texto sobre el buffer del script.
//!
//! Todas trabajan sobre un `String` mutable que el resolver posee durante la
//! llamada. Los reemplazos se calculan contra una copia inmutable y se aplican
//! de derecha a izquierda para que los offsets de los matches sigan siendo
//! válidos.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::errors::ScriptError;

static IMPORT_NAMES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:from\s+([\w.]+)\s+import\s+(.+)|import\s+(.+))\s*$").expect("import regex is a valid literal")
});

/// Compila una regex de configuración. Un patrón inválido es error de
/// configuración y se detecta al construir el resolver, nunca por llamada.
pub fn compile_pattern(pattern: &str) -> Result<Regex, ScriptError> {
    Regex::new(pattern).map_err(|e| ScriptError::Config(format!("invalid regex '{pattern}': {e}")))
}

/// Inserta `line` + salto al inicio salvo que esas líneas exactas ya estén
/// presentes en el buffer. Idempotente.
pub fn insert_unique_line_at_start(buffer: &mut String, line: &str) {
    if contains_lines(buffer, line) {
        return;
    }
    buffer.insert_str(0, &format!("{line}\n"));
}

/// Añade `line` + salto al final, sin comprobar duplicados.
pub fn append_line(buffer: &mut String, line: &str) {
    if !buffer.is_empty() && !buffer.ends_with('\n') {
        buffer.push('\n');
    }
    buffer.push_str(line);
    buffer.push('\n');
}

fn contains_lines(buffer: &str, needle: &str) -> bool {
    let wanted: Vec<&str> = needle.lines().collect();
    if wanted.is_empty() {
        return false;
    }
    let present: Vec<&str> = buffer.lines().collect();
    present.windows(wanted.len()).any(|w| w == wanted.as_slice())
}

/// Reemplaza cada match de `regex` por el texto que produzca `replacer`.
///
/// `replacer` recibe las capturas, la expresión interior (el match sin
/// `start_trim` caracteres al inicio ni `end_trim` al final) y un acumulador
/// vacío donde escribe el reemplazo. El primer error aborta sin tocar el
/// buffer.
pub fn replace_fragments<F>(buffer: &mut String,
                            regex: &Regex,
                            start_trim: usize,
                            end_trim: usize,
                            mut replacer: F)
                            -> Result<(), ScriptError>
    where F: FnMut(&Captures, &str, &mut String) -> Result<(), ScriptError>
{
    let snapshot = buffer.clone();
    let mut replacements: Vec<(usize, usize, String)> = Vec::new();
    for caps in regex.captures_iter(&snapshot) {
        let Some(m) = caps.get(0) else { continue };
        let inner = trim_chars(m.as_str(), start_trim, end_trim);
        let mut accumulator = String::new();
        replacer(&caps, inner, &mut accumulator)?;
        replacements.push((m.start(), m.end(), accumulator));
    }
    for (start, end, text) in replacements.into_iter().rev() {
        buffer.replace_range(start..end, &text);
    }
    Ok(())
}

fn trim_chars(s: &str, start: usize, end: usize) -> &str {
    let total = s.chars().count();
    if start + end >= total {
        return "";
    }
    let begin = s.char_indices().nth(start).map(|(i, _)| i).unwrap_or(s.len());
    let finish = s.char_indices().nth(total - end).map(|(i, _)| i).unwrap_or(s.len());
    &s[begin..finish]
}

/// Elimina cada línea que case completa con `regex` (incluido su salto de
/// línea) y la entrega a `collector` en orden de aparición.
pub fn remove_lines<F>(buffer: &mut String, regex: &Regex, mut collector: F)
    where F: FnMut(&str)
{
    let mut kept = String::with_capacity(buffer.len());
    for line in buffer.split_inclusive('\n') {
        let bare = line.strip_suffix('\n').unwrap_or(line);
        let bare = bare.strip_suffix('\r').unwrap_or(bare);
        if full_match(regex, bare) {
            collector(bare);
        } else {
            kept.push_str(line);
        }
    }
    *buffer = kept;
}

fn full_match(regex: &Regex, line: &str) -> bool {
    regex.find(line)
         .map(|m| m.start() == 0 && m.end() == line.len())
         .unwrap_or(false)
}

/// Nombres que una línea de import deja visibles en el scope del script.
///
/// `import x.y` → `x`; `import x as y` → `y`; `from m import a, b as c` → `a, c`.
pub fn find_import_names(line: &str) -> Vec<String> {
    let Some(caps) = IMPORT_NAMES.captures(line) else {
        return Vec::new();
    };
    if let Some(names) = caps.get(2) {
        return split_names(names.as_str(), |name| name.to_string());
    }
    match caps.get(3) {
        Some(modules) => split_names(modules.as_str(), |name| name.split('.').next().unwrap_or(name).to_string()),
        None => Vec::new(),
    }
}

fn split_names<F>(list: &str, plain: F) -> Vec<String>
    where F: Fn(&str) -> String
{
    list.trim_matches(|c| c == '(' || c == ')' || char::is_whitespace(c))
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once(" as ") {
            Some((_, alias)) => alias.trim().to_string(),
            None => plain(part),
        })
        .collect()
}
