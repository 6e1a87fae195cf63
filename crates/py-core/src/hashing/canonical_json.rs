//! Canonical JSON mínimo: objetos con claves ordenadas y sin espacios.
//!
//! Se usa para que dos mapas de argumentos semánticamente iguales produzcan
//! el mismo texto (y por tanto la misma clave de cache) sin importar el orden
//! de iteración del `HashMap`.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::Arguments;

fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let mut tree = BTreeMap::new();
            for (k, v) in map {
                tree.insert(k, to_canonical_json(v));
            }
            let items: Vec<String> = tree.into_iter()
                                         .map(|(k, v)| format!("{}:{}", quote(k), v))
                                         .collect();
            format!("{{{}}}", items.join(","))
        }
    }
}

/// Serializa el mapa de argumentos ordenado por clave.
pub fn canonical_arguments(arguments: &Arguments) -> String {
    let sorted: BTreeMap<&String, String> = arguments.iter()
                                                     .map(|(k, v)| (k, to_canonical_json(v)))
                                                     .collect();
    let items: Vec<String> = sorted.into_iter()
                                   .map(|(k, v)| format!("{}:{}", quote(k), v))
                                   .collect();
    format!("{{{}}}", items.join(","))
}
