//! Constantes compartidas por resolvers y executors.
//!
//! Los marcadores (`spel{...}`, `o4java{...}`) y el nombre de la variable de
//! resultado forman parte del contrato con los scripts existentes: cambiarlos
//! rompe la compatibilidad con scripts ya escritos.

/// Línea de import que varios resolvers necesitan (sin salto de línea).
pub const IMPORT_JSON: &str = "import json";

/// Regex por defecto de marcadores de expresión: `spel{<expr>}`.
pub const EXPRESSION_REGEX: &str = r"spel\{.+?}";
/// Caracteres a recortar al inicio (`spel{`) y al final (`}`).
pub const EXPRESSION_TRIM_START: usize = 5;
pub const EXPRESSION_TRIM_END: usize = 1;
/// Prefijo con el que una expresión referencia un argumento (`#name`).
pub const EXPRESSION_VARIABLE_PREFIX: &str = "#";

/// Regex por defecto de marcadores de resultado: `o4java{<expr>}`.
pub const RESULT_REGEX: &str = r"o4java\{.+?}";
pub const RESULT_TRIM_START: usize = 7;
pub const RESULT_TRIM_END: usize = 1;
/// Nombre de la variable visible que contiene el resultado; también es el
/// prefijo de la línea que el executor local busca en stdout.
pub const RESULT_APPEARANCE: &str = "r4java";

/// Regex de líneas de import a nivel de script (una por línea).
pub const SCRIPT_IMPORTS_REGEX: &str =
    r"(^import [\w.]+$)|(^import [\w.]+ as [\w.]+$)|(^from [\w.]+ import [\w., ]+$)";

pub const BRIDGE_IMPORT_LINE: &str = "from py4j.java_gateway import JavaGateway, GatewayParameters";
pub const BRIDGE_GATEWAY_TEMPLATE: &str =
    "gateway = JavaGateway(\n\tgateway_parameters=GatewayParameters(\n\t\t{params}\n\t)\n)";
/// Separador entre los parámetros del gateway dentro de la plantilla.
pub const BRIDGE_PARAMS_SEPARATOR: &str = ",\n\t\t";

pub const SANDBOX_IMPORT_LINE: &str =
    "from RestrictedPython import compile_restricted\nfrom RestrictedPython import safe_globals";
pub const SANDBOX_CODE_VARIABLE: &str = "source_code";
pub const SANDBOX_LOCALS_VARIABLE: &str = "execution_result";
pub const SANDBOX_SAFE_RESULT: &str = "r4java_restricted";
pub const SANDBOX_GLOBALS: &str = "safe_globals_with_imports";

/// Clave reservada bajo la que un trigger posterior a la llamada expone el
/// valor de retorno del método interceptado.
pub const RESULT_ARGUMENT_KEY: &str = "result";

pub const PYTHON_FILE_EXTENSION: &str = ".py";
pub const DEFAULT_START_COMMAND: &str = "python3";
pub const DEFAULT_RPC_METHOD: &str = "SendCode";
