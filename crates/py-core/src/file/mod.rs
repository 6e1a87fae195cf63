//! Acceso a scripts guardados en disco.
//!
//! Un script es "referencia a fichero" cuando termina en la extensión
//! configurada (`.py`). Las rutas relativas se resuelven contra `base_dir`.

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::constants::PYTHON_FILE_EXTENSION;
use crate::errors::ScriptError;

pub trait ScriptFileHandler: Send + Sync + Debug {
    fn is_file_reference(&self, script: &str) -> bool;
    fn resolve_path(&self, reference: &str) -> Result<PathBuf, ScriptError>;
    fn read_body(&self, path: &Path) -> Result<String, ScriptError>;
    fn write_body(&self, path: &Path, body: &str) -> Result<(), ScriptError>;

    /// Resuelve la referencia y lee su contenido.
    fn read_reference(&self, reference: &str) -> Result<String, ScriptError> {
        let path = self.resolve_path(reference)?;
        self.read_body(&path)
    }
}

#[derive(Debug, Clone)]
pub struct LocalFileHandler {
    base_dir: PathBuf,
    extension: String,
}

impl LocalFileHandler {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into(),
               extension: PYTHON_FILE_EXTENSION.to_string() }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Lee el fichero aplicando `mapper` a cada línea.
    pub fn read_body_mapped<F>(&self, path: &Path, mapper: F) -> Result<String, ScriptError>
        where F: Fn(&str) -> String
    {
        let raw = fs::read_to_string(path).map_err(|e| ScriptError::ScriptLoad { path: path.display().to_string(),
                                                                                  reason: e.to_string() })?;
        Ok(raw.lines().map(mapper).collect::<Vec<_>>().join("\n"))
    }
}

impl Default for LocalFileHandler {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ScriptFileHandler for LocalFileHandler {
    fn is_file_reference(&self, script: &str) -> bool {
        let trimmed = script.trim();
        !trimmed.contains('\n') && trimmed.ends_with(&self.extension)
    }

    fn resolve_path(&self, reference: &str) -> Result<PathBuf, ScriptError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ScriptError::ScriptLoad { path: String::new(),
                                                 reason: "empty file reference".into() });
        }
        let candidate = Path::new(reference);
        if candidate.is_absolute() {
            Ok(candidate.to_path_buf())
        } else {
            Ok(self.base_dir.join(candidate))
        }
    }

    fn read_body(&self, path: &Path) -> Result<String, ScriptError> {
        debug!("reading script body from {}", path.display());
        self.read_body_mapped(path, str::to_string)
    }

    fn write_body(&self, path: &Path, body: &str) -> Result<(), ScriptError> {
        debug!("writing script body to {}", path.display());
        fs::write(path, body).map_err(|e| ScriptError::ScriptWrite { path: path.display().to_string(),
                                                                     reason: e.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_file_references() {
        let handler = LocalFileHandler::default();
        assert!(handler.is_file_reference("scripts/test.py"));
        assert!(handler.is_file_reference(" test.py\n"));
        assert!(!handler.is_file_reference("print(2 + 2)"));
        assert!(!handler.is_file_reference("import os\nx = 'a.py'"));
    }

    #[test]
    fn relative_paths_use_base_dir() {
        let handler = LocalFileHandler::new("/srv/scripts");
        assert_eq!(handler.resolve_path("a.py").unwrap(), PathBuf::from("/srv/scripts/a.py"));
        assert_eq!(handler.resolve_path("/abs/b.py").unwrap(), PathBuf::from("/abs/b.py"));
    }

    #[test]
    fn write_then_read_normalizes_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let handler = LocalFileHandler::new(dir.path());
        let path = handler.resolve_path("w.py").unwrap();
        handler.write_body(&path, "x = 1\r\nprint(x)\r\n").unwrap();
        assert_eq!(handler.read_body(&path).unwrap(), "x = 1\nprint(x)");
        assert_eq!(handler.read_body_mapped(&path, |l| l.to_uppercase()).unwrap(), "X = 1\nPRINT(X)");
    }

    #[test]
    fn missing_file_is_load_error() {
        let handler = LocalFileHandler::new("/definitely/not/here");
        let err = handler.read_reference("nope.py").unwrap_err();
        assert!(matches!(err, ScriptError::ScriptLoad { .. }));
    }
}
