//! Executor que lanza un intérprete Python local por llamada.
//!
//! El resultado se recupera de stdout: la línea que contiene el prefijo
//! configurado (`r4java` por defecto) aporta el payload JSON que le sigue.
//! Cualquier texto en stderr hace fallar la llamada.

use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use uuid::Uuid;

use super::config::LocalExecutorConfig;
use super::{materialize, ExecutionResponse, ResultType, ScriptExecutor};
use crate::errors::ScriptError;
use crate::file::ScriptFileHandler;

const WAIT_POLL: Duration = Duration::from_millis(10);

#[derive(Debug)]
pub struct LocalProcessExecutor {
    config: LocalExecutorConfig,
    files: Arc<dyn ScriptFileHandler>,
}

impl LocalProcessExecutor {
    pub fn new(config: LocalExecutorConfig, files: Arc<dyn ScriptFileHandler>) -> Self {
        Self { config, files }
    }

    pub fn config(&self) -> &LocalExecutorConfig {
        &self.config
    }

    fn command(&self, script: &str) -> Result<Command, ScriptError> {
        let mut parts = self.config.start_command.split_whitespace();
        let program = parts.next()
                           .ok_or_else(|| ScriptError::Config("local start command is empty".into()))?;
        let mut cmd = Command::new(program);
        cmd.args(parts);
        if self.files.is_file_reference(script) {
            cmd.arg(self.files.resolve_path(script)?);
        } else {
            cmd.arg("-c").arg(inline_argument(script));
        }
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        Ok(cmd)
    }
}

/// En Windows el argumento pasa por la línea de comandos y las comillas
/// dobles deben duplicarse; en Unix llega tal cual a `argv`.
fn inline_argument(script: &str) -> String {
    if cfg!(windows) {
        script.replace('"', "\"\"")
    } else {
        script.to_string()
    }
}

/// Recorre stdout buscando `appearance`. Devuelve el texto que sigue al
/// prefijo en la última línea que lo contenga.
///
/// Las líneas se decodifican con pérdida: bytes no UTF-8 no cortan la lectura.
pub fn scan_result<R: BufRead>(mut reader: R, appearance: &str, loggable: bool, execution_id: &str)
                               -> io::Result<Option<String>> {
    let mut found = None;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let decoded = String::from_utf8_lossy(&buf);
        let line = decoded.trim_end_matches(['\n', '\r']);
        if loggable {
            info!("[{execution_id}] {line}");
        }
        if let Some(idx) = line.find(appearance) {
            found = Some(line[idx + appearance.len()..].to_string());
        }
    }
    Ok(found)
}

/// Mata y recoge el hijo si la llamada sale antes de terminar el `wait`.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn wait(&mut self, timeout: Option<Duration>) -> Result<ExitStatus, ScriptError> {
        let status = match timeout {
            None => self.child.wait().map_err(ScriptError::execution)?,
            Some(limit) => {
                let deadline = Instant::now() + limit;
                loop {
                    if let Some(status) = self.child.try_wait().map_err(ScriptError::execution)? {
                        break status;
                    }
                    if Instant::now() >= deadline {
                        return Err(ScriptError::execution(format!("process timed out after {} ms",
                                                                  limit.as_millis())));
                    }
                    thread::sleep(WAIT_POLL);
                }
            }
        };
        self.reaped = true;
        Ok(status)
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn join<T>(handle: thread::JoinHandle<io::Result<T>>, stream: &str) -> Result<T, ScriptError> {
    handle.join()
          .map_err(|_| ScriptError::execution(format!("{stream} reader panicked")))?
          .map_err(|e| ScriptError::execution(format!("failed to read {stream}: {e}")))
}

impl ScriptExecutor for LocalProcessExecutor {
    fn execute(&self, script: &str, result_type: Option<&ResultType>) -> Result<ExecutionResponse, ScriptError> {
        let execution_id = Uuid::new_v4().to_string();
        let mut cmd = self.command(script)?;
        debug!("[{execution_id}] starting '{}'", self.config.start_command);
        let child = cmd.spawn()
                       .map_err(|e| ScriptError::execution(format!("failed to start '{}': {e}",
                                                                   self.config.start_command)))?;
        let mut guard = ChildGuard { child, reaped: false };

        let stdout = guard.child
                          .stdout
                          .take()
                          .ok_or_else(|| ScriptError::execution("stdout not captured"))?;
        let stderr = guard.child
                          .stderr
                          .take()
                          .ok_or_else(|| ScriptError::execution("stderr not captured"))?;

        let appearance = self.config.appearance.clone();
        let loggable = self.config.loggable;
        let id = execution_id.clone();
        let out_reader = thread::spawn(move || scan_result(BufReader::new(stdout), &appearance, loggable, &id));
        let err_reader = thread::spawn(move || {
            let mut text = String::new();
            BufReader::new(stderr).read_to_string(&mut text).map(|_| text)
        });

        let status = guard.wait(self.config.timeout())?;
        let raw = join(out_reader, "stdout")?;
        let errors = join(err_reader, "stderr")?;

        if !errors.trim().is_empty() {
            error!("[{execution_id}] python stderr: {}", errors.trim_end());
            return Err(ScriptError::execution(errors.trim_end()));
        }
        if !status.success() {
            error!("[{execution_id}] python exited with {status}");
            if self.config.fail_on_non_zero_exit {
                return Err(ScriptError::execution(format!("process exited with {status}")));
            }
        } else {
            debug!("[{execution_id}] python exited with {status}");
        }
        if raw.is_none() && result_type.is_some() {
            warn!("[{execution_id}] no '{}' line found in stdout", self.config.appearance);
        }
        materialize(raw.as_deref(), result_type)
    }
}
