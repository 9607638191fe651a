//! Invocación de herramientas externas como subprocesos.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info};

use crate::ProviderError;

/// Línea de comando fija de una herramienta. Si `stdout_to` está presente, la
/// salida estándar se escribe en ese archivo (herramientas que emiten el
/// resultado por stdout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub stdout_to: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: &str) -> Self {
        Self { program: program.to_string(),
               args: Vec::new(),
               stdout_to: None }
    }

    pub fn arg(mut self, arg: impl AsRef<std::ffi::OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_to = Some(path.into());
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        if let Some(out) = &self.stdout_to {
            write!(f, " > {}", out.display())?;
        }
        Ok(())
    }
}

/// Ejecutor de comandos; el de sistema lanza procesos reales.
pub trait ToolRunner: fmt::Debug {
    fn run(&self, cmd: &ToolCommand, cwd: &Path) -> Result<(), ProviderError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolRunner;

// Cola del stderr conservada en el error.
const STDERR_TAIL: usize = 2000;

impl ToolRunner for SystemToolRunner {
    fn run(&self, cmd: &ToolCommand, cwd: &Path) -> Result<(), ProviderError> {
        info!("tool:start cmd=\"{cmd}\" cwd={}", cwd.display());
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args).current_dir(cwd).stdin(Stdio::null());
        if let Some(path) = &cmd.stdout_to {
            let file = File::create(path).map_err(|e| ProviderError::io(path, e))?;
            command.stdout(Stdio::from(file));
        }

        let output = command.output().map_err(|source| ProviderError::ToolLaunch { tool: cmd.program.clone(),
                                                                                   source })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let start = stderr.char_indices()
                              .rev()
                              .nth(STDERR_TAIL)
                              .map(|(i, _)| i)
                              .unwrap_or(0);
            return Err(ProviderError::ToolFailed { tool: cmd.program.clone(),
                                                   status: output.status.to_string(),
                                                   stderr: stderr[start..].trim().to_string() });
        }
        debug!("tool:done program={}", cmd.program);
        Ok(())
    }
}
