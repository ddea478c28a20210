//! Primitivas del host: ejecución de procesos, transporte y cola.
//!
//! El adaptador sólo produce entradas para estas primitivas y consume sus
//! salidas; las implementaciones locales viven en `shell-adapters`.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::errors::ShellJobError;
use crate::job::JobSpec;

/// Todo lo que el runner necesita para lanzar un job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub job_id: Uuid,
    pub computer: String,
    /// Prefijo MPI (vacío si no aplica).
    pub prefix: Vec<String>,
    pub executable: String,
    pub arguments: Vec<String>,
    pub working_dir: PathBuf,
    /// Archivo del directorio de trabajo conectado a stdin.
    pub stdin: Option<String>,
    pub stdout_name: String,
    /// `None` mezcla stderr en el archivo de stdout.
    pub stderr_name: Option<String>,
    pub status_name: String,
}

impl ExecutionRequest {
    /// Vector completo: prefijo, ejecutable y argumentos.
    pub fn command_line(&self) -> Vec<String> {
        self.prefix
            .iter()
            .cloned()
            .chain(std::iter::once(self.executable.clone()))
            .chain(self.arguments.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// `None` si el proceso terminó por señal.
    pub exit_status: Option<i32>,
}

/// Ejecuta un comando en el directorio de trabajo escribiendo stdout,
/// stderr y el archivo de estado.
pub trait ProcessRunner {
    fn run(&self, request: &ExecutionRequest) -> Result<ProcessOutcome, ShellJobError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Acceso a los computers del host.
pub trait Transport {
    /// Copia cada hijo de `remote_path` dentro de `dest`.
    fn copy_tree(&self, computer: &str, remote_path: &str, dest: &Path) -> Result<(), ShellJobError>;
    /// Crea en `dest` un enlace simbólico por cada hijo de `remote_path`.
    fn symlink_tree(&self, computer: &str, remote_path: &str, dest: &Path) -> Result<(), ShellJobError>;
    /// Ejecuta un comando corto y espera su resultado (p.ej. `which`).
    fn exec_command_wait(&self, computer: &str, command: &[String]) -> Result<CommandOutput, ShellJobError>;
}

/// Cliente de la cola de jobs del host.
pub trait JobQueue {
    fn enqueue(&mut self, job_id: Uuid, spec: JobSpec) -> Result<(), ShellJobError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_prepends_prefix() {
        let req = ExecutionRequest { job_id: Uuid::nil(),
                                     computer: "localhost".into(),
                                     prefix: vec!["mpirun".into(), "-np".into(), "2".into()],
                                     executable: "/bin/echo".into(),
                                     arguments: vec!["hi".into()],
                                     working_dir: PathBuf::from("/tmp"),
                                     stdin: None,
                                     stdout_name: "stdout".into(),
                                     stderr_name: Some("stderr".into()),
                                     status_name: "status".into() };
        assert_eq!(req.command_line(), vec!["mpirun", "-np", "2", "/bin/echo", "hi"]);
    }
}
