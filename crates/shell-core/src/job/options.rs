//! Opciones de ejecución del job.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MPIRUN_COMMAND, FILENAME_STDOUT, MPI_PROCS_PLACEHOLDER};

/// Qué hacer cuando el nombre *implícito* de un input choca con un nombre
/// reservado (`stdout`, `stderr`, `status`). Un nombre explícito en
/// `filenames` siempre es un error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Renombra a un nombre único y emite un warning.
    #[default]
    Rename,
    /// Falla la validación.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpiOptions {
    pub withmpi: bool,
    pub mpirun_command: Vec<String>,
    pub tot_num_mpiprocs: u32,
}

impl Default for MpiOptions {
    fn default() -> Self {
        Self { withmpi: false,
               mpirun_command: DEFAULT_MPIRUN_COMMAND.iter().map(|s| s.to_string()).collect(),
               tot_num_mpiprocs: 1 }
    }
}

impl MpiOptions {
    /// Prefijo a anteponer a la línea de comandos (vacío sin MPI).
    pub fn prefix(&self) -> Vec<String> {
        if !self.withmpi {
            return Vec::new();
        }
        let procs = self.tot_num_mpiprocs.to_string();
        self.mpirun_command.iter().map(|part| part.replace(MPI_PROCS_PLACEHOLDER, &procs)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobOptions {
    /// Archivo del directorio de trabajo redirigido a stdin.
    pub filename_stdin: Option<String>,
    /// Mezcla stderr en el archivo de stdout.
    pub redirect_stderr: bool,
    /// Nombre alternativo para el archivo de stdout.
    pub output_filename: Option<String>,
    /// Enlaza (en lugar de copiar) el contenido de carpetas remotas.
    pub use_symlinks: bool,
    pub collision: CollisionPolicy,
    /// Un glob sin coincidencias cuenta como output faltante.
    pub require_glob_matches: bool,
    pub mpi: MpiOptions,
    /// Computer de destino; si falta se usa el del engine.
    pub computer: Option<String>,
}

impl JobOptions {
    pub fn stdout_filename(&self) -> &str {
        self.output_filename.as_deref().unwrap_or(FILENAME_STDOUT)
    }
}
