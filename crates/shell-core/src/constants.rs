//! Constantes del adaptador.
//!
//! Agrupa los nombres de archivo reservados que el runner escribe en el
//! directorio de trabajo y la versión lógica del motor. `ENGINE_VERSION`
//! forma parte del input del hashing: cambiarla invalida los fingerprints
//! aunque la especificación del job y los datos no cambien.

/// Versión lógica del motor. Se incluye en `spec_hash` y en el fingerprint
/// final de cada job.
pub const ENGINE_VERSION: &str = "S1.0";

/// Archivo donde el runner vuelca el stdout del comando.
pub const FILENAME_STDOUT: &str = "stdout";
/// Archivo donde el runner vuelca el stderr (salvo `redirect_stderr`).
pub const FILENAME_STDERR: &str = "stderr";
/// Archivo con el código de salida del proceso (entero en texto plano).
pub const FILENAME_STATUS: &str = "status";

/// Prefijo para labels de output que comienzan con un dígito.
pub const LABEL_DIGIT_PREFIX: &str = "shell_";

/// Computer por defecto cuando ni el job ni el engine definen uno.
pub const DEFAULT_COMPUTER: &str = "localhost";

/// Placeholder sustituido en `mpirun_command` por el número total de procesos.
pub const MPI_PROCS_PLACEHOLDER: &str = "{tot_num_mpiprocs}";

/// Comando MPI por defecto.
pub const DEFAULT_MPIRUN_COMMAND: &[&str] = &["mpirun", "-np", MPI_PROCS_PLACEHOLDER];
