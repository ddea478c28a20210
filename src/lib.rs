//! shellflow
//!
//! Este crate es la fachada de uso del adaptador:
//! - Expone `launch` con `launch_shell_job`/`submit_shell_job` y `ShellLauncher`.
//! - Expone `config` para leer la configuración desde el entorno (`.env`).
//! - Expone `errors` con el error de lanzamiento.
//!
//! Los tipos del core (`JobSpec`, `Artifact`, `ShellEngine`, ...) y las
//! primitivas locales se re-exportan para no tener que depender de los
//! crates del workspace por separado.

pub mod config;
pub mod errors;
pub mod launch;

pub use config::{init_dotenv, ShellflowConfig};
pub use errors::LaunchError;
pub use launch::{launch_shell_job, submit_shell_job, CommandPolicy, LaunchRequest, LaunchResult, NodeInput, ShellLauncher};

pub use shell_adapters;
pub use shell_core;
