//! Resolución de ejecutables en el computer de destino.

use log::debug;
use shell_core::{ShellJobError, Transport};

/// Devuelve la ruta absoluta de `command` en `computer` usando `which`.
pub fn resolve_executable<T>(transport: &T, computer: &str, command: &str) -> Result<String, ShellJobError>
    where T: Transport + ?Sized
{
    let probe = vec!["which".to_string(), command.to_string()];
    let output = transport.exec_command_wait(computer, &probe)?;
    let path = output.stdout.trim();
    if output.status != 0 || path.is_empty() {
        return Err(ShellJobError::CommandNotFound(output.stderr.trim().to_string()));
    }
    debug!("resolved `{command}` on `{computer}` to `{path}`");
    Ok(path.to_string())
}
