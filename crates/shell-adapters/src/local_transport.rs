//! Transporte local: el "computer" es el propio sistema de archivos.

use std::fs;
use std::path::Path;
use std::process::Command;

use log::debug;
use shell_core::constants::DEFAULT_COMPUTER;
use shell_core::{CommandOutput, ShellJobError, Transport};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct LocalTransport {
    computer: String,
}

impl Default for LocalTransport {
    fn default() -> Self {
        Self::new(DEFAULT_COMPUTER)
    }
}

impl LocalTransport {
    pub fn new(computer: impl Into<String>) -> Self {
        Self { computer: computer.into() }
    }

    pub fn computer(&self) -> &str {
        &self.computer
    }

    fn check_computer(&self, computer: &str) -> Result<(), ShellJobError> {
        if computer == self.computer {
            Ok(())
        } else {
            Err(ShellJobError::Transport(format!("computer `{computer}` is not reachable from `{}`", self.computer)))
        }
    }

    fn source_dir<'a>(&self, computer: &str, remote_path: &'a str) -> Result<&'a Path, ShellJobError> {
        self.check_computer(computer)?;
        let src = Path::new(remote_path);
        if !src.is_dir() {
            return Err(ShellJobError::Transport(format!("remote path `{remote_path}` on `{computer}` is not a directory")));
        }
        Ok(src)
    }
}

impl Transport for LocalTransport {
    fn copy_tree(&self, computer: &str, remote_path: &str, dest: &Path) -> Result<(), ShellJobError> {
        let src = self.source_dir(computer, remote_path)?;
        for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
            let entry = entry.map_err(|e| ShellJobError::Transport(e.to_string()))?;
            let rel = entry.path()
                           .strip_prefix(src)
                           .map_err(|e| ShellJobError::Internal(e.to_string()))?;
            let target = dest.join(rel);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(|e| ShellJobError::staging(&target, e))?;
            } else {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| ShellJobError::staging(parent, e))?;
                }
                fs::copy(entry.path(), &target).map_err(|e| ShellJobError::staging(&target, e))?;
            }
        }
        debug!("copied `{remote_path}/*` into {}", dest.display());
        Ok(())
    }

    fn symlink_tree(&self, computer: &str, remote_path: &str, dest: &Path) -> Result<(), ShellJobError> {
        let src = self.source_dir(computer, remote_path)?;
        for entry in fs::read_dir(src).map_err(|e| ShellJobError::staging(src, e))? {
            let entry = entry.map_err(|e| ShellJobError::staging(src, e))?;
            let target = dest.join(entry.file_name());
            #[cfg(unix)]
            std::os::unix::fs::symlink(entry.path(), &target).map_err(|e| ShellJobError::staging(&target, e))?;
            #[cfg(not(unix))]
            {
                // Sin enlaces simbólicos portables: se copia el contenido.
                let _ = target;
                return self.copy_tree(computer, remote_path, dest);
            }
        }
        debug!("linked `{remote_path}/*` into {}", dest.display());
        Ok(())
    }

    fn exec_command_wait(&self, computer: &str, command: &[String]) -> Result<CommandOutput, ShellJobError> {
        self.check_computer(computer)?;
        let (program, args) = command.split_first()
                                     .ok_or_else(|| ShellJobError::Internal("empty command".into()))?;
        let output = Command::new(program).args(args)
                                          .output()
                                          .map_err(|source| ShellJobError::Launch { command: program.clone(),
                                                                                    source })?;
        Ok(CommandOutput { status: output.status.code().unwrap_or(-1),
                           stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                           stderr: String::from_utf8_lossy(&output.stderr).into_owned() })
    }
}
