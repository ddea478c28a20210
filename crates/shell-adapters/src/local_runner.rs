//! Runner local basado en `std::process::Command`.
//!
//! Se comporta como el script que generaría un scheduler:
//! `cmd args < stdin > stdout 2> stderr; echo $? > status`. Si el ejecutable
//! no existe, el estado es 127 y el mensaje va a stderr, como en un shell.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};

use log::{debug, warn};
use shell_core::{ExecutionRequest, ProcessOutcome, ProcessRunner, ShellJobError};

/// Código de salida de un shell cuando no encuentra el comando.
pub const STATUS_COMMAND_NOT_FOUND: i32 = 127;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRunner;

#[cfg(unix)]
fn signal_status(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    // Convención de shell para procesos terminados por señal.
    status.signal().map(|sig| 128 + sig)
}

#[cfg(not(unix))]
fn signal_status(_status: ExitStatus) -> Option<i32> {
    None
}

fn status_code(status: ExitStatus) -> Option<i32> {
    status.code().or_else(|| signal_status(status))
}

impl ProcessRunner for LocalRunner {
    fn run(&self, request: &ExecutionRequest) -> Result<ProcessOutcome, ShellJobError> {
        let command_line = request.command_line();
        let (program, args) = command_line.split_first()
                                          .ok_or_else(|| ShellJobError::Internal("empty command line".into()))?;
        let launch = |source: io::Error| ShellJobError::Launch { command: program.clone(),
                                                                 source };
        let dir = &request.working_dir;

        let stdout_path = dir.join(&request.stdout_name);
        if let Some(parent) = stdout_path.parent() {
            fs::create_dir_all(parent).map_err(launch)?;
        }
        let stdout = File::create(&stdout_path).map_err(launch)?;
        let stderr_path = dir.join(request.stderr_name.as_deref().unwrap_or(&request.stdout_name));
        let stderr = match &request.stderr_name {
            Some(name) => File::create(dir.join(name)).map_err(launch)?,
            None => stdout.try_clone().map_err(launch)?,
        };
        let stdin = match &request.stdin {
            Some(name) => Stdio::from(File::open(dir.join(name)).map_err(launch)?),
            None => Stdio::null(),
        };

        debug!("running {:?} in {}", command_line, dir.display());
        let result = Command::new(program).args(args)
                                          .current_dir(dir)
                                          .stdin(stdin)
                                          .stdout(stdout)
                                          .stderr(stderr)
                                          .status();
        let exit_status = match result {
            Ok(status) => status_code(status),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("command `{program}` not found");
                let mut f = OpenOptions::new().append(true).open(&stderr_path).map_err(launch)?;
                writeln!(f, "{program}: command not found").map_err(launch)?;
                Some(STATUS_COMMAND_NOT_FOUND)
            }
            Err(e) => return Err(launch(e)),
        };

        if let Some(code) = exit_status {
            fs::write(dir.join(&request.status_name), format!("{code}\n")).map_err(launch)?;
        }
        Ok(ProcessOutcome { exit_status })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::Path;

    use super::*;
    use uuid::Uuid;

    fn request(dir: &Path, executable: &str, args: &[&str]) -> ExecutionRequest {
        ExecutionRequest { job_id: Uuid::new_v4(),
                           computer: "localhost".into(),
                           prefix: vec![],
                           executable: executable.into(),
                           arguments: args.iter().map(|s| s.to_string()).collect(),
                           working_dir: dir.to_path_buf(),
                           stdin: None,
                           stdout_name: "stdout".into(),
                           stderr_name: Some("stderr".into()),
                           status_name: "status".into() }
    }

    #[test]
    fn writes_stdout_and_status() {
        let dir = tempfile::tempdir().expect("tmp");
        let out = LocalRunner.run(&request(dir.path(), "echo", &["hola"])).expect("run");
        assert_eq!(out.exit_status, Some(0));
        assert_eq!(fs::read_to_string(dir.path().join("stdout")).unwrap(), "hola\n");
        assert_eq!(fs::read_to_string(dir.path().join("status")).unwrap(), "0\n");
        assert_eq!(fs::read_to_string(dir.path().join("stderr")).unwrap(), "");
    }

    #[test]
    fn missing_command_yields_127() {
        let dir = tempfile::tempdir().expect("tmp");
        let out = LocalRunner.run(&request(dir.path(), "definitely-not-a-command-xyz", &[])).expect("run");
        assert_eq!(out.exit_status, Some(127));
        let stderr = fs::read_to_string(dir.path().join("stderr")).unwrap();
        assert!(stderr.contains("command not found"));
    }

    #[test]
    fn stdin_and_merged_stderr() {
        let dir = tempfile::tempdir().expect("tmp");
        fs::write(dir.path().join("input"), "b\na\n").unwrap();
        let mut req = request(dir.path(), "sh", &["-c", "sort; echo oops >&2"]);
        req.stdin = Some("input".into());
        req.stderr_name = None;
        LocalRunner.run(&req).expect("run");
        let stdout = fs::read_to_string(dir.path().join("stdout")).unwrap();
        assert!(stdout.starts_with("a\nb\n"));
        assert!(stdout.contains("oops"));
        assert!(!dir.path().join("stderr").exists());
    }
}
