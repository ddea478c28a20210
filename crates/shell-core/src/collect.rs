//! Recolección de outputs tras la ejecución.
//!
//! Lee `status`, stdout y stderr, expande los outputs declarados (literales
//! o globs) contra el directorio de trabajo, aplica el parser opcional y
//! decide el `ExitCode` del job.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use indexmap::IndexMap;
use log::{debug, warn};
use uuid::Uuid;

use crate::constants::{FILENAME_STATUS, FILENAME_STDERR, FILENAME_STDOUT};
use crate::errors::ShellJobError;
use crate::job::{ExitCode, JobSpec};
use crate::model::{is_valid_label, sanitize_label, Artifact};
use crate::parser::ParserContext;

#[derive(Debug, Clone)]
pub struct CollectedOutputs {
    pub artifacts: IndexMap<String, Artifact>,
    pub exit_code: ExitCode,
    pub exit_status: Option<i32>,
    /// Outputs declarados que no se encontraron.
    pub missing: Vec<String>,
}

enum StatusRead {
    Missing,
    Invalid(String),
    Valid(i32),
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

pub struct OutputCollector<'a> {
    dirpath: &'a Path,
    spec: &'a JobSpec,
}

impl<'a> OutputCollector<'a> {
    pub fn new(dirpath: &'a Path, spec: &'a JobSpec) -> Self {
        Self { dirpath, spec }
    }

    fn read_status(&self) -> Result<StatusRead, ShellJobError> {
        let path = self.dirpath.join(FILENAME_STATUS);
        if !path.is_file() {
            return Ok(StatusRead::Missing);
        }
        let raw = fs::read_to_string(&path)?;
        Ok(match raw.trim().parse::<i32>() {
               Ok(status) => StatusRead::Valid(status),
               Err(_) => StatusRead::Invalid(raw),
           })
    }

    fn artifact_at(&self, path: &Path) -> Result<Artifact, ShellJobError> {
        if path.is_dir() {
            Artifact::from_directory(path)
        } else {
            Artifact::from_file(path)
        }
    }

    fn matches(&self, pattern: &str) -> Result<Vec<PathBuf>, ShellJobError> {
        let full = format!("{}/{}", Pattern::escape(&self.dirpath.to_string_lossy()), pattern);
        let paths = glob::glob(&full).map_err(|e| ShellJobError::InvalidOutputPattern { pattern: pattern.to_string(),
                                                                                          reason: e.msg.to_string() })?;
        let mut found = Vec::new();
        for entry in paths {
            found.push(entry.map_err(|e| ShellJobError::Io(e.into()))?);
        }
        Ok(found)
    }

    fn is_runner_file(&self, relative: &str) -> bool {
        let top = relative.split('/').next().unwrap_or(relative);
        self.spec.is_reserved(relative) || self.spec.is_reserved(top)
    }

    /// Primer label libre: `label`, `label_1`, `label_2`, ...
    fn free_label(label: String, artifacts: &IndexMap<String, Artifact>) -> String {
        let mut candidate = label.clone();
        let mut n = 0;
        while artifacts.contains_key(&candidate) {
            n += 1;
            candidate = format!("{label}_{n}");
        }
        candidate
    }

    /// Outputs declarados; devuelve los que faltan.
    fn collect_declared(&self, artifacts: &mut IndexMap<String, Artifact>) -> Result<Vec<String>, ShellJobError> {
        let mut missing = Vec::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        for pattern in &self.spec.outputs {
            let found = if is_glob(pattern) {
                self.matches(pattern)?
            } else {
                let path = self.dirpath.join(pattern);
                if path.exists() { vec![path] } else { Vec::new() }
            };
            if found.is_empty() {
                if is_glob(pattern) && !self.spec.options.require_glob_matches {
                    debug!("output pattern `{pattern}` matched nothing");
                } else {
                    warn!("expected output `{pattern}` was not found");
                    missing.push(pattern.clone());
                }
                continue;
            }
            for path in found {
                let relative = path.strip_prefix(self.dirpath)
                                   .map_err(|e| ShellJobError::Internal(e.to_string()))?
                                   .to_string_lossy()
                                   .replace('\\', "/");
                if self.is_runner_file(&relative) {
                    debug!("output pattern `{pattern}` skips runner file `{relative}`");
                    continue;
                }
                if !seen.insert(relative.clone()) {
                    continue;
                }
                let sanitized = sanitize_label(&relative);
                let label = Self::free_label(sanitized.clone(), artifacts);
                if label != sanitized {
                    warn!("output `{relative}` clashes with label `{sanitized}`; linked as `{label}`");
                }
                let artifact = self.artifact_at(&path)?;
                artifacts.insert(label, artifact);
            }
        }
        Ok(missing)
    }

    pub fn collect(&self, job_id: Uuid, arguments: &[String]) -> Result<CollectedOutputs, ShellJobError> {
        let options = &self.spec.options;
        let mut artifacts = IndexMap::new();

        let status = self.read_status()?;

        let stdout_name = options.stdout_filename();
        let stdout_path = self.dirpath.join(stdout_name);
        let stdout_found = stdout_path.is_file();
        if stdout_found {
            artifacts.insert(FILENAME_STDOUT.to_string(), Artifact::from_file(&stdout_path)?);
        }

        let mut stderr_text = String::new();
        if !options.redirect_stderr {
            let stderr_path = self.dirpath.join(FILENAME_STDERR);
            if stderr_path.is_file() {
                let stderr = Artifact::from_file(&stderr_path)?;
                stderr_text = stderr.text().unwrap_or_default();
                artifacts.insert(FILENAME_STDERR.to_string(), stderr);
            }
        }

        let missing = self.collect_declared(&mut artifacts)?;

        let exit_status = match status {
            StatusRead::Valid(s) => Some(s),
            _ => None,
        };

        if let Some(parser) = &self.spec.parser {
            let ctx = ParserContext { job_id,
                                      spec: self.spec,
                                      arguments,
                                      exit_status };
            let parsed = parser.parse(self.dirpath, &ctx)
                               .map_err(|e| ShellJobError::Parser(e.to_string()))?;
            for (label, artifact) in parsed {
                if !is_valid_label(&label) {
                    return Err(ShellJobError::InvalidOutputLabel(label));
                }
                artifacts.insert(label, artifact);
            }
        }

        let exit_code = if !missing.is_empty() {
            ExitCode::filepaths_missing(&missing)
        } else if !stdout_found {
            ExitCode::stdout_missing(stdout_name)
        } else {
            match status {
                StatusRead::Missing => ExitCode::status_missing(),
                StatusRead::Invalid(raw) => ExitCode::status_invalid(&raw),
                StatusRead::Valid(s) if s != 0 => ExitCode::command_failed(s, &stderr_text),
                StatusRead::Valid(_) if !stderr_text.is_empty() => ExitCode::stderr_not_empty(),
                StatusRead::Valid(_) => ExitCode::success(),
            }
        };

        Ok(CollectedOutputs { artifacts,
                              exit_code,
                              exit_status,
                              missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobOptions;
    use crate::parser::OutputParser;

    fn workdir(status: Option<&str>, stdout: Option<&str>, stderr: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tmp");
        if let Some(s) = status {
            fs::write(dir.path().join("status"), s).unwrap();
        }
        if let Some(out) = stdout {
            fs::write(dir.path().join("stdout"), out).unwrap();
        }
        fs::write(dir.path().join("stderr"), stderr).unwrap();
        dir
    }

    fn collect(dir: &Path, spec: &JobSpec) -> CollectedOutputs {
        OutputCollector::new(dir, spec).collect(Uuid::new_v4(), &[]).unwrap()
    }

    #[test]
    fn success_with_empty_stderr() {
        let dir = workdir(Some("0\n"), Some("hi\n"), "");
        let out = collect(dir.path(), &JobSpec::new("echo"));
        assert!(out.exit_code.is_success());
        assert_eq!(out.exit_status, Some(0));
        assert_eq!(out.artifacts["stdout"].text().as_deref(), Some("hi\n"));
        assert!(out.artifacts.contains_key("stderr"));
    }

    #[test]
    fn stderr_with_zero_status_is_suspicious_unless_redirected() {
        let dir = workdir(Some("0"), Some(""), "careful\n");
        let out = collect(dir.path(), &JobSpec::new("x"));
        assert_eq!(out.exit_code.status, ExitCode::STDERR_NOT_EMPTY);

        let options = JobOptions { redirect_stderr: true,
                                   ..Default::default() };
        let out = collect(dir.path(), &JobSpec::new("x").options(options));
        assert!(out.exit_code.is_success());
        assert!(!out.artifacts.contains_key("stderr"));
    }

    #[test]
    fn status_problems() {
        let dir = workdir(None, Some(""), "");
        assert_eq!(collect(dir.path(), &JobSpec::new("x")).exit_code.status, 300);
        let dir = workdir(Some("abc"), Some(""), "");
        assert_eq!(collect(dir.path(), &JobSpec::new("x")).exit_code.status, 301);
        let dir = workdir(Some("0"), None, "");
        assert_eq!(collect(dir.path(), &JobSpec::new("x")).exit_code.status, 302);
        let dir = workdir(None, None, "");
        assert_eq!(collect(dir.path(), &JobSpec::new("x")).exit_code.status, 302);
        let dir = workdir(Some("abc"), None, "");
        assert_eq!(collect(dir.path(), &JobSpec::new("x")).exit_code.status, 302);
        let dir = workdir(Some("2"), Some(""), "boom");
        let code = collect(dir.path(), &JobSpec::new("x")).exit_code;
        assert_eq!(code.status, 400);
        assert!(code.message.contains("2 boom"));
    }

    #[test]
    fn globs_literals_and_folders() {
        let dir = workdir(Some("0"), Some(""), "");
        for name in ["xaa", "xab", "xac", "other"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        fs::create_dir_all(dir.path().join("results/inner")).unwrap();
        fs::write(dir.path().join("results/inner/r.txt"), "r").unwrap();
        let spec = JobSpec::new("split").output("x*").output("results").output("nothing*");
        let out = collect(dir.path(), &spec);
        assert!(out.exit_code.is_success());
        for label in ["xaa", "xab", "xac"] {
            assert_eq!(out.artifacts[label].text().as_deref(), Some(label));
        }
        let folder = out.artifacts["results"].as_folder().expect("folder");
        assert_eq!(folder.file("inner/r.txt"), Some(&b"r"[..]));
        assert!(!out.artifacts.contains_key("other"));
    }

    #[test]
    fn missing_outputs_take_precedence() {
        let dir = workdir(Some("1"), Some(""), "err");
        let options = JobOptions { require_glob_matches: true,
                                   ..Default::default() };
        let spec = JobSpec::new("x").output("absent.txt").output("y*").options(options);
        let out = collect(dir.path(), &spec);
        assert_eq!(out.exit_code.status, 303);
        assert_eq!(out.missing, vec!["absent.txt", "y*"]);
    }

    #[test]
    fn labels_are_sanitized() {
        let dir = workdir(Some("0"), Some(""), "");
        fs::write(dir.path().join("my-file.txt"), "m").unwrap();
        let out = collect(dir.path(), &JobSpec::new("x").output("my-file.txt"));
        assert!(out.artifacts.contains_key("my_file_txt"));
    }

    #[test]
    fn clashing_labels_keep_both_outputs() {
        let dir = workdir(Some("0"), Some(""), "");
        fs::write(dir.path().join("a-b"), "dash").unwrap();
        fs::write(dir.path().join("a.b"), "dot").unwrap();
        let out = collect(dir.path(), &JobSpec::new("x").output("a-b").output("a.b").output("a?b"));
        assert!(out.exit_code.is_success());
        assert_eq!(out.artifacts["a_b"].text().as_deref(), Some("dash"));
        assert_eq!(out.artifacts["a_b_1"].text().as_deref(), Some("dot"));
        assert!(!out.artifacts.contains_key("a_b_2"));
    }

    #[test]
    fn globs_skip_runner_files() {
        let dir = workdir(Some("0"), Some("out"), "");
        fs::write(dir.path().join("summary"), "s").unwrap();
        let out = collect(dir.path(), &JobSpec::new("x").output("s*").output("*"));
        assert!(out.exit_code.is_success());
        assert!(!out.artifacts.contains_key("status"));
        assert!(out.artifacts.contains_key("summary"));
        assert_eq!(out.artifacts["stdout"].text().as_deref(), Some("out"));
        assert_eq!(out.artifacts.len(), 3);

        let dir = workdir(Some("0"), None, "");
        fs::write(dir.path().join("log.txt"), "custom").unwrap();
        let options = JobOptions { output_filename: Some("log.txt".into()),
                                   ..Default::default() };
        let out = collect(dir.path(), &JobSpec::new("x").output("*.txt").options(options));
        assert_eq!(out.artifacts["stdout"].text().as_deref(), Some("custom"));
        assert!(!out.artifacts.contains_key("log_txt"));
    }

    #[test]
    fn parser_overrides_and_errors() {
        let dir = workdir(Some("0"), Some("3\n"), "");
        let parser = OutputParser::new(|dirpath, ctx| {
            let count = fs::read_to_string(dirpath.join("stdout"))?.trim().parse::<i64>()?;
            let mut out = IndexMap::new();
            out.insert("count".to_string(), Artifact::scalar(count));
            out.insert("stdout".to_string(), Artifact::scalar(ctx.exit_status.unwrap_or(-1) as i64));
            Ok(out)
        });
        let out = collect(dir.path(), &JobSpec::new("wc").parser(parser));
        assert_eq!(out.artifacts["count"].as_scalar(), Some(&3i64.into()));
        assert_eq!(out.artifacts["stdout"].kind(), crate::model::ArtifactKind::Scalar);

        let failing = OutputParser::new(|_, _| Err("cannot parse".into()));
        let err = OutputCollector::new(dir.path(), &JobSpec::new("wc").parser(failing)).collect(Uuid::new_v4(), &[])
                                                                                         .unwrap_err();
        assert!(matches!(err, ShellJobError::Parser(m) if m == "cannot parse"));

        let bad_label = OutputParser::new(|_, _| Ok(IndexMap::from([("bad-label".to_string(), Artifact::scalar(1))])));
        let err = OutputCollector::new(dir.path(), &JobSpec::new("wc").parser(bad_label)).collect(Uuid::new_v4(), &[])
                                                                                           .unwrap_err();
        assert!(matches!(err, ShellJobError::InvalidOutputLabel(_)));
    }
}
