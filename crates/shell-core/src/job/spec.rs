//! Especificación declarativa de un job.
//!
//! Se construye con métodos encadenables y se valida completa antes de crear
//! nada en disco (`validate`). La especificación se consume una vez por
//! ejecución; `spec_hash` la identifica en el log de eventos.

use std::path::Path;

use glob::Pattern;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::options::JobOptions;
use crate::constants::{ENGINE_VERSION, FILENAME_STATUS, FILENAME_STDERR, FILENAME_STDOUT};
use crate::errors::ShellJobError;
use crate::hashing::hash_value;
use crate::model::{clean_relative_path, validate_input_name, Artifact};
use crate::parser::OutputParser;
use crate::template;

/// Argumentos del comando: lista de tokens o un único string con reglas de
/// palabras de shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgumentTemplate {
    Tokens(Vec<String>),
    Raw(String),
}

impl Default for ArgumentTemplate {
    fn default() -> Self {
        ArgumentTemplate::Tokens(Vec::new())
    }
}

impl From<Vec<String>> for ArgumentTemplate {
    fn from(v: Vec<String>) -> Self {
        ArgumentTemplate::Tokens(v)
    }
}

impl From<Vec<&str>> for ArgumentTemplate {
    fn from(v: Vec<&str>) -> Self {
        ArgumentTemplate::Tokens(v.into_iter().map(str::to_string).collect())
    }
}

impl From<&str> for ArgumentTemplate {
    fn from(v: &str) -> Self {
        ArgumentTemplate::Raw(v.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobSpec {
    pub command: String,
    pub label: Option<String>,
    pub arguments: ArgumentTemplate,
    /// Inputs por nombre, en orden de inserción.
    pub nodes: IndexMap<String, Artifact>,
    /// Nombre de staging explícito por input.
    pub filenames: IndexMap<String, String>,
    /// Outputs declarados (nombres literales o globs).
    pub outputs: Vec<String>,
    pub parser: Option<OutputParser>,
    pub options: JobOptions,
}

impl JobSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into(),
               ..Default::default() }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn arguments(mut self, arguments: impl Into<ArgumentTemplate>) -> Self {
        self.arguments = arguments.into();
        self
    }

    pub fn node(mut self, name: impl Into<String>, artifact: Artifact) -> Self {
        self.nodes.insert(name.into(), artifact);
        self
    }

    pub fn filename(mut self, name: impl Into<String>, filename: impl Into<String>) -> Self {
        self.filenames.insert(name.into(), filename.into());
        self
    }

    pub fn output(mut self, pattern: impl Into<String>) -> Self {
        self.outputs.push(pattern.into());
        self
    }

    pub fn parser(mut self, parser: OutputParser) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn options(mut self, options: JobOptions) -> Self {
        self.options = options;
        self
    }

    /// Nombres que el runner escribe en el directorio de trabajo. `stdout`
    /// queda reservado siempre, también cuando `output_filename` lo sustituye.
    pub fn reserved_filenames(&self) -> Vec<&str> {
        let mut names = vec![FILENAME_STDOUT, FILENAME_STDERR, FILENAME_STATUS];
        let stdout = self.options.stdout_filename();
        if !names.contains(&stdout) {
            names.push(stdout);
        }
        names
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_filenames().contains(&name)
    }

    /// Label mostrado del comando: el explícito o el nombre base del comando.
    pub fn display_label(&self) -> String {
        self.label.clone().unwrap_or_else(|| {
                              Path::new(&self.command).file_name()
                                                      .map(|n| n.to_string_lossy().into_owned())
                                                      .unwrap_or_else(|| self.command.clone())
                          })
    }

    pub fn computer<'a>(&'a self, default: &'a str) -> &'a str {
        self.options.computer.as_deref().unwrap_or(default)
    }

    /// `ShellJob<label@computer>`.
    pub fn process_label(&self, default_computer: &str) -> String {
        format!("ShellJob<{}@{}>", self.display_label(), self.computer(default_computer))
    }

    /// Validación completa y sin efectos laterales.
    pub fn validate(&self) -> Result<(), ShellJobError> {
        if self.command.trim().is_empty() {
            return Err(ShellJobError::EmptyCommand);
        }
        for name in self.nodes.keys() {
            validate_input_name(name)?;
        }
        for name in template::placeholders(&self.arguments)? {
            if !self.nodes.contains_key(&name) {
                return Err(ShellJobError::UnknownPlaceholder(name));
            }
        }
        for filename in self.filenames.values() {
            clean_relative_path(filename)?;
        }
        if let Some(stdin) = &self.options.filename_stdin {
            clean_relative_path(stdin)?;
        }
        if let Some(stdout) = &self.options.output_filename {
            let clean = clean_relative_path(stdout)?;
            if clean == FILENAME_STDERR || clean == FILENAME_STATUS {
                return Err(ShellJobError::ReservedOutput(clean));
            }
        }
        for output in &self.outputs {
            self.validate_output(output)?;
        }
        Ok(())
    }

    fn validate_output(&self, output: &str) -> Result<(), ShellJobError> {
        let bad = |reason: &str| ShellJobError::InvalidOutputPattern { pattern: output.to_string(),
                                                                       reason: reason.to_string() };
        let clean = clean_relative_path(output).map_err(|_| bad("must be a relative path inside the working directory"))?;
        if self.is_reserved(&clean) {
            return Err(ShellJobError::ReservedOutput(clean));
        }
        Pattern::new(&clean).map_err(|e| bad(e.msg))?;
        Ok(())
    }

    /// Hash estable de la especificación (sin el parser, que no es serializable).
    pub fn spec_hash(&self) -> String {
        let nodes: IndexMap<&str, &str> = self.nodes.iter().map(|(k, v)| (k.as_str(), v.hash())).collect();
        hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "command": self.command,
            "label": self.label,
            "arguments": self.arguments,
            "nodes": nodes,
            "filenames": self.filenames,
            "outputs": self.outputs,
            "options": self.options,
            "has_parser": self.parser.is_some(),
        }))
    }
}
