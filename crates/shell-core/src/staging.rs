//! Resolución de inputs a un plan de staging.
//!
//! `StagingResolver::resolve` es puro: decide nombres, valores de
//! placeholder y argumentos finales sin tocar el disco. El plan resultante
//! se materializa después en el directorio de trabajo (`materialize`),
//! una vez aplicadas las instrucciones remotas por el transporte.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::ShellJobError;
use crate::job::{CollisionPolicy, JobSpec};
use crate::model::{clean_relative_path, ArtifactContent, FolderTree, ToArgumentString};
use crate::template;

/// Entrada local a escribir en el directorio de trabajo.
#[derive(Debug, Clone, PartialEq)]
pub enum StagedEntry {
    File { key: String, relpath: String, bytes: Vec<u8> },
    /// `relpath == None` copia el contenido en la raíz del directorio.
    Folder { key: String, relpath: Option<String>, tree: FolderTree },
}

impl StagedEntry {
    pub fn key(&self) -> &str {
        match self {
            StagedEntry::File { key, .. } | StagedEntry::Folder { key, .. } => key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkMode {
    Copy,
    Symlink,
}

/// Instrucción para que el transporte traiga el contenido de un árbol remoto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInstruction {
    pub key: String,
    pub computer: String,
    pub remote_path: String,
    /// Patrón de origen: `"{remote_path}/*"`.
    pub source: String,
    /// Destino relativo al directorio de trabajo.
    pub target: String,
    pub mode: LinkMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StagingPlan {
    /// Argumentos finales, ya expandidos.
    pub arguments: Vec<String>,
    pub entries: Vec<StagedEntry>,
    pub remote: Vec<RemoteInstruction>,
}

impl StagingPlan {
    /// Escribe las entradas locales bajo `dirpath` y devuelve los nombres de
    /// primer nivel presentes tras el staging, ordenados.
    pub fn materialize(&self, dirpath: &Path) -> Result<Vec<String>, ShellJobError> {
        for entry in &self.entries {
            match entry {
                StagedEntry::File { relpath, bytes, .. } => {
                    let target = dirpath.join(relpath);
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent).map_err(|e| ShellJobError::staging(parent, e))?;
                    }
                    fs::write(&target, bytes).map_err(|e| ShellJobError::staging(&target, e))?;
                    debug!("staged file `{relpath}`");
                }
                StagedEntry::Folder { relpath, tree, key } => {
                    let target = relpath.as_ref().map(|r| dirpath.join(r)).unwrap_or_else(|| dirpath.to_path_buf());
                    tree.write_to(&target)?;
                    debug!("staged folder `{key}` into `{}`", target.display());
                }
            }
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dirpath).map_err(|e| ShellJobError::staging(dirpath, e))? {
            let entry = entry.map_err(|e| ShellJobError::staging(dirpath, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

pub struct StagingResolver<'a> {
    spec: &'a JobSpec,
    used: BTreeSet<String>,
}

fn top_level(relpath: &str) -> &str {
    relpath.split('/').next().unwrap_or(relpath)
}

impl<'a> StagingResolver<'a> {
    pub fn new(spec: &'a JobSpec) -> Self {
        Self { spec,
               used: BTreeSet::new() }
    }

    /// Primer nombre libre de la forma `name_1`, `name_2`, ...
    fn unique_name(&self, name: &str) -> String {
        (1..).map(|n| format!("{name}_{n}"))
             .find(|candidate| !self.spec.is_reserved(candidate) && !self.used.contains(candidate))
             .unwrap_or_else(|| name.to_string())
    }

    fn file_name(&mut self, key: &str, declared: Option<&str>) -> Result<String, ShellJobError> {
        if let Some(explicit) = self.spec.filenames.get(key) {
            let clean = clean_relative_path(explicit)?;
            if self.spec.is_reserved(top_level(&clean)) {
                return Err(ShellJobError::ReservedInputFilename { key: key.to_string(),
                                                                  filename: clean });
            }
            return Ok(clean);
        }
        let implicit = match declared {
            Some(name) => clean_relative_path(name)?,
            None => key.to_string(),
        };
        if !self.spec.is_reserved(top_level(&implicit)) {
            return Ok(implicit);
        }
        match self.spec.options.collision {
            CollisionPolicy::Fail => Err(ShellJobError::ReservedInputFilename { key: key.to_string(),
                                                                                filename: implicit }),
            CollisionPolicy::Rename => {
                let renamed = self.unique_name(&implicit);
                warn!("input `{key}` would be staged as reserved filename `{implicit}`; renamed to `{renamed}`");
                Ok(renamed)
            }
        }
    }

    pub fn resolve(mut self) -> Result<StagingPlan, ShellJobError> {
        let spec = self.spec;
        let parsed = template::parse_template(&spec.arguments)?;

        let mut bindings: IndexMap<String, String> = IndexMap::new();
        let mut entries = Vec::new();
        let mut remote = Vec::new();

        for (key, artifact) in &spec.nodes {
            match artifact.content() {
                ArtifactContent::SingleFile { filename, bytes } => {
                    let relpath = self.file_name(key, filename.as_deref())?;
                    self.used.insert(relpath.clone());
                    bindings.insert(key.clone(), relpath.clone());
                    entries.push(StagedEntry::File { key: key.clone(),
                                                     relpath,
                                                     bytes: bytes.clone() });
                }
                ArtifactContent::Folder(tree) => {
                    let relpath = match spec.filenames.get(key) {
                        Some(explicit) => {
                            let clean = clean_relative_path(explicit)?;
                            if spec.is_reserved(top_level(&clean)) {
                                return Err(ShellJobError::ReservedInputFilename { key: key.clone(),
                                                                                  filename: clean });
                            }
                            Some(clean)
                        }
                        None => {
                            if let Some(clash) = tree.top_level_names().into_iter().find(|n| spec.is_reserved(n)) {
                                return Err(ShellJobError::ReservedFolderEntry { key: key.clone(),
                                                                                filename: clash });
                            }
                            None
                        }
                    };
                    bindings.insert(key.clone(), relpath.clone().unwrap_or_else(|| key.clone()));
                    match &relpath {
                        Some(r) => {
                            self.used.insert(r.clone());
                        }
                        None => self.used.extend(tree.top_level_names()),
                    }
                    entries.push(StagedEntry::Folder { key: key.clone(),
                                                       relpath,
                                                       tree: tree.clone() });
                }
                ArtifactContent::RemoteFolder { computer, remote_path } => {
                    let mode = if spec.options.use_symlinks { LinkMode::Symlink } else { LinkMode::Copy };
                    bindings.insert(key.clone(), remote_path.clone());
                    remote.push(RemoteInstruction { key: key.clone(),
                                                    computer: computer.clone(),
                                                    remote_path: remote_path.clone(),
                                                    source: format!("{}/*", remote_path.trim_end_matches('/')),
                                                    target: ".".to_string(),
                                                    mode });
                }
                ArtifactContent::Scalar(value) => {
                    if let Some(text) = value.to_argument_string() {
                        bindings.insert(key.clone(), text);
                    }
                }
            }
        }

        let mut arguments = parsed.iter().map(|arg| arg.render(&bindings)).collect::<Result<Vec<_>, _>>()?;
        if let Some(stdin) = &spec.options.filename_stdin {
            arguments.retain(|a| a != stdin);
        }

        Ok(StagingPlan { arguments,
                         entries,
                         remote })
    }
}
