//! Árbol de directorio en memoria.
//!
//! Las rutas son relativas, con separador `/`, y pasan por
//! `clean_relative_path`. `directories` guarda los directorios declarados
//! explícitamente (p.ej. vacíos); los padres de cada archivo son implícitos.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use walkdir::WalkDir;

use super::relpath::clean_relative_path;
use crate::errors::ShellJobError;
use crate::hashing::hash_bytes;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderTree {
    files: BTreeMap<String, Vec<u8>>,
    directories: BTreeSet<String>,
}

impl FolderTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_file(&mut self, relpath: &str, bytes: impl Into<Vec<u8>>) -> Result<(), ShellJobError> {
        let clean = clean_relative_path(relpath)?;
        self.files.insert(clean, bytes.into());
        Ok(())
    }

    pub fn insert_dir(&mut self, relpath: &str) -> Result<(), ShellJobError> {
        let clean = clean_relative_path(relpath)?;
        self.directories.insert(clean);
        Ok(())
    }

    /// Variante encadenable de `insert_file` para construir árboles en tests
    /// y demos.
    pub fn with_file(mut self, relpath: &str, bytes: impl Into<Vec<u8>>) -> Result<Self, ShellJobError> {
        self.insert_file(relpath, bytes)?;
        Ok(self)
    }

    /// Lee recursivamente `root`. Los enlaces simbólicos se siguen.
    pub fn from_path(root: &Path) -> Result<Self, ShellJobError> {
        let mut tree = Self::new();
        for entry in WalkDir::new(root).min_depth(1).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                                 let path = e.path().unwrap_or(root).to_path_buf();
                                 ShellJobError::staging(path, e.into())
                             })?;
            let rel = entry.path()
                           .strip_prefix(root)
                           .map_err(|e| ShellJobError::Internal(e.to_string()))?;
            let rel = rel.to_string_lossy().replace('\\', "/");
            if entry.file_type().is_dir() {
                tree.insert_dir(&rel)?;
            } else {
                let bytes = fs::read(entry.path()).map_err(|e| ShellJobError::staging(entry.path(), e))?;
                tree.insert_file(&rel, bytes)?;
            }
        }
        Ok(tree)
    }

    /// Escribe el árbol bajo `dest`, creando directorios intermedios.
    pub fn write_to(&self, dest: &Path) -> Result<(), ShellJobError> {
        for dir in &self.directories {
            let target = dest.join(dir);
            fs::create_dir_all(&target).map_err(|e| ShellJobError::staging(&target, e))?;
        }
        for (rel, bytes) in &self.files {
            let target = dest.join(rel);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| ShellJobError::staging(parent, e))?;
            }
            fs::write(&target, bytes).map_err(|e| ShellJobError::staging(&target, e))?;
        }
        Ok(())
    }

    /// Nombres de primer nivel (archivos y directorios) del árbol.
    pub fn top_level_names(&self) -> BTreeSet<String> {
        self.files
            .keys()
            .chain(self.directories.iter())
            .filter_map(|p| p.split('/').next().map(str::to_string))
            .collect()
    }

    pub fn file(&self, relpath: &str) -> Option<&[u8]> {
        self.files.get(relpath).map(Vec::as_slice)
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.directories.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }

    /// Descripción estable del contenido para el hashing del artifact.
    pub(crate) fn to_hash_json(&self) -> Value {
        let files: BTreeMap<&str, String> = self.files.iter().map(|(k, v)| (k.as_str(), hash_bytes(v))).collect();
        json!({"files": files, "directories": self.directories})
    }
}
