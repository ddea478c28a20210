//! Artifact neutral del adaptador.
//!
//! Un `Artifact` es la unidad de datos que entra (inputs enlazados a
//! placeholders) y sale (outputs recolectados) de un job:
//! - `content` es uno de archivo, carpeta, carpeta remota o escalar.
//! - `hash` se calcula en la construcción sobre el JSON canonicalizado que
//!   describe el contenido (los bytes entran por su propio digest blake3).
//!   Sirve como identidad para deduplicación y trazabilidad.
//! - `metadata` permite anotar información auxiliar que no entra al hash.
//!
//! Los campos son privados: un artifact no cambia después de creado.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::folder::FolderTree;
use super::scalar::{ScalarValue, ToArgumentString};
use crate::errors::ShellJobError;
use crate::hashing::{hash_bytes, hash_value};

/// Tipos de artifact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Un único archivo con nombre declarado opcional.
    SingleFile,
    /// Árbol de directorio local.
    Folder,
    /// Referencia a un árbol que vive en otro computer.
    RemoteFolder,
    /// Valor escalar (bool, entero, float o texto).
    Scalar,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactContent {
    SingleFile { filename: Option<String>, bytes: Vec<u8> },
    Folder(FolderTree),
    RemoteFolder { computer: String, remote_path: String },
    Scalar(ScalarValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    kind: ArtifactKind,
    hash: String,
    content: ArtifactContent,
    metadata: Option<Value>,
}

impl Artifact {
    fn new(content: ArtifactContent) -> Self {
        let (kind, description) = match &content {
            ArtifactContent::SingleFile { filename, bytes } => {
                (ArtifactKind::SingleFile, json!({"filename": filename, "content": hash_bytes(bytes)}))
            }
            ArtifactContent::Folder(tree) => (ArtifactKind::Folder, tree.to_hash_json()),
            ArtifactContent::RemoteFolder { computer, remote_path } => {
                (ArtifactKind::RemoteFolder, json!({"computer": computer, "remote_path": remote_path}))
            }
            ArtifactContent::Scalar(value) => (ArtifactKind::Scalar, value.to_json()),
        };
        let hash = hash_value(&json!({"kind": kind, "content": description}));
        Self { kind,
               hash,
               content,
               metadata: None }
    }

    /// Archivo sin nombre declarado: al hacer staging toma el nombre del input.
    pub fn single_file(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(ArtifactContent::SingleFile { filename: None,
                                                bytes: bytes.into() })
    }

    pub fn single_file_named(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(ArtifactContent::SingleFile { filename: Some(filename.into()),
                                                bytes: bytes.into() })
    }

    /// Lee un archivo del disco; el nombre declarado es el nombre base de `path`.
    pub fn from_file(path: &Path) -> Result<Self, ShellJobError> {
        if !path.is_file() {
            return Err(ShellJobError::MissingInput(path.to_path_buf()));
        }
        let bytes = fs::read(path).map_err(|e| ShellJobError::staging(path, e))?;
        let filename = path.file_name().map(|n| n.to_string_lossy().into_owned());
        Ok(Self::new(ArtifactContent::SingleFile { filename, bytes }))
    }

    pub fn folder(tree: FolderTree) -> Self {
        Self::new(ArtifactContent::Folder(tree))
    }

    pub fn from_directory(path: &Path) -> Result<Self, ShellJobError> {
        if !path.is_dir() {
            return Err(ShellJobError::MissingInput(path.to_path_buf()));
        }
        Ok(Self::folder(FolderTree::from_path(path)?))
    }

    pub fn remote_folder(computer: impl Into<String>, remote_path: impl Into<String>) -> Self {
        Self::new(ArtifactContent::RemoteFolder { computer: computer.into(),
                                                  remote_path: remote_path.into() })
    }

    pub fn scalar(value: impl Into<ScalarValue>) -> Self {
        Self::new(ArtifactContent::Scalar(value.into()))
    }

    /// Adjunta metadata auxiliar; no altera el hash.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn content(&self) -> &ArtifactContent {
        &self.content
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    /// Nombre declarado de un archivo (si lo tiene).
    pub fn filename(&self) -> Option<&str> {
        match &self.content {
            ArtifactContent::SingleFile { filename, .. } => filename.as_deref(),
            _ => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.content {
            ArtifactContent::SingleFile { bytes, .. } => Some(bytes),
            _ => None,
        }
    }

    /// Contenido de un archivo como texto (UTF-8 con reemplazo).
    pub fn text(&self) -> Option<String> {
        self.bytes().map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn as_folder(&self) -> Option<&FolderTree> {
        match &self.content {
            ArtifactContent::Folder(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match &self.content {
            ArtifactContent::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

impl ToArgumentString for Artifact {
    fn to_argument_string(&self) -> Option<String> {
        self.as_scalar().and_then(ToArgumentString::to_argument_string)
    }
}
