//! Modelos neutrales del adaptador (Artifact, ScalarValue, FolderTree, labels).

pub mod artifact;
pub mod folder;
pub mod label;
pub mod relpath;
pub mod scalar;

pub use artifact::{Artifact, ArtifactContent, ArtifactKind};
pub use folder::FolderTree;
pub use label::{is_valid_label, sanitize_label, validate_input_name};
pub use relpath::clean_relative_path;
pub use scalar::{ScalarValue, ToArgumentString};
