//! Validación de rutas relativas "limpias" para nombres de staging.

use std::path::{Component, Path};

use crate::errors::ShellJobError;

/// Normaliza `raw` a una ruta relativa con separadores `/`.
///
/// Rechaza rutas absolutas, componentes `..` y rutas vacías; los `.`
/// intermedios se descartan.
pub fn clean_relative_path(raw: &str) -> Result<String, ShellJobError> {
    let invalid = || ShellJobError::InvalidRelativePath(raw.to_string());
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(invalid)?.to_string()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return Err(invalid()),
        }
    }
    if parts.is_empty() {
        return Err(invalid());
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_and_strips_curdir() {
        assert_eq!(clean_relative_path("a/b.txt").unwrap(), "a/b.txt");
        assert_eq!(clean_relative_path("./a//b").unwrap(), "a/b");
    }

    #[test]
    fn rejects_escaping_paths() {
        for bad in ["/etc/passwd", "../x", "a/../../b", "", "."] {
            assert!(matches!(clean_relative_path(bad), Err(ShellJobError::InvalidRelativePath(_))), "{bad}");
        }
    }
}
