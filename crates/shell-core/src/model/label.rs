//! Labels de inputs y outputs.
//!
//! Los nombres de input sirven a la vez de placeholder y de label de enlace
//! en la proveniencia, por eso se restringen a identificadores simples. Los
//! labels de output se derivan de nombres de archivo y se sanean.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::LABEL_DIGIT_PREFIX;
use crate::errors::ShellJobError;

static NON_LABEL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9a-zA-Z_]+").expect("regex válida"));
static REPEATED_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"__+").expect("regex válida"));
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("regex válida"));

/// Convierte un nombre de archivo arbitrario en un label seguro.
///
/// Secuencias de caracteres fuera de `[0-9a-zA-Z_]` pasan a `_`, los `_`
/// consecutivos se colapsan y un label que empieza por dígito recibe el
/// prefijo `shell_`. La función es idempotente.
pub fn sanitize_label(raw: &str) -> String {
    let replaced = NON_LABEL_CHARS.replace_all(raw, "_");
    let collapsed = REPEATED_UNDERSCORES.replace_all(&replaced, "_").into_owned();
    if collapsed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{LABEL_DIGIT_PREFIX}{collapsed}")
    } else {
        collapsed
    }
}

/// `true` si `label` es un identificador sin `__`.
pub fn is_valid_label(label: &str) -> bool {
    IDENTIFIER.is_match(label) && !label.contains("__")
}

pub fn validate_input_name(name: &str) -> Result<(), ShellJobError> {
    if is_valid_label(name) {
        Ok(())
    } else {
        Err(ShellJobError::InvalidInputName(name.to_string()))
    }
}
