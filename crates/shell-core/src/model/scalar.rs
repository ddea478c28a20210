//! Valores escalares enlazables a placeholders.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Valor escalar de input. Se convierte a texto sólo cuando un placeholder
/// lo referencia; si ningún argumento lo usa se ignora.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ScalarValue {
    /// Representación JSON estable usada por el hashing.
    pub fn to_json(&self) -> Value {
        match self {
            ScalarValue::Bool(b) => json!({"type": "bool", "value": b}),
            ScalarValue::Int(i) => json!({"type": "int", "value": i}),
            // `{:?}` conserva el punto decimal y evita depender de la
            // representación de NaN en JSON.
            ScalarValue::Float(f) => json!({"type": "float", "value": format!("{f:?}")}),
            ScalarValue::Str(s) => json!({"type": "str", "value": s}),
        }
    }
}

/// Capacidad de convertirse en un argumento de línea de comandos.
///
/// `None` significa que el valor no es representable como argumento (por
/// ejemplo un archivo o una carpeta, que se referencian por nombre).
pub trait ToArgumentString {
    fn to_argument_string(&self) -> Option<String>;
}

impl ToArgumentString for ScalarValue {
    fn to_argument_string(&self) -> Option<String> {
        Some(match self {
            ScalarValue::Bool(b) => b.to_string(),
            ScalarValue::Int(i) => i.to_string(),
            ScalarValue::Float(f) => format!("{f:?}"),
            ScalarValue::Str(s) => s.clone(),
        })
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::Int(v as i64)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Str(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Str(v)
    }
}
