//! Canonical JSON mínimo: claves de objeto ordenadas, sin espacios.
//!
//! Es la única forma de serialización que entra en los hashes, así que dos
//! valores con el mismo contenido producen siempre el mismo texto.

use serde_json::Value;
use std::collections::BTreeMap;

fn quote(s: &str) -> String {
    // `Value::String` serializa con el escape estándar de JSON.
    Value::String(s.to_owned()).to_string()
}

pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let tree: BTreeMap<&String, String> = map.iter().map(|(k, v)| (k, to_canonical_json(v))).collect();
            let items: Vec<String> = tree.into_iter().map(|(k, v)| format!("{}:{}", quote(k), v)).collect();
            format!("{{{}}}", items.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_keys_are_sorted_recursively() {
        let v = json!({"b": 1, "a": {"z": true, "y": null}, "c": ["x", 2]});
        assert_eq!(to_canonical_json(&v), r#"{"a":{"y":null,"z":true},"b":1,"c":["x",2]}"#);
    }

    #[test]
    fn strings_are_escaped() {
        let v = json!({"k": "line\n\"quoted\""});
        assert_eq!(to_canonical_json(&v), r#"{"k":"line\n\"quoted\""}"#);
    }
}
