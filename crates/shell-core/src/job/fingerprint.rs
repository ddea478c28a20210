use std::collections::BTreeMap;

use serde::Serialize;

/// Insumos del fingerprint de un job finalizado.
/// NO es el fingerprint final (string hash) sino el modelo previo a canonicalizar.
#[derive(Serialize)]
pub struct JobFingerprintInput<'a> {
    pub engine_version: &'a str,
    pub spec_hash: &'a str,
    pub arguments: &'a [String],
    pub outputs: &'a BTreeMap<String, String>, // label -> hash
    pub exit_status: u32,
}
