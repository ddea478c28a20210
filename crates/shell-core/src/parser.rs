//! Parser de outputs inyectable.
//!
//! Un parser es una clausura que recibe el directorio de trabajo y el
//! contexto de la ejecución y devuelve artifacts adicionales por label. Los
//! artifacts que devuelve reemplazan a los recolectados por defecto con el
//! mismo label. Un error del parser hace fallar el job.

use std::error::Error;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::job::JobSpec;
use crate::model::Artifact;

pub type BoxError = Box<dyn Error + Send + Sync>;

type ParserFn = dyn Fn(&Path, &ParserContext<'_>) -> Result<IndexMap<String, Artifact>, BoxError> + Send + Sync;

/// Datos de la ejecución visibles para el parser.
pub struct ParserContext<'a> {
    pub job_id: Uuid,
    pub spec: &'a JobSpec,
    /// Argumentos finales, ya expandidos.
    pub arguments: &'a [String],
    /// Código de salida leído del archivo `status` (si existe y es válido).
    pub exit_status: Option<i32>,
}

#[derive(Clone)]
pub struct OutputParser(Arc<ParserFn>);

impl OutputParser {
    pub fn new<F>(f: F) -> Self
        where F: Fn(&Path, &ParserContext<'_>) -> Result<IndexMap<String, Artifact>, BoxError> + Send + Sync + 'static
    {
        Self(Arc::new(f))
    }

    pub fn parse(&self, dirpath: &Path, ctx: &ParserContext<'_>) -> Result<IndexMap<String, Artifact>, BoxError> {
        (self.0)(dirpath, ctx)
    }
}

impl fmt::Debug for OutputParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OutputParser(<closure>)")
    }
}
