//! Fachada de lanzamiento.
//!
//! `ShellLauncher` convierte una `LaunchRequest` (comando relativo, argumentos
//! como lista o string, inputs como artifacts, rutas o escalares) en un
//! `JobSpec` y lo ejecuta o encola en su `ShellEngine`. Los comandos se
//! preparan como "codes" `comando@computer` y se cachean por launcher.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::info;
use shell_adapters::{resolve_executable, LocalRunner, LocalTransport};
use shell_core::{ArgumentTemplate, Artifact, EventStore, ExecutionRecord, InMemoryEventStore, JobOptions, JobQueue,
                 JobSpec, OutputParser, ProcessRunner, ScalarValue, ShellEngine, Transport};

use crate::config::ShellflowConfig;
use crate::errors::LaunchError;

/// Cómo se traduce el comando pedido al ejecutable que se lanza.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandPolicy {
    /// Ruta absoluta obtenida con `which` en el computer de destino.
    #[default]
    Resolve,
    /// El comando se usa tal cual (búsqueda en `PATH` del runner).
    AsGiven,
}

/// Valor aceptado en `nodes`.
#[derive(Debug, Clone)]
pub enum NodeInput {
    Artifact(Artifact),
    /// Archivo o directorio local; se convierte en artifact al lanzar.
    Path(PathBuf),
    Scalar(ScalarValue),
}

impl From<Artifact> for NodeInput {
    fn from(v: Artifact) -> Self {
        NodeInput::Artifact(v)
    }
}

impl From<PathBuf> for NodeInput {
    fn from(v: PathBuf) -> Self {
        NodeInput::Path(v)
    }
}

impl From<&Path> for NodeInput {
    fn from(v: &Path) -> Self {
        NodeInput::Path(v.to_path_buf())
    }
}

/// Un `&str` en `nodes` se interpreta como ruta.
impl From<&str> for NodeInput {
    fn from(v: &str) -> Self {
        NodeInput::Path(PathBuf::from(v))
    }
}

impl From<ScalarValue> for NodeInput {
    fn from(v: ScalarValue) -> Self {
        NodeInput::Scalar(v)
    }
}

impl From<i64> for NodeInput {
    fn from(v: i64) -> Self {
        NodeInput::Scalar(v.into())
    }
}

impl From<f64> for NodeInput {
    fn from(v: f64) -> Self {
        NodeInput::Scalar(v.into())
    }
}

impl From<bool> for NodeInput {
    fn from(v: bool) -> Self {
        NodeInput::Scalar(v.into())
    }
}

impl NodeInput {
    fn into_artifact(self) -> Result<Artifact, LaunchError> {
        match self {
            NodeInput::Artifact(a) => Ok(a),
            NodeInput::Scalar(v) => Ok(Artifact::scalar(v)),
            NodeInput::Path(path) if path.is_dir() => Ok(Artifact::from_directory(&path)?),
            NodeInput::Path(path) if path.is_file() => Ok(Artifact::from_file(&path)?),
            NodeInput::Path(path) => Err(LaunchError::MissingPath(path)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    pub command: String,
    pub arguments: ArgumentTemplate,
    pub nodes: IndexMap<String, NodeInput>,
    pub filenames: IndexMap<String, String>,
    pub outputs: Vec<String>,
    pub parser: Option<OutputParser>,
    /// `None` usa las opciones por defecto del launcher.
    pub options: Option<JobOptions>,
}

impl LaunchRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into(),
               ..Default::default() }
    }

    /// Lista de tokens o string (dividido con reglas de palabras de shell).
    pub fn arguments(mut self, arguments: impl Into<ArgumentTemplate>) -> Self {
        self.arguments = arguments.into();
        self
    }

    pub fn node(mut self, name: impl Into<String>, value: impl Into<NodeInput>) -> Self {
        self.nodes.insert(name.into(), value.into());
        self
    }

    pub fn filename(mut self, name: impl Into<String>, filename: impl Into<String>) -> Self {
        self.filenames.insert(name.into(), filename.into());
        self
    }

    pub fn output(mut self, pattern: impl Into<String>) -> Self {
        self.outputs.push(pattern.into());
        self
    }

    pub fn parser(mut self, parser: OutputParser) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn options(mut self, options: JobOptions) -> Self {
        self.options = Some(options);
        self
    }
}

pub type LaunchResult = (IndexMap<String, Artifact>, ExecutionRecord);

pub struct ShellLauncher<E, R, T>
    where E: EventStore,
          R: ProcessRunner,
          T: Transport
{
    engine: ShellEngine<E, R, T>,
    policy: CommandPolicy,
    default_options: JobOptions,
    // "comando@computer" -> ejecutable
    codes: HashMap<String, String>,
}

impl ShellLauncher<InMemoryEventStore, LocalRunner, LocalTransport> {
    /// Launcher local configurado a partir de `config`.
    pub fn from_config(config: &ShellflowConfig) -> Self {
        let engine = ShellEngine::new(LocalRunner, LocalTransport::new(config.computer.clone()))
            .workdir_root(config.workdir_root.clone())
            .default_computer(config.computer.clone())
            .build();
        let default_options = JobOptions { use_symlinks: config.use_symlinks,
                                           ..Default::default() };
        Self::new(engine, config.command_policy).with_default_options(default_options)
    }

    /// Launcher local configurado desde el entorno (`.env` incluido).
    pub fn local() -> Self {
        Self::from_config(&ShellflowConfig::from_env())
    }
}

impl<E, R, T> ShellLauncher<E, R, T>
    where E: EventStore,
          R: ProcessRunner,
          T: Transport
{
    pub fn new(engine: ShellEngine<E, R, T>, policy: CommandPolicy) -> Self {
        Self { engine,
               policy,
               default_options: JobOptions::default(),
               codes: HashMap::new() }
    }

    pub fn with_default_options(mut self, options: JobOptions) -> Self {
        self.default_options = options;
        self
    }

    pub fn engine(&self) -> &ShellEngine<E, R, T> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ShellEngine<E, R, T> {
        &mut self.engine
    }

    /// Ejecutable para `command` en `computer`, resuelto una sola vez por
    /// launcher.
    pub fn prepare_code(&mut self, command: &str, computer: &str) -> Result<String, LaunchError> {
        let code_label = format!("{command}@{computer}");
        if let Some(executable) = self.codes.get(&code_label) {
            return Ok(executable.clone());
        }
        let executable = match self.policy {
            CommandPolicy::Resolve => resolve_executable(self.engine.transport(), computer, command)?,
            CommandPolicy::AsGiven => command.to_string(),
        };
        info!("prepared code `{code_label}` -> `{executable}`");
        self.codes.insert(code_label, executable.clone());
        Ok(executable)
    }

    fn build_spec(&mut self, request: LaunchRequest) -> Result<JobSpec, LaunchError> {
        let options = request.options.unwrap_or_else(|| self.default_options.clone());
        let computer = options.computer
                              .clone()
                              .unwrap_or_else(|| self.engine.default_computer().to_string());
        let executable = self.prepare_code(&request.command, &computer)?;

        let mut nodes = IndexMap::with_capacity(request.nodes.len());
        for (key, value) in request.nodes {
            nodes.insert(key, value.into_artifact()?);
        }

        Ok(JobSpec { command: executable,
                     label: Some(request.command),
                     arguments: request.arguments,
                     nodes,
                     filenames: request.filenames,
                     outputs: request.outputs,
                     parser: request.parser,
                     options })
    }

    /// Ejecuta el job y devuelve los artifacts producidos y su registro.
    pub fn launch(&mut self, request: LaunchRequest) -> Result<LaunchResult, LaunchError> {
        let spec = self.build_spec(request)?;
        Ok(self.engine.run(spec)?)
    }

    /// Registra y encola el job; el registro queda en estado `Created`.
    pub fn submit<Q>(&mut self, request: LaunchRequest, queue: &mut Q) -> Result<ExecutionRecord, LaunchError>
        where Q: JobQueue + ?Sized
    {
        let spec = self.build_spec(request)?;
        Ok(self.engine.submit(spec, queue)?)
    }
}

/// Ejecuta `request` con un launcher local configurado desde el entorno.
pub fn launch_shell_job(request: LaunchRequest) -> Result<LaunchResult, LaunchError> {
    ShellLauncher::local().launch(request)
}

/// Encola `request` con un launcher local configurado desde el entorno.
pub fn submit_shell_job<Q>(request: LaunchRequest, queue: &mut Q) -> Result<ExecutionRecord, LaunchError>
    where Q: JobQueue + ?Sized
{
    ShellLauncher::local().submit(request, queue)
}
