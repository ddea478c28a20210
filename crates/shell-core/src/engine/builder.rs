//! Builder para `ShellEngine`.
//!
//! El runner, el transporte y la store de eventos son obligatorios; la raíz
//! de directorios de trabajo y el computer por defecto tienen valores
//! razonables (`<tmp>/shellflow`, `localhost`).

use std::path::PathBuf;

use crate::constants::DEFAULT_COMPUTER;
use crate::engine::ShellEngine;
use crate::event::EventStore;
use crate::host::{ProcessRunner, Transport};

pub struct ShellEngineBuilder<E, R, T>
    where E: EventStore,
          R: ProcessRunner,
          T: Transport
{
    pub(crate) event_store: E,
    pub(crate) runner: R,
    pub(crate) transport: T,
    pub(crate) workdir_root: Option<PathBuf>,
    pub(crate) default_computer: Option<String>,
}

impl<E, R, T> ShellEngineBuilder<E, R, T>
    where E: EventStore,
          R: ProcessRunner,
          T: Transport
{
    /// Directorio bajo el que se crea `<job uuid>/` para cada ejecución.
    #[inline]
    pub fn workdir_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workdir_root = Some(root.into());
        self
    }

    #[inline]
    pub fn default_computer(mut self, computer: impl Into<String>) -> Self {
        self.default_computer = Some(computer.into());
        self
    }

    pub fn build(self) -> ShellEngine<E, R, T> {
        let workdir_root = self.workdir_root
                               .unwrap_or_else(|| std::env::temp_dir().join("shellflow"));
        let default_computer = self.default_computer
                                   .unwrap_or_else(|| DEFAULT_COMPUTER.to_string());
        ShellEngine::from_parts(self.event_store,
                                self.runner,
                                self.transport,
                                workdir_root,
                                default_computer)
    }
}
