//! shell-adapters: primitivas de host locales para `shell-core`.
//!
//! Este crate provee:
//! - `LocalRunner`: ejecuta el comando con `std::process` escribiendo
//!   stdout, stderr y `status` en el directorio de trabajo.
//! - `LocalTransport`: trata el sistema de archivos local como "computer"
//!   para copiar o enlazar árboles remotos y sondear comandos.
//! - `InMemoryJobQueue`: cola FIFO que ejecuta los jobs pendientes contra
//!   un `ShellEngine`.
//! - `resolve_executable`: ruta absoluta de un comando vía `which`.

pub mod local_runner;
pub mod local_transport;
pub mod queue;
pub mod resolver;

pub use local_runner::LocalRunner;
pub use local_transport::LocalTransport;
pub use queue::InMemoryJobQueue;
pub use resolver::resolve_executable;
