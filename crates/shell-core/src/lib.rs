//! shell-core: adaptador de comandos de shell como jobs con proveniencia.
pub mod collect;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod host;
pub mod job;
pub mod model;
pub mod parser;
pub mod record;
pub mod staging;
pub mod template;

pub use collect::{CollectedOutputs, OutputCollector};
pub use engine::{ShellEngine, ShellEngineBuilder};
pub use errors::{ErrorClass, ShellJobError};
pub use event::{EventStore, InMemoryEventStore, JobEvent, JobEventKind};
pub use host::{CommandOutput, ExecutionRequest, JobQueue, ProcessOutcome, ProcessRunner, Transport};
pub use job::{ArgumentTemplate, CollisionPolicy, ExitCode, JobOptions, JobOutcome, JobSpec, JobState, MpiOptions};
pub use model::{Artifact, ArtifactContent, ArtifactKind, FolderTree, ScalarValue, ToArgumentString};
pub use parser::{BoxError, OutputParser, ParserContext};
pub use record::{ExecutionRecord, JobFailure};
pub use staging::{LinkMode, RemoteInstruction, StagedEntry, StagingPlan, StagingResolver};
