//! Descripción declarativa de un job y sus tipos asociados.

pub mod exit_code;
pub mod fingerprint;
pub mod options;
pub mod spec;
pub mod state;

pub use exit_code::{ExitCode, JobOutcome};
pub use fingerprint::JobFingerprintInput;
pub use options::{CollisionPolicy, JobOptions, MpiOptions};
pub use spec::{ArgumentTemplate, JobSpec};
pub use state::JobState;
