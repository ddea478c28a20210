//! Motor de jobs: builder y ejecución.

pub mod builder;
pub mod core;

pub use builder::ShellEngineBuilder;
pub use core::ShellEngine;
