pub mod launch_error;

pub use launch_error::LaunchError;
