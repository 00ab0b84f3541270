//! Core infrastructure for dependency builds
//!
//! Command execution, the step wrapper, errors, console output, run
//! configuration and the run lock.

pub mod command;
pub mod env;
pub mod error;
pub mod lock;
pub mod options;
pub mod output;
pub mod step;
