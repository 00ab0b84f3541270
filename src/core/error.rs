//! Step and pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

/// Outcome signals a step body can raise.
///
/// `Skip` is not a failure: the operation is already satisfied. `CommandFailed`
/// is an operational failure that halts the pipeline. Everything else is an
/// orchestrator defect and is reported unchanged.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("step already satisfied")]
    Skip,

    #[error("command failed: {cmd} (exit code: {code:?})")]
    CommandFailed { cmd: String, code: Option<i32> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("cannot extract {}: {reason}", archive.display())]
    Extract { archive: PathBuf, reason: String },

    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("cannot resolve template '{template}': {reason}")]
    Template { template: String, reason: String },

    #[error("patch not found: {}", .0.display())]
    MissingPatch(PathBuf),
}

impl StepError {
    /// True for the failures that halt the pipeline after a log dump.
    pub fn is_command_failure(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }
}

/// Errors that stop a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A subprocess exited nonzero. The step log has already been printed.
    #[error("{step} {dependency} failed, see {}", log.display())]
    Halt {
        step: String,
        dependency: String,
        log: PathBuf,
    },

    #[error("{step} {dependency}: {source}")]
    Unexpected {
        step: String,
        dependency: String,
        #[source]
        source: StepError,
    },
}

impl PipelineError {
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halt { .. })
    }
}
