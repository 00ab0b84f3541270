//! Step wrapper: status line, log file, skip markers and failure escalation.
//!
//! Every fetch and build operation runs through [`run_step`]. The wrapper
//! prints `<step> <dependency>: ` and then exactly one of `OK`, `SKIP` or
//! `ERROR`, so a run reads as one status line per step.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use super::error::{PipelineError, StepError};
use super::output;

/// Result of a step that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    Skipped,
}

/// Per-attempt log file. Truncated when created.
#[derive(Debug)]
pub struct StepLog {
    path: PathBuf,
    file: File,
}

impl StepLog {
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A handle child processes can write into.
    pub fn stdio(&self) -> io::Result<Stdio> {
        Ok(Stdio::from(self.file.try_clone()?))
    }

    pub fn contents(&self) -> io::Result<String> {
        let bytes = std::fs::read(&self.path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Write for StepLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// `cmd_<step>_<dependency>.log`
pub fn log_file_name(step: &str, dependency: &str) -> String {
    format!("cmd_{}_{}.log", step, dependency)
}

/// `<source path>/.<step>_ok`
pub fn marker_path(source_path: &Path, step: &str) -> PathBuf {
    source_path.join(format!(".{}_ok", step))
}

pub fn is_marked(source_path: &Path, step: &str) -> bool {
    marker_path(source_path, step).exists()
}

fn write_marker(source_path: &Path, step: &str) -> io::Result<()> {
    let path = marker_path(source_path, step);
    log::debug!("marking {}", path.display());
    File::create(path).map(|_| ())
}

/// Identity and placement of one step invocation.
#[derive(Debug, Clone, Copy)]
pub struct StepSpec<'a> {
    pub name: &'a str,
    pub dependency: &'a str,
    /// Directory the log file goes in
    pub log_dir: &'a Path,
    /// Directory the completion marker lives in
    pub marker_dir: &'a Path,
    pub autoskip: bool,
}

impl StepSpec<'_> {
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(log_file_name(self.name, self.dependency))
    }

    fn unexpected(&self, source: StepError) -> PipelineError {
        PipelineError::Unexpected {
            step: self.name.to_string(),
            dependency: self.dependency.to_string(),
            source,
        }
    }
}

/// Run `body` as the step described by `spec`.
///
/// A `Skip` from the body is absorbed (no marker, the attempt's log is
/// discarded). A failed command prints the whole log and becomes
/// [`PipelineError::Halt`]. Any other error is passed up as
/// [`PipelineError::Unexpected`] without a log dump.
pub fn run_step<F>(spec: &StepSpec<'_>, body: F) -> Result<StepOutcome, PipelineError>
where
    F: FnOnce(&mut StepLog) -> Result<(), StepError>,
{
    output::step_begin(spec.name, spec.dependency);

    if spec.autoskip && is_marked(spec.marker_dir, spec.name) {
        output::step_skip();
        return Ok(StepOutcome::Skipped);
    }

    let log_path = spec.log_path();
    let mut log = match StepLog::create(&log_path) {
        Ok(log) => log,
        Err(e) => {
            output::step_error();
            return Err(spec.unexpected(e.into()));
        }
    };

    match body(&mut log) {
        Ok(()) => {
            if spec.autoskip
                && let Err(e) = write_marker(spec.marker_dir, spec.name)
            {
                output::step_error();
                return Err(spec.unexpected(e.into()));
            }
            output::step_ok();
            Ok(StepOutcome::Done)
        }
        Err(StepError::Skip) => {
            drop(log);
            let _ = std::fs::remove_file(&log_path);
            output::step_skip();
            Ok(StepOutcome::Skipped)
        }
        Err(e) if e.is_command_failure() => {
            output::step_error();
            log::debug!("{} {}: {}", spec.name, spec.dependency, e);
            match log.contents() {
                Ok(content) => output::dump_log(&content),
                Err(read_err) => output::warning(&format!(
                    "cannot read {}: {}",
                    log_path.display(),
                    read_err
                )),
            }
            Err(PipelineError::Halt {
                step: spec.name.to_string(),
                dependency: spec.dependency.to_string(),
                log: log_path,
            })
        }
        Err(e) => {
            output::step_error();
            Err(spec.unexpected(e))
        }
    }
}
