//! Shell command execution into a step log.
//!
//! Every command is run through `sh -c` with stdout and stderr both
//! redirected into the step's log file, after the literal command line and
//! the composed environment have been written to it.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::env::BuildEnv;
use super::error::StepError;
use super::step::StepLog;

/// Builder for one external command.
///
/// # Example
/// ```ignore
/// ShellCmd::new("make -j4", &source_path)
///     .env(env)
///     .run(log)?;
/// ```
#[derive(Debug)]
pub struct ShellCmd {
    cmd: String,
    cwd: PathBuf,
    env: Option<BuildEnv>,
    stdin: Option<File>,
}

impl ShellCmd {
    pub fn new(cmd: impl Into<String>, cwd: impl AsRef<Path>) -> Self {
        Self {
            cmd: cmd.into(),
            cwd: cwd.as_ref().to_path_buf(),
            env: None,
            stdin: None,
        }
    }

    /// Replace the child's environment entirely.
    pub fn env(mut self, env: BuildEnv) -> Self {
        self.env = Some(env);
        self
    }

    /// Feed the child's standard input from an open file.
    pub fn stdin(mut self, input: File) -> Self {
        self.stdin = Some(input);
        self
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    /// Run to completion, failing with `CommandFailed` on a nonzero exit.
    pub fn run(self, log: &mut StepLog) -> Result<(), StepError> {
        writeln!(log, "run command '{}'", self.cmd)?;
        if let Some(ref env) = self.env {
            writeln!(log, "env is :")?;
            for (k, v) in env.iter() {
                writeln!(log, "  {} : {:?}", k, v)?;
            }
        }
        log.flush()?;

        log::debug!("running `{}` in {}", self.cmd, self.cwd.display());

        let mut command = Command::new("sh");
        command
            .args(["-c", &self.cmd])
            .current_dir(&self.cwd)
            .stdout(log.stdio()?)
            .stderr(log.stdio()?);

        if let Some(ref env) = self.env {
            command.env_clear().envs(env.iter());
        }

        match self.stdin {
            Some(input) => command.stdin(Stdio::from(input)),
            None => command.stdin(Stdio::null()),
        };

        let status = command.status()?;
        if !status.success() {
            return Err(StepError::CommandFailed {
                cmd: self.cmd,
                code: status.code(),
            });
        }
        Ok(())
    }
}

/// Run `cmd` in `cwd`, capturing merged output into `log`.
pub fn execute(
    cmd: &str,
    cwd: &Path,
    log: &mut StepLog,
    env: Option<BuildEnv>,
    stdin: Option<File>,
) -> Result<(), StepError> {
    let mut shell = ShellCmd::new(cmd, cwd);
    if let Some(env) = env {
        shell = shell.env(env);
    }
    if let Some(input) = stdin {
        shell = shell.stdin(input);
    }
    shell.run(log)
}
