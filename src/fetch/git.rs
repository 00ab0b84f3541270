//! Source-control fetch: clone once, then re-sync to the declared ref on every run.

use std::path::PathBuf;

use super::FetchStrategy;
use crate::core::command;
use crate::core::error::{PipelineError, StepError};
use crate::core::options::{BuildContext, Layout};
use crate::core::step::StepLog;
use crate::dependency::{Dependency, LogLocation, StepContext};

#[derive(Debug, Clone)]
pub struct SourceControl {
    pub remote: String,
    /// Checkout directory, relative to the source root
    pub checkout_dir: PathBuf,
    pub git_ref: String,
}

impl SourceControl {
    pub fn new(remote: impl Into<String>, checkout_dir: impl Into<PathBuf>) -> Self {
        Self {
            remote: remote.into(),
            checkout_dir: checkout_dir.into(),
            git_ref: "master".to_string(),
        }
    }

    pub fn git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = git_ref.into();
        self
    }

    pub fn checkout_path(&self, layout: &Layout) -> PathBuf {
        layout.source_dir.join(&self.checkout_dir)
    }

    /// Never touches an existing checkout.
    pub fn clone_repo(&self, sc: &StepContext<'_>, log: &mut StepLog) -> Result<(), StepError> {
        if self.checkout_path(sc.layout()).exists() {
            return Err(StepError::Skip);
        }
        let cmd = format!(
            "{} clone {} {}",
            sc.tools().git,
            self.remote,
            self.checkout_dir.display()
        );
        command::execute(&cmd, &sc.layout().source_dir, log, None, None)
    }

    pub fn update(&self, sc: &StepContext<'_>, log: &mut StepLog) -> Result<(), StepError> {
        let checkout = self.checkout_path(sc.layout());
        let git = &sc.tools().git;
        command::execute(&format!("{} pull", git), &checkout, log, None, None)?;
        command::execute(
            &format!("{} checkout {}", git, self.git_ref),
            &checkout,
            log,
            None,
            None,
        )
    }
}

impl FetchStrategy for SourceControl {
    fn describe(&self) -> String {
        format!("{} ({})", self.remote, self.git_ref)
    }

    fn prepare(&self, dep: &Dependency, ctx: &BuildContext) -> Result<(), PipelineError> {
        dep.run_step(ctx, "clone", LogLocation::SourceRoot, false, |sc, log| {
            self.clone_repo(sc, log)
        })?;
        dep.run_step(ctx, "update", LogLocation::SourcePath, false, |sc, log| {
            self.update(sc, log)
        })?;
        Ok(())
    }
}
