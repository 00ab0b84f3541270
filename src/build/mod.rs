//! Build strategies: how a source tree becomes installed artifacts.
//!
//! [`RawMake`] is the base behavior. [`CMake`] replaces its configure step;
//! [`Meson`] replaces configure, compile and install.

mod cmake;
mod make;
mod meson;

pub use cmake::CMake;
pub use make::{RawMake, make_in_source};
pub use meson::Meson;

use crate::core::error::{PipelineError, StepError};
use crate::core::options::BuildContext;
use crate::core::step::StepLog;
use crate::dependency::{Dependency, LogLocation, StepContext};

/// Turns a prepared source tree into installed artifacts.
pub trait BuildStrategy {
    fn describe(&self) -> &'static str;

    fn configure(&self, sc: &StepContext<'_>, log: &mut StepLog) -> Result<(), StepError>;

    fn compile(&self, sc: &StepContext<'_>, log: &mut StepLog) -> Result<(), StepError> {
        let target = format!("-j{}", sc.options().jobs);
        make_in_source(sc, log, &target)
    }

    fn install(&self, sc: &StepContext<'_>, log: &mut StepLog) -> Result<(), StepError> {
        make_in_source(sc, log, "install")
    }

    /// Whether compile and install leave completion markers.
    fn marks_compile(&self) -> bool {
        true
    }

    /// configure, compile, install, strictly in that order.
    fn build(&self, dep: &Dependency, ctx: &BuildContext) -> Result<(), PipelineError> {
        let marks = self.marks_compile();
        dep.run_step(ctx, "configure", LogLocation::SourcePath, true, |sc, log| {
            self.configure(sc, log)
        })?;
        dep.run_step(ctx, "compile", LogLocation::SourcePath, marks, |sc, log| {
            self.compile(sc, log)
        })?;
        dep.run_step(ctx, "install", LogLocation::SourcePath, marks, |sc, log| {
            self.install(sc, log)
        })?;
        Ok(())
    }
}
