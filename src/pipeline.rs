//! Two-phase driver: prepare every dependency, then build every dependency.
//!
//! The order is the declared order and never changes. The first failing step
//! ends the run; nothing after it starts.

use anyhow::{Result, bail};

use crate::core::error::PipelineError;
use crate::core::options::BuildContext;
use crate::core::output;
use crate::dependency::Dependency;

pub struct Pipeline {
    deps: Vec<Dependency>,
    ctx: BuildContext,
}

impl Pipeline {
    /// Create the source and archive roots and take ownership of `deps`.
    pub fn new(deps: Vec<Dependency>, ctx: BuildContext) -> Result<Self> {
        ctx.layout.ensure_dirs()?;
        log::debug!(
            "source root {}, archive root {}",
            ctx.layout.source_dir.display(),
            ctx.layout.archive_dir.display()
        );
        Ok(Self { deps, ctx })
    }

    /// Keep only the named dependencies, in declared order.
    pub fn only(mut self, names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }
        for name in names {
            if !self.deps.iter().any(|d| &d.name == name) {
                bail!(
                    "unknown dependency '{}' (known: {})",
                    name,
                    self.names().join(", ")
                );
            }
        }
        self.deps.retain(|d| names.contains(&d.name));
        Ok(self)
    }

    pub fn names(&self) -> Vec<&str> {
        self.deps.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.deps
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    pub fn prepare(&self) -> Result<(), PipelineError> {
        for dep in &self.deps {
            output::dependency_header("prepare", &dep.name);
            dep.prepare(&self.ctx)?;
        }
        Ok(())
    }

    pub fn build(&self) -> Result<(), PipelineError> {
        for dep in &self.deps {
            output::dependency_header("build", &dep.name);
            dep.build(&self.ctx)?;
        }
        Ok(())
    }

    /// Prepare all, then build all.
    pub fn run(&self) -> Result<(), PipelineError> {
        output::phase("PREPARE");
        self.prepare()?;
        output::phase("BUILD");
        self.build()
    }
}
