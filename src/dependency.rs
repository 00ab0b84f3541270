//! Dependency descriptor.
//!
//! A [`Dependency`] pairs one fetch strategy with one build strategy and
//! carries the identity and flags both need. Non-standard behavior is
//! expressed per step name: [`Dependency::override_step`] swaps the body of
//! one step, [`Dependency::after_step`] schedules an extra step right after
//! a named one. The strategies themselves stay shared.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::build::BuildStrategy;
use crate::core::error::{PipelineError, StepError};
use crate::core::options::{BuildContext, BuildOptions, Layout, Toolchain};
use crate::core::step::{self, StepLog, StepOutcome, StepSpec};
use crate::fetch::FetchStrategy;

/// Body of a step, as supplied by an override or an extra step.
pub type StepBody = Box<dyn Fn(&StepContext<'_>, &mut StepLog) -> Result<(), StepError>>;

/// Where a step's log file is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLocation {
    /// The archive root
    ArchiveDir,
    /// The shared source root
    SourceRoot,
    /// The dependency's own source path
    SourcePath,
}

/// Environment entry applied on top of the configure environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvOverride {
    Value { key: String, value: String },
    /// Resolved against the current options and environment at configure time
    Template { key: String, template: String },
}

/// Flags consumed by the build strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFlags {
    pub configure_script: String,
    pub configure_option: String,
    pub make_option: String,
    pub configure_env: Vec<EnvOverride>,
}

impl Default for BuildFlags {
    fn default() -> Self {
        Self {
            configure_script: "./configure".to_string(),
            configure_option: String::new(),
            make_option: String::new(),
            configure_env: Vec::new(),
        }
    }
}

/// A step scheduled after another step of the same dependency.
pub struct ExtraStep {
    pub name: String,
    pub log: LogLocation,
    pub autoskip: bool,
    pub body: StepBody,
}

impl ExtraStep {
    pub fn new(name: impl Into<String>, log: LogLocation, autoskip: bool, body: StepBody) -> Self {
        Self {
            name: name.into(),
            log,
            autoskip,
            body,
        }
    }
}

/// What a step body sees.
pub struct StepContext<'a> {
    pub dep: &'a Dependency,
    pub ctx: &'a BuildContext,
}

impl StepContext<'_> {
    pub fn source_path(&self) -> PathBuf {
        self.dep.source_path(&self.ctx.layout)
    }

    pub fn options(&self) -> &BuildOptions {
        &self.ctx.options
    }

    pub fn layout(&self) -> &Layout {
        &self.ctx.layout
    }

    pub fn tools(&self) -> &Toolchain {
        &self.ctx.tools
    }

    pub fn flags(&self) -> &BuildFlags {
        &self.dep.flags
    }
}

pub struct Dependency {
    pub name: String,
    /// Source tree, relative to the source root
    pub source_dir: PathBuf,
    /// Unified diff under the patches directory
    pub patch: Option<String>,
    pub flags: BuildFlags,
    fetch: Box<dyn FetchStrategy>,
    build: Box<dyn BuildStrategy>,
    overrides: HashMap<String, StepBody>,
    extras: Vec<(String, ExtraStep)>,
}

impl std::fmt::Debug for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependency")
            .field("name", &self.name)
            .field("source_dir", &self.source_dir)
            .field("fetch", &self.fetch.describe())
            .field("build", &self.build.describe())
            .field("patch", &self.patch)
            .field("flags", &self.flags)
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Dependency {
    pub fn new(
        name: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        fetch: impl FetchStrategy + 'static,
        build: impl BuildStrategy + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            source_dir: source_dir.into(),
            patch: None,
            flags: BuildFlags::default(),
            fetch: Box::new(fetch),
            build: Box::new(build),
            overrides: HashMap::new(),
            extras: Vec::new(),
        }
    }

    pub fn patch(mut self, patch: impl Into<String>) -> Self {
        self.patch = Some(patch.into());
        self
    }

    pub fn configure_script(mut self, script: impl Into<String>) -> Self {
        self.flags.configure_script = script.into();
        self
    }

    pub fn configure_option(mut self, option: impl Into<String>) -> Self {
        self.flags.configure_option = option.into();
        self
    }

    pub fn make_option(mut self, option: impl Into<String>) -> Self {
        self.flags.make_option = option.into();
        self
    }

    pub fn configure_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.configure_env.push(EnvOverride::Value {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn configure_env_template(
        mut self,
        key: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.flags.configure_env.push(EnvOverride::Template {
            key: key.into(),
            template: template.into(),
        });
        self
    }

    /// Replace the body of step `name` for this dependency only.
    pub fn override_step<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&StepContext<'_>, &mut StepLog) -> Result<(), StepError> + 'static,
    {
        self.overrides.insert(name.into(), Box::new(body));
        self
    }

    /// Run `extra` right after step `after` finishes without failing.
    pub fn after_step(mut self, after: impl Into<String>, extra: ExtraStep) -> Self {
        self.extras.push((after.into(), extra));
        self
    }

    pub fn source_path(&self, layout: &Layout) -> PathBuf {
        layout.source_dir.join(&self.source_dir)
    }

    pub fn fetch_strategy(&self) -> &dyn FetchStrategy {
        self.fetch.as_ref()
    }

    pub fn build_strategy(&self) -> &dyn BuildStrategy {
        self.build.as_ref()
    }

    pub fn has_override(&self, step: &str) -> bool {
        self.overrides.contains_key(step)
    }

    /// Obtain the source tree.
    pub fn prepare(&self, ctx: &BuildContext) -> Result<(), PipelineError> {
        self.fetch.prepare(self, ctx)
    }

    /// Configure, compile and install.
    pub fn build(&self, ctx: &BuildContext) -> Result<(), PipelineError> {
        self.build.build(self, ctx)
    }

    fn log_dir(&self, ctx: &BuildContext, location: LogLocation) -> PathBuf {
        match location {
            LogLocation::ArchiveDir => ctx.layout.archive_dir.clone(),
            LogLocation::SourceRoot => ctx.layout.source_dir.clone(),
            LogLocation::SourcePath => self.source_path(&ctx.layout),
        }
    }

    fn wrap<F>(
        &self,
        ctx: &BuildContext,
        name: &str,
        location: LogLocation,
        autoskip: bool,
        body: F,
    ) -> Result<StepOutcome, PipelineError>
    where
        F: FnOnce(&StepContext<'_>, &mut StepLog) -> Result<(), StepError>,
    {
        let sc = StepContext { dep: self, ctx };
        let log_dir = self.log_dir(ctx, location);
        let marker_dir = self.source_path(&ctx.layout);
        let spec = StepSpec {
            name,
            dependency: &self.name,
            log_dir: Path::new(&log_dir),
            marker_dir: Path::new(&marker_dir),
            autoskip,
        };
        step::run_step(&spec, |log| body(&sc, log))
    }

    /// Run step `name`, using this dependency's override when one is set,
    /// then any extra steps scheduled after it.
    pub fn run_step<F>(
        &self,
        ctx: &BuildContext,
        name: &str,
        location: LogLocation,
        autoskip: bool,
        default: F,
    ) -> Result<StepOutcome, PipelineError>
    where
        F: FnOnce(&StepContext<'_>, &mut StepLog) -> Result<(), StepError>,
    {
        let outcome = match self.overrides.get(name) {
            Some(body) => self.wrap(ctx, name, location, autoskip, |sc, log| body(sc, log))?,
            None => self.wrap(ctx, name, location, autoskip, default)?,
        };

        for (_, extra) in self.extras.iter().filter(|(after, _)| after == name) {
            self.wrap(ctx, &extra.name, extra.log, extra.autoskip, |sc, log| {
                (extra.body)(sc, log)
            })?;
        }

        Ok(outcome)
    }
}
