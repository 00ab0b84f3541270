//! Bootstrap builder for the Kiwix native stack.
//!
//! Fetches, patches, configures, compiles and installs a fixed list of
//! third-party libraries into one install prefix, so the Kiwix tools can be
//! built without relying on the host's packaged versions.
//!
//! # Layout
//!
//! - `ARCHIVE/` - downloaded release archives and their download logs
//! - `SOURCE/` - extracted and cloned trees, per-step logs, completion markers
//! - `patches/` - unified diffs applied after extraction
//!
//! # Steps
//!
//! Every unit of work is a named step run through one wrapper that prints
//! `<step> <dependency>: OK | SKIP | ERROR`, captures output into
//! `cmd_<step>_<dependency>.log`, and, for markable steps, writes a
//! `.<step>_ok` marker in the dependency's source tree so a rerun skips it.
//!
//! A release archive runs `download`, `extract`, `patch`; a git checkout runs
//! `clone`, `update`. Every dependency then runs `configure`, `compile`,
//! `install`.
//!
//! # Example
//!
//! ```no_run
//! use kiwix_builder::{BuildContext, BuildOptions, Layout, Pipeline, registry};
//!
//! let ctx = BuildContext::new(BuildOptions::new("/opt/kiwix"), Layout::rooted_at("."));
//! let pipeline = Pipeline::new(registry::dependencies(), ctx)?;
//! pipeline.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod build;
pub mod core;
pub mod dependency;
pub mod fetch;
pub mod helpers;
pub mod pipeline;
pub mod registry;

pub use crate::core::error::{PipelineError, StepError};
pub use crate::core::options::{BuildContext, BuildOptions, Layout, Toolchain};
pub use dependency::Dependency;
pub use pipeline::Pipeline;
