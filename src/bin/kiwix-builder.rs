//! kiwix-builder CLI
//!
//! Usage:
//!   kiwix-builder <install_dir>                  Prepare and build everything
//!   kiwix-builder <install_dir> --only icu       Limit the run to named dependencies
//!   kiwix-builder <install_dir> --list           Show the dependency list and exit

use anyhow::{Context, Result};
use clap::Parser;
use kiwix_builder::core::lock::acquire_run_lock;
use kiwix_builder::core::options::DEFAULT_REMOTE;
use kiwix_builder::core::output;
use kiwix_builder::{BuildContext, BuildOptions, Layout, Pipeline, Toolchain, registry};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "kiwix-builder")]
#[command(about = "Build the third-party dependencies of the Kiwix tools into one prefix")]
#[command(version)]
struct Cli {
    /// Install prefix shared by every dependency
    install_dir: PathBuf,

    /// Target architecture; selects lib64 vs lib
    #[arg(long, default_value = "x86_64")]
    target_arch: String,

    /// Build static libraries
    #[arg(long)]
    build_static: bool,

    /// Parallel make jobs
    #[arg(short, long, default_value_t = 4)]
    jobs: usize,

    /// Extracted/cloned trees, logs and markers
    #[arg(long, env = "KIWIX_SOURCE_DIR", default_value = "SOURCE")]
    source_dir: PathBuf,

    /// Downloaded archives
    #[arg(long, env = "KIWIX_ARCHIVE_DIR", default_value = "ARCHIVE")]
    archive_dir: PathBuf,

    /// Patch files
    #[arg(long, env = "KIWIX_PATCHES_DIR", default_value = "patches")]
    patches_dir: PathBuf,

    /// Base URL for release archives
    #[arg(long, env = "KIWIX_REMOTE", default_value = DEFAULT_REMOTE)]
    remote: String,

    #[arg(long, env = "KIWIX_MAKE", default_value = "make")]
    make: String,

    #[arg(long, env = "KIWIX_CMAKE", default_value = "cmake")]
    cmake: String,

    #[arg(long, env = "KIWIX_MESON", default_value = "meson.py")]
    meson: String,

    #[arg(long, env = "KIWIX_NINJA", default_value = "ninja-build")]
    ninja: String,

    #[arg(long, env = "KIWIX_GIT", default_value = "git")]
    git: String,

    #[arg(long = "patch-tool", env = "KIWIX_PATCH", default_value = "patch")]
    patch_tool: String,

    /// Only process these dependencies (repeatable, declared order is kept)
    #[arg(long, value_name = "NAME")]
    only: Vec<String>,

    /// List dependencies and exit
    #[arg(long)]
    list: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn context(&self) -> Result<BuildContext> {
        let install_dir = std::path::absolute(&self.install_dir).with_context(|| {
            format!("Invalid install directory: {}", self.install_dir.display())
        })?;
        let options = BuildOptions::new(install_dir)
            .target_arch(&self.target_arch)
            .build_static(self.build_static)
            .jobs(self.jobs);
        let layout = Layout {
            source_dir: std::path::absolute(&self.source_dir)?,
            archive_dir: std::path::absolute(&self.archive_dir)?,
            patches_dir: std::path::absolute(&self.patches_dir)?,
            remote: self.remote.clone(),
        };
        let tools = Toolchain {
            make: self.make.clone(),
            cmake: self.cmake.clone(),
            meson: self.meson.clone(),
            ninja: self.ninja.clone(),
            git: self.git.clone(),
            patch: self.patch_tool.clone(),
        };
        Ok(BuildContext::new(options, layout).tools(tools))
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let ctx = cli.context()?;
    let pipeline = Pipeline::new(registry::dependencies(), ctx)?.only(&cli.only)?;

    if cli.list {
        for dep in pipeline.dependencies() {
            println!(
                "{:<12} {:<8} {}",
                dep.name,
                dep.build_strategy().describe(),
                dep.fetch_strategy().describe()
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let _lock = acquire_run_lock(&pipeline.context().layout.source_dir)?;
    let ctx = pipeline.context();
    output::info(&format!("installing into {}", ctx.options.install_dir.display()));
    output::detail(&format!("sources: {}", ctx.layout.source_dir.display()));
    output::detail(&format!("archives: {}", ctx.layout.archive_dir.display()));

    match pipeline.run() {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if e.is_halt() => {
            log::debug!("{}", e);
            output::stop_notice();
            Ok(ExitCode::from(1))
        }
        Err(e) => Err(e.into()),
    }
}
