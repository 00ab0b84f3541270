//! Run configuration threaded through every strategy call.

use std::path::{Path, PathBuf};

/// Remote base location for release archives and auxiliary data files.
pub const DEFAULT_REMOTE: &str = "http://download.kiwix.org/dev/";

/// Architectures whose libraries go to `lib64`.
const ARCH_64: &[&str] = &["x86_64", "aarch64", "ppc64le", "s390x", "riscv64"];

/// Process-wide build options.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Shared install prefix (absolute)
    pub install_dir: PathBuf,
    /// Target architecture (e.g., "x86_64")
    pub target_arch: String,
    /// Prefer static libraries
    pub build_static: bool,
    /// Parallel make jobs
    pub jobs: usize,
}

impl BuildOptions {
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            target_arch: "x86_64".to_string(),
            build_static: false,
            jobs: 4,
        }
    }

    pub fn target_arch(mut self, arch: impl Into<String>) -> Self {
        self.target_arch = arch.into();
        self
    }

    pub fn build_static(mut self, build_static: bool) -> Self {
        self.build_static = build_static;
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn is_64bit(&self) -> bool {
        ARCH_64.contains(&self.target_arch.as_str())
    }

    /// Library directory name under the install prefix.
    pub fn libdir(&self) -> &'static str {
        if self.is_64bit() { "lib64" } else { "lib" }
    }
}

/// Filesystem roots shared by all dependencies.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Extracted and cloned trees, markers, most logs
    pub source_dir: PathBuf,
    /// Downloaded archives and download logs
    pub archive_dir: PathBuf,
    /// Unified diffs referenced by dependencies
    pub patches_dir: PathBuf,
    /// Base URL archives are fetched from
    pub remote: String,
}

impl Layout {
    /// Layout rooted at `base` (`base/SOURCE`, `base/ARCHIVE`, `base/patches`).
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            source_dir: base.join("SOURCE"),
            archive_dir: base.join("ARCHIVE"),
            patches_dir: base.join("patches"),
            remote: DEFAULT_REMOTE.to_string(),
        }
    }

    pub fn remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn patches_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.patches_dir = dir.into();
        self
    }

    /// URL of a file under the remote base.
    pub fn remote_url(&self, name: &str) -> String {
        if self.remote.ends_with('/') {
            format!("{}{}", self.remote, name)
        } else {
            format!("{}/{}", self.remote, name)
        }
    }

    /// Create the source and archive roots.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.source_dir)?;
        std::fs::create_dir_all(&self.archive_dir)
    }
}

/// External tool command names.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub make: String,
    pub cmake: String,
    pub meson: String,
    pub ninja: String,
    pub git: String,
    pub patch: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            make: "make".to_string(),
            cmake: "cmake".to_string(),
            meson: "meson.py".to_string(),
            ninja: "ninja-build".to_string(),
            git: "git".to_string(),
            patch: "patch".to_string(),
        }
    }
}

/// Everything a step needs besides the dependency itself.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub options: BuildOptions,
    pub layout: Layout,
    pub tools: Toolchain,
}

impl BuildContext {
    pub fn new(options: BuildOptions, layout: Layout) -> Self {
        Self {
            options,
            layout,
            tools: Toolchain::default(),
        }
    }

    pub fn tools(mut self, tools: Toolchain) -> Self {
        self.tools = tools;
        self
    }
}
