//! Shared fixtures: scratch layouts, fake tools, and small source tarballs.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use kiwix_builder::helpers::hash::sha256_file;
use kiwix_builder::{BuildContext, BuildOptions, Layout, Toolchain};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Configure script recording its arguments and the flags it was given.
pub const RECORDING_CONFIGURE: &str = "#!/bin/sh\n\
echo \"args=$*\" > configured\n\
echo \"CFLAGS=$CFLAGS\" >> configured\n";

pub struct Workspace {
    pub dir: TempDir,
    pub ctx: BuildContext,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let layout = Layout::rooted_at(dir.path());
        layout.ensure_dirs().unwrap();
        let ctx = BuildContext::new(BuildOptions::new(dir.path().join("install")), layout).tools(
            Toolchain {
                make: "true".to_string(),
                ..Toolchain::default()
            },
        );
        Self { dir, ctx }
    }

    pub fn source(&self, rel: &str) -> PathBuf {
        self.ctx.layout.source_dir.join(rel)
    }

    pub fn archive(&self, name: &str) -> PathBuf {
        self.ctx.layout.archive_dir.join(name)
    }
}

/// Write a `.tar.gz` whose entries all live under `top`, returning its sha256.
///
/// Each file is `(relative path, contents, executable)`.
pub fn write_source_tarball(path: &Path, top: &str, files: &[(&str, &str, bool)]) -> String {
    let file = std::fs::File::create(path).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, contents, executable) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(if *executable { 0o755 } else { 0o644 });
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{}/{}", top, name), contents.as_bytes())
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap();
    sha256_file(path).unwrap()
}

/// Relative path -> contents for every file under `root`.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, std::fs::read(e.path()).unwrap())
        })
        .collect()
}
