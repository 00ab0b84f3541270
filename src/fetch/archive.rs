//! Release archive fetch: download, extract, patch.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::FetchStrategy;
use crate::core::command;
use crate::core::error::{PipelineError, StepError};
use crate::core::options::{BuildContext, Layout};
use crate::core::step::StepLog;
use crate::dependency::{Dependency, ExtraStep, LogLocation, StepContext};
use crate::helpers::{download, extract, hash};

/// Fetch `name` from the remote base into the archive directory, unless a
/// cached copy already hashes to `sha256`.
fn fetch_verified(
    layout: &Layout,
    name: &str,
    sha256: &str,
    log: &mut StepLog,
) -> Result<(), StepError> {
    let path = layout.archive_dir.join(name);
    if path.exists() {
        if hash::matches_sha256(&path, sha256)? {
            log::debug!("{} matches declared sha256", path.display());
            return Err(StepError::Skip);
        }
        log::debug!("{} is stale, removing", path.display());
        std::fs::remove_file(&path)?;
    }

    let url = layout.remote_url(name);
    writeln!(log, "download {} to {}", url, path.display())?;
    let bytes = download::download(&url, &path)?;
    writeln!(log, "downloaded {} bytes", bytes)?;
    Ok(())
}

/// Source shipped as a release tarball on the remote base location.
#[derive(Debug, Clone)]
pub struct ReleaseArchive {
    pub archive_name: String,
    pub sha256: String,
    /// Top directory of the archive when it differs from the source dir
    pub top_dir: Option<PathBuf>,
    /// Subdirectory of the source root to unpack into, for archives
    /// without a top directory
    pub extract_into: Option<PathBuf>,
}

impl ReleaseArchive {
    pub fn new(archive_name: impl Into<String>, sha256: impl Into<String>) -> Self {
        Self {
            archive_name: archive_name.into(),
            sha256: sha256.into(),
            top_dir: None,
            extract_into: None,
        }
    }

    pub fn top_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.top_dir = Some(dir.into());
        self
    }

    pub fn extract_into(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extract_into = Some(dir.into());
        self
    }

    pub fn archive_path(&self, layout: &Layout) -> PathBuf {
        layout.archive_dir.join(&self.archive_name)
    }

    /// Directory removed before unpacking.
    fn wipe_path(&self, sc: &StepContext<'_>) -> PathBuf {
        match self.top_dir {
            Some(ref top) => sc.layout().source_dir.join(top),
            None => sc.source_path(),
        }
    }

    fn extract_dest(&self, layout: &Layout) -> PathBuf {
        match self.extract_into {
            Some(ref dir) => layout.source_dir.join(dir),
            None => layout.source_dir.clone(),
        }
    }

    pub fn download(&self, sc: &StepContext<'_>, log: &mut StepLog) -> Result<(), StepError> {
        fetch_verified(sc.layout(), &self.archive_name, &self.sha256, log)
    }

    pub fn extract(&self, sc: &StepContext<'_>, log: &mut StepLog) -> Result<(), StepError> {
        let wipe = self.wipe_path(sc);
        if wipe.exists() {
            writeln!(log, "remove {}", wipe.display())?;
            std::fs::remove_dir_all(&wipe)?;
        }

        let archive = self.archive_path(sc.layout());
        let dest = self.extract_dest(sc.layout());
        writeln!(log, "extract {} into {}", archive.display(), dest.display())?;
        extract::extract(&archive, &dest)
    }

    /// Pipe the declared unified diff into the patch tool, run from the
    /// source path with `-p1`.
    pub fn patch(sc: &StepContext<'_>, log: &mut StepLog) -> Result<(), StepError> {
        let Some(ref patch) = sc.dep.patch else {
            return Err(StepError::Skip);
        };

        let patch_path = sc.layout().patches_dir.join(patch);
        if !patch_path.exists() {
            return Err(StepError::MissingPatch(patch_path));
        }

        let input = File::open(&patch_path)?;
        let cmd = format!("{} -p1", sc.tools().patch);
        command::execute(&cmd, &sc.source_path(), log, None, Some(input))
    }
}

impl FetchStrategy for ReleaseArchive {
    fn describe(&self) -> String {
        self.archive_name.clone()
    }

    fn prepare(&self, dep: &Dependency, ctx: &BuildContext) -> Result<(), PipelineError> {
        dep.run_step(ctx, "download", LogLocation::ArchiveDir, false, |sc, log| {
            self.download(sc, log)
        })?;
        dep.run_step(ctx, "extract", LogLocation::SourceRoot, true, |sc, log| {
            self.extract(sc, log)
        })?;
        dep.run_step(ctx, "patch", LogLocation::SourcePath, true, Self::patch)?;
        Ok(())
    }
}

/// A data file fetched beside an archive and copied into the extracted tree.
#[derive(Debug, Clone)]
pub struct AuxiliaryFile {
    pub name: String,
    pub sha256: String,
    /// Destination directory, relative to the source path
    pub dest_dir: PathBuf,
}

impl AuxiliaryFile {
    pub fn new(
        name: impl Into<String>,
        sha256: impl Into<String>,
        dest_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            sha256: sha256.into(),
            dest_dir: dest_dir.into(),
        }
    }

    /// `download_data`: fetch into the archive directory, skipping on a hash match.
    pub fn download_step(&self) -> ExtraStep {
        let aux = self.clone();
        ExtraStep::new(
            "download_data",
            LogLocation::ArchiveDir,
            true,
            Box::new(move |sc, log| fetch_verified(sc.layout(), &aux.name, &aux.sha256, log)),
        )
    }

    /// `copy_data`: copy the fetched file into the source tree.
    pub fn copy_step(&self) -> ExtraStep {
        let aux = self.clone();
        ExtraStep::new(
            "copy_data",
            LogLocation::SourcePath,
            true,
            Box::new(move |sc, log| aux.copy(sc.layout(), &sc.source_path(), log)),
        )
    }

    fn copy(&self, layout: &Layout, source_path: &Path, log: &mut StepLog) -> Result<(), StepError> {
        let from = layout.archive_dir.join(&self.name);
        let dest_dir = source_path.join(&self.dest_dir);
        std::fs::create_dir_all(&dest_dir)?;
        let to = dest_dir.join(&self.name);
        writeln!(log, "copy {} to {}", from.display(), to.display())?;
        std::fs::copy(&from, &to)?;
        Ok(())
    }
}
