//! Run lock
//!
//! Extraction wipes trees and installs overwrite the shared prefix, so only
//! one pipeline may own a source root at a time.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = ".kiwix-builder.lock";

/// How old a lock file can be before it's considered stale (24 hours)
const STALE_LOCK_AGE_SECS: u64 = 86400;

fn is_stale_lock(lock_path: &Path) -> bool {
    if let Ok(metadata) = std::fs::metadata(lock_path)
        && let Ok(modified) = metadata.modified()
        && let Ok(age) = std::time::SystemTime::now().duration_since(modified)
    {
        return age.as_secs() > STALE_LOCK_AGE_SECS;
    }
    false
}

/// Acquire the exclusive lock for `source_dir`.
/// Returns a guard that releases the lock when dropped.
pub fn acquire_run_lock(source_dir: &Path) -> Result<RunLock> {
    let lock_path = source_dir.join(LOCK_FILE);

    if lock_path.exists() && is_stale_lock(&lock_path) {
        log::warn!("removing stale lock {}", lock_path.display());
        let _ = std::fs::remove_file(&lock_path);
    }

    let lock_file = File::create(&lock_path)
        .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

    if lock_file.try_lock_exclusive().is_err() {
        return Err(anyhow::anyhow!(
            "'{}' is in use by another build. If this is incorrect, delete '{}'",
            source_dir.display(),
            lock_path.display()
        ));
    }

    Ok(RunLock {
        _file: lock_file,
        path: lock_path,
    })
}

/// RAII guard - releases the lock and deletes the lock file when dropped
#[derive(Debug)]
pub struct RunLock {
    _file: File,
    path: PathBuf,
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
