//! Native archive extraction (no external tools needed)
//!
//! The compression is picked from the archive file name. Entries that would
//! land outside the destination, directly or through a link, are rejected.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

use crate::core::error::StepError;

/// Compression wrapped around a tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    TarXz,
    TarBz2,
    TarZst,
    Tar,
}

impl ArchiveFormat {
    /// Detect the format from a file name.
    pub fn detect(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if lower.ends_with(".tar.xz") || lower.ends_with(".txz") {
            Some(Self::TarXz)
        } else if lower.ends_with(".tar.bz2") || lower.ends_with(".tbz2") {
            Some(Self::TarBz2)
        } else if lower.ends_with(".tar.zst") || lower.ends_with(".tzst") {
            Some(Self::TarZst)
        } else if lower.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

fn extract_error(archive: &Path, reason: impl std::fmt::Display) -> StepError {
    StepError::Extract {
        archive: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    // No filesystem access: link targets are validated without following symlinks.
    let mut out = PathBuf::new();
    let mut has_root = false;

    for c in path.components() {
        match c {
            Component::Prefix(p) => {
                out.clear();
                out.push(p.as_os_str());
                has_root = true;
            }
            Component::RootDir => {
                out.push(Component::RootDir.as_os_str());
                has_root = true;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = out
                    .components()
                    .next_back()
                    .is_some_and(|last| matches!(last, Component::Normal(_)));
                if popped {
                    out.pop();
                } else if !has_root {
                    out.push("..");
                }
            }
            Component::Normal(seg) => out.push(seg),
        }
    }

    out
}

fn ensure_no_symlink_components(dest: &Path, full_path: &Path) -> Result<(), String> {
    let rel = full_path
        .strip_prefix(dest)
        .map_err(|_| format!("path outside destination: {}", full_path.display()))?;

    let mut cur = dest.to_path_buf();
    for comp in rel.components() {
        cur.push(comp);
        if let Ok(md) = std::fs::symlink_metadata(&cur)
            && md.file_type().is_symlink()
        {
            return Err(format!("symlink in path component: {}", cur.display()));
        }
    }

    Ok(())
}

fn ensure_link_target_within_dest(
    dest: &Path,
    link_parent: &Path,
    link_name: &Path,
) -> Result<(), String> {
    if link_name.is_absolute()
        || link_name
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return Err(format!(
            "unsafe link target (absolute): {}",
            link_name.display()
        ));
    }

    let candidate = normalize_lexical(&link_parent.join(link_name));
    let norm_dest = normalize_lexical(dest);
    if candidate.strip_prefix(&norm_dest).is_err() {
        return Err(format!(
            "unsafe link target (escapes dest): {} -> {}",
            link_parent.display(),
            link_name.display()
        ));
    }

    Ok(())
}

fn unpack_tar<R: Read>(reader: R, dest: &Path) -> Result<(), String> {
    let mut archive = tar::Archive::new(reader);

    for entry in archive.entries().map_err(|e| format!("tar read error: {}", e))? {
        let mut entry = entry.map_err(|e| format!("tar entry error: {}", e))?;

        let path = entry
            .path()
            .map_err(|e| format!("tar path error: {}", e))?
            .into_owned();

        if path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
            return Err(format!("unsafe path: {}", path.display()));
        }

        if path.as_os_str().is_empty() || path == Path::new(".") {
            continue;
        }

        let full_path = dest.join(&path);
        ensure_no_symlink_components(dest, &full_path)?;

        let entry_type = entry.header().entry_type();
        if entry_type == tar::EntryType::Symlink || entry_type == tar::EntryType::Link {
            let link_name = entry
                .link_name()
                .map_err(|e| format!("tar link_name error: {}", e))?
                .ok_or_else(|| format!("link without target: {}", path.display()))?;
            let link_parent = full_path.parent().unwrap_or(dest);
            ensure_link_target_within_dest(dest, link_parent, &link_name)?;
        }

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create directory {}: {}", parent.display(), e))?;
        }

        entry
            .unpack(&full_path)
            .map_err(|e| format!("unpack error for {}: {}", path.display(), e))?;
    }

    Ok(())
}

/// Unpack `archive_path` into `dest`, creating `dest` if needed.
pub fn extract(archive_path: &Path, dest: &Path) -> Result<(), StepError> {
    let filename = archive_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let format = ArchiveFormat::detect(&filename)
        .ok_or_else(|| StepError::UnsupportedFormat(filename.clone()))?;

    std::fs::create_dir_all(dest)?;
    let reader = BufReader::new(File::open(archive_path)?);

    log::debug!("extracting {} into {}", archive_path.display(), dest.display());
    let result = match format {
        ArchiveFormat::TarGz => unpack_tar(flate2::read::GzDecoder::new(reader), dest),
        ArchiveFormat::TarXz => unpack_tar(xz2::read::XzDecoder::new(reader), dest),
        ArchiveFormat::TarBz2 => unpack_tar(bzip2::read::BzDecoder::new(reader), dest),
        ArchiveFormat::TarZst => {
            let decoder = zstd::stream::read::Decoder::new(reader)
                .map_err(|e| extract_error(archive_path, e))?;
            unpack_tar(decoder, dest)
        }
        ArchiveFormat::Tar => unpack_tar(reader, dest),
    };

    result.map_err(|reason| extract_error(archive_path, reason))
}
