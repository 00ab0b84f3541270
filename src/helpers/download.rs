//! HTTP download into the archive directory.

use std::io::{Read, Write};
use std::path::Path;

use crate::core::error::StepError;
use crate::core::output;

/// Download `url` to `dest`.
///
/// Bytes are streamed into a temporary file beside `dest` and only moved into
/// place once the transfer completes. Returns the number of bytes written.
pub fn download(url: &str, dest: &Path) -> Result<u64, StepError> {
    let dir = dest.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;

    let filename = dest
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());

    log::debug!("downloading {} to {}", url, dest.display());
    let pb = output::download_progress(&format!("downloading {}", filename));

    let response = ureq::get(url).call().map_err(|e| {
        pb.finish_and_clear();
        StepError::Download {
            url: url.to_string(),
            reason: e.to_string(),
        }
    })?;

    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        output::upgrade_to_bytes(&pb, len);
    }

    let mut part = tempfile::NamedTempFile::new_in(dir)?;
    let mut reader = response.into_reader();
    let mut buffer = [0u8; 8192];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| {
            pb.finish_and_clear();
            StepError::Download {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;
        if bytes_read == 0 {
            break;
        }
        part.write_all(&buffer[..bytes_read])?;
        total_bytes += bytes_read as u64;
        pb.set_position(total_bytes);
    }

    pb.finish_and_clear();
    part.persist(dest).map_err(|e| StepError::Io(e.error))?;
    log::debug!("downloaded {} ({} bytes)", filename, total_bytes);
    Ok(total_bytes)
}
