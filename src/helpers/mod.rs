//! Pure helpers used by the fetch and build strategies.
//!
//! - **hash**: SHA-256 of cached archives
//! - **download**: HTTP download into the archive directory
//! - **extract**: native tar extraction
//! - **template**: run-time flag templates

pub mod download;
pub mod extract;
pub mod hash;
pub mod template;
