//! Fetch strategies: how a dependency's source tree is obtained.
//!
//! - [`ReleaseArchive`]: download, extract, patch
//! - [`SourceControl`]: clone, update

mod archive;
mod git;

pub use archive::{AuxiliaryFile, ReleaseArchive};
pub use git::SourceControl;

use crate::core::options::BuildContext;
use crate::core::error::PipelineError;
use crate::dependency::Dependency;

/// Produces a dependency's source tree under the source root.
pub trait FetchStrategy {
    /// Short human-readable identity (archive name or remote URL).
    fn describe(&self) -> String;

    /// Run the fetch steps in their fixed order.
    fn prepare(&self, dep: &Dependency, ctx: &BuildContext) -> Result<(), PipelineError>;
}
