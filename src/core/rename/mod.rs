//! Package rename: compute the plan, then apply it in a fixed order.
//!
//! Planning reads the manifest and the package's descriptors and produces
//! every new text, file name and directory name without writing. Applying
//! re-checks the snapshot, rewrites and renames each descriptor, rewrites the
//! manifest, and moves the package directory last.

mod apply;
mod plan;
mod session;

pub use apply::{apply_plan, AppliedStep, ApplyReport, StepKind, StepStatus};
pub use plan::{
    plan_rename, DescriptorChange, DirectoryMove, ManifestChange, RenamePlan, RenameWarning,
};
pub use session::{RenameSession, SessionState};
