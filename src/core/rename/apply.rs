use serde::Serialize;
use std::path::PathBuf;

use crate::asset_index::AssetIndex;
use crate::error::{ApplyStepFailedDetails, Error, Result};

use super::plan::{RenamePlan, Snapshot};

/// The mutation kinds, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    WriteDescriptor,
    RenameDescriptor,
    WriteManifest,
    MoveDirectory,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::WriteDescriptor => "write_descriptor",
            StepKind::RenameDescriptor => "rename_descriptor",
            StepKind::WriteManifest => "write_manifest",
            StepKind::MoveDirectory => "move_directory",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Done,
    /// The effect was already in place.
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppliedStep {
    pub step: StepKind,
    pub path: String,
    pub status: StepStatus,
}

impl AppliedStep {
    fn label(&self) -> String {
        format!("{} {}", self.step.as_str(), self.path)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub steps: Vec<AppliedStep>,
    pub domain_name: String,
    pub manifest_path: PathBuf,
}

/// Runs steps in order and remembers what has already happened, so a
/// failure can say exactly how far the rename got.
struct StepRunner {
    steps: Vec<AppliedStep>,
}

impl StepRunner {
    fn run(
        &mut self,
        step: StepKind,
        path: &str,
        already_done: bool,
        action: impl FnOnce() -> Result<()>,
    ) -> Result<()> {
        let status = if already_done {
            StepStatus::Skipped
        } else {
            action().map_err(|err| self.failure(step, path, &err))?;
            StepStatus::Done
        };

        tracing::info!(step = step.as_str(), path = %path, status = ?status, "rename step");
        self.steps.push(AppliedStep {
            step,
            path: path.to_string(),
            status,
        });
        Ok(())
    }

    fn failure(&self, step: StepKind, path: &str, err: &Error) -> Error {
        let error = match err.details.get("error").and_then(|e| e.as_str()) {
            Some(detail) => format!("{}: {}", err.message, detail),
            None => err.message.clone(),
        };

        tracing::error!(step = step.as_str(), path = %path, error = %error, "rename step failed");
        Error::apply_step_failed(ApplyStepFailedDetails {
            step: step.as_str().to_string(),
            path: path.to_string(),
            error,
            completed_steps: self
                .steps
                .iter()
                .filter(|s| s.status == StepStatus::Done)
                .map(AppliedStep::label)
                .collect(),
        })
    }
}

/// Apply a plan to disk.
///
/// The snapshot is re-read first and a mismatch aborts before any write.
/// Steps then run in a fixed order: each descriptor is rewritten and renamed,
/// the manifest is rewritten, and the package directory is moved last. There
/// is no rollback; a failed step leaves earlier steps applied and the error
/// lists them.
pub fn apply_plan(index: &dyn AssetIndex, plan: &RenamePlan) -> Result<ApplyReport> {
    plan.identity.require_valid()?;

    let current = Snapshot::read(index, &plan.location)?;
    let found = current.fingerprint();
    if found != plan.snapshot {
        return Err(Error::plan_stale(plan.snapshot.clone(), found));
    }

    let mut runner = StepRunner { steps: Vec::new() };

    for change in &plan.descriptors {
        let unchanged = current
            .descriptors
            .iter()
            .any(|d| d.path == change.path && d.text == change.new_text);
        runner.run(StepKind::WriteDescriptor, &change.path, unchanged, || {
            index.write_text(&change.path, &change.new_text)
        })?;

        runner.run(
            StepKind::RenameDescriptor,
            &change.path,
            !change.renames_file(),
            || index.rename_asset(&change.path, &change.new_file_name).map(|_| ()),
        )?;
    }

    runner.run(
        StepKind::WriteManifest,
        &plan.manifest.path,
        current.manifest_text == plan.manifest.new_text,
        || index.write_text(&plan.manifest.path, &plan.manifest.new_text),
    )?;

    runner.run(
        StepKind::MoveDirectory,
        &plan.directory.from,
        plan.directory.is_noop(),
        || index.move_asset(&plan.directory.from, &plan.directory.to),
    )?;

    Ok(ApplyReport {
        steps: runner.steps,
        domain_name: plan.manifest.new_domain_name.clone(),
        manifest_path: plan.new_manifest_path(),
    })
}
