use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::asset_index::AssetIndex;
use crate::defaults::WizardConfig;
use crate::error::Result;
use crate::identity::PackageIdentity;

use super::apply::{apply_plan, ApplyReport};
use super::plan::{plan_rename, RenamePlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Previewing,
    Applying,
}

/// Caller-facing wrapper that tracks which manifest is current.
///
/// Previews may be repeated freely. An apply consumes its plan and, on
/// success, points the session at the moved manifest. Both calls leave the
/// session `Idle` again, whatever their outcome.
pub struct RenameSession<I: AssetIndex> {
    index: I,
    config: WizardConfig,
    manifest_path: PathBuf,
    state: SessionState,
}

impl<I: AssetIndex> RenameSession<I> {
    pub fn new(index: I, config: WizardConfig, manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            config,
            manifest_path: manifest_path.into(),
            state: SessionState::Idle,
        }
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn preview(&mut self, identity: &PackageIdentity) -> Result<RenamePlan> {
        self.state = SessionState::Previewing;
        let result = plan_rename(&self.index, &self.config, &self.manifest_path, identity);
        self.state = SessionState::Idle;
        result
    }

    pub fn apply(&mut self, plan: RenamePlan) -> Result<ApplyReport> {
        self.state = SessionState::Applying;
        let result = apply_plan(&self.index, &plan);
        self.state = SessionState::Idle;

        let report = result?;
        self.manifest_path = report.manifest_path.clone();
        Ok(report)
    }
}
