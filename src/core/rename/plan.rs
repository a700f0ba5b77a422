use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::asset_index::AssetIndex;
use crate::defaults::WizardConfig;
use crate::descriptor::{self, ModuleDescriptor};
use crate::error::{Error, Result};
use crate::identity::PackageIdentity;
use crate::manifest::{ManifestDocument, PackageLocation};

// ============================================================================
// Types
// ============================================================================

/// The manifest's domain-name rewrite.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestChange {
    /// Project-relative path.
    pub path: String,
    pub old_domain_name: String,
    pub new_domain_name: String,
    /// Whether the new text differs from the text on disk.
    pub rewrites_text: bool,
    #[serde(skip)]
    pub new_text: String,
}

/// One descriptor's rewrite and rename.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorChange {
    pub path: String,
    pub new_path: String,
    pub old_module_name: String,
    pub new_module_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_root_namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_root_namespace: Option<String>,
    pub new_file_name: String,
    pub rewrites_text: bool,
    #[serde(skip)]
    pub new_text: String,
}

impl DescriptorChange {
    pub fn renames_file(&self) -> bool {
        self.path != self.new_path
    }

    pub fn has_changes(&self) -> bool {
        self.rewrites_text || self.renames_file()
    }
}

/// The package directory move.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryMove {
    pub from: String,
    pub to: String,
}

impl DirectoryMove {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// A warning about a potential collision or issue.
#[derive(Debug, Clone, Serialize)]
pub struct RenameWarning {
    /// Warning category.
    pub kind: String,
    /// Project-relative path the warning is about.
    pub file: String,
    /// Human-readable description.
    pub message: String,
}

/// Everything a rename will do, computed without touching disk.
///
/// Valid only for the snapshot it was computed from; `snapshot` is checked
/// again before anything is written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePlan {
    pub identity: PackageIdentity,
    pub location: PackageLocation,
    pub manifest: ManifestChange,
    pub descriptors: Vec<DescriptorChange>,
    pub directory: DirectoryMove,
    pub warnings: Vec<RenameWarning>,
    pub snapshot: String,
}

impl RenamePlan {
    /// Absolute manifest path once the directory has moved.
    pub fn new_manifest_path(&self) -> PathBuf {
        let file_name = self
            .location
            .manifest_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        self.location
            .project_root
            .join(&self.location.packages_dir)
            .join(&self.manifest.new_domain_name)
            .join(file_name)
    }

    /// Whether applying the plan would change anything.
    pub fn has_changes(&self) -> bool {
        !self.directory.is_noop()
            || self.manifest.rewrites_text
            || self.descriptors.iter().any(DescriptorChange::has_changes)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// The on-disk inputs a plan depends on.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    pub manifest_text: String,
    pub descriptors: Vec<ModuleDescriptor>,
}

impl Snapshot {
    pub(crate) fn read(index: &dyn AssetIndex, location: &PackageLocation) -> Result<Self> {
        let manifest_text = index.read_text(&manifest_rel_path(location))?;

        let descriptors = index
            .find_descriptors()?
            .into_iter()
            .filter(|path| {
                descriptor::belongs_to_package(path, &location.packages_dir, &location.folder_name)
            })
            .map(|path| index.load_descriptor(&path))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            manifest_text,
            descriptors,
        })
    }

    pub(crate) fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.manifest_text.as_bytes());
        for descriptor in &self.descriptors {
            hasher.update([0u8]);
            hasher.update(descriptor.path.as_bytes());
            hasher.update([0u8]);
            hasher.update(descriptor.text.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

pub(crate) fn manifest_rel_path(location: &PackageLocation) -> String {
    let file_name = location
        .manifest_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}{}", location.asset_prefix(), file_name)
}

// ============================================================================
// Planning
// ============================================================================

/// Compute the rename of the package whose manifest is at `manifest_path`.
///
/// Reads the manifest and the package's descriptors through `index` but
/// writes nothing.
pub fn plan_rename(
    index: &dyn AssetIndex,
    config: &WizardConfig,
    manifest_path: &Path,
    identity: &PackageIdentity,
) -> Result<RenamePlan> {
    identity.require_valid()?;

    let location = PackageLocation::resolve(index.project_root(), manifest_path, &config.packages_dir)?;
    let snapshot = Snapshot::read(index, &location)?;

    let document = ManifestDocument::from_text(&location.manifest_path, snapshot.manifest_text.clone());
    let new_domain_name = identity.domain_name(&config.domain_prefix);
    let new_manifest_text = document.rewrite(&new_domain_name)?;
    let manifest = ManifestChange {
        path: manifest_rel_path(&location),
        old_domain_name: document.domain_name()?,
        new_domain_name: new_domain_name.clone(),
        rewrites_text: new_manifest_text != snapshot.manifest_text,
        new_text: new_manifest_text,
    };

    let mut descriptors = Vec::with_capacity(snapshot.descriptors.len());
    for current in &snapshot.descriptors {
        let rewrite = current.rewrite(&identity.package_name)?;
        let parent = current
            .path
            .rsplit_once('/')
            .map(|(parent, _)| parent)
            .unwrap_or("");

        descriptors.push(DescriptorChange {
            path: current.path.clone(),
            new_path: format!("{}/{}", parent, rewrite.new_file_name),
            old_module_name: current.module_name.clone(),
            new_module_name: rewrite.new_module_name,
            old_root_namespace: current.root_namespace.clone(),
            new_root_namespace: rewrite.new_root_namespace,
            new_file_name: rewrite.new_file_name,
            rewrites_text: rewrite.new_text != current.text,
            new_text: rewrite.new_text,
        });
    }

    check_rename_targets(&descriptors)?;

    let directory = DirectoryMove {
        from: format!("{}/{}", location.packages_dir, location.folder_name),
        to: format!("{}/{}", location.packages_dir, new_domain_name),
    };

    let warnings = detect_collisions(index, &descriptors, &directory);
    for warning in &warnings {
        tracing::warn!(kind = %warning.kind, file = %warning.file, "{}", warning.message);
    }

    tracing::debug!(
        manifest = %manifest.path,
        descriptors = descriptors.len(),
        from = %directory.from,
        to = %directory.to,
        "planned package rename"
    );

    Ok(RenamePlan {
        identity: identity.clone(),
        location,
        manifest,
        descriptors,
        directory,
        warnings,
        snapshot: snapshot.fingerprint(),
    })
}

/// Two descriptors renamed to the same file would make apply fail halfway,
/// so this is an error rather than a warning.
fn check_rename_targets(descriptors: &[DescriptorChange]) -> Result<()> {
    let mut targets: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for change in descriptors {
        targets
            .entry(change.new_path.as_str())
            .or_default()
            .push(change.path.clone());
    }

    match targets.into_iter().find(|(_, sources)| sources.len() > 1) {
        Some((target, sources)) => Err(Error::plan_conflict(target, sources)),
        None => Ok(()),
    }
}

/// Preview-only checks; none of these stop the plan from being applied.
fn detect_collisions(
    index: &dyn AssetIndex,
    descriptors: &[DescriptorChange],
    directory: &DirectoryMove,
) -> Vec<RenameWarning> {
    let mut warnings = Vec::new();

    if descriptors.is_empty() {
        warnings.push(RenameWarning {
            kind: "no_descriptors".to_string(),
            file: directory.from.clone(),
            message: format!("No module descriptors found under '{}'", directory.from),
        });
    }

    for change in descriptors.iter().filter(|d| d.renames_file()) {
        if index.exists(&change.new_path) {
            warnings.push(RenameWarning {
                kind: "file_collision".to_string(),
                file: change.new_path.clone(),
                message: format!(
                    "Rename target '{}' already exists on disk (from '{}')",
                    change.new_path, change.path
                ),
            });
        }
    }

    if !directory.is_noop() && index.exists(&directory.to) {
        warnings.push(RenameWarning {
            kind: "directory_collision".to_string(),
            file: directory.to.clone(),
            message: format!(
                "Package directory '{}' already exists; the move will fail",
                directory.to
            ),
        });
    }

    warnings
}
