//! Package manifest: the file carrying the package's domain name.
//!
//! The manifest is treated as an opaque JSON document with exactly one field
//! of interest, the top-level `"name"`. Rewrites replace that value's bytes
//! and nothing else.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::io;
use crate::utils::parser::{self, StringField};

pub const DOMAIN_NAME_KEY: &str = "name";

/// Raw manifest text plus where it was read from.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    pub path: PathBuf,
    pub text: String,
}

impl ManifestDocument {
    /// Read the manifest fresh from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::manifest_not_found(path.display().to_string()));
        }

        let text = io::read_file(path, "read manifest")?;
        Ok(Self::from_text(path, text))
    }

    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// The package root: the directory containing the manifest.
    pub fn package_root(&self) -> Result<&Path> {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                Error::manifest_malformed(
                    self.path.display().to_string(),
                    "manifest path has no parent directory",
                )
            })
    }

    /// Base name of the package root directory.
    pub fn folder_name(&self) -> Result<String> {
        let root = self.package_root()?;
        root.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                Error::manifest_malformed(
                    self.path.display().to_string(),
                    "package directory has no name",
                )
            })
    }

    fn domain_field(&self) -> Result<StringField> {
        let path = self.path.display().to_string();
        parser::find_top_level_string(&self.text, DOMAIN_NAME_KEY)
            .map_err(|problem| Error::manifest_malformed(path.clone(), problem.to_string()))?
            .ok_or_else(|| {
                Error::manifest_malformed(path, format!("missing \"{}\" field", DOMAIN_NAME_KEY))
            })
    }

    /// The current domain name, e.g. `com.company.package`.
    pub fn domain_name(&self) -> Result<String> {
        Ok(self.domain_field()?.value)
    }

    /// Manifest text with the domain name replaced; all other bytes are kept.
    pub fn rewrite(&self, new_domain_name: &str) -> Result<String> {
        let field = self.domain_field()?;
        Ok(parser::splice(&self.text, &field.span, new_domain_name))
    }
}

/// Where a package sits inside a project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageLocation {
    pub project_root: PathBuf,
    pub packages_dir: String,
    pub folder_name: String,
    pub package_root: PathBuf,
    pub manifest_path: PathBuf,
}

impl PackageLocation {
    /// Resolve and check the manifest's place in the project layout.
    ///
    /// The manifest must live at `<project>/<packages_dir>/<folder>/<file>`,
    /// and no sibling folder may share the package folder's name up to case.
    pub fn resolve(project_root: &Path, manifest_path: &Path, packages_dir: &str) -> Result<Self> {
        if !manifest_path.is_file() {
            return Err(Error::manifest_not_found(manifest_path.display().to_string()));
        }

        let project_root = canonicalize(project_root, "resolve project root")?;
        let manifest_path = canonicalize(manifest_path, "resolve manifest path")?;

        let outside = || {
            Error::manifest_outside_packages_root(manifest_path.display().to_string(), packages_dir)
        };

        let relative = manifest_path.strip_prefix(&project_root).map_err(|_| outside())?;
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();

        let folder_name = match segments.as_slice() {
            [root, folder, _file] if root == packages_dir => folder.clone(),
            _ => return Err(outside()),
        };

        let packages_path = project_root.join(packages_dir);
        check_folder_collisions(&packages_path, &folder_name)?;

        Ok(Self {
            package_root: packages_path.join(&folder_name),
            packages_dir: packages_dir.to_string(),
            folder_name,
            manifest_path,
            project_root,
        })
    }

    /// Project-relative, slash-delimited prefix shared by every asset in this package.
    pub fn asset_prefix(&self) -> String {
        format!("{}/{}/", self.packages_dir, self.folder_name)
    }
}

fn canonicalize(path: &Path, operation: &str) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("{} {}", operation, path.display())),
        )
    })
}

fn check_folder_collisions(packages_path: &Path, folder_name: &str) -> Result<()> {
    let entries = fs::read_dir(packages_path).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("list {}", packages_path.display())),
        )
    })?;

    let wanted = folder_name.to_lowercase();
    let mut conflicting: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name != folder_name && name.to_lowercase() == wanted)
        .collect();

    if conflicting.is_empty() {
        return Ok(());
    }

    conflicting.sort();
    Err(Error::package_folder_ambiguous(folder_name, conflicting))
}
