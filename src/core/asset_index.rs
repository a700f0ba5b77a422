//! Asset index: the engine's only view of the project on disk.
//!
//! Paths crossing this boundary are project-relative and slash-delimited.
//! Results are never cached; every call reads the file system again.

use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults::WizardConfig;
use crate::descriptor::ModuleDescriptor;
use crate::error::{Error, Result};
use crate::utils::io;

pub const META_EXTENSION: &str = "meta";

pub trait AssetIndex {
    fn project_root(&self) -> &Path;

    /// Every descriptor file in the project, sorted.
    fn find_descriptors(&self) -> Result<Vec<String>>;

    fn read_text(&self, path: &str) -> Result<String>;

    fn write_text(&self, path: &str, text: &str) -> Result<()>;

    /// Rename the asset at `path` in place; returns its new project-relative path.
    fn rename_asset(&self, path: &str, new_file_name: &str) -> Result<String>;

    /// Move a file or directory to a new project-relative path.
    fn move_asset(&self, from: &str, to: &str) -> Result<()>;

    fn exists(&self, path: &str) -> bool;

    fn load_descriptor(&self, path: &str) -> Result<ModuleDescriptor> {
        let text = self.read_text(path)?;
        ModuleDescriptor::parse(path, text)
    }
}

/// Asset index over the local file system.
#[derive(Debug, Clone)]
pub struct FsAssetIndex {
    root: PathBuf,
    descriptor_extension: String,
    skip_dirs: Vec<String>,
}

impl FsAssetIndex {
    pub fn new(project_root: impl Into<PathBuf>, config: &WizardConfig) -> Self {
        Self {
            root: project_root.into(),
            descriptor_extension: config.descriptor_extension.clone(),
            skip_dirs: config.skip_dirs.clone(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    fn walk(&self, dir: &Path, found: &mut Vec<String>) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("list {}", dir.display())))
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            if path.is_dir() {
                if self.skip_dirs.iter().any(|skip| skip == &name) {
                    continue;
                }
                self.walk(&path, found)?;
            } else if path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy() == self.descriptor_extension)
            {
                if let Ok(relative) = path.strip_prefix(&self.root) {
                    found.push(io::to_slash_path(relative));
                }
            }
        }

        Ok(())
    }
}

fn sidecar(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(META_EXTENSION);
    PathBuf::from(name)
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

impl AssetIndex for FsAssetIndex {
    fn project_root(&self) -> &Path {
        &self.root
    }

    fn find_descriptors(&self) -> Result<Vec<String>> {
        let mut found = Vec::new();
        self.walk(&self.root, &mut found)?;
        found.sort();

        tracing::debug!(
            count = found.len(),
            extension = %self.descriptor_extension,
            "discovered descriptor files"
        );
        Ok(found)
    }

    fn read_text(&self, path: &str) -> Result<String> {
        io::read_file(&self.resolve(path), "read")
    }

    fn write_text(&self, path: &str, text: &str) -> Result<()> {
        io::write_file(&self.resolve(path), text, "write")
    }

    fn rename_asset(&self, path: &str, new_file_name: &str) -> Result<String> {
        if new_file_name.is_empty() || new_file_name.contains(['/', '\\']) {
            return Err(Error::validation_invalid_argument(
                "new_file_name",
                "Asset names cannot be empty or contain path separators",
                Some(new_file_name.to_string()),
                None,
            ));
        }

        let parent = parent_of(path);
        let target = if parent.is_empty() {
            new_file_name.to_string()
        } else {
            format!("{}/{}", parent, new_file_name)
        };

        self.move_asset(path, &target)?;
        Ok(target)
    }

    fn move_asset(&self, from: &str, to: &str) -> Result<()> {
        let source = self.resolve(from);
        let target = self.resolve(to);
        io::rename_no_clobber(&source, &target, "move asset")?;

        let source_meta = sidecar(&source);
        if source_meta.is_file() {
            io::rename_no_clobber(&source_meta, &sidecar(&target), "move asset sidecar")?;
        }

        tracing::debug!(from = %from, to = %to, "moved asset");
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn index(root: &Path) -> FsAssetIndex {
        FsAssetIndex::new(root, &WizardConfig::default())
    }

    #[test]
    fn finds_descriptors_sorted_and_skips_ignored_dirs() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Packages/p/Runtime/P.Runtime.asmdef", "{}");
        write(dir.path(), "Packages/p/Editor/P.Editor.asmdef", "{}");
        write(dir.path(), "Assets/Scripts/Game.asmdef", "{}");
        write(dir.path(), "Library/Cache/Stale.asmdef", "{}");
        write(dir.path(), "Packages/p/package.json", "{}");
        write(dir.path(), "Packages/p/Editor/P.Editor.asmdef.meta", "guid: 1");

        let found = index(dir.path()).find_descriptors().unwrap();
        assert_eq!(
            found,
            vec![
                "Assets/Scripts/Game.asmdef",
                "Packages/p/Editor/P.Editor.asmdef",
                "Packages/p/Runtime/P.Runtime.asmdef",
            ]
        );
    }

    #[test]
    fn honors_configured_extension() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Packages/p/Mod.modinfo", "{}");
        write(dir.path(), "Packages/p/Mod.asmdef", "{}");

        let config = WizardConfig {
            descriptor_extension: "modinfo".to_string(),
            ..WizardConfig::default()
        };
        let found = FsAssetIndex::new(dir.path(), &config)
            .find_descriptors()
            .unwrap();
        assert_eq!(found, vec!["Packages/p/Mod.modinfo"]);
    }

    #[test]
    fn loads_descriptor_by_relative_path() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "Packages/p/P.Editor.asmdef",
            "{\"name\": \"P.Editor\", \"rootNamespace\": \"P\"}",
        );

        let descriptor = index(dir.path())
            .load_descriptor("Packages/p/P.Editor.asmdef")
            .unwrap();
        assert_eq!(descriptor.module_name, "P.Editor");
        assert_eq!(descriptor.root_namespace.as_deref(), Some("P"));
    }

    #[test]
    fn rename_asset_moves_meta_sidecar() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Packages/p/Old.Editor.asmdef", "{}");
        write(dir.path(), "Packages/p/Old.Editor.asmdef.meta", "guid: 1");

        let new_path = index(dir.path())
            .rename_asset("Packages/p/Old.Editor.asmdef", "New.Editor.asmdef")
            .unwrap();

        assert_eq!(new_path, "Packages/p/New.Editor.asmdef");
        assert!(dir.path().join("Packages/p/New.Editor.asmdef").is_file());
        assert_eq!(
            fs::read_to_string(dir.path().join("Packages/p/New.Editor.asmdef.meta")).unwrap(),
            "guid: 1"
        );
        assert!(!dir.path().join("Packages/p/Old.Editor.asmdef.meta").exists());
    }

    #[test]
    fn rename_asset_refuses_existing_target() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Packages/p/A.asmdef", "a");
        write(dir.path(), "Packages/p/B.asmdef", "b");

        let err = index(dir.path())
            .rename_asset("Packages/p/A.asmdef", "B.asmdef")
            .unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
        assert_eq!(
            fs::read_to_string(dir.path().join("Packages/p/B.asmdef")).unwrap(),
            "b"
        );
    }

    #[test]
    fn rename_asset_rejects_path_separators() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Packages/p/A.asmdef", "a");

        let err = index(dir.path())
            .rename_asset("Packages/p/A.asmdef", "../A.asmdef")
            .unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn move_asset_moves_directories() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Packages/old/package.json", "{}");

        let idx = index(dir.path());
        idx.move_asset("Packages/old", "Packages/new").unwrap();
        assert!(idx.exists("Packages/new/package.json"));
        assert!(!idx.exists("Packages/old"));
    }
}
