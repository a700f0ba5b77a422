//! Module descriptors: per-module identity files inside a package.
//!
//! A descriptor carries a module name (`"name"`, conventionally
//! `<Package>.<Role>`) and optionally a `"rootNamespace"`. Renaming a package
//! swaps the leading segment of both and renames the file to match.

use serde::Serialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::parser::{self, StringField};

pub const MODULE_NAME_KEY: &str = "name";
pub const ROOT_NAMESPACE_KEY: &str = "rootNamespace";

/// `new_package` followed by everything from the first `.` of `current` onward.
///
/// `"OldPkg.Runtime.Tests"` with `"NewPkg"` gives `"NewPkg.Runtime.Tests"`.
/// A name without a dot has an empty suffix.
pub fn derive_module_name(current: &str, new_package: &str) -> String {
    let suffix = current.find('.').map(|i| &current[i..]).unwrap_or("");
    format!("{}{}", new_package, suffix)
}

/// Whether a project-relative, slash-delimited asset path lies inside
/// `<packages_dir>/<folder>/`.
///
/// Both leading segments must match exactly; an `Assets/<folder>/...` path
/// that happens to reuse the folder name does not belong to the package.
pub fn belongs_to_package(rel_path: &str, packages_dir: &str, folder: &str) -> bool {
    let mut segments = rel_path.split('/');
    segments.next() == Some(packages_dir)
        && segments.next() == Some(folder)
        && segments.next().is_some_and(|rest| !rest.is_empty())
}

/// One module descriptor as loaded from the project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    /// Project-relative, slash-delimited path.
    pub path: String,
    pub module_name: String,
    pub root_namespace: Option<String>,
    #[serde(skip)]
    pub text: String,
}

/// The rewritten form of a descriptor, computed without touching disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorRewrite {
    pub new_module_name: String,
    pub new_root_namespace: Option<String>,
    pub new_file_name: String,
    pub new_text: String,
}

impl ModuleDescriptor {
    pub fn parse(path: impl Into<String>, text: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let text = text.into();

        let module_name = Self::field(&path, &text, MODULE_NAME_KEY)?
            .ok_or_else(|| {
                Error::descriptor_malformed(
                    path.clone(),
                    format!("missing \"{}\" field", MODULE_NAME_KEY),
                )
            })?
            .value;
        let root_namespace = Self::field(&path, &text, ROOT_NAMESPACE_KEY)?.map(|f| f.value);

        Ok(Self {
            path,
            module_name,
            root_namespace,
            text,
        })
    }

    fn field(path: &str, text: &str, key: &str) -> Result<Option<StringField>> {
        parser::find_top_level_string(text, key)
            .map_err(|problem| Error::descriptor_malformed(path, problem.to_string()))
    }

    /// File name of the descriptor, e.g. `Package.Editor.asmdef`.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Compute the renamed descriptor for `new_package`.
    ///
    /// `name` becomes the derived module name. `rootNamespace`, when present,
    /// has its leading segment swapped the same way. The file name is derived
    /// from the current file stem so it keeps any role suffix it carries.
    pub fn rewrite(&self, new_package: &str) -> Result<DescriptorRewrite> {
        let new_module_name = derive_module_name(&self.module_name, new_package);
        let new_root_namespace = self
            .root_namespace
            .as_deref()
            .map(|ns| derive_module_name(ns, new_package));

        let mut edits: Vec<(StringField, String)> = Vec::new();
        if let Some(field) = Self::field(&self.path, &self.text, MODULE_NAME_KEY)? {
            edits.push((field, new_module_name.clone()));
        }
        if let (Some(field), Some(ns)) = (
            Self::field(&self.path, &self.text, ROOT_NAMESPACE_KEY)?,
            new_root_namespace.as_ref(),
        ) {
            edits.push((field, ns.clone()));
        }

        // Splice from the end so earlier spans stay valid.
        edits.sort_by(|a, b| b.0.span.start.cmp(&a.0.span.start));
        let mut new_text = self.text.clone();
        for (field, replacement) in &edits {
            new_text = parser::splice(&new_text, &field.span, replacement);
        }

        Ok(DescriptorRewrite {
            new_file_name: self.renamed_file_name(new_package),
            new_module_name,
            new_root_namespace,
            new_text,
        })
    }

    fn renamed_file_name(&self, new_package: &str) -> String {
        let file_name = self.file_name();
        let path = Path::new(file_name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.to_string());

        match path.extension() {
            Some(ext) => format!(
                "{}.{}",
                derive_module_name(&stem, new_package),
                ext.to_string_lossy()
            ),
            None => derive_module_name(&stem, new_package),
        }
    }
}
