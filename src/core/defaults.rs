use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::identity::{self, DEFAULT_DOMAIN_PREFIX};
use crate::utils::io;

pub const CONFIG_FILE_NAME: &str = "pkgwiz.json";

/// Project layout and naming defaults, overridable via `pkgwiz.json` in the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardConfig {
    #[serde(default = "default_packages_dir")]
    pub packages_dir: String,

    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    #[serde(default = "default_descriptor_extension")]
    pub descriptor_extension: String,

    #[serde(default = "default_domain_prefix")]
    pub domain_prefix: String,

    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,

    #[serde(default = "default_company")]
    pub default_company: String,

    #[serde(default = "default_package")]
    pub default_package: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            packages_dir: default_packages_dir(),
            manifest_file: default_manifest_file(),
            descriptor_extension: default_descriptor_extension(),
            domain_prefix: default_domain_prefix(),
            skip_dirs: default_skip_dirs(),
            default_company: default_company(),
            default_package: default_package(),
        }
    }
}

impl WizardConfig {
    /// Manifest path used when the caller does not pass one:
    /// `<project>/<packagesDir>/<prefix>.<company>.<package>/<manifestFile>`.
    pub fn default_manifest_path(&self, project_root: &Path) -> PathBuf {
        let folder = identity::domain_name_with_prefix(
            &self.domain_prefix,
            &self.default_company,
            &self.default_package,
        );
        project_root
            .join(&self.packages_dir)
            .join(folder)
            .join(&self.manifest_file)
    }

    fn validate(&self) -> Result<()> {
        if self.packages_dir.trim().is_empty() || self.packages_dir.contains(['/', '\\']) {
            return Err(Error::config_invalid_value(
                "packagesDir",
                Some(self.packages_dir.clone()),
                "must be a single non-empty directory name",
            ));
        }

        if self.manifest_file.trim().is_empty() || self.manifest_file.contains(['/', '\\']) {
            return Err(Error::config_invalid_value(
                "manifestFile",
                Some(self.manifest_file.clone()),
                "must be a single non-empty file name",
            ));
        }

        if self.descriptor_extension.is_empty() || self.descriptor_extension.starts_with('.') {
            return Err(Error::config_invalid_value(
                "descriptorExtension",
                Some(self.descriptor_extension.clone()),
                "must be non-empty and written without a leading dot",
            ));
        }

        if self.domain_prefix.is_empty() || !identity::is_valid_identifier_segment(&self.domain_prefix)
        {
            return Err(Error::config_invalid_value(
                "domainPrefix",
                Some(self.domain_prefix.clone()),
                "must be a non-empty lowercase identifier segment",
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_packages_dir() -> String {
    "Packages".to_string()
}

fn default_manifest_file() -> String {
    "package.json".to_string()
}

fn default_descriptor_extension() -> String {
    "asmdef".to_string()
}

fn default_domain_prefix() -> String {
    DEFAULT_DOMAIN_PREFIX.to_string()
}

fn default_skip_dirs() -> Vec<String> {
    ["Library", "Temp", "Logs", "obj", ".git", "node_modules"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_company() -> String {
    "Company".to_string()
}

fn default_package() -> String {
    "Package".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Path of the project config file (may not exist).
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILE_NAME)
}

/// Load `pkgwiz.json` from the project root, merged over built-in defaults.
///
/// A missing file yields the defaults; an unreadable or invalid one is an error.
pub fn load_config(project_root: &Path) -> Result<WizardConfig> {
    let path = config_path(project_root);

    if !path.exists() {
        return Ok(WizardConfig::default());
    }

    let content = io::read_file(&path, "read config")?;
    let config: WizardConfig = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;

    config.validate()?;
    tracing::debug!(path = %path.display(), "loaded project config");

    Ok(config)
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> WizardConfig {
    WizardConfig::default()
}
