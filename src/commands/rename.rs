use clap::Args;
use serde::Serialize;

use pkgwiz::asset_index::FsAssetIndex;
use pkgwiz::identity::PackageIdentity;
use pkgwiz::log_status;
use pkgwiz::rename::{
    AppliedStep, DescriptorChange, DirectoryMove, ManifestChange, RenameSession, RenameWarning,
};
use pkgwiz::validation;

use super::CmdResult;

#[derive(Args)]
pub struct RenameArgs {
    /// Path to the package manifest (default: the configured default package)
    #[arg(long)]
    pub manifest: Option<String>,

    /// New company name (default: `defaultCompany` from pkgwiz.json)
    #[arg(long)]
    pub company: Option<String>,

    /// New package name (default: `defaultPackage` from pkgwiz.json)
    #[arg(long)]
    pub package: Option<String>,

    /// Apply changes to disk (default is dry-run)
    #[arg(long)]
    pub write: bool,

    /// Skip the confirmation prompt when applying
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum RenameOutput {
    #[serde(rename = "rename")]
    Rename {
        company: String,
        package: String,
        domain_name: String,
        dry_run: bool,
        manifest: ManifestChange,
        descriptors: Vec<DescriptorChange>,
        directory: DirectoryMove,
        warnings: Vec<RenameWarning>,
        applied: bool,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        steps: Vec<AppliedStep>,
        manifest_path: String,
    },
}

pub fn run(args: RenameArgs, global: &crate::commands::GlobalArgs) -> CmdResult<RenameOutput> {
    let (root, config) = global.load_config()?;

    let identity = PackageIdentity::new(
        args.company.unwrap_or_else(|| config.default_company.clone()),
        args.package.unwrap_or_else(|| config.default_package.clone()),
    );
    identity.require_valid()?;

    let manifest_path = match args.manifest.as_deref() {
        Some(raw) if raw.trim().is_empty() => {
            return Err(pkgwiz::Error::validation_missing_argument(vec![
                "manifest".to_string(),
            ]))
        }
        Some(raw) => {
            let path = validation::expand_path(raw);
            if path.is_relative() {
                root.join(path)
            } else {
                path
            }
        }
        None => config.default_manifest_path(&root),
    };

    let index = FsAssetIndex::new(&root, &config);
    let mut session = RenameSession::new(index, config, manifest_path);
    let plan = session.preview(&identity)?;

    let domain_name = plan.manifest.new_domain_name.clone();
    let mut manifest_path = plan.location.manifest_path.display().to_string();
    let mut steps = Vec::new();
    let mut applied = false;

    if args.write && plan.has_changes() && confirm(&plan.directory, args.yes)? {
        log_status!("rename", "{} → {}", plan.directory.from, plan.directory.to);
        let report = session.apply(plan.clone())?;
        manifest_path = report.manifest_path.display().to_string();
        steps = report.steps;
        applied = true;
    }

    // Declined at the prompt.
    let exit_code = if args.write && !applied && plan.has_changes() { 1 } else { 0 };

    Ok((
        RenameOutput::Rename {
            company: identity.company_name,
            package: identity.package_name,
            domain_name,
            dry_run: !args.write,
            manifest: plan.manifest,
            descriptors: plan.descriptors,
            directory: plan.directory,
            warnings: plan.warnings,
            applied,
            steps,
            manifest_path,
        },
        exit_code,
    ))
}

fn confirm(directory: &DirectoryMove, yes: bool) -> pkgwiz::Result<bool> {
    if yes {
        return Ok(true);
    }
    crate::tty::confirm(&format!(
        "Rename package {} to {}?",
        directory.from, directory.to
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::GlobalArgs;
    use serde_json::Value;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    const MANIFEST: &str = "Packages/com.company.package/package.json";
    const EDITOR: &str = "Packages/com.company.package/Editor/Package.Editor.asmdef";

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project() -> TempDir {
        let dir = tempdir().unwrap();
        write(dir.path(), MANIFEST, "{\"name\": \"com.company.package\"}");
        write(dir.path(), EDITOR, "{\"name\": \"Package.Editor\"}");
        dir
    }

    fn args(
        manifest: Option<&str>,
        company: Option<&str>,
        package: Option<&str>,
        write: bool,
    ) -> RenameArgs {
        RenameArgs {
            manifest: manifest.map(str::to_string),
            company: company.map(str::to_string),
            package: package.map(str::to_string),
            write,
            yes: true,
        }
    }

    fn run_in(dir: &TempDir, args: RenameArgs) -> pkgwiz::Result<(Value, i32)> {
        let global = GlobalArgs {
            project: Some(dir.path().display().to_string()),
        };
        run(args, &global).map(|(output, code)| (serde_json::to_value(output).unwrap(), code))
    }

    #[test]
    fn dry_run_previews_without_writing() {
        let dir = project();
        let (output, code) = run_in(&dir, args(None, Some("Acme"), Some("Widgets"), false)).unwrap();

        assert_eq!(code, 0);
        assert_eq!(output["command"], "rename");
        assert_eq!(output["dry_run"], true);
        assert_eq!(output["applied"], false);
        assert_eq!(output["domain_name"], "com.acme.widgets");
        assert_eq!(output["descriptors"][0]["newModuleName"], "Widgets.Editor");
        assert!(dir.path().join(EDITOR).is_file());
    }

    #[test]
    fn write_with_yes_applies_and_reports_new_manifest() {
        let dir = project();
        let (output, code) = run_in(&dir, args(None, Some("Acme"), Some("Widgets"), true)).unwrap();

        assert_eq!(code, 0);
        assert_eq!(output["applied"], true);
        assert_eq!(output["steps"].as_array().unwrap().len(), 4);
        assert!(output["manifest_path"]
            .as_str()
            .unwrap()
            .ends_with("com.acme.widgets/package.json"));
        assert!(dir
            .path()
            .join("Packages/com.acme.widgets/Editor/Widgets.Editor.asmdef")
            .is_file());
    }

    #[test]
    fn write_without_changes_is_a_successful_noop() {
        let dir = project();
        // Identity falls back to the configured defaults, which match the package.
        let (output, code) = run_in(&dir, args(None, None, None, true)).unwrap();

        assert_eq!(code, 0);
        assert_eq!(output["applied"], false);
        assert!(output.get("steps").is_none());
        assert!(dir.path().join(EDITOR).is_file());
    }

    #[test]
    fn namespace_only_change_is_applied() {
        let dir = project();
        write(
            dir.path(),
            EDITOR,
            "{\"name\": \"Package.Editor\", \"rootNamespace\": \"Legacy\"}",
        );

        let (output, code) = run_in(&dir, args(None, None, None, true)).unwrap();
        assert_eq!(code, 0);
        assert_eq!(output["applied"], true);
        assert_eq!(
            fs::read_to_string(dir.path().join(EDITOR)).unwrap(),
            "{\"name\": \"Package.Editor\", \"rootNamespace\": \"Package\"}"
        );
    }

    #[test]
    fn relative_manifest_resolves_against_project_root() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "Packages/com.other.tool/package.json",
            "{\"name\": \"com.other.tool\"}",
        );

        let (output, code) = run_in(
            &dir,
            args(
                Some("Packages/com.other.tool/package.json"),
                Some("Acme"),
                Some("Tool"),
                false,
            ),
        )
        .unwrap();

        assert_eq!(code, 0);
        assert_eq!(output["manifest"]["oldDomainName"], "com.other.tool");
        assert_eq!(output["directory"]["to"], "Packages/com.acme.tool");
    }

    #[test]
    fn blank_manifest_is_a_missing_argument() {
        let dir = project();
        let err = run_in(&dir, args(Some("  "), Some("Acme"), Some("Widgets"), false)).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.missing_argument");
    }

    #[test]
    fn invalid_identity_blocks_write() {
        let dir = project();
        let err = run_in(&dir, args(None, Some("Acme"), Some("My Widgets"), true)).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
        assert!(dir.path().join(EDITOR).is_file());
    }
}
