use std::fs;
use std::path::{Path, PathBuf};

use pkgwiz::asset_index::FsAssetIndex;
use pkgwiz::defaults::{load_config, WizardConfig};
use pkgwiz::identity::PackageIdentity;
use pkgwiz::rename::{apply_plan, plan_rename, RenameSession, StepKind};
use tempfile::{tempdir, TempDir};

const MANIFEST: &str = "Packages/com.company.package/package.json";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

fn project() -> TempDir {
    let dir = tempdir().unwrap();
    write(dir.path(), MANIFEST, "{\"name\": \"com.company.package\"}");
    write(
        dir.path(),
        "Packages/com.company.package/Editor/Package.Editor.asmdef",
        "{\n    \"name\": \"Package.Editor\",\n    \"rootNamespace\": \"Package.Editor\",\n    \"includePlatforms\": [\"Editor\"]\n}\n",
    );
    write(
        dir.path(),
        "Packages/com.company.package/Editor/Package.Editor.asmdef.meta",
        "fileFormatVersion: 2\nguid: 0123456789abcdef0123456789abcdef\n",
    );
    write(
        dir.path(),
        "Packages/com.company.package/Runtime/Package.Runtime.asmdef",
        "{\n    \"name\": \"Package.Runtime\"\n}\n",
    );
    // Same folder name under a different root must be left alone.
    write(
        dir.path(),
        "Assets/com.company.package/Package.Game.asmdef",
        "{\"name\": \"Package.Game\"}",
    );
    dir
}

fn manifest_path(dir: &TempDir) -> PathBuf {
    dir.path().join(MANIFEST)
}

#[test]
fn renames_manifest_descriptors_and_directory() {
    let dir = project();
    let root = dir.path();
    let config = load_config(root).unwrap();
    let index = FsAssetIndex::new(root, &config);

    let plan = plan_rename(
        &index,
        &config,
        &manifest_path(&dir),
        &PackageIdentity::new("Acme", "Widgets"),
    )
    .unwrap();
    let report = apply_plan(&index, &plan).unwrap();

    assert_eq!(
        read(root, "Packages/com.acme.widgets/package.json"),
        "{\"name\": \"com.acme.widgets\"}"
    );
    assert_eq!(
        read(root, "Packages/com.acme.widgets/Editor/Widgets.Editor.asmdef"),
        "{\n    \"name\": \"Widgets.Editor\",\n    \"rootNamespace\": \"Widgets.Editor\",\n    \"includePlatforms\": [\"Editor\"]\n}\n"
    );
    assert_eq!(
        read(root, "Packages/com.acme.widgets/Runtime/Widgets.Runtime.asmdef"),
        "{\n    \"name\": \"Widgets.Runtime\"\n}\n"
    );
    assert!(root
        .join("Packages/com.acme.widgets/Editor/Widgets.Editor.asmdef.meta")
        .is_file());
    assert!(!root.join("Packages/com.company.package").exists());
    assert_eq!(
        read(root, "Assets/com.company.package/Package.Game.asmdef"),
        "{\"name\": \"Package.Game\"}"
    );

    assert_eq!(report.domain_name, "com.acme.widgets");
    assert!(report.manifest_path.is_file());
}

#[test]
fn failed_directory_move_leaves_manifest_rewritten() {
    let dir = project();
    let root = dir.path();
    let config = WizardConfig::default();
    let index = FsAssetIndex::new(root, &config);

    // An occupied target forces the final move to fail.
    write(root, "Packages/com.acme.widgets/README.md", "taken");

    let plan = plan_rename(
        &index,
        &config,
        &manifest_path(&dir),
        &PackageIdentity::new("Acme", "Widgets"),
    )
    .unwrap();
    assert!(plan
        .warnings
        .iter()
        .any(|w| w.kind == "directory_collision"));

    let err = apply_plan(&index, &plan).unwrap_err();
    assert_eq!(err.code.as_str(), "apply.step_failed");
    assert_eq!(err.details["step"], StepKind::MoveDirectory.as_str());
    assert_eq!(err.details["path"], "Packages/com.company.package");

    // Manifest already carries the new domain name; the directory has not moved.
    assert_eq!(read(root, MANIFEST), "{\"name\": \"com.acme.widgets\"}");
    assert!(root
        .join("Packages/com.company.package/Editor/Widgets.Editor.asmdef")
        .is_file());
    assert!(root
        .join("Packages/com.company.package/Runtime/Widgets.Runtime.asmdef")
        .is_file());
    assert_eq!(read(root, "Packages/com.acme.widgets/README.md"), "taken");
}

#[test]
fn session_follows_the_package_through_two_renames() {
    let dir = project();
    let config = WizardConfig::default();
    let index = FsAssetIndex::new(dir.path(), &config);
    let mut session = RenameSession::new(index, config, manifest_path(&dir));

    let plan = session.preview(&PackageIdentity::new("Acme", "Widgets")).unwrap();
    session.apply(plan).unwrap();

    let plan = session.preview(&PackageIdentity::new("Acme", "Gizmos")).unwrap();
    assert_eq!(plan.manifest.old_domain_name, "com.acme.widgets");
    assert_eq!(plan.descriptors[0].old_module_name, "Widgets.Editor");
    session.apply(plan).unwrap();

    assert!(dir
        .path()
        .join("Packages/com.acme.gizmos/Runtime/Gizmos.Runtime.asmdef")
        .is_file());
    assert!(session
        .manifest_path()
        .ends_with("Packages/com.acme.gizmos/package.json"));
}

#[test]
fn invalid_identity_touches_nothing() {
    let dir = project();
    let config = WizardConfig::default();
    let index = FsAssetIndex::new(dir.path(), &config);

    let err = plan_rename(
        &index,
        &config,
        &manifest_path(&dir),
        &PackageIdentity::new("Acme", ""),
    )
    .unwrap_err();

    assert_eq!(err.code.as_str(), "validation.invalid_argument");
    assert_eq!(err.details["field"], "package");
    assert_eq!(read(dir.path(), MANIFEST), "{\"name\": \"com.company.package\"}");
}

#[test]
fn project_config_changes_layout() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "pkgwiz.json",
        r#"{"packagesDir": "Modules", "descriptorExtension": "modinfo", "domainPrefix": "io"}"#,
    );
    write(root, "Modules/io.company.package/package.json", "{\"name\": \"io.company.package\"}");
    write(
        root,
        "Modules/io.company.package/Package.Core.modinfo",
        "{\"name\": \"Package.Core\"}",
    );

    let config = load_config(root).unwrap();
    let index = FsAssetIndex::new(root, &config);
    let plan = plan_rename(
        &index,
        &config,
        &root.join("Modules/io.company.package/package.json"),
        &PackageIdentity::new("Acme", "Widgets"),
    )
    .unwrap();
    apply_plan(&index, &plan).unwrap();

    assert_eq!(
        read(root, "Modules/io.acme.widgets/package.json"),
        "{\"name\": \"io.acme.widgets\"}"
    );
    assert!(root.join("Modules/io.acme.widgets/Widgets.Core.modinfo").is_file());
}
