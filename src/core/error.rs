use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationMissingArgument,
    ValidationInvalidArgument,

    ManifestNotFound,
    ManifestMalformed,
    ManifestOutsidePackagesRoot,
    DescriptorMalformed,
    PackageFolderAmbiguous,

    PlanStale,
    PlanConflict,
    ApplyStepFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationMissingArgument => "validation.missing_argument",
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::ManifestNotFound => "manifest.not_found",
            ErrorCode::ManifestMalformed => "manifest.malformed",
            ErrorCode::ManifestOutsidePackagesRoot => "manifest.outside_packages_root",
            ErrorCode::DescriptorMalformed => "descriptor.malformed",
            ErrorCode::PackageFolderAmbiguous => "package.folder_ambiguous",

            ErrorCode::PlanStale => "plan.stale",
            ErrorCode::PlanConflict => "plan.conflict",
            ErrorCode::ApplyStepFailed => "apply.step_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingArgumentDetails {
    pub args: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MalformedFileDetails {
    pub path: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutsidePackagesRootDetails {
    pub manifest_path: String,
    pub expected_layout: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderAmbiguousDetails {
    pub folder: String,
    pub conflicting: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStaleDetails {
    pub expected: String,
    pub found: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanConflictDetails {
    pub target: String,
    pub sources: Vec<String>,
}

/// Context attached to a failed apply step so the partial state can be repaired by hand.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyStepFailedDetails {
    pub step: String,
    pub path: String,
    pub error: String,
    pub completed_steps: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn validation_missing_argument(args: Vec<String>) -> Self {
        Self::new(
            ErrorCode::ValidationMissingArgument,
            "Missing required argument",
            to_details(MissingArgumentDetails { args }),
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            id,
            tried,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = to_details(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn manifest_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::ManifestNotFound,
            "No package manifest found",
            serde_json::json!({ "path": path }),
        )
        .with_hint("Pass --manifest <path> pointing at the package's package.json")
    }

    pub fn manifest_malformed(path: impl Into<String>, problem: impl Into<String>) -> Self {
        let details = to_details(MalformedFileDetails {
            path: path.into(),
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ManifestMalformed,
            "Package manifest is malformed",
            details,
        )
    }

    pub fn manifest_outside_packages_root(
        manifest_path: impl Into<String>,
        packages_dir: &str,
    ) -> Self {
        let details = to_details(OutsidePackagesRootDetails {
            manifest_path: manifest_path.into(),
            expected_layout: format!("<project>/{}/<package-folder>/<manifest>", packages_dir),
        });

        Self::new(
            ErrorCode::ManifestOutsidePackagesRoot,
            format!(
                "Manifest must sit one folder below the project's {} directory",
                packages_dir
            ),
            details,
        )
        .with_hint("Use --project to point at the directory that contains the packages folder")
    }

    pub fn descriptor_malformed(path: impl Into<String>, problem: impl Into<String>) -> Self {
        let details = to_details(MalformedFileDetails {
            path: path.into(),
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::DescriptorMalformed,
            "Module descriptor is malformed",
            details,
        )
    }

    pub fn package_folder_ambiguous(folder: impl Into<String>, conflicting: Vec<String>) -> Self {
        let folder = folder.into();
        let details = to_details(FolderAmbiguousDetails {
            folder: folder.clone(),
            conflicting,
        });

        Self::new(
            ErrorCode::PackageFolderAmbiguous,
            format!(
                "Package folder '{}' collides with another folder that differs only by case",
                folder
            ),
            details,
        )
    }

    pub fn plan_stale(expected: impl Into<String>, found: impl Into<String>) -> Self {
        let details = to_details(PlanStaleDetails {
            expected: expected.into(),
            found: found.into(),
        });

        Self::new(
            ErrorCode::PlanStale,
            "Package files changed since the rename was previewed",
            details,
        )
        .with_hint("Preview the rename again before applying it")
    }

    pub fn plan_conflict(target: impl Into<String>, sources: Vec<String>) -> Self {
        let target = target.into();
        let message = format!(
            "{} descriptors would be renamed to '{}'",
            sources.len(),
            target
        );

        Self::new(
            ErrorCode::PlanConflict,
            message,
            to_details(PlanConflictDetails { target, sources }),
        )
        .with_hint("Give the conflicting descriptors distinct role suffixes before renaming")
    }

    pub fn apply_step_failed(details: ApplyStepFailedDetails) -> Self {
        let message = format!("Rename stopped at step '{}' ({})", details.step, details.path);
        let hint = if details.completed_steps.is_empty() {
            "No changes were written".to_string()
        } else {
            format!(
                "{} earlier step(s) remain applied; repair the package by hand",
                details.completed_steps.len()
            )
        };

        Self::new(ErrorCode::ApplyStepFailed, message, to_details(details)).with_hint(hint)
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_dotted() {
        assert_eq!(ErrorCode::ManifestMalformed.as_str(), "manifest.malformed");
        assert_eq!(ErrorCode::ApplyStepFailed.as_str(), "apply.step_failed");
    }

    #[test]
    fn apply_step_failed_carries_context() {
        let err = Error::apply_step_failed(ApplyStepFailedDetails {
            step: "move_directory".to_string(),
            path: "Packages/com.company.package".to_string(),
            error: "target exists".to_string(),
            completed_steps: vec!["write_manifest".to_string()],
        });

        assert_eq!(err.code, ErrorCode::ApplyStepFailed);
        assert_eq!(err.details["step"], "move_directory");
        assert_eq!(err.details["completedSteps"][0], "write_manifest");
        assert!(err.hints[0].message.contains("1 earlier step"));
    }

    #[test]
    fn invalid_argument_omits_empty_options() {
        let err = Error::validation_invalid_argument("company", "bad", None, None);
        assert!(err.details.get("id").is_none());
        assert_eq!(err.details["field"], "company");
    }
}
