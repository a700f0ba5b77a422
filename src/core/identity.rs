//! Package identity: company/package names and the domain name derived from them.
//!
//! A segment is legal when its lowercased form matches `^[a-z0-9._-]*$`.
//! The predicate accepts the empty string; [`PackageIdentity::require_valid`]
//! is the gate that additionally rejects empty segments before any rename.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::error::{Error, Result};

static SEGMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9._-]*$").unwrap());

pub const DEFAULT_DOMAIN_PREFIX: &str = "com";

/// Whether `name` is a legal domain-name segment.
///
/// Case-sensitive: callers lowercase first.
pub fn is_valid_identifier_segment(name: &str) -> bool {
    SEGMENT_PATTERN.is_match(name)
}

/// `com.<company>.<package>`, both segments lowercased.
pub fn derive_domain_name(company: &str, package: &str) -> String {
    domain_name_with_prefix(DEFAULT_DOMAIN_PREFIX, company, package)
}

pub fn domain_name_with_prefix(prefix: &str, company: &str, package: &str) -> String {
    format!(
        "{}.{}.{}",
        prefix,
        company.to_lowercase(),
        package.to_lowercase()
    )
}

/// Validation outcome for one identity segment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStatus {
    pub raw: String,
    pub normalized: String,
    pub valid: bool,
    pub empty: bool,
}

impl SegmentStatus {
    fn check(raw: &str) -> Self {
        let normalized = raw.to_lowercase();
        Self {
            raw: raw.to_string(),
            valid: is_valid_identifier_segment(&normalized),
            empty: normalized.is_empty(),
            normalized,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.valid && !self.empty
    }

    fn problem(&self) -> Option<&'static str> {
        if !self.valid {
            Some("may only contain lowercase letters, digits, '.', '_' and '-'")
        } else if self.empty {
            Some("cannot be empty")
        } else {
            None
        }
    }
}

/// Per-field validation, reported as booleans rather than errors.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityValidation {
    pub company: SegmentStatus,
    pub package: SegmentStatus,
    pub domain_name: String,
    pub usable: bool,
}

pub fn validate_identity(company: &str, package: &str, prefix: &str) -> IdentityValidation {
    let company_status = SegmentStatus::check(company);
    let package_status = SegmentStatus::check(package);
    let usable = company_status.is_usable() && package_status.is_usable();

    IdentityValidation {
        domain_name: domain_name_with_prefix(prefix, company, package),
        company: company_status,
        package: package_status,
        usable,
    }
}

/// The identity a package is being renamed to.
///
/// The package name keeps its case: module names are built from it verbatim,
/// while the domain name uses the lowercased form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageIdentity {
    pub company_name: String,
    pub package_name: String,
}

impl PackageIdentity {
    pub fn new(company_name: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            package_name: package_name.into(),
        }
    }

    pub fn domain_name(&self, prefix: &str) -> String {
        domain_name_with_prefix(prefix, &self.company_name, &self.package_name)
    }

    /// Reject the identity if either segment is illegal or empty.
    pub fn require_valid(&self) -> Result<()> {
        let company = SegmentStatus::check(&self.company_name);
        let package = SegmentStatus::check(&self.package_name);

        let mut failures = Vec::new();
        if let Some(problem) = company.problem() {
            failures.push(("company", company.raw.clone(), problem));
        }
        if let Some(problem) = package.problem() {
            failures.push(("package", package.raw.clone(), problem));
        }

        match failures.as_slice() {
            [] => Ok(()),
            [(field, raw, problem)] => Err(Error::validation_invalid_argument(
                *field,
                format!("{} name {}", capitalize(field), problem),
                Some(raw.clone()),
                None,
            )),
            _ => Err(Error::validation_invalid_argument(
                "company,package",
                "Company and package names are both invalid",
                None,
                Some(failures.iter().map(|(_, raw, _)| raw.clone()).collect()),
            )),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
