//! Core parsing primitives for locating values inside JSON documents.
//!
//! Manifests and descriptors are rewritten in place: the document is parsed
//! with serde_json to prove it is a well-formed object, then the byte span of
//! one top-level string value is located so it can be replaced without
//! touching any other byte (formatting, key order, trailing newline).

use serde_json::Value;
use std::fmt;
use std::ops::Range;

const BOM: &str = "\u{feff}";

/// A top-level string value and its byte span (quotes excluded) in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringField {
    pub span: Range<usize>,
    pub value: String,
}

/// Why a field could not be located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    NotJson(String),
    NotAnObject,
    NotAString(String),
    DuplicateKey(String),
    EscapedValue(String),
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldProblem::NotJson(err) => write!(f, "not valid JSON: {}", err),
            FieldProblem::NotAnObject => write!(f, "top-level value is not a JSON object"),
            FieldProblem::NotAString(key) => write!(f, "\"{}\" is not a string", key),
            FieldProblem::DuplicateKey(key) => write!(f, "\"{}\" appears more than once", key),
            FieldProblem::EscapedValue(key) => {
                write!(f, "\"{}\" contains escape sequences", key)
            }
        }
    }
}

/// Locate the string value of a top-level key.
///
/// Returns `Ok(None)` when the key is absent. Nested keys with the same name
/// (e.g. inside `versionDefines`) are never matched.
pub fn find_top_level_string(
    content: &str,
    key: &str,
) -> std::result::Result<Option<StringField>, FieldProblem> {
    let parsed: Value = serde_json::from_str(content.strip_prefix(BOM).unwrap_or(content))
        .map_err(|e| FieldProblem::NotJson(e.to_string()))?;
    let object = parsed.as_object().ok_or(FieldProblem::NotAnObject)?;

    let Some(value) = object.get(key) else {
        return Ok(None);
    };
    let expected = value
        .as_str()
        .ok_or_else(|| FieldProblem::NotAString(key.to_string()))?;

    let occurrences = top_level_occurrences(content, key);
    if occurrences.len() > 1 {
        return Err(FieldProblem::DuplicateKey(key.to_string()));
    }

    // The key itself may be spelled with escapes, which the scanner does not decode.
    let span = occurrences
        .into_iter()
        .next()
        .flatten()
        .ok_or_else(|| FieldProblem::EscapedValue(key.to_string()))?;

    if &content[span.clone()] != expected {
        return Err(FieldProblem::EscapedValue(key.to_string()));
    }

    Ok(Some(StringField {
        span,
        value: expected.to_string(),
    }))
}

/// Replace a byte span with new text, leaving everything else untouched.
pub fn splice(content: &str, span: &Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(content.len() + replacement.len());
    out.push_str(&content[..span.start]);
    out.push_str(replacement);
    out.push_str(&content[span.end..]);
    out
}

/// Scan for every occurrence of `key` directly inside the root object.
///
/// Each entry is the value span when the value is a string, `None` otherwise.
/// Assumes `content` is valid JSON; only ASCII delimiters are inspected so all
/// slice points fall on char boundaries.
fn top_level_occurrences(content: &str, key: &str) -> Vec<Option<Range<usize>>> {
    let bytes = content.as_bytes();
    let mut found = Vec::new();
    let mut depth = 0usize;
    let mut expect_key = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                let end = string_end(bytes, i);
                if depth == 1 && expect_key {
                    expect_key = false;
                    let name = &content[i + 1..end];
                    let colon = skip_whitespace(bytes, end + 1);
                    let value_start = skip_whitespace(bytes, colon + 1);

                    if name == key {
                        if bytes.get(value_start) == Some(&b'"') {
                            let value_end = string_end(bytes, value_start);
                            found.push(Some(value_start + 1..value_end));
                            i = value_end + 1;
                            continue;
                        }
                        found.push(None);
                    }
                    i = value_start;
                    continue;
                }
                i = end + 1;
                continue;
            }
            b'{' => {
                depth += 1;
                expect_key = depth == 1;
            }
            b'[' => depth += 1,
            b'}' | b']' => depth = depth.saturating_sub(1),
            b',' if depth == 1 => expect_key = true,
            _ => {}
        }
        i += 1;
    }

    found
}

/// Index of the closing quote of the string opening at `open`.
fn string_end(bytes: &[u8], open: usize) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}
