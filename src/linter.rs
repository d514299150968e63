//! Catalog linting - static analysis of component schema files.
//!
//! Checks schema files for:
//! - JSON syntax errors
//! - Component documents that break the catalog document contract
//! - Syntax segments with no declared property
//! - Default values outside their enum, and file names that differ from the scheme

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Value};

use crate::model::{ComponentModel, COMPONENT_GROUP};
use crate::rows::SchemaDocument;

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }

    /// ANSI colour the terminal report uses for this severity.
    pub fn color(self) -> &'static str {
        match self {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
        }
    }
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// JSON path to the issue (e.g., "/properties/period/defaultValue")
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    /// One coloured report line, e.g. `error[E001]: / - expected value`.
    pub fn render(&self) -> String {
        format!(
            "{}{}[{}]{RESET}: {} - {}",
            self.severity.color(),
            self.severity.label(),
            self.code,
            self.path,
            self.message
        )
    }
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

impl FileStatus {
    pub fn icon(self) -> String {
        match self {
            FileStatus::Ok => format!("{GREEN}✓{RESET}"),
            FileStatus::Warning => format!("{YELLOW}⚠{RESET}"),
            FileStatus::Error => format!("{RED}✗{RESET}"),
        }
    }
}

/// Result of linting a catalog directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }

    /// Whether the run passes, counting warnings when `strict`.
    pub fn passes(&self, strict: bool) -> bool {
        self.is_ok() && (!strict || self.warnings == 0)
    }

    /// Closing line of the terminal report.
    pub fn summary(&self, strict: bool) -> String {
        if self.passes(strict) {
            format!("{GREEN}✓ {} files checked, all passed{RESET}", self.files_checked)
        } else {
            format!(
                "{RED}✗ {} files checked: {} passed, {} failed ({} errors, {} warnings){RESET}",
                self.files_checked, self.passed, self.failed, self.errors, self.warnings
            )
        }
    }
}

/// Lint a file or catalog directory.
///
/// If path is a directory, recursively finds all .json files.
/// If `strict` is true, warnings are treated as errors.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_schema_files(path);
    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let file_result = lint_file(file, path);
        total_errors += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        total_warnings += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        results.push(file_result);
    }

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    tracing::debug!(
        files = files.len(),
        errors = total_errors,
        warnings = total_warnings,
        "linted catalog"
    );

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors: total_errors,
        warnings: total_warnings,
        results,
    }
}

/// Lint a single schema file.
///
/// Documents without a `component` group (models, data formats, languages)
/// are only checked for syntax.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let mut diagnostics = Vec::new();
    let mut push = |severity, code: &str, path: &str, message: String| {
        diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            file: file.to_path_buf(),
            path: path.to_string(),
            message,
        });
    };

    let parsed = std::fs::read_to_string(file)
        .map_err(|e| e.to_string())
        .and_then(|text| {
            let value: Value = serde_json::from_str(&text).map_err(|e| e.to_string())?;
            let document = SchemaDocument::parse(&text).map_err(|e| e.to_string())?;
            Ok((value, document))
        });

    match parsed {
        Err(message) => push(
            Severity::Error,
            "E001",
            "/",
            format!("syntax error: {}", message),
        ),
        Ok((value, document)) if value.get(COMPONENT_GROUP).is_some() => {
            let violations = contract_violations(&value);
            let contract_ok = violations.is_empty();
            for (path, message) in violations {
                push(Severity::Error, "E002", &path, message);
            }

            let scheme = document.scalar(COMPONENT_GROUP, "scheme").unwrap_or_default();
            if contract_ok {
                if let Ok(model) = ComponentModel::from_document(scheme, &document) {
                    check_model(&model, &mut push);
                }
            }

            let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            if !scheme.is_empty() && stem != scheme {
                push(
                    Severity::Warning,
                    "W002",
                    "/component/scheme",
                    format!("file name \"{}\" differs from scheme \"{}\"", stem, scheme),
                );
            }
        }
        Ok(_) => {}
    }

    let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);
    let has_warnings = diagnostics.iter().any(|d| d.severity == Severity::Warning);

    let status = if has_errors {
        FileStatus::Error
    } else if has_warnings {
        FileStatus::Warning
    } else {
        FileStatus::Ok
    };

    FileResult {
        file: file.strip_prefix(base_path).unwrap_or(file).to_path_buf(),
        status,
        diagnostics,
    }
}

/// Shape every component document must have.
fn component_contract() -> Value {
    let flag = json!({ "type": ["boolean", "string"] });
    json!({
        "type": "object",
        "required": ["component"],
        "properties": {
            "component": {
                "type": "object",
                "required": ["scheme", "syntax"],
                "properties": {
                    "scheme": { "type": "string", "minLength": 1 },
                    "syntax": { "type": "string", "minLength": 1 },
                    "alternativeSyntax": { "type": "string" },
                    "lenientProperties": flag,
                    "consumerOnly": flag,
                    "producerOnly": flag
                }
            },
            "properties": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "properties": {
                        "kind": { "type": "string" },
                        "type": { "type": "string" },
                        "required": flag,
                        "enum": { "type": ["array", "string"] },
                        "prefix": { "type": "string" },
                        "optionalPrefix": { "type": "string" },
                        "multiValue": flag,
                        "deprecated": flag
                    }
                }
            }
        }
    })
}

fn contract_violations(document: &Value) -> Vec<(String, String)> {
    let validator = match jsonschema::validator_for(&component_contract()) {
        Ok(v) => v,
        Err(e) => return vec![("/".to_string(), format!("invalid document contract: {}", e))],
    };

    validator
        .iter_errors(document)
        .map(|e| {
            let path = e.instance_path.to_string();
            let path = if path.is_empty() { "/".to_string() } else { path };
            (path, e.to_string())
        })
        .collect()
}

fn check_model(model: &ComponentModel, push: &mut impl FnMut(Severity, &str, &str, String)) {
    for name in model.syntax.names() {
        if model.property(name).is_none() {
            push(
                Severity::Error,
                "E003",
                "/component/syntax",
                format!("syntax segment \"{}\" has no declared property", name),
            );
        }
    }

    for meta in model.properties.values() {
        let (Some(default), Some(choices)) = (&meta.default_value, &meta.enum_values) else {
            continue;
        };
        if !choices.iter().any(|c| c.eq_ignore_ascii_case(default)) {
            push(
                Severity::Warning,
                "W001",
                &format!("/properties/{}/defaultValue", meta.name),
                format!(
                    "default value \"{}\" is not one of [{}]",
                    default,
                    choices.join(", ")
                ),
            );
        }
    }
}

/// Collect all .json files in a path (file or directory).
fn collect_schema_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            files.push(path);
        }
    }
}
