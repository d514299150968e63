//! Core types shared by the catalog operations.

use serde::{Deserialize, Serialize};

/// Query delimiter for plain endpoint URIs.
pub const QUERY_DELIMITER: &str = "&";

/// Query delimiter for endpoint URIs embedded in XML documents.
pub const XML_QUERY_DELIMITER: &str = "&amp;";

/// Prefixes marking a value as resolved later by an expression or placeholder
/// mechanism.
const VALUE_PLACEHOLDER_PREFIXES: &[&str] = &["{{", "${", "$simple{"];

/// Returns true if the whole text is a `{{name}}` property placeholder.
pub fn is_placeholder(text: &str) -> bool {
    text.starts_with("{{") && text.ends_with("}}")
}

/// Returns true if the text contains a `{{...}}` placeholder anywhere.
pub fn contains_placeholder(text: &str) -> bool {
    text.find("{{")
        .map(|start| text[start + 2..].contains("}}"))
        .unwrap_or(false)
}

/// Returns true if the value will be substituted before use, so its literal
/// form cannot be type checked.
pub fn is_value_placeholder(value: &str) -> bool {
    VALUE_PLACEHOLDER_PREFIXES
        .iter()
        .any(|prefix| value.starts_with(prefix))
}

/// Returns true if the value is a `#name` registry reference.
pub fn is_reference(value: &str) -> bool {
    value.starts_with('#') && value.len() > 1
}

/// Whether text is validated as a value-producing expression or as a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionMode {
    Expression,
    Predicate,
}

impl ExpressionMode {
    /// Create mode from a predicate flag (true = Predicate, false = Expression).
    pub fn from_predicate_flag(predicate: bool) -> Self {
        if predicate {
            ExpressionMode::Predicate
        } else {
            ExpressionMode::Expression
        }
    }
}

/// Options for endpoint validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// When true, lenient components are validated as if they were strict.
    pub ignore_lenient: bool,
    /// Validate the endpoint as used by a consumer.
    pub consumer_only: bool,
    /// Validate the endpoint as used by a producer.
    pub producer_only: bool,
}

impl ValidateOptions {
    /// Create options with every flag disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat lenient components as strict.
    pub fn ignore_lenient(mut self, ignore: bool) -> Self {
        self.ignore_lenient = ignore;
        self
    }

    /// Reject producer-only options.
    pub fn consumer_only(mut self, consumer_only: bool) -> Self {
        self.consumer_only = consumer_only;
        self
    }

    /// Reject consumer-only options.
    pub fn producer_only(mut self, producer_only: bool) -> Self {
        self.producer_only = producer_only;
        self
    }
}
