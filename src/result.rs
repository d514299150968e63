//! Categorized endpoint validation report.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Minimum width of the option-name column in the summary table.
const MIN_KEY_WIDTH: usize = 24;

/// Outcome of validating an endpoint URI or property map.
///
/// Each category is populated independently. `lenient`, `deprecated` and
/// `default_values` are informational and never count as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub uri: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub incapable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_component: Option<String>,

    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub unknown: IndexSet<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub unknown_suggestions: IndexMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub lenient: IndexSet<String>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub deprecated: IndexSet<String>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub not_consumer_only: IndexSet<String>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub not_producer_only: IndexSet<String>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub required: IndexSet<String>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub invalid_enum: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub invalid_enum_choices: IndexMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub invalid_enum_suggestions: IndexMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub invalid_reference: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub invalid_boolean: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub invalid_integer: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub invalid_number: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub invalid_duration: IndexMap<String, String>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub default_values: IndexMap<String, String>,
}

impl ValidationResult {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.number_of_errors() == 0
    }

    /// Total problems across all error categories.
    pub fn number_of_errors(&self) -> usize {
        usize::from(self.incapable.is_some())
            + usize::from(self.syntax_error.is_some())
            + usize::from(self.unknown_component.is_some())
            + self.unknown.len()
            + self.not_consumer_only.len()
            + self.not_producer_only.len()
            + self.required.len()
            + self.invalid_enum.len()
            + self.invalid_reference.len()
            + self.invalid_boolean.len()
            + self.invalid_integer.len()
            + self.invalid_number.len()
            + self.invalid_duration.len()
    }

    pub fn add_unknown(&mut self, name: &str) {
        self.unknown.insert(name.to_string());
    }

    pub fn add_unknown_suggestions(&mut self, name: &str, suggestions: Vec<String>) {
        if !suggestions.is_empty() {
            self.unknown_suggestions.insert(name.to_string(), suggestions);
        }
    }

    pub fn add_lenient(&mut self, name: &str) {
        self.lenient.insert(name.to_string());
    }

    /// Record a recognized option the component has deprecated.
    pub fn add_deprecated(&mut self, name: &str) {
        self.deprecated.insert(name.to_string());
    }

    pub fn add_not_consumer_only(&mut self, name: &str) {
        self.not_consumer_only.insert(name.to_string());
    }

    pub fn add_not_producer_only(&mut self, name: &str) {
        self.not_producer_only.insert(name.to_string());
    }

    pub fn add_required(&mut self, name: &str) {
        self.required.insert(name.to_string());
    }

    pub fn add_invalid_enum(&mut self, name: &str, value: &str) {
        self.invalid_enum.insert(name.to_string(), value.to_string());
    }

    pub fn add_invalid_enum_choices(&mut self, name: &str, choices: Vec<String>) {
        self.invalid_enum_choices.insert(name.to_string(), choices);
    }

    pub fn add_invalid_enum_suggestions(&mut self, name: &str, suggestions: Vec<String>) {
        if !suggestions.is_empty() {
            self.invalid_enum_suggestions
                .insert(name.to_string(), suggestions);
        }
    }

    pub fn add_invalid_reference(&mut self, name: &str, value: &str) {
        self.invalid_reference
            .insert(name.to_string(), value.to_string());
    }

    pub fn add_invalid_boolean(&mut self, name: &str, value: &str) {
        self.invalid_boolean
            .insert(name.to_string(), value.to_string());
    }

    pub fn add_invalid_integer(&mut self, name: &str, value: &str) {
        self.invalid_integer
            .insert(name.to_string(), value.to_string());
    }

    pub fn add_invalid_number(&mut self, name: &str, value: &str) {
        self.invalid_number.insert(name.to_string(), value.to_string());
    }

    pub fn add_invalid_duration(&mut self, name: &str, value: &str) {
        self.invalid_duration
            .insert(name.to_string(), value.to_string());
    }

    pub fn add_default_value(&mut self, name: &str, value: &str) {
        self.default_values.insert(name.to_string(), value.to_string());
    }

    /// Render the problems as a human readable table.
    ///
    /// Returns `None` when validation succeeded.
    pub fn summary_error_message(&self, include_header: bool) -> Option<String> {
        if self.is_success() {
            return None;
        }
        if let Some(uri) = &self.incapable {
            return Some(format!("\tIncapable of parsing uri: {uri}"));
        }
        if let Some(error) = &self.syntax_error {
            return Some(format!("\tSyntax error: {error}"));
        }
        if let Some(scheme) = &self.unknown_component {
            return Some(format!("\tUnknown component: {scheme}"));
        }

        let rows = self.error_rows();
        let width = rows
            .iter()
            .map(|(key, _)| key.len())
            .max()
            .unwrap_or(0)
            .max(MIN_KEY_WIDTH);

        let mut out = String::new();
        if include_header {
            out.push_str("Endpoint validator error\n");
            out.push_str(&"-".repeat(95));
            out.push_str("\n\n");
        }
        out.push('\t');
        out.push_str(&self.uri);
        out.push('\n');
        for (key, message) in rows {
            out.push_str(&format!("\n\t{key:>width$}    {message}"));
        }
        out.push('\n');
        Some(out)
    }

    fn error_rows(&self) -> Vec<(&str, String)> {
        let mut rows: Vec<(&str, String)> = Vec::new();

        for name in &self.unknown {
            let message = match self.unknown_suggestions.get(name) {
                Some(s) => format!("Unknown option. Did you mean: [{}]", s.join(", ")),
                None => "Unknown option".to_string(),
            };
            rows.push((name, message));
        }
        for name in &self.not_consumer_only {
            rows.push((name, "Option not applicable in consumer only mode".to_string()));
        }
        for name in &self.not_producer_only {
            rows.push((name, "Option not applicable in producer only mode".to_string()));
        }
        for name in &self.required {
            rows.push((name, "Missing required option".to_string()));
        }
        for (name, value) in &self.invalid_enum {
            let mut message = format!("Invalid enum value: {value}");
            if let Some(choices) = self.invalid_enum_choices.get(name) {
                message.push_str(&format!(". Possible values: [{}]", choices.join(", ")));
            }
            if let Some(suggestions) = self.invalid_enum_suggestions.get(name) {
                message.push_str(&format!(". Did you mean: [{}]", suggestions.join(", ")));
            }
            if let Some(default) = self.default_values.get(name) {
                message.push_str(&format!(". Default value: {default}"));
            }
            rows.push((name, message));
        }
        for (name, value) in &self.invalid_reference {
            let message = if value.is_empty() {
                "Empty reference value".to_string()
            } else if !value.starts_with('#') {
                format!("Invalid reference value: {value} must start with #")
            } else {
                format!("Invalid reference value: {value}")
            };
            rows.push((name, message));
        }
        for (label, category) in [
            ("boolean", &self.invalid_boolean),
            ("integer", &self.invalid_integer),
            ("number", &self.invalid_number),
            ("duration", &self.invalid_duration),
        ] {
            for (name, value) in category {
                let message = if value.is_empty() {
                    format!("Empty {label} value")
                } else {
                    format!("Invalid {label} value: {value}")
                };
                rows.push((name, message));
            }
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_is_success() {
        let result = ValidationResult::new("timer:foo");
        assert!(result.is_success());
        assert_eq!(result.number_of_errors(), 0);
        assert!(result.summary_error_message(true).is_none());
    }

    #[test]
    fn informational_categories_are_not_errors() {
        let mut result = ValidationResult::new("netty4-http:http://localhost:8080?foo=bar");
        result.add_lenient("foo");
        result.add_deprecated("transferExchange");
        result.add_default_value("synchronous", "false");
        assert!(result.is_success());
        assert_eq!(result.number_of_errors(), 0);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["deprecated"], serde_json::json!(["transferExchange"]));
    }

    #[test]
    fn counts_every_category() {
        let mut result = ValidationResult::new("x");
        result.add_unknown("a");
        result.add_required("b");
        result.add_invalid_enum("c", "blah");
        result.add_invalid_boolean("d", "ggg");
        result.add_invalid_integer("e", "1x");
        result.add_invalid_number("f", "nan?");
        result.add_invalid_duration("g", "bla");
        result.add_invalid_reference("h", "x");
        result.add_not_consumer_only("i");
        result.add_not_producer_only("j");
        assert_eq!(result.number_of_errors(), 10);

        let mut result = ValidationResult::new("foo:bar");
        result.unknown_component = Some("foo".into());
        assert_eq!(result.number_of_errors(), 1);
    }

    #[test]
    fn short_circuit_messages() {
        let mut result = ValidationResult::new("{{x}}");
        result.incapable = Some("{{x}}".into());
        assert_eq!(
            result.summary_error_message(true).unwrap(),
            "\tIncapable of parsing uri: {{x}}"
        );

        let mut result = ValidationResult::new("foo:bar");
        result.unknown_component = Some("foo".into());
        assert_eq!(
            result.summary_error_message(false).unwrap(),
            "\tUnknown component: foo"
        );
    }

    #[test]
    fn table_layout() {
        let mut result = ValidationResult::new("log:foo?showAll=ggg");
        result.add_invalid_boolean("showAll", "ggg");
        let expected = format!(
            "\tlog:foo?showAll=ggg\n\n\t{:>24}    Invalid boolean value: ggg\n",
            "showAll"
        );
        assert_eq!(result.summary_error_message(false).unwrap(), expected);

        let with_header = result.summary_error_message(true).unwrap();
        assert!(with_header.starts_with("Endpoint validator error\n---"));
        assert!(with_header.ends_with(&expected));
    }

    #[test]
    fn enum_message_lists_choices_and_default() {
        let mut result = ValidationResult::new("seda:foo?waitForTaskToComplete=blah");
        result.add_invalid_enum("waitForTaskToComplete", "blah");
        result.add_invalid_enum_choices(
            "waitForTaskToComplete",
            vec!["Never".into(), "IfReplyExpected".into(), "Always".into()],
        );
        result.add_default_value("waitForTaskToComplete", "IfReplyExpected");
        let summary = result.summary_error_message(false).unwrap();
        assert!(summary.contains(
            "Invalid enum value: blah. Possible values: [Never, IfReplyExpected, Always]. Default value: IfReplyExpected"
        ));
    }

    #[test]
    fn reference_messages() {
        let mut result = ValidationResult::new("x");
        result.add_invalid_reference("a", "");
        result.add_invalid_reference("b", "foo");
        let summary = result.summary_error_message(false).unwrap();
        assert!(summary.contains("Empty reference value"));
        assert!(summary.contains("Invalid reference value: foo must start with #"));
    }

    #[test]
    fn long_keys_widen_the_column() {
        let mut result = ValidationResult::new("x");
        let key = "a".repeat(30);
        result.add_required(&key);
        result.add_required("short");
        let summary = result.summary_error_message(false).unwrap();
        assert!(summary.contains(&format!("\n\t{:>30}    Missing required option", "short")));
    }

    #[test]
    fn serializes_without_empty_categories() {
        let mut result = ValidationResult::new("log:foo?showAll=ggg");
        result.add_invalid_boolean("showAll", "ggg");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "uri": "log:foo?showAll=ggg",
                "invalidBoolean": { "showAll": "ggg" }
            })
        );
    }
}
