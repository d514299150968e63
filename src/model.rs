//! Component models built from catalog schema documents.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::CatalogError;
use crate::rows::{SchemaDocument, SchemaRow, SchemaValue};

/// Group holding component-level metadata.
pub const COMPONENT_GROUP: &str = "component";

/// Group holding endpoint options.
pub const PROPERTIES_GROUP: &str = "properties";

/// Where an option lives in the endpoint URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Part of the URI path, named by the syntax template.
    Path,
    /// Query parameter.
    #[default]
    Parameter,
    Other,
}

impl OptionKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "path" => OptionKind::Path,
            "parameter" => OptionKind::Parameter,
            _ => OptionKind::Other,
        }
    }
}

/// Declared value type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Boolean,
    Integer,
    Number,
    #[default]
    String,
    Duration,
    /// Bean-typed option; values must be `#name` references.
    Object,
}

impl PropertyType {
    /// Unrecognized types (`array`, `enum`, ...) validate as plain strings.
    pub fn parse(s: &str) -> Self {
        match s {
            "boolean" => PropertyType::Boolean,
            "integer" => PropertyType::Integer,
            "number" => PropertyType::Number,
            "duration" => PropertyType::Duration,
            "object" => PropertyType::Object,
            _ => PropertyType::String,
        }
    }
}

/// Metadata of one endpoint option.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PropertyMeta {
    pub name: String,
    pub kind: OptionKind,
    pub property_type: PropertyType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    pub consumer_only: bool,
    pub producer_only: bool,
    /// Prefix of a multi-value group, e.g. `scheduler.`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Prefix that may be prepended to the name, e.g. `consumer.`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_prefix: Option<String>,
    pub multi_value: bool,
    pub deprecated: bool,
    pub secret: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertyMeta {
    /// Decode a row of the properties group.
    pub fn from_row(row: &SchemaRow) -> Self {
        let flag = |key: &str| row.value.get(key).map(SchemaValue::is_true).unwrap_or(false);
        let text = |key: &str| row.attribute(key).map(str::to_string);
        let label = row.attribute("label").unwrap_or_default();

        PropertyMeta {
            name: row.name.clone(),
            kind: row.attribute("kind").map(OptionKind::parse).unwrap_or_default(),
            property_type: row
                .attribute("type")
                .map(PropertyType::parse)
                .unwrap_or_default(),
            required: flag("required"),
            default_value: text("defaultValue"),
            enum_values: row
                .value
                .get("enum")
                .map(SchemaValue::to_string_list)
                .filter(|values| !values.is_empty()),
            consumer_only: label.contains("consumer"),
            producer_only: label.contains("producer"),
            prefix: text("prefix").filter(|p| !p.is_empty()),
            optional_prefix: text("optionalPrefix").filter(|p| !p.is_empty()),
            multi_value: flag("multiValue"),
            deprecated: flag("deprecated"),
            secret: flag("secret"),
            description: text("description"),
        }
    }
}

/// One named path segment and the delimiter text preceding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxSegment {
    pub separator: String,
    pub name: String,
}

/// Ordered path segments of a scheme's URI syntax (`ftp:host:port/directoryName`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SyntaxTemplate {
    segments: Vec<SyntaxSegment>,
}

impl SyntaxTemplate {
    /// Parse a syntax string. Everything up to and including the first `:` is
    /// the scheme and is clipped; a syntax without `:` has no path segments.
    pub fn parse(syntax: &str) -> Self {
        let path = match syntax.split_once(':') {
            Some((_, path)) => path,
            None => "",
        };

        let mut segments = Vec::new();
        let mut separator = String::new();
        let mut name = String::new();
        for ch in path.chars() {
            if is_name_char(ch) {
                name.push(ch);
            } else {
                if !name.is_empty() {
                    segments.push(SyntaxSegment {
                        separator: std::mem::take(&mut separator),
                        name: std::mem::take(&mut name),
                    });
                }
                separator.push(ch);
            }
        }
        if !name.is_empty() {
            segments.push(SyntaxSegment { separator, name });
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[SyntaxSegment] {
        &self.segments
    }

    /// Segment names in template order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}

/// In-memory model of one component schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentModel {
    pub scheme: String,
    pub syntax: SyntaxTemplate,
    /// Raw alternative syntax, e.g. `ssh:username:password@host:port`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_syntax: Option<String>,
    pub properties: IndexMap<String, PropertyMeta>,
    pub lenient: bool,
    pub consumer_only: bool,
    pub producer_only: bool,
    #[serde(skip)]
    pub component_rows: Vec<SchemaRow>,
}

impl ComponentModel {
    /// Build a model from a parsed schema document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MissingSyntax` if the component group declares
    /// no `syntax`.
    pub fn from_document(scheme: &str, document: &SchemaDocument) -> Result<Self, CatalogError> {
        let component_rows = document.rows(COMPONENT_GROUP);
        let component = |key: &str| {
            component_rows
                .iter()
                .find(|row| row.name == key)
                .map(|row| &row.value)
        };
        let component_flag = |key: &str| component(key).map(SchemaValue::is_true).unwrap_or(false);

        let syntax = component("syntax")
            .and_then(SchemaValue::as_str)
            .ok_or_else(|| CatalogError::MissingSyntax {
                scheme: scheme.to_string(),
            })?;
        let syntax = SyntaxTemplate::parse(syntax);
        let alternative_syntax = component("alternativeSyntax")
            .and_then(SchemaValue::as_str)
            .map(str::to_string);

        let properties = document
            .rows(PROPERTIES_GROUP)
            .iter()
            .map(|row| (row.name.clone(), PropertyMeta::from_row(row)))
            .collect();

        Ok(Self {
            scheme: scheme.to_string(),
            syntax,
            alternative_syntax,
            properties,
            lenient: component_flag("lenientProperties"),
            consumer_only: component_flag("consumerOnly"),
            producer_only: component_flag("producerOnly"),
            component_rows,
        })
    }

    /// Declared option by exact name.
    pub fn property(&self, name: &str) -> Option<&PropertyMeta> {
        self.properties.get(name)
    }

    /// Resolve an option name as written in a URI.
    ///
    /// Tries the exact name, then `optionalPrefix` + name (`consumer.delay`),
    /// then the prefix of a multi-value group (`scheduler.anything`).
    pub fn resolve_property(&self, name: &str) -> Option<&PropertyMeta> {
        if let Some(meta) = self.properties.get(name) {
            return Some(meta);
        }
        let optional = self.properties.values().find(|meta| {
            meta.optional_prefix
                .as_deref()
                .and_then(|prefix| name.strip_prefix(prefix))
                .map(|rest| rest == meta.name)
                .unwrap_or(false)
        });
        if optional.is_some() {
            return optional;
        }
        self.multi_value_owner(name)
    }

    /// Multi-value option whose prefix the name starts with.
    pub fn multi_value_owner(&self, name: &str) -> Option<&PropertyMeta> {
        self.properties.values().find(|meta| {
            meta.multi_value
                && meta
                    .prefix
                    .as_deref()
                    .map(|prefix| name.starts_with(prefix))
                    .unwrap_or(false)
        })
    }

    /// True when the component supports both consumer and producer endpoints.
    pub fn can_consume_and_produce(&self) -> bool {
        !self.consumer_only && !self.producer_only
    }

    /// Component metadata value by row name (e.g. `title`).
    pub fn component_attribute(&self, name: &str) -> Option<&str> {
        self.component_rows
            .iter()
            .find(|row| row.name == name)
            .and_then(|row| row.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(json: &str) -> ComponentModel {
        let doc = SchemaDocument::parse(json).unwrap();
        ComponentModel::from_document("test", &doc).unwrap()
    }

    #[test]
    fn syntax_keeps_separators() {
        let syntax = SyntaxTemplate::parse("ftp:host:port/directoryName");
        let seps: Vec<&str> = syntax
            .segments()
            .iter()
            .map(|s| s.separator.as_str())
            .collect();
        assert_eq!(syntax.names().collect::<Vec<_>>(), ["host", "port", "directoryName"]);
        assert_eq!(seps, ["", ":", "/"]);
    }

    #[test]
    fn syntax_clips_dashed_scheme() {
        let syntax = SyntaxTemplate::parse("netty-http:protocol://host:port/path");
        assert_eq!(
            syntax.names().collect::<Vec<_>>(),
            ["protocol", "host", "port", "path"]
        );
        assert_eq!(syntax.segments()[1].separator, "://");
    }

    #[test]
    fn bare_scheme_has_no_segments() {
        assert!(SyntaxTemplate::parse("comp").is_empty());
        assert!(SyntaxTemplate::parse("comp:").is_empty());
    }

    #[test]
    fn decodes_property_metadata() {
        let m = model(
            r#"{
                "component": { "scheme": "test", "syntax": "test:name", "lenientProperties": "true" },
                "properties": {
                    "name": { "kind": "path", "required": "true", "type": "string" },
                    "mode": { "kind": "parameter", "type": "string", "enum": "fast,slow",
                              "defaultValue": "fast", "label": "consumer,advanced" },
                    "delay": { "kind": "parameter", "type": "integer", "optionalPrefix": "consumer." },
                    "schedulerProperties": { "kind": "parameter", "type": "object",
                                             "prefix": "scheduler.", "multiValue": true },
                    "old": { "kind": "parameter", "type": "boolean", "deprecated": true,
                             "label": "producer" }
                }
            }"#,
        );
        assert!(m.lenient);
        assert_eq!(
            m.properties.keys().collect::<Vec<_>>(),
            ["name", "mode", "delay", "schedulerProperties", "old"]
        );

        let name = m.property("name").unwrap();
        assert!(name.required);
        assert_eq!(name.kind, OptionKind::Path);

        let mode = m.property("mode").unwrap();
        assert_eq!(mode.enum_values.as_deref(), Some(&["fast".to_string(), "slow".to_string()][..]));
        assert_eq!(mode.default_value.as_deref(), Some("fast"));
        assert!(mode.consumer_only);
        assert!(!mode.producer_only);

        let old = m.property("old").unwrap();
        assert!(old.deprecated);
        assert!(old.producer_only);
        assert_eq!(old.property_type, PropertyType::Boolean);
    }

    #[test]
    fn resolves_prefixed_names() {
        let m = model(
            r#"{
                "component": { "syntax": "file:directoryName" },
                "properties": {
                    "delay": { "kind": "parameter", "type": "integer", "optionalPrefix": "consumer." },
                    "schedulerProperties": { "kind": "parameter", "type": "object",
                                             "prefix": "scheduler.", "multiValue": true }
                }
            }"#,
        );
        assert_eq!(m.resolve_property("delay").unwrap().name, "delay");
        assert_eq!(m.resolve_property("consumer.delay").unwrap().name, "delay");
        assert!(m.resolve_property("consumer.other").is_none());
        assert_eq!(
            m.resolve_property("scheduler.foo").unwrap().name,
            "schedulerProperties"
        );
    }

    #[test]
    fn missing_syntax_is_an_error() {
        let doc = SchemaDocument::parse(r#"{"component": {"scheme": "x"}}"#).unwrap();
        let err = ComponentModel::from_document("x", &doc).unwrap_err();
        assert!(matches!(err, CatalogError::MissingSyntax { .. }));
    }
}
