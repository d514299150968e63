//! Endpoint Catalog
//!
//! Build, parse and validate connector endpoint URIs from component metadata
//! schemas.
//!
//! Each connector *scheme* has a schema document describing its URI syntax
//! and options. The catalog loads these documents from a [`SchemaSource`],
//! caches the resulting [`ComponentModel`]s and answers questions about
//! endpoint URIs.
//!
//! # Example
//!
//! ```
//! use endpoint_catalog::{Catalog, InMemorySchemaSource, ValidateOptions};
//! use indexmap::IndexMap;
//!
//! let timer = r#"{
//!     "component": { "scheme": "timer", "syntax": "timer:timerName" },
//!     "properties": {
//!         "timerName": { "kind": "path", "type": "string", "required": true },
//!         "period": { "kind": "parameter", "type": "duration", "defaultValue": "1000" },
//!         "fixedRate": { "kind": "parameter", "type": "boolean" }
//!     }
//! }"#;
//! let catalog = Catalog::new(InMemorySchemaSource::new().with_component("timer", timer));
//!
//! let mut options = IndexMap::new();
//! options.insert("timerName".to_string(), "tick".to_string());
//! options.insert("period".to_string(), "5s".to_string());
//! let uri = catalog.as_endpoint_uri("timer", &options, false).unwrap();
//! assert_eq!(uri, "timer:tick?period=5s");
//!
//! let result = catalog
//!     .validate_endpoint_properties("timer:tick?fixedRate=maybe", &ValidateOptions::new())
//!     .unwrap();
//! assert_eq!(result.invalid_boolean.get("fixedRate").map(String::as_str), Some("maybe"));
//! ```
//!
//! # Schema Documents
//!
//! | Group | Content |
//! |-------|---------|
//! | `component` | `scheme`, `syntax`, `alternativeSyntax`, `lenientProperties`, `consumerOnly`, `producerOnly` |
//! | `properties` | one object per option: `kind`, `type`, `required`, `defaultValue`, `enum`, `label`, `prefix`, `optionalPrefix`, `multiValue` |
//!
//! Rows keep the order in which they appear in the document.

mod cache;
mod catalog;
mod error;
mod expression;
mod linter;
mod loader;
mod model;
mod result;
mod rows;
mod suggest;
mod time_pattern;
mod types;
mod uri;
mod validator;

pub use cache::ModelCache;
pub use catalog::{endpoint_component_name, Catalog, SIMPLE_LANGUAGE};
pub use error::{CatalogError, SchemaError, SourceError};
pub use expression::{
    validate_expression, ExpressionParser, ExpressionSyntaxError, ExpressionValidation,
    PositionalError,
};
pub use linter::{lint, lint_file, Diagnostic, FileResult, FileStatus, LintResult, Severity};
pub use loader::{is_url, DirectorySchemaSource, InMemorySchemaSource, SchemaKind, SchemaSource};
pub use model::{
    ComponentModel, OptionKind, PropertyMeta, PropertyType, SyntaxSegment, SyntaxTemplate,
};
pub use result::ValidationResult;
pub use rows::{parse_json_schema, SchemaDocument, SchemaRow, SchemaValue};
pub use suggest::{LevenshteinSuggestions, SuggestionStrategy};
pub use time_pattern::{parse_time_pattern, validate_time_pattern};
pub use types::{ExpressionMode, ValidateOptions, QUERY_DELIMITER, XML_QUERY_DELIMITER};
pub use uri::{build_endpoint_uri, endpoint_lenient_properties, parse_endpoint_uri};
pub use validator::validate_properties;

#[cfg(feature = "remote")]
pub use loader::RemoteSchemaSource;
