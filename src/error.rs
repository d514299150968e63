//! Error types for catalog schema parsing, schema sources and catalog operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while tokenizing a schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The text is not a JSON object document. `source` is absent when the
    /// text parsed but the root was not an object.
    #[error("Cannot parse json")]
    Malformed {
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl SchemaError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors raised by a schema source while fetching schema text.
///
/// A missing schema is not an error; sources report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors from catalog operations.
///
/// Validation problems are never reported through this type; they are
/// collected in a [`ValidationResult`](crate::ValidationResult).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown component: {scheme}")]
    UnknownComponent { scheme: String },

    #[error("unknown model: {name}")]
    UnknownModel { name: String },

    #[error("unknown data format: {name}")]
    UnknownDataFormat { name: String },

    #[error("Unknown language {name}")]
    UnknownLanguage { name: String },

    #[error("endpoint with scheme {scheme} has no syntax defined in the json schema")]
    MissingSyntax { scheme: String },

    #[error("incapable of parsing uri: {uri}")]
    IncapableOfParsing { uri: String },

    #[error("invalid schema for {name}: {source}")]
    Schema {
        name: String,
        #[source]
        source: SchemaError,
    },

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl SourceError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        3
    }
}

impl CatalogError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CatalogError::Source(e) => e.exit_code(),
            CatalogError::Schema { source, .. } => source.exit_code(),
            CatalogError::IncapableOfParsing { .. } => 1,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_schema_message() {
        let source = serde_json::from_str::<serde_json::Value>("{ \"a\": b }").unwrap_err();
        let err = SchemaError::Malformed {
            source: Some(source),
        };
        assert_eq!(err.to_string(), "Cannot parse json");
    }

    #[test]
    fn catalog_error_exit_codes() {
        let err = CatalogError::Source(SourceError::Read {
            path: PathBuf::from("components/file.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert_eq!(err.exit_code(), 3);

        let err = CatalogError::UnknownComponent {
            scheme: "foo".into(),
        };
        assert_eq!(err.exit_code(), 2);

        let err = CatalogError::IncapableOfParsing {
            uri: "{{getFtpUrl}}?recursive=true".into(),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn unknown_language_display() {
        let err = CatalogError::UnknownLanguage {
            name: "foobar".into(),
        };
        assert_eq!(err.to_string(), "Unknown language foobar");
    }
}
