//! Schema sources: where the catalog fetches raw schema text from.
//!
//! Handles in-memory registries, catalog directories on disk, and HTTP/HTTPS
//! catalog servers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::SourceError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Kind of schema document held by a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Component,
    Model,
    DataFormat,
    Language,
}

impl SchemaKind {
    /// Catalog subdirectory (or URL path segment) holding this kind.
    pub fn dir_name(self) -> &'static str {
        match self {
            SchemaKind::Component => "components",
            SchemaKind::Model => "models",
            SchemaKind::DataFormat => "dataformats",
            SchemaKind::Language => "languages",
        }
    }
}

/// Provides raw schema text by name.
///
/// A missing schema is `Ok(None)`; errors are reserved for sources that could
/// not be read at all.
pub trait SchemaSource: Send + Sync {
    fn component_schema(&self, scheme: &str) -> Result<Option<String>, SourceError>;

    fn model_schema(&self, name: &str) -> Result<Option<String>, SourceError>;

    fn data_format_schema(&self, _name: &str) -> Result<Option<String>, SourceError> {
        Ok(None)
    }

    fn language_schema(&self, _name: &str) -> Result<Option<String>, SourceError> {
        Ok(None)
    }
}

/// Schema source backed by in-memory maps, mostly useful for tests and
/// embedding a fixed catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemaSource {
    schemas: HashMap<(SchemaKind, String), String>,
}

impl InMemorySchemaSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, scheme: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(SchemaKind::Component, scheme, text);
        self
    }

    pub fn with_model(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(SchemaKind::Model, name, text);
        self
    }

    pub fn with_data_format(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(SchemaKind::DataFormat, name, text);
        self
    }

    pub fn with_language(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(SchemaKind::Language, name, text);
        self
    }

    pub fn insert(&mut self, kind: SchemaKind, name: impl Into<String>, text: impl Into<String>) {
        self.schemas.insert((kind, name.into()), text.into());
    }

    fn get(&self, kind: SchemaKind, name: &str) -> Option<String> {
        self.schemas.get(&(kind, name.to_string())).cloned()
    }
}

impl SchemaSource for InMemorySchemaSource {
    fn component_schema(&self, scheme: &str) -> Result<Option<String>, SourceError> {
        Ok(self.get(SchemaKind::Component, scheme))
    }

    fn model_schema(&self, name: &str) -> Result<Option<String>, SourceError> {
        Ok(self.get(SchemaKind::Model, name))
    }

    fn data_format_schema(&self, name: &str) -> Result<Option<String>, SourceError> {
        Ok(self.get(SchemaKind::DataFormat, name))
    }

    fn language_schema(&self, name: &str) -> Result<Option<String>, SourceError> {
        Ok(self.get(SchemaKind::Language, name))
    }
}

/// Schema source reading `<root>/<kind>/<name>.json` files.
///
/// ```text
/// catalog/
///   components/timer.json
///   models/aggregate.json
///   dataformats/csv.json
///   languages/simple.json
/// ```
#[derive(Debug, Clone)]
pub struct DirectorySchemaSource {
    root: PathBuf,
}

impl DirectorySchemaSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a schema file. `None` for names that would escape the catalog.
    pub fn schema_path(&self, kind: SchemaKind, name: &str) -> Option<PathBuf> {
        if !is_plain_name(name) {
            return None;
        }
        Some(
            self.root
                .join(kind.dir_name())
                .join(format!("{name}.json")),
        )
    }

    fn load(&self, kind: SchemaKind, name: &str) -> Result<Option<String>, SourceError> {
        let Some(path) = self.schema_path(kind, name) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| SourceError::Read { path, source })
    }
}

impl SchemaSource for DirectorySchemaSource {
    fn component_schema(&self, scheme: &str) -> Result<Option<String>, SourceError> {
        self.load(SchemaKind::Component, scheme)
    }

    fn model_schema(&self, name: &str) -> Result<Option<String>, SourceError> {
        self.load(SchemaKind::Model, name)
    }

    fn data_format_schema(&self, name: &str) -> Result<Option<String>, SourceError> {
        self.load(SchemaKind::DataFormat, name)
    }

    fn language_schema(&self, name: &str) -> Result<Option<String>, SourceError> {
        self.load(SchemaKind::Language, name)
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(&['/', '\\'][..]) && !name.contains("..")
}

/// Schema source fetching `<base>/<kind>/<name>.json` over HTTP/HTTPS.
///
/// Requires the `remote` feature (enabled by default). A 404 response means
/// the schema does not exist; other failures are errors.
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct RemoteSchemaSource {
    base: url::Url,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "remote")]
impl RemoteSchemaSource {
    /// Create a source for a catalog base URL.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Network` if the HTTP client cannot be built, or
    /// `SourceError::InvalidUrl` if the base is not an absolute URL.
    pub fn new(base: &str) -> Result<Self, SourceError> {
        // a trailing slash keeps the last path segment when joining
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let base = url::Url::parse(&normalized).map_err(|source| SourceError::InvalidUrl {
            url: normalized.clone(),
            source,
        })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|source| SourceError::Network {
                url: base.to_string(),
                source,
            })?;

        Ok(Self { base, client })
    }

    /// URL of a schema document. `None` for names that would escape the catalog.
    pub fn schema_url(&self, kind: SchemaKind, name: &str) -> Option<url::Url> {
        if !is_plain_name(name) {
            return None;
        }
        self.base
            .join(&format!("{}/{name}.json", kind.dir_name()))
            .ok()
    }

    fn fetch(&self, kind: SchemaKind, name: &str) -> Result<Option<String>, SourceError> {
        let Some(url) = self.schema_url(kind, name) else {
            return Ok(None);
        };
        let network = |source| SourceError::Network {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url.clone()).send().map_err(network)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        // Check for HTTP errors before reading the body
        let response = response.error_for_status().map_err(network)?;
        response.text().map(Some).map_err(network)
    }
}

#[cfg(feature = "remote")]
impl SchemaSource for RemoteSchemaSource {
    fn component_schema(&self, scheme: &str) -> Result<Option<String>, SourceError> {
        self.fetch(SchemaKind::Component, scheme)
    }

    fn model_schema(&self, name: &str) -> Result<Option<String>, SourceError> {
        self.fetch(SchemaKind::Model, name)
    }

    fn data_format_schema(&self, name: &str) -> Result<Option<String>, SourceError> {
        self.fetch(SchemaKind::DataFormat, name)
    }

    fn language_schema(&self, name: &str) -> Result<Option<String>, SourceError> {
        self.fetch(SchemaKind::Language, name)
    }
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}
