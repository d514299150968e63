//! The catalog facade.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::cache::ModelCache;
use crate::error::{CatalogError, SourceError};
use crate::expression::{validate_expression, ExpressionParser, ExpressionValidation};
use crate::loader::SchemaSource;
use crate::model::ComponentModel;
use crate::result::ValidationResult;
use crate::rows::SchemaDocument;
use crate::suggest::SuggestionStrategy;
use crate::types::{ExpressionMode, ValidateOptions, QUERY_DELIMITER, XML_QUERY_DELIMITER};
use crate::uri;
use crate::validator;

/// Name of the built-in expression language whose `{{placeholders}}` are
/// masked before parsing.
pub const SIMPLE_LANGUAGE: &str = "simple";

/// Endpoint catalog over a schema source.
///
/// Component models are built on first use and cached for the lifetime of
/// the catalog. `Catalog` is `Send + Sync` and may be shared across threads.
pub struct Catalog {
    source: Arc<dyn SchemaSource>,
    cache: ModelCache,
    languages: HashMap<String, Arc<dyn ExpressionParser>>,
    suggestions: Option<Arc<dyn SuggestionStrategy>>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("cached_models", &self.cache.len())
            .field("languages", &self.languages.keys().collect::<Vec<_>>())
            .field("suggestions", &self.suggestions.is_some())
            .finish()
    }
}

impl Catalog {
    pub fn new(source: impl SchemaSource + 'static) -> Self {
        Self::from_arc(Arc::new(source))
    }

    pub fn from_arc(source: Arc<dyn SchemaSource>) -> Self {
        Self {
            source,
            cache: ModelCache::new(),
            languages: HashMap::new(),
            suggestions: None,
        }
    }

    /// Register the parser for an expression language.
    pub fn with_language(
        mut self,
        name: impl Into<String>,
        parser: Arc<dyn ExpressionParser>,
    ) -> Self {
        self.languages.insert(name.into(), parser);
        self
    }

    /// Enable "did you mean" suggestions for unknown options and enum values.
    pub fn with_suggestion_strategy(mut self, strategy: Arc<dyn SuggestionStrategy>) -> Self {
        self.suggestions = Some(strategy);
        self
    }

    /// The component model for a scheme.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownComponent` if the source has no schema for
    /// the scheme, `CatalogError::Schema` or `CatalogError::MissingSyntax` if
    /// the schema is unusable, or `CatalogError::Source` if it cannot be read.
    pub fn component_model(&self, scheme: &str) -> Result<Arc<ComponentModel>, CatalogError> {
        self.find_model(scheme)?
            .ok_or_else(|| CatalogError::UnknownComponent {
                scheme: scheme.to_string(),
            })
    }

    fn find_model(&self, scheme: &str) -> Result<Option<Arc<ComponentModel>>, CatalogError> {
        self.cache.get_or_try_build(scheme, || {
            let Some(text) = self
                .source
                .component_schema(scheme)
                .map_err(|e| source_failure(scheme, e))?
            else {
                tracing::debug!(scheme, "no component schema");
                return Ok(None);
            };
            let document = SchemaDocument::parse(&text).map_err(|source| CatalogError::Schema {
                name: scheme.to_string(),
                source,
            })?;
            ComponentModel::from_document(scheme, &document).map(Some)
        })
    }

    /// Build an endpoint URI with `&` between query parameters.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownComponent` for an unknown scheme, or any
    /// error from loading its model.
    pub fn as_endpoint_uri(
        &self,
        scheme: &str,
        properties: &IndexMap<String, String>,
        encode: bool,
    ) -> Result<String, CatalogError> {
        let model = self.component_model(scheme)?;
        Ok(uri::build_endpoint_uri(&model, properties, QUERY_DELIMITER, encode))
    }

    /// Build an endpoint URI for embedding in XML (`&amp;` between query
    /// parameters).
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::as_endpoint_uri`].
    pub fn as_endpoint_uri_xml(
        &self,
        scheme: &str,
        properties: &IndexMap<String, String>,
        encode: bool,
    ) -> Result<String, CatalogError> {
        let model = self.component_model(scheme)?;
        Ok(uri::build_endpoint_uri(
            &model,
            properties,
            XML_QUERY_DELIMITER,
            encode,
        ))
    }

    /// Parse an endpoint URI into its options.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::IncapableOfParsing` for URIs without a usable
    /// scheme, `CatalogError::UnknownComponent` for unknown schemes, or any
    /// error from loading the model.
    pub fn endpoint_properties(&self, uri: &str) -> Result<IndexMap<String, String>, CatalogError> {
        let model = self.model_for_uri(uri)?;
        uri::parse_endpoint_uri(&model, uri)
    }

    /// Query parameters of a URI that its component does not declare.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::endpoint_properties`].
    pub fn endpoint_lenient_properties(
        &self,
        uri: &str,
    ) -> Result<IndexMap<String, String>, CatalogError> {
        let model = self.model_for_uri(uri)?;
        uri::endpoint_lenient_properties(&model, uri)
    }

    fn model_for_uri(&self, uri: &str) -> Result<Arc<ComponentModel>, CatalogError> {
        let scheme = endpoint_component_name(uri).ok_or_else(|| CatalogError::IncapableOfParsing {
            uri: uri.to_string(),
        })?;
        self.component_model(scheme)
    }

    /// The scheme of an endpoint URI.
    pub fn endpoint_component_name<'a>(&self, uri: &'a str) -> Option<&'a str> {
        endpoint_component_name(uri)
    }

    /// Validate an endpoint URI.
    ///
    /// URIs that cannot be parsed and unknown schemes are reported in the
    /// result, not as errors.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Source` or `CatalogError::Schema` if the
    /// component schema cannot be loaded.
    pub fn validate_endpoint_properties(
        &self,
        uri: &str,
        options: &ValidateOptions,
    ) -> Result<ValidationResult, CatalogError> {
        let mut result = ValidationResult::new(uri);

        let Some(scheme) = endpoint_component_name(uri) else {
            result.incapable = Some(uri.to_string());
            return Ok(result);
        };
        let Some(model) = self.find_model(scheme)? else {
            result.unknown_component = Some(scheme.to_string());
            return Ok(result);
        };

        let properties = match uri::parse_endpoint_uri(&model, uri) {
            Ok(properties) => properties,
            Err(CatalogError::IncapableOfParsing { uri }) => {
                result.incapable = Some(uri);
                return Ok(result);
            }
            Err(e) => {
                result.syntax_error = Some(e.to_string());
                return Ok(result);
            }
        };

        validator::validate_properties(
            &model,
            &properties,
            options,
            self.suggestions.as_deref(),
            &mut result,
        );
        Ok(result)
    }

    /// Validate a property map for a scheme without building a URI.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::validate_endpoint_properties`].
    pub fn validate_properties(
        &self,
        scheme: &str,
        properties: &IndexMap<String, String>,
        options: &ValidateOptions,
    ) -> Result<ValidationResult, CatalogError> {
        let mut result = ValidationResult::new(scheme);
        let Some(model) = self.find_model(scheme)? else {
            result.unknown_component = Some(scheme.to_string());
            return Ok(result);
        };
        validator::validate_properties(
            &model,
            properties,
            options,
            self.suggestions.as_deref(),
            &mut result,
        );
        Ok(result)
    }

    pub fn validate_time_pattern(&self, text: &str) -> bool {
        crate::time_pattern::validate_time_pattern(text)
    }

    /// Validate a simple language expression.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownLanguage` if no parser is registered for
    /// the simple language.
    pub fn validate_simple_expression(
        &self,
        text: &str,
    ) -> Result<ExpressionValidation, CatalogError> {
        self.validate_language(SIMPLE_LANGUAGE, text, ExpressionMode::Expression)
    }

    /// Validate a simple language predicate.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::validate_simple_expression`].
    pub fn validate_simple_predicate(
        &self,
        text: &str,
    ) -> Result<ExpressionValidation, CatalogError> {
        self.validate_language(SIMPLE_LANGUAGE, text, ExpressionMode::Predicate)
    }

    /// Validate an expression in a registered language.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownLanguage` if no parser is registered for
    /// `language`.
    pub fn validate_language_expression(
        &self,
        language: &str,
        text: &str,
    ) -> Result<ExpressionValidation, CatalogError> {
        self.validate_language(language, text, ExpressionMode::Expression)
    }

    /// Validate a predicate in a registered language.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::validate_language_expression`].
    pub fn validate_language_predicate(
        &self,
        language: &str,
        text: &str,
    ) -> Result<ExpressionValidation, CatalogError> {
        self.validate_language(language, text, ExpressionMode::Predicate)
    }

    fn validate_language(
        &self,
        language: &str,
        text: &str,
        mode: ExpressionMode,
    ) -> Result<ExpressionValidation, CatalogError> {
        let parser = self
            .languages
            .get(language)
            .ok_or_else(|| CatalogError::UnknownLanguage {
                name: language.to_string(),
            })?;
        let validation =
            validate_expression(parser.as_ref(), text, mode, language == SIMPLE_LANGUAGE);
        if let Some(error) = &validation.error {
            tracing::debug!(language, index = ?error.index, "{}", error.short_message);
        }
        Ok(validation)
    }

    /// Raw schema text of a component.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownComponent` if there is none, or
    /// `CatalogError::Source` if it cannot be read.
    pub fn component_json_schema(&self, scheme: &str) -> Result<String, CatalogError> {
        self.source
            .component_schema(scheme)
            .map_err(|e| source_failure(scheme, e))?
            .ok_or_else(|| CatalogError::UnknownComponent {
                scheme: scheme.to_string(),
            })
    }

    /// Raw schema text of a model.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownModel` if there is none, or
    /// `CatalogError::Source` if it cannot be read.
    pub fn model_json_schema(&self, name: &str) -> Result<String, CatalogError> {
        self.source
            .model_schema(name)
            .map_err(|e| source_failure(name, e))?
            .ok_or_else(|| CatalogError::UnknownModel {
                name: name.to_string(),
            })
    }

    /// Raw schema text of a data format.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownDataFormat` if there is none, or
    /// `CatalogError::Source` if it cannot be read.
    pub fn data_format_json_schema(&self, name: &str) -> Result<String, CatalogError> {
        self.source
            .data_format_schema(name)
            .map_err(|e| source_failure(name, e))?
            .ok_or_else(|| CatalogError::UnknownDataFormat {
                name: name.to_string(),
            })
    }

    /// Raw schema text of a language.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownLanguage` if there is none, or
    /// `CatalogError::Source` if it cannot be read.
    pub fn language_json_schema(&self, name: &str) -> Result<String, CatalogError> {
        self.source
            .language_schema(name)
            .map_err(|e| source_failure(name, e))?
            .ok_or_else(|| CatalogError::UnknownLanguage {
                name: name.to_string(),
            })
    }
}

fn source_failure(name: &str, error: SourceError) -> CatalogError {
    tracing::warn!(name, error = %error, "schema source failed");
    CatalogError::Source(error)
}

/// The scheme of an endpoint URI: the text before the first `:` or `?`.
///
/// Returns `None` when there is no scheme or it is an unresolved
/// `{{placeholder}}`.
pub fn endpoint_component_name(uri: &str) -> Option<&str> {
    uri::split_scheme(uri).map(|(scheme, _)| scheme)
}
