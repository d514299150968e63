//! Endpoint property validation against a component model.

use indexmap::{IndexMap, IndexSet};

use crate::model::{ComponentModel, OptionKind, PropertyMeta, PropertyType};
use crate::result::ValidationResult;
use crate::suggest::SuggestionStrategy;
use crate::time_pattern::validate_time_pattern;
use crate::types::{is_placeholder, is_reference, is_value_placeholder, ValidateOptions};

/// Validate a property map against a component model.
///
/// Problems are added to `result`; nothing is thrown. Unknown names on a
/// lenient component are recorded as lenient instead of unknown, but options
/// the component does declare are type checked either way.
pub fn validate_properties(
    model: &ComponentModel,
    properties: &IndexMap<String, String>,
    options: &ValidateOptions,
    suggest: Option<&dyn SuggestionStrategy>,
    result: &mut ValidationResult,
) {
    let lenient = effective_leniency(model, options);
    let mut seen: IndexSet<&str> = IndexSet::new();

    for (name, value) in properties {
        if is_placeholder(name) {
            continue;
        }

        let Some(meta) = model.resolve_property(name) else {
            if lenient {
                result.add_lenient(name);
            } else {
                result.add_unknown(name);
                if let Some(strategy) = suggest {
                    let names: Vec<&str> = model.properties.keys().map(String::as_str).collect();
                    result.add_unknown_suggestions(name, strategy.suggest(&names, name));
                }
            }
            continue;
        };

        if !value.is_empty() {
            seen.insert(meta.name.as_str());
        }
        check_value(meta, name, value, options, suggest, result);
    }

    for meta in model.properties.values() {
        if !meta.required || seen.contains(meta.name.as_str()) {
            continue;
        }
        let has_default = meta
            .default_value
            .as_deref()
            .map(|d| !d.is_empty())
            .unwrap_or(false);
        if !has_default {
            result.add_required(&meta.name);
        }
    }

    tracing::debug!(
        scheme = %model.scheme,
        errors = result.number_of_errors(),
        "validated endpoint properties"
    );
}

/// Leniency after applying the caller's options.
///
/// A component that can both consume and produce is never lenient when
/// validated as a consumer.
pub fn effective_leniency(model: &ComponentModel, options: &ValidateOptions) -> bool {
    if model.can_consume_and_produce() && options.consumer_only {
        return false;
    }
    model.lenient && !options.ignore_lenient
}

fn check_value(
    meta: &PropertyMeta,
    written_name: &str,
    value: &str,
    options: &ValidateOptions,
    suggest: Option<&dyn SuggestionStrategy>,
    result: &mut ValidationResult,
) {
    let name = meta.name.as_str();

    if meta.kind == OptionKind::Parameter {
        if options.consumer_only {
            if meta.producer_only {
                result.add_not_consumer_only(name);
            }
        } else if options.producer_only && meta.consumer_only {
            result.add_not_producer_only(name);
        }
    }

    if let Some(default) = &meta.default_value {
        result.add_default_value(name, default);
    }

    let placeholder = is_value_placeholder(value);
    let reference = is_reference(value);
    if meta.deprecated && !placeholder && !reference {
        result.add_deprecated(name);
    }

    if meta.required && value.is_empty() {
        result.add_required(name);
    }

    // `scheduler.foo=1`, or the folded `scheduler.foo=1&scheduler.bar=2`
    let multi_value = meta.multi_value
        && meta
            .prefix
            .as_deref()
            .map(|prefix| written_name.starts_with(prefix) || value.starts_with(prefix))
            .unwrap_or(false);
    let checked = !multi_value && !placeholder && !reference;

    if let Some(choices) = &meta.enum_values {
        if checked && !choices.iter().any(|c| c.eq_ignore_ascii_case(value)) {
            result.add_invalid_enum(name, value);
            result.add_invalid_enum_choices(name, choices.clone());
            if let Some(strategy) = suggest {
                let names: Vec<&str> = choices.iter().map(String::as_str).collect();
                result.add_invalid_enum_suggestions(name, strategy.suggest(&names, value));
            }
        }
    }

    if meta.property_type == PropertyType::Object
        && meta.kind != OptionKind::Path
        && meta.enum_values.is_none()
        && !multi_value
        && !placeholder
        && !reference
    {
        result.add_invalid_reference(name, value);
    }

    if !checked {
        return;
    }
    match meta.property_type {
        PropertyType::Boolean => {
            if !value.eq_ignore_ascii_case("true") && !value.eq_ignore_ascii_case("false") {
                result.add_invalid_boolean(name, value);
            }
        }
        PropertyType::Integer => {
            if value.parse::<i64>().is_err() && !validate_time_pattern(value) {
                result.add_invalid_integer(name, value);
            }
        }
        PropertyType::Number => {
            if !value.parse::<f64>().map(|n| !n.is_nan()).unwrap_or(false) {
                result.add_invalid_number(name, value);
            }
        }
        PropertyType::Duration => {
            if !validate_time_pattern(value) {
                result.add_invalid_duration(name, value);
            }
        }
        PropertyType::String | PropertyType::Object => {}
    }
}
