//! Adapter from an external expression parser's failures to positional errors.
//!
//! The catalog does not parse expressions itself. Callers register a parser per
//! language; its syntax errors carry a message of the form
//! `"<description> at location <N>"` and, usually, the offset `N`.

use serde::Serialize;

use crate::types::ExpressionMode;

const LOCATION_MARKER: &str = " at location ";

/// Failure reported by an [`ExpressionParser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionSyntaxError {
    pub message: String,
    /// 0-based character offset, when the parser knows it.
    pub index: Option<usize>,
}

impl ExpressionSyntaxError {
    pub fn new(message: impl Into<String>, index: Option<usize>) -> Self {
        Self {
            message: message.into(),
            index,
        }
    }
}

/// Parser for one embedded expression language.
pub trait ExpressionParser: Send + Sync {
    fn parse(&self, text: &str, mode: ExpressionMode) -> Result<(), ExpressionSyntaxError>;
}

impl<F> ExpressionParser for F
where
    F: Fn(&str, ExpressionMode) -> Result<(), ExpressionSyntaxError> + Send + Sync,
{
    fn parse(&self, text: &str, mode: ExpressionMode) -> Result<(), ExpressionSyntaxError> {
        self(text, mode)
    }
}

/// An error located in the validated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionalError {
    pub message: String,
    /// The message without its `at location N` suffix.
    pub short_message: String,
    /// 0-based character offset; never past the end of the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl PositionalError {
    /// Build from a raw parser message, clamping the offset into `text`.
    pub fn from_message(text: &str, message: String, index: Option<usize>) -> Self {
        let short_message = short_message(&message).to_string();
        let index = index
            .or_else(|| location_index(&message))
            .map(|i| i.min(text.chars().count()));
        Self {
            message,
            short_message,
            index,
        }
    }
}

/// Outcome of validating an expression or predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionValidation {
    /// The text as given by the caller.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PositionalError>,
}

impl ExpressionValidation {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Message text before `" at location "`, or the whole message.
pub fn short_message(message: &str) -> &str {
    match message.find(LOCATION_MARKER) {
        Some(idx) if idx > 0 => &message[..idx],
        _ => message,
    }
}

/// Offset following `" at location "` in a message.
pub fn location_index(message: &str) -> Option<usize> {
    let idx = message.find(LOCATION_MARKER)?;
    let tail = &message[idx + LOCATION_MARKER.len()..];
    let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
    tail[..digits].parse().ok()
}

/// Validate text with an external parser.
///
/// With `mask_placeholders`, `{{name}}` property placeholders are rewritten to
/// the same-length `~^name^~` before parsing (the parser has no placeholder
/// support) and restored in the error message. Offsets are unaffected.
pub fn validate_expression(
    parser: &dyn ExpressionParser,
    text: &str,
    mode: ExpressionMode,
    mask_placeholders: bool,
) -> ExpressionValidation {
    let input = if mask_placeholders {
        mask(text)
    } else {
        text.to_string()
    };

    let error = parser.parse(&input, mode).err().map(|err| {
        let message = if mask_placeholders {
            unmask(&err.message)
        } else {
            err.message
        };
        PositionalError::from_message(text, message, err.index)
    });

    ExpressionValidation {
        text: text.to_string(),
        error,
    }
}

fn mask(text: &str) -> String {
    replace_delimited(text, "{{", "}}", "~^", "^~")
}

fn unmask(text: &str) -> String {
    replace_delimited(text, "~^", "^~", "{{", "}}")
}

/// Replace each `open..close` pair with `new_open..new_close`, keeping the
/// enclosed text. Unterminated openers are left alone.
fn replace_delimited(text: &str, open: &str, close: &str, new_open: &str, new_close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(open) {
        let after = &rest[start + open.len()..];
        let Some(end) = after.find(close) else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(new_open);
        out.push_str(&after[..end]);
        out.push_str(new_close);
        rest = &after[end + close.len()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing(message: &'static str, index: Option<usize>) -> impl ExpressionParser {
        move |_: &str, _: ExpressionMode| Err(ExpressionSyntaxError::new(message, index))
    }

    #[test]
    fn success_echoes_text() {
        let parser = |_: &str, _: ExpressionMode| Ok(());
        let result = validate_expression(&parser, "${body}", ExpressionMode::Expression, true);
        assert!(result.is_success());
        assert_eq!(result.text, "${body}");
    }

    #[test]
    fn strips_location_suffix() {
        let parser = failing("expected symbol functionEnd but was eol at location 5", Some(5));
        let result = validate_expression(&parser, "${body", ExpressionMode::Expression, true);
        let error = result.error.unwrap();
        assert_eq!(error.short_message, "expected symbol functionEnd but was eol");
        assert_eq!(error.index, Some(5));
        assert!(error.message.starts_with("expected symbol functionEnd but was eol at location 5"));
    }

    #[test]
    fn index_falls_back_to_message() {
        let parser = failing("expected symbol functionEnd but was eol at location 22\n*", None);
        let result = validate_expression(
            &parser,
            "${body} > ${header.size",
            ExpressionMode::Predicate,
            true,
        );
        assert_eq!(result.error.unwrap().index, Some(22));
    }

    #[test]
    fn index_is_clamped_into_text() {
        let parser = failing("unexpected end at location 99", None);
        let result = validate_expression(&parser, "${x", ExpressionMode::Expression, false);
        assert_eq!(result.error.unwrap().index, Some(3));
    }

    #[test]
    fn message_without_location() {
        let error = PositionalError::from_message("x", "boom".to_string(), None);
        assert_eq!(error.short_message, "boom");
        assert_eq!(error.index, None);
    }

    #[test]
    fn placeholders_are_masked_with_same_length() {
        let seen = std::sync::Mutex::new(String::new());
        let parser = |text: &str, _: ExpressionMode| {
            *seen.lock().unwrap() = text.to_string();
            Err(ExpressionSyntaxError::new(
                format!("Unknown function: bdy at location 0\n{text}\n*"),
                Some(0),
            ))
        };
        let text = "${bdy} contains '{{danger}}'";
        let result = validate_expression(&parser, text, ExpressionMode::Predicate, true);

        let parsed = seen.lock().unwrap().clone();
        assert_eq!(parsed, "${bdy} contains '~^danger^~'");
        assert_eq!(parsed.len(), text.len());

        let error = result.error.unwrap();
        assert!(error.message.contains("'{{danger}}'"));
        assert_eq!(error.short_message, "Unknown function: bdy");
        assert_eq!(error.index, Some(0));
    }

    #[test]
    fn unterminated_placeholder_is_kept() {
        assert_eq!(mask("a {{b"), "a {{b");
        assert_eq!(mask("{{a}} and {{b}}"), "~^a^~ and ~^b^~");
    }
}
