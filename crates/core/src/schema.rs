//! Validation helpers shared by every model and request DTO.
//!
//! Models derive [`validator::Validate`]; [`check`] turns the resulting error
//! tree into a single `CoreError::Validation("<path>: <message>")` so API
//! clients always get one actionable message. Fields are visited in sorted
//! path order, which keeps the reported error stable across runs.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid regex"));

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Validate `value`, returning the first error as a `CoreError::Validation`.
pub fn check<T: Validate>(value: &T) -> Result<(), CoreError> {
    match value.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(CoreError::Validation(
            first_error(&errors).unwrap_or_else(|| "invalid input".to_string()),
        )),
    }
}

/// Render the first error of an error tree as `"<path>: <message>"`.
pub fn first_error(errors: &ValidationErrors) -> Option<String> {
    first_error_at("", errors)
}

fn first_error_at(prefix: &str, errors: &ValidationErrors) -> Option<String> {
    let mut fields: Vec<(String, &ValidationErrorsKind)> = errors
        .errors()
        .iter()
        .map(|(field, kind)| (field.to_string(), kind))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    for (field, kind) in fields {
        let path = join_path(prefix, &field);
        let found = match kind {
            ValidationErrorsKind::Field(list) => list
                .first()
                .map(|err| format!("{path}: {}", describe(err))),
            ValidationErrorsKind::Struct(inner) => first_error_at(&path, inner),
            ValidationErrorsKind::List(items) => items
                .iter()
                .find_map(|(index, inner)| first_error_at(&format!("{path}[{index}]"), inner)),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

/// Human-readable message for a single error, synthesized from its code and
/// params when no explicit message was set.
fn describe(err: &ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }

    let param = |name: &str| err.params.get(name).map(|v| v.to_string());
    match err.code.as_ref() {
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("length must be between {min} and {max}"),
            (Some(min), None) => format!("length must be at least {min}"),
            (None, Some(max)) => format!("length must be at most {max}"),
            (None, None) => "invalid length".to_string(),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("must be between {min} and {max}"),
            (Some(min), None) => format!("must be at least {min}"),
            (None, Some(max)) => format!("must be at most {max}"),
            (None, None) => "out of range".to_string(),
        },
        "email" => "must be a valid email address".to_string(),
        "url" => "must be a valid URL".to_string(),
        "required" => "is required".to_string(),
        code => format!("failed '{code}' check"),
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

// ---------------------------------------------------------------------------
// Custom validators
// ---------------------------------------------------------------------------

/// `#RRGGBB` colour.
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    if HEX_COLOR_RE.is_match(value) {
        Ok(())
    } else {
        Err(error("hex_color", "must be a hex colour like #1A2B3C"))
    }
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("not_blank", "must not be blank"))
    } else {
        Ok(())
    }
}

/// Lower-case words separated by single hyphens.
pub fn validate_slug(value: &str) -> Result<(), ValidationError> {
    if SLUG_RE.is_match(value) {
        Ok(())
    } else {
        Err(error(
            "slug",
            "must contain only lowercase letters, digits and single hyphens",
        ))
    }
}

/// Sentiment scores live in `[-1, 1]`. NaN is rejected.
/// Takes the value by copy: the validator derive passes number fields by value.
pub fn validate_sentiment_score(value: f64) -> Result<(), ValidationError> {
    if (-1.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(error("sentiment_range", "must be between -1 and 1"))
    }
}

/// Embeddings must be non-empty and contain only finite values.
pub fn validate_embedding(values: &[f64]) -> Result<(), ValidationError> {
    if values.is_empty() {
        return Err(error("embedding", "must not be empty"));
    }
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(error("embedding", "must contain only finite numbers"))
    }
}

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Derive a slug from a display name: "Help & Support" -> "help-support".
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Validate)]
    struct Inner {
        #[validate(length(min = 1, max = 3))]
        code: String,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(length(min = 1, max = 10))]
        name: String,
        #[validate(range(min = 0))]
        position: i32,
        #[validate(nested)]
        inner: Inner,
        #[validate(custom(function = "validate_hex_color"))]
        color: String,
    }

    fn valid() -> Outer {
        Outer {
            name: "ok".to_string(),
            position: 1,
            inner: Inner {
                code: "ab".to_string(),
            },
            color: "#AABBCC".to_string(),
        }
    }

    #[test]
    fn valid_value_passes() {
        assert!(check(&valid()).is_ok());
    }

    #[test]
    fn reports_path_and_message() {
        let mut value = valid();
        value.position = -1;
        assert_matches!(
            check(&value),
            Err(CoreError::Validation(msg)) if msg.starts_with("position: must be at least")
        );
    }

    #[test]
    fn reports_first_field_in_sorted_order() {
        let mut value = valid();
        value.name = String::new();
        value.position = -5;
        assert_matches!(
            check(&value),
            Err(CoreError::Validation(msg)) if msg.starts_with("name: length must be between")
        );
    }

    #[test]
    fn nested_errors_use_dotted_path() {
        let mut value = valid();
        value.inner.code = "toolong".to_string();
        assert_matches!(
            check(&value),
            Err(CoreError::Validation(msg)) if msg.starts_with("inner.code: ")
        );
    }

    #[test]
    fn custom_message_is_used() {
        let mut value = valid();
        value.color = "red".to_string();
        assert_matches!(
            check(&value),
            Err(CoreError::Validation(msg)) if msg == "color: must be a hex colour like #1A2B3C"
        );
    }

    #[test]
    fn hex_color() {
        assert!(validate_hex_color("#1a2B3c").is_ok());
        assert!(validate_hex_color("#123").is_err());
        assert!(validate_hex_color("123456").is_err());
        assert!(validate_hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn not_blank() {
        assert!(validate_not_blank("x").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn slug() {
        assert!(validate_slug("bug-reports").is_ok());
        assert!(validate_slug("help2").is_ok());
        assert!(validate_slug("Bug Reports").is_err());
        assert!(validate_slug("double--dash").is_err());
        assert!(validate_slug("-leading").is_err());
    }

    #[test]
    fn sentiment_score_bounds() {
        assert!(validate_sentiment_score(-1.0).is_ok());
        assert!(validate_sentiment_score(1.0).is_ok());
        assert!(validate_sentiment_score(1.01).is_err());
        assert!(validate_sentiment_score(f64::NAN).is_err());
    }

    #[test]
    fn embedding_values() {
        assert!(validate_embedding(&[0.1, -0.2]).is_ok());
        assert!(validate_embedding(&[]).is_err());
        assert!(validate_embedding(&[f64::INFINITY]).is_err());
    }

    #[test]
    fn slugify_names() {
        assert_eq!(slugify("Help & Support"), "help-support");
        assert_eq!(slugify("  Bug Reports "), "bug-reports");
        assert_eq!(slugify("Café"), "caf");
        assert!(validate_slug(&slugify("Policy & Guidelines")).is_ok());
    }
}
