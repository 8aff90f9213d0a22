//! Content sanitization and dangerous-pattern detection.
//!
//! Everything a client can submit for display (post titles and bodies,
//! responses, templates) is HTML-escaped before it is stored. Escaping never
//! fails. [`validate_input_safety`] is a separate, stricter check that runs on
//! the raw text and lets callers refuse obvious injection attempts outright.

use std::sync::LazyLock;

use regex::RegexSet;
use serde_json::Value;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Error message returned when the denylist matches.
pub const DANGEROUS_PATTERN_MESSAGE: &str = "Potentially dangerous pattern detected";

/// Filename used when sanitization leaves nothing behind.
pub const FALLBACK_FILENAME: &str = "uploaded_file";

const DANGEROUS_PATTERNS: &[&str] = &[
    // Script tags
    r"(?i)<script[^>]*>",
    // Inline event handlers: onerror=, onclick =, ...
    r"(?i)\bon\w+\s*=",
    r"(?i)javascript:",
    r"(?i)data:text/html",
    // Legacy IE CSS expressions
    r"(?i)expression\s*\(",
    r"(?i)vbscript:",
    // Executable and shell-script extensions
    r"(?i)\.(exe|vbs|bat|cmd|ps1|sh|bash|zsh)\b",
];

static DANGEROUS_RE: LazyLock<RegexSet> =
    LazyLock::new(|| RegexSet::new(DANGEROUS_PATTERNS).expect("valid regex"));

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

/// HTML-escape `input`.
///
/// `&` becomes `&amp;` and `< > " ' ` /` become their entity forms. Each
/// character is visited once, so existing entities are escaped again
/// (`&lt;` becomes `&amp;lt;`).
pub fn sanitize_input(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '`' => out.push_str("&#96;"),
            '/' => out.push_str("&#47;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape every string leaf in a JSON graph. Keys and non-string values are
/// left alone.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_input(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, v)| (key, sanitize_value(v)))
                .collect(),
        ),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Denylist
// ---------------------------------------------------------------------------

/// Reject raw input that matches a known injection pattern.
///
/// Must run before [`sanitize_input`]: escaping rewrites `<` and `/`, after
/// which `<script>` no longer matches.
pub fn validate_input_safety(input: &str) -> Result<(), CoreError> {
    if input.is_empty() || !DANGEROUS_RE.is_match(input) {
        return Ok(());
    }
    Err(CoreError::Validation(DANGEROUS_PATTERN_MESSAGE.to_string()))
}

/// Boolean form of [`validate_input_safety`].
pub fn is_input_safe(input: &str) -> bool {
    validate_input_safety(input).is_ok()
}

// ---------------------------------------------------------------------------
// Field wrappers
// ---------------------------------------------------------------------------

/// Escaped post fields, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub body_content: String,
    pub excerpt: Option<String>,
}

/// Escape the displayable fields of a post. An empty excerpt is dropped.
pub fn sanitize_post_content(title: &str, body_content: &str, excerpt: Option<&str>) -> PostContent {
    PostContent {
        title: sanitize_input(title),
        body_content: sanitize_input(body_content),
        excerpt: excerpt.filter(|e| !e.is_empty()).map(sanitize_input),
    }
}

pub fn sanitize_response_content(content: &str) -> String {
    sanitize_input(content)
}

/// Escape template content. `{{placeholder}}` tokens survive untouched since
/// braces are not HTML-special.
pub fn sanitize_template_content(content: &str) -> String {
    sanitize_input(content)
}

// ---------------------------------------------------------------------------
// Filenames
// ---------------------------------------------------------------------------

/// Make a client-supplied filename safe to write to disk.
///
/// Strips `../` and doubled backslashes, replaces `< > : " / \ | ? *` with
/// `_`, drops control characters and trims. Returns [`FALLBACK_FILENAME`] if
/// nothing is left and prefixes hidden names with `file_`.
pub fn sanitize_filename(filename: &str) -> String {
    let stripped = filename.replace("../", "").replace("\\\\", "");

    let sanitized: String = stripped
        .chars()
        .filter(|c| !c.is_ascii_control())
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect();
    let sanitized = sanitized.trim();

    if sanitized.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }
    if sanitized.starts_with('.') {
        return format!("file_{sanitized}");
    }
    sanitized.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
