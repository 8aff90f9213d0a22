//! Response-template placeholders.
//!
//! Templates reference values with `{{name}}` tokens (whitespace inside the
//! braces is tolerated). Names start with a letter or underscore.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::security::sanitize_input;

/// Regex pattern matching `{{placeholder}}` tokens; group 1 is the name.
pub const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex"));

/// Maximum number of placeholders a template may declare.
pub const MAX_PLACEHOLDERS: usize = 20;

/// Distinct placeholder names in order of first appearance.
pub fn extract_placeholders(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Substitute known placeholders. Tokens with no value are left as written.
///
/// `content` is stored template text and is already escaped; values are
/// escaped here so the rendered text is uniformly escaped.
pub fn render(content: &str, values: &HashMap<String, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(content, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => sanitize_input(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Placeholder names referenced by `content` but missing from `values`.
pub fn missing_placeholders(content: &str, values: &HashMap<String, String>) -> Vec<String> {
    extract_placeholders(content)
        .into_iter()
        .filter(|name| !values.contains_key(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn extracts_in_order_of_first_appearance() {
        let content = "Hi {{authorName}}, ticket {{ ticket_id }} for {{authorName}}";
        assert_eq!(extract_placeholders(content), vec!["authorName", "ticket_id"]);
    }

    #[test]
    fn ignores_single_braces_and_invalid_names() {
        assert!(extract_placeholders("{name} {{1abc}} {{}}").is_empty());
    }

    #[test]
    fn renders_known_and_keeps_unknown() {
        let rendered = render(
            "Hi {{authorName}}, see {{link}}",
            &values(&[("authorName", "Sam")]),
        );
        assert_eq!(rendered, "Hi Sam, see {{link}}");
    }

    #[test]
    fn renders_with_inner_whitespace() {
        assert_eq!(
            render("Hello {{ name }}!", &values(&[("name", "Ada")])),
            "Hello Ada!"
        );
    }

    #[test]
    fn escapes_values_but_not_stored_content() {
        let stored = crate::security::sanitize_template_content("Hi {{name}}, it's fixed");
        let rendered = render(
            &stored,
            &values(&[("name", "<script>alert('x')</script>")]),
        );
        assert_eq!(
            rendered,
            "Hi &lt;script&gt;alert(&#39;x&#39;)&lt;&#47;script&gt;, it&#39;s fixed"
        );
    }

    #[test]
    fn reports_missing_values() {
        assert_eq!(
            missing_placeholders("{{a}} {{b}}", &values(&[("a", "1")])),
            vec!["b"]
        );
    }
}
