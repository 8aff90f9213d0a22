//! Response suggestions for agents.
//!
//! Builds the prompt a language model would receive, ranks earlier responses
//! by embedding similarity, and produces a deterministic draft reply. No
//! model is called; the draft is a priority-specific canned reply.

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::CoreError;
use crate::post::{Priority, SentimentLabel};

/// Model name reported alongside a generated draft.
pub const SUGGESTION_MODEL: &str = "modus-canned-v1";

/// Earlier responses quoted in a prompt.
pub const MAX_PROMPT_RESPONSES: usize = 3;

/// Templates quoted in a prompt.
pub const MAX_PROMPT_TEMPLATES: usize = 3;

/// Characters kept from each quoted response.
const RESPONSE_EXCERPT_CHARS: usize = 200;

/// The parts of a post a suggestion looks at.
#[derive(Debug, Clone, Copy)]
pub struct SuggestPost<'a> {
    pub title: &'a str,
    pub body_content: &'a str,
    pub priority: Priority,
    pub sentiment_label: SentimentLabel,
    pub author_post_count: i32,
}

impl SuggestPost<'_> {
    /// Authors with at most one post get a welcome.
    pub fn is_first_time_poster(&self) -> bool {
        self.author_post_count <= 1
    }
}

/// Everything a suggestion prompt is built from.
#[derive(Debug, Clone)]
pub struct SuggestContext<'a> {
    pub post: SuggestPost<'a>,
    pub similar_responses: Vec<&'a str>,
    pub templates: Vec<&'a str>,
}

/// Result of `POST /ai/suggest`.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub suggestion: String,
    pub similar_response_count: usize,
    pub template_count: usize,
    /// Rough prompt size: one token per four characters.
    pub tokens_used: usize,
    pub model: &'static str,
}

/// Render the prompt for a suggestion.
pub fn build_suggestion_prompt(context: &SuggestContext<'_>) -> String {
    let post = &context.post;
    let mut prompt = String::from(
        "You are a helpful community moderator assistant. Generate a professional, \
         empathetic response to the following community post.\n\n",
    );

    prompt.push_str("## Post Details\n");
    prompt.push_str(&format!("Title: {}\n", post.title));
    prompt.push_str(&format!("Content: {}\n", post.body_content));
    prompt.push_str(&format!("Priority: {}\n", post.priority));
    prompt.push_str(&format!("Sentiment: {}\n", post.sentiment_label));
    if post.is_first_time_poster() {
        prompt.push_str("Note: This appears to be a first-time poster. Be extra welcoming.\n");
    }

    if !context.similar_responses.is_empty() {
        prompt.push_str("\n## Similar Past Responses (for reference)\n");
        for (i, response) in context
            .similar_responses
            .iter()
            .take(MAX_PROMPT_RESPONSES)
            .enumerate()
        {
            let excerpt: String = response.chars().take(RESPONSE_EXCERPT_CHARS).collect();
            prompt.push_str(&format!("{}. {excerpt}...\n", i + 1));
        }
    }

    if !context.templates.is_empty() {
        prompt.push_str("\n## Available Templates (for inspiration)\n");
        for template in context.templates.iter().take(MAX_PROMPT_TEMPLATES) {
            prompt.push_str(template);
            prompt.push('\n');
        }
    }

    prompt.push_str(
        "\n## Guidelines\n\
         - Be professional yet friendly\n\
         - Address the user's concern directly\n\
         - Provide actionable next steps if applicable\n\
         - Keep the response concise but complete\n\
         - If the sentiment is negative, acknowledge their frustration\n\n\
         Generate a response:",
    );
    prompt
}

/// Cosine similarity of two embeddings. Zero-magnitude vectors score 0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, CoreError> {
    if a.len() != b.len() {
        return Err(CoreError::Validation(format!(
            "embedding: dimensions differ ({} vs {})",
            a.len(),
            b.len()
        )));
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0, 0.0, 0.0), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });
    let magnitude = norm_a.sqrt() * norm_b.sqrt();
    Ok(if magnitude == 0.0 { 0.0 } else { dot / magnitude })
}

/// Order candidates by similarity of their embedding to `target`, most
/// similar first. Candidates without a comparable embedding keep their
/// relative order after the scored ones. Without a target the input order is
/// kept.
pub fn rank_by_similarity<T>(
    target: Option<&[f64]>,
    candidates: Vec<(T, Option<Vec<f64>>)>,
) -> Vec<T> {
    let Some(target) = target else {
        return candidates.into_iter().map(|(item, _)| item).collect();
    };

    let mut scored: Vec<(Option<f64>, T)> = candidates
        .into_iter()
        .map(|(item, embedding)| {
            let score = embedding.and_then(|e| cosine_similarity(target, &e).ok());
            (score, item)
        })
        .collect();

    // Stable sort: equal scores and unscored items keep their order.
    scored.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    scored.into_iter().map(|(_, item)| item).collect()
}

/// A draft reply matched to the post's priority.
///
/// Greeting and closing are picked from the title so the same post always
/// gets the same draft.
pub fn draft_reply(post: &SuggestPost<'_>) -> String {
    const WELCOME: [&str; 3] = [
        "Hi there! Welcome to our community!",
        "Hello! Thanks for reaching out.",
        "Hello!",
    ];
    const GREETING: [&str; 3] = ["Hi!", "Hello!", "Hi there!"];
    const CLOSING: [&str; 3] = [
        "Please let us know if you need any further assistance.",
        "We're here to help if you have any other questions.",
        "Feel free to reach out if you need anything else.",
    ];

    let pick = post.title.chars().count() % 3;
    let greeting = if post.is_first_time_poster() {
        WELCOME[pick]
    } else {
        GREETING[pick]
    };
    let closing = CLOSING[pick];
    let title = post.title;

    let body = match post.priority {
        Priority::P1 => format!(
            "I understand this is a critical issue that needs immediate attention. \
             Thank you for bringing this to our notice.\n\n\
             Our team is looking into \"{title}\" as a top priority. \
             We'll work to resolve this as quickly as possible."
        ),
        Priority::P2 => format!(
            "Thank you for reporting this issue. We understand the importance of \
             resolving this for you.\n\n\
             We're investigating \"{title}\" and will provide an update soon. \
             Your patience is appreciated."
        ),
        Priority::P3 => format!(
            "Thanks for your feedback regarding \"{title}\".\n\n\
             We've noted your input and will review it. If this requires further \
             action, we'll follow up with you."
        ),
        Priority::P4 => format!(
            "Thank you for sharing your thoughts on \"{title}\".\n\n\
             We appreciate your feedback and will take it into consideration as we \
             continue to improve our platform."
        ),
        Priority::P5 => format!(
            "Thanks for reaching out!\n\n\
             We've received your message about \"{title}\" and will review it when \
             possible. We appreciate you taking the time to share this with us."
        ),
    };

    format!("{greeting} {body}\n\n{closing}\n\nBest regards")
}

/// Build the prompt and the draft for a post.
pub fn suggest(context: &SuggestContext<'_>) -> Suggestion {
    let prompt = build_suggestion_prompt(context);
    Suggestion {
        suggestion: draft_reply(&context.post),
        similar_response_count: context.similar_responses.len(),
        template_count: context.templates.len(),
        tokens_used: prompt.chars().count().div_ceil(4),
        model: SUGGESTION_MODEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn post(priority: Priority, author_post_count: i32) -> SuggestPost<'static> {
        SuggestPost {
            title: "Export fails",
            body_content: "The CSV export stops halfway.",
            priority,
            sentiment_label: SentimentLabel::Negative,
            author_post_count,
        }
    }

    fn context(post: SuggestPost<'static>) -> SuggestContext<'static> {
        SuggestContext {
            post,
            similar_responses: Vec::new(),
            templates: Vec::new(),
        }
    }

    #[test]
    fn prompt_carries_post_details() {
        let prompt = build_suggestion_prompt(&context(post(Priority::P2, 7)));
        assert!(prompt.contains("Title: Export fails\n"));
        assert!(prompt.contains("Priority: P2\n"));
        assert!(prompt.contains("Sentiment: negative\n"));
        assert!(!prompt.contains("first-time poster"));
        assert!(!prompt.contains("Similar Past Responses"));
        assert!(prompt.ends_with("Generate a response:"));
    }

    #[test]
    fn prompt_welcomes_first_time_posters() {
        let prompt = build_suggestion_prompt(&context(post(Priority::P3, 1)));
        assert!(prompt.contains("first-time poster"));
    }

    #[test]
    fn prompt_quotes_at_most_three_responses() {
        let ctx = SuggestContext {
            post: post(Priority::P3, 5),
            similar_responses: vec!["first", "second", "third", "fourth"],
            templates: vec!["Hi {{authorName}}"],
        };
        let prompt = build_suggestion_prompt(&ctx);
        assert!(prompt.contains("1. first...\n"));
        assert!(prompt.contains("3. third...\n"));
        assert!(!prompt.contains("fourth"));
        assert!(prompt.contains("Hi {{authorName}}\n"));
    }

    #[test]
    fn prompt_truncates_long_responses() {
        let long = "y".repeat(300);
        let ctx = SuggestContext {
            post: post(Priority::P3, 5),
            similar_responses: vec![long.as_str()],
            templates: Vec::new(),
        };
        let prompt = build_suggestion_prompt(&ctx);
        assert!(prompt.contains(&format!("1. {}...\n", "y".repeat(200))));
        assert!(!prompt.contains(&"y".repeat(201)));
    }

    #[test]
    fn cosine_similarity_values() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap().abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).unwrap(), 0.0);
        assert_matches!(
            cosine_similarity(&[1.0], &[1.0, 2.0]),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn ranking_puts_closest_first_and_unscored_last() {
        let candidates = vec![
            ("none", None),
            ("far", Some(vec![0.0, 1.0])),
            ("close", Some(vec![1.0, 0.1])),
            ("wrong_dims", Some(vec![1.0])),
        ];
        let ranked = rank_by_similarity(Some(&[1.0, 0.0][..]), candidates);
        assert_eq!(ranked, vec!["close", "far", "none", "wrong_dims"]);
    }

    #[test]
    fn ranking_without_target_keeps_order() {
        let candidates = vec![("a", Some(vec![0.0, 1.0])), ("b", None)];
        assert_eq!(rank_by_similarity(None, candidates), vec!["a", "b"]);
    }

    #[test]
    fn draft_follows_priority_and_is_stable() {
        let urgent = draft_reply(&post(Priority::P1, 4));
        assert!(urgent.contains("critical issue"));
        assert!(urgent.contains("\"Export fails\""));
        assert!(urgent.ends_with("Best regards"));
        assert_eq!(urgent, draft_reply(&post(Priority::P1, 4)));

        assert!(draft_reply(&post(Priority::P5, 4)).contains("when possible"));
    }

    #[test]
    fn draft_welcomes_first_time_posters() {
        // "Export fails" has 12 characters, so index 0 is picked.
        assert!(draft_reply(&post(Priority::P3, 0)).starts_with("Hi there! Welcome"));
        assert!(draft_reply(&post(Priority::P3, 9)).starts_with("Hi! "));
    }

    #[test]
    fn suggest_reports_context_and_token_estimate() {
        let ctx = SuggestContext {
            post: post(Priority::P2, 3),
            similar_responses: vec!["We fixed a similar export bug last week."],
            templates: Vec::new(),
        };
        let result = suggest(&ctx);
        assert_eq!(result.similar_response_count, 1);
        assert_eq!(result.template_count, 0);
        assert_eq!(result.model, SUGGESTION_MODEL);
        assert_eq!(
            result.tokens_used,
            build_suggestion_prompt(&ctx).chars().count().div_ceil(4)
        );
    }
}
