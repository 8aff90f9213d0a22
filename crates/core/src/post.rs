//! Moderation post enums and priority arithmetic.
//!
//! Priorities run from `P1` (most urgent) to `P5` (least urgent). Queue
//! ordering, rule escalation and `set_priority` comparisons all go through
//! [`Priority::level`].

string_enum! {
    /// Queue priority of a moderation post.
    pub enum Priority {
        P1 => "P1",
        P2 => "P2",
        P3 => "P3",
        P4 => "P4",
        P5 => "P5",
    }
}

string_enum! {
    /// Workflow state of a moderation post.
    pub enum PostStatus {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
    }
}

string_enum! {
    /// Coarse polarity bucket derived from a sentiment score.
    pub enum SentimentLabel {
        Negative => "negative",
        Neutral => "neutral",
        Positive => "positive",
    }
}

/// Priority assigned when no rule decides otherwise.
pub const DEFAULT_PRIORITY: Priority = Priority::P3;

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: u64 = 500;

/// Maximum excerpt length in characters.
pub const MAX_EXCERPT_LENGTH: u64 = 300;

/// Excerpt length generated when a post is ingested without one.
pub const GENERATED_EXCERPT_LENGTH: usize = 200;

impl Priority {
    /// Numeric urgency: 1 for `P1` through 5 for `P5`.
    pub fn level(self) -> u8 {
        match self {
            Priority::P1 => 1,
            Priority::P2 => 2,
            Priority::P3 => 3,
            Priority::P4 => 4,
            Priority::P5 => 5,
        }
    }

    /// Whether `self` should be handled before `other`.
    pub fn is_more_urgent_than(self, other: Priority) -> bool {
        self.level() < other.level()
    }

    /// Move one level toward `P1`. `P1` stays `P1`.
    pub fn escalate(self) -> Priority {
        match self {
            Priority::P5 => Priority::P4,
            Priority::P4 => Priority::P3,
            Priority::P3 => Priority::P2,
            Priority::P2 | Priority::P1 => Priority::P1,
        }
    }
}

impl PostStatus {
    /// Sort rank used by the queue: open first, resolved last.
    pub fn rank(self) -> u8 {
        match self {
            PostStatus::Open => 1,
            PostStatus::InProgress => 2,
            PostStatus::Resolved => 3,
        }
    }
}

impl SentimentLabel {
    /// Bucket a score in `[-1, 1]`: below -0.3 is negative, above 0.3 positive.
    pub fn from_score(score: f64) -> SentimentLabel {
        if score < -0.3 {
            SentimentLabel::Negative
        } else if score > 0.3 {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Build a plain-text excerpt from a post body, cut on a char boundary.
pub fn make_excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= GENERATED_EXCERPT_LENGTH {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(GENERATED_EXCERPT_LENGTH).collect();
    format!("{}...", cut.trim_end())
}
