//! Priority-rule engine -- pure logic, no database access.
//!
//! Rules are evaluated in ascending `position` order. Every active rule whose
//! condition matches is collected (evaluation is cumulative, not
//! first-match). The calculated priority starts at [`DEFAULT_PRIORITY`] and
//! walks the matches in order:
//!
//! - `set_priority` replaces the current priority only when the requested one
//!   is more urgent;
//! - `escalate` moves one level toward `P1`;
//! - `auto_assign` and `tag` never touch the priority.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::CoreError;
use crate::post::{PostStatus, Priority, DEFAULT_PRIORITY};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Condition and action types
// ---------------------------------------------------------------------------

string_enum! {
    /// Predicate family a rule evaluates against a post.
    pub enum ConditionType {
        FirstTimePoster => "first_time_poster",
        SentimentNegative => "sentiment_negative",
        SlaExceeded => "sla_exceeded",
        KeywordMatch => "keyword_match",
        CategoryMatch => "category_match",
    }
}

string_enum! {
    /// Mutation a matching rule requests.
    pub enum ActionType {
        SetPriority => "set_priority",
        Escalate => "escalate",
        AutoAssign => "auto_assign",
        Tag => "tag",
    }
}

/// `first_time_poster` threshold when the condition value is missing or zero.
pub const DEFAULT_FIRST_POST_THRESHOLD: i64 = 2;

/// `sentiment_negative` threshold when the condition value is missing or zero.
pub const DEFAULT_SENTIMENT_THRESHOLD: f64 = -0.3;

/// `sla_exceeded` threshold in hours when the condition value is missing or zero.
pub const DEFAULT_SLA_HOURS: f64 = 2.0;

// ---------------------------------------------------------------------------
// Engine inputs
// ---------------------------------------------------------------------------

/// A rule as seen by the engine. Converted from the persisted row.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityRule {
    pub id: DbId,
    pub name: String,
    pub condition_type: ConditionType,
    pub condition_value: String,
    pub action_type: ActionType,
    pub action_value: String,
    pub position: i32,
    pub is_active: bool,
}

/// The facts about a post that rule conditions inspect.
#[derive(Debug, Clone, Copy)]
pub struct RuleSubject<'a> {
    pub title: &'a str,
    pub body_content: &'a str,
    pub author_post_count: i32,
    pub sentiment_score: Option<f64>,
    pub category_id: Option<DbId>,
    pub status: PostStatus,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Engine outputs
// ---------------------------------------------------------------------------

/// A rule that matched, reduced to what the UI displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRule {
    pub rule_id: DbId,
    pub rule_name: String,
    pub action_type: ActionType,
    pub action_value: String,
}

/// Response body of the rule tester.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleTestResult {
    pub matched_rules: Vec<MatchedRule>,
    pub calculated_priority: Priority,
}

/// Everything the matched rules request for a post.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub matched_rules: Vec<MatchedRule>,
    pub priority: Priority,
    /// Target agent of the first matching `auto_assign` rule with a valid id.
    pub assign_to: Option<DbId>,
    /// Values of matching `tag` rules, deduplicated, in match order.
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// An ordered rule set ready for evaluation.
#[derive(Debug, Clone, Default)]
pub struct RulesEngine {
    rules: Vec<PriorityRule>,
}

impl RulesEngine {
    /// Build an engine. Rules are sorted by `position`; ties keep input order.
    pub fn new(mut rules: Vec<PriorityRule>) -> Self {
        rules.sort_by_key(|r| r.position);
        Self { rules }
    }

    /// Return every active rule whose condition matches `subject`, in order.
    pub fn evaluate(&self, subject: &RuleSubject<'_>, now: Timestamp) -> Vec<&PriorityRule> {
        self.rules
            .iter()
            .filter(|rule| rule.is_active && condition_matches(rule, subject, now))
            .collect()
    }

    /// Derive the final priority for `subject`.
    pub fn calculate_priority(&self, subject: &RuleSubject<'_>, now: Timestamp) -> Priority {
        fold_priority(&self.evaluate(subject, now))
    }

    /// Evaluate once and collect priority, assignment and tags together.
    pub fn outcome(&self, subject: &RuleSubject<'_>, now: Timestamp) -> RuleOutcome {
        let matched = self.evaluate(subject, now);

        let assign_to = matched
            .iter()
            .filter(|r| r.action_type == ActionType::AutoAssign)
            .find_map(|r| r.action_value.trim().parse::<DbId>().ok());

        let mut seen = HashSet::new();
        let tags = matched
            .iter()
            .filter(|r| r.action_type == ActionType::Tag)
            .map(|r| r.action_value.trim().to_string())
            .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
            .collect();

        RuleOutcome {
            priority: fold_priority(&matched),
            matched_rules: matched.iter().map(|r| to_matched(r)).collect(),
            assign_to,
            tags,
        }
    }
}

/// Evaluate `rules` against a sample post for the admin rule tester.
pub fn test_rules(
    rules: Vec<PriorityRule>,
    subject: &RuleSubject<'_>,
    now: Timestamp,
) -> RuleTestResult {
    let outcome = RulesEngine::new(rules).outcome(subject, now);
    RuleTestResult {
        matched_rules: outcome.matched_rules,
        calculated_priority: outcome.priority,
    }
}

fn to_matched(rule: &PriorityRule) -> MatchedRule {
    MatchedRule {
        rule_id: rule.id,
        rule_name: rule.name.clone(),
        action_type: rule.action_type,
        action_value: rule.action_value.clone(),
    }
}

fn fold_priority(matched: &[&PriorityRule]) -> Priority {
    matched
        .iter()
        .fold(DEFAULT_PRIORITY, |current, rule| match rule.action_type {
            ActionType::SetPriority => match rule.action_value.trim().parse::<Priority>() {
                Ok(requested) if requested.is_more_urgent_than(current) => requested,
                _ => current,
            },
            ActionType::Escalate => current.escalate(),
            ActionType::AutoAssign | ActionType::Tag => current,
        })
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

fn condition_matches(rule: &PriorityRule, subject: &RuleSubject<'_>, now: Timestamp) -> bool {
    let value = rule.condition_value.trim();

    match rule.condition_type {
        ConditionType::FirstTimePoster => {
            let threshold = parse_nonzero_int(value).unwrap_or(DEFAULT_FIRST_POST_THRESHOLD);
            i64::from(subject.author_post_count) < threshold
        }
        ConditionType::SentimentNegative => {
            let threshold = parse_nonzero_float(value).unwrap_or(DEFAULT_SENTIMENT_THRESHOLD);
            // Strict: a score exactly at the threshold does not match.
            subject.sentiment_score.unwrap_or(0.0) < threshold
        }
        ConditionType::SlaExceeded => {
            let hours = parse_nonzero_float(value).unwrap_or(DEFAULT_SLA_HOURS);
            let elapsed_hours = (now - subject.created_at).num_seconds() as f64 / 3600.0;
            subject.status == PostStatus::Open && elapsed_hours > hours
        }
        ConditionType::KeywordMatch => {
            let content = format!("{} {}", subject.title, subject.body_content).to_lowercase();
            keywords(value).any(|keyword| content.contains(&keyword))
        }
        ConditionType::CategoryMatch => match (subject.category_id, value.parse::<DbId>()) {
            (Some(category_id), Ok(wanted)) => category_id == wanted,
            _ => false,
        },
    }
}

/// Comma-separated keyword list, trimmed and lower-cased. Empty entries are
/// dropped so a trailing comma does not match every post.
pub fn keywords(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
}

fn parse_nonzero_int(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().filter(|v| *v != 0)
}

fn parse_nonzero_float(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v != 0.0)
}

// ---------------------------------------------------------------------------
// Authoring checks
// ---------------------------------------------------------------------------

/// Check that a rule's values make sense for its condition and action types.
///
/// Evaluation tolerates bad values (they fall back to defaults or never
/// match); this check stops them from being saved in the first place.
pub fn validate_rule_values(
    condition_type: ConditionType,
    condition_value: &str,
    action_type: ActionType,
    action_value: &str,
) -> Result<(), CoreError> {
    // Zero thresholds are rejected: evaluation reads 0 as "use the default".
    let condition_value = condition_value.trim();
    let condition_ok = match condition_type {
        ConditionType::FirstTimePoster => condition_value.parse::<i64>().is_ok_and(|v| v > 0),
        ConditionType::SentimentNegative => condition_value
            .parse::<f64>()
            .is_ok_and(|v| v != 0.0 && (-1.0..=1.0).contains(&v)),
        ConditionType::SlaExceeded => condition_value
            .parse::<f64>()
            .is_ok_and(|v| v.is_finite() && v > 0.0),
        ConditionType::KeywordMatch => keywords(condition_value).next().is_some(),
        ConditionType::CategoryMatch => condition_value.parse::<DbId>().is_ok(),
    };
    if !condition_ok {
        return Err(CoreError::Validation(format!(
            "condition_value '{condition_value}' is not valid for condition type '{condition_type}'"
        )));
    }

    let action_value = action_value.trim();
    let action_ok = match action_type {
        ActionType::SetPriority => action_value.parse::<Priority>().is_ok(),
        ActionType::Escalate => true,
        ActionType::AutoAssign => action_value.parse::<DbId>().is_ok(),
        ActionType::Tag => !action_value.is_empty(),
    };
    if !action_ok {
        return Err(CoreError::Validation(format!(
            "action_value '{action_value}' is not valid for action type '{action_type}'"
        )));
    }

    Ok(())
}

/// Positions for a reorder request: the rule at index `i` gets `i + 1`.
///
/// Rejects duplicate ids, which would make the resulting order ambiguous.
pub fn reorder_positions(ids: &[DbId]) -> Result<Vec<(DbId, i32)>, CoreError> {
    let mut seen = HashSet::with_capacity(ids.len());
    let mut positions = Vec::with_capacity(ids.len());
    for (index, id) in ids.iter().enumerate() {
        if !seen.insert(*id) {
            return Err(CoreError::Validation(format!(
                "Duplicate id {id} in reorder request"
            )));
        }
        let position = i32::try_from(index + 1)
            .map_err(|_| CoreError::Validation("Too many ids in reorder request".into()))?;
        positions.push((*id, position));
    }
    Ok(positions)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
