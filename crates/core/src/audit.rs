//! Audit-log action names.
//!
//! Stored verbatim in `audit_logs.action_type`. The column is free text so
//! older entries survive new actions being added here.

pub const ACTION_UPDATE_POST: &str = "update_post";
pub const ACTION_ASSIGN_POST: &str = "assign_post";
pub const ACTION_RELEASE_POST: &str = "release_post";

pub const ACTION_CREATE_RESPONSE: &str = "create_response";
pub const ACTION_UPDATE_RESPONSE: &str = "update_response";
pub const ACTION_DELETE_RESPONSE: &str = "delete_response";

pub const ACTION_CREATE_RULE: &str = "create_rule";
pub const ACTION_UPDATE_RULE: &str = "update_rule";
pub const ACTION_DELETE_RULE: &str = "delete_rule";
pub const ACTION_REORDER_RULES: &str = "reorder_rules";

/// Every action name this service writes.
pub const KNOWN_ACTIONS: &[&str] = &[
    ACTION_UPDATE_POST,
    ACTION_ASSIGN_POST,
    ACTION_RELEASE_POST,
    ACTION_CREATE_RESPONSE,
    ACTION_UPDATE_RESPONSE,
    ACTION_DELETE_RESPONSE,
    ACTION_CREATE_RULE,
    ACTION_UPDATE_RULE,
    ACTION_DELETE_RULE,
    ACTION_REORDER_RULES,
];

/// Whether `action` is one this service writes.
pub fn is_known_action(action: &str) -> bool {
    KNOWN_ACTIONS.contains(&action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_actions_are_unique_snake_case() {
        let mut names = KNOWN_ACTIONS.to_vec();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), KNOWN_ACTIONS.len());
        assert!(KNOWN_ACTIONS
            .iter()
            .all(|a| a.chars().all(|c| c.is_ascii_lowercase() || c == '_')));
    }

    #[test]
    fn recognises_actions() {
        assert!(is_known_action("assign_post"));
        assert!(!is_known_action("drop_table"));
    }
}
