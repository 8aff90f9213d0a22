//! Route definitions for the `/rules` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rules;
use crate::state::AppState;

/// Routes mounted at `/rules`.
///
/// ```text
/// GET    /          -> list_rules
/// POST   /          -> create_rule (admin)
/// POST   /reorder   -> reorder_rules (admin)
/// POST   /test      -> test_rule_set (admin)
/// GET    /{id}      -> get_rule (admin)
/// PATCH  /{id}      -> update_rule (admin)
/// DELETE /{id}      -> delete_rule (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rules::list_rules).post(rules::create_rule))
        .route("/reorder", post(rules::reorder_rules))
        .route("/test", post(rules::test_rule_set))
        .route(
            "/{id}",
            get(rules::get_rule)
                .patch(rules::update_rule)
                .delete(rules::delete_rule),
        )
}
