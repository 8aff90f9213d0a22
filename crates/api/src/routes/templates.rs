//! Route definitions for the `/templates` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::templates;
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// GET    /           -> list_templates
/// POST   /           -> create_template
/// GET    /{id}       -> get_template
/// PATCH  /{id}       -> update_template (supervisor)
/// DELETE /{id}       -> delete_template (supervisor)
/// POST   /{id}/use   -> use_template
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/{id}",
            get(templates::get_template)
                .patch(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/{id}/use", post(templates::use_template))
}
