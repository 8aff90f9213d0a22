pub mod agents;
pub mod ai;
pub mod audit;
pub mod auth;
pub mod categories;
pub mod health;
pub mod posts;
pub mod rules;
pub mod templates;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                              login (public)
/// /auth/session                            session of the caller
///
/// /rules                                   list, create (admin)
/// /rules/reorder                           reorder (admin)
/// /rules/test                              rule tester (admin)
/// /rules/{id}                              get, update, delete (admin)
///
/// /categories                              list, create (admin)
/// /categories/reorder                      reorder (admin)
/// /categories/{id}                         get, update, delete (admin)
///
/// /agents                                  list, create (admin)
/// /agents/{id}                             get, update
///
/// /posts                                   list, ingest
/// /posts/{id}                              get, update
/// /posts/{id}/assign                       claim or assign
/// /posts/{id}/release                      release
/// /posts/{id}/audit                        audit trail
/// /posts/{id}/responses                    list, create
/// /posts/{id}/responses/{response_id}      update, delete (author)
///
/// /templates                               list, create
/// /templates/{id}                          get, update, delete (supervisor)
/// /templates/{id}/use                      render and count
///
/// /audit                                   audit log (admin)
/// /ai/analyze-sentiment                    keyword sentiment
/// /ai/analyze-sentiment/batch              keyword sentiment, many texts
/// /ai/suggest                              draft reply for a post
/// /uploads                                 base64 file upload
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/rules", rules::router())
        .nest("/categories", categories::router())
        .nest("/agents", agents::router())
        .nest("/posts", posts::router())
        .nest("/templates", templates::router())
        .nest("/audit", audit::router())
        .nest("/ai", ai::router())
        .nest("/uploads", uploads::router())
}
