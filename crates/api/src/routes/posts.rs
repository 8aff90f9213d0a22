//! Route definitions for the `/posts` resource and its responses.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{posts, responses};
use crate::state::AppState;

/// Routes mounted at `/posts`.
///
/// ```text
/// GET    /                              -> list_posts
/// POST   /                              -> create_post
/// GET    /{id}                          -> get_post
/// PATCH  /{id}                          -> update_post
/// POST   /{id}/assign                   -> assign_post
/// POST   /{id}/release                  -> release_post
/// GET    /{id}/audit                    -> post_audit_trail
/// GET    /{id}/responses                -> list_responses
/// POST   /{id}/responses                -> create_response
/// PATCH  /{id}/responses/{response_id}  -> update_response (author)
/// DELETE /{id}/responses/{response_id}  -> delete_response (author)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::list_posts).post(posts::create_post))
        .route("/{id}", get(posts::get_post).patch(posts::update_post))
        .route("/{id}/assign", post(posts::assign_post))
        .route("/{id}/release", post(posts::release_post))
        .route("/{id}/audit", get(posts::post_audit_trail))
        .route(
            "/{id}/responses",
            get(responses::list_responses).post(responses::create_response),
        )
        .route(
            "/{id}/responses/{response_id}",
            patch(responses::update_response).delete(responses::delete_response),
        )
}
