//! Route definitions for the `/uploads` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

/// Request body cap for uploads: the largest allowed file (10 MiB)
/// base64-encoded, plus room for the JSON envelope.
const UPLOAD_BODY_LIMIT: usize = 14 * 1024 * 1024;

/// Routes mounted at `/uploads`.
///
/// ```text
/// POST /   -> upload_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(uploads::upload_file))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}
