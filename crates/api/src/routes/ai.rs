//! Route definitions for the `/ai` helpers.

use axum::routing::post;
use axum::Router;

use crate::handlers::ai;
use crate::state::AppState;

/// Routes mounted at `/ai`.
///
/// ```text
/// POST /analyze-sentiment         -> analyze
/// POST /analyze-sentiment/batch   -> analyze_batch
/// POST /suggest                   -> suggest
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze-sentiment", post(ai::analyze))
        .route("/analyze-sentiment/batch", post(ai::analyze_batch))
        .route("/suggest", post(ai::suggest))
}
