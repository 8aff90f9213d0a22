//! Handlers for the `/ai` helpers. Sentiment and suggestions are computed
//! locally; no model is called.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use modus_core::sentiment::{analyze_sentiment, analyze_sentiment_batch};
use modus_core::suggest::{
    rank_by_similarity, suggest as build_suggestion, SuggestContext, SuggestPost,
    MAX_PROMPT_TEMPLATES,
};
use modus_core::types::DbId;
use modus_db::repositories::{PostRepo, ResponseRepo, TemplateRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// Largest text accepted for analysis, in bytes.
const MAX_TEXT_LENGTH: u64 = 50_000;

/// Request body for `POST /ai/analyze-sentiment`.
#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeSentimentRequest {
    #[validate(length(min = 1, max = MAX_TEXT_LENGTH))]
    pub text: String,
}

/// Request body for `POST /ai/analyze-sentiment/batch`.
#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeSentimentBatchRequest {
    #[validate(length(min = 1, max = 100))]
    pub texts: Vec<String>,
}

/// Earlier responses fetched before ranking for a suggestion.
const SUGGEST_CANDIDATE_LIMIT: i64 = 50;

/// Request body for `POST /ai/suggest`.
#[derive(Debug, Deserialize, Validate)]
pub struct SuggestRequest {
    pub post_id: DbId,
    /// Quote earlier responses from the same category.
    #[serde(default = "default_use_rag")]
    pub use_rag: bool,
    #[serde(default = "default_max_similar")]
    #[validate(range(min = 1, max = 10))]
    pub max_similar: usize,
}

fn default_use_rag() -> bool {
    true
}

fn default_max_similar() -> usize {
    3
}

/// POST /api/v1/ai/analyze-sentiment
pub async fn analyze(
    _auth: AuthUser,
    ValidatedJson(input): ValidatedJson<AnalyzeSentimentRequest>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: analyze_sentiment(&input.text),
    }))
}

/// POST /api/v1/ai/analyze-sentiment/batch
///
/// One result per input text, in the same order.
pub async fn analyze_batch(
    _auth: AuthUser,
    ValidatedJson(input): ValidatedJson<AnalyzeSentimentBatchRequest>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(ListResponse::all(analyze_sentiment_batch(&input.texts))))
}

/// POST /api/v1/ai/suggest
///
/// Draft a reply for a post. With `use_rag`, public responses from other
/// posts in the same category are ranked by embedding similarity and the
/// closest `max_similar` are quoted in the prompt.
pub async fn suggest(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(input): ValidatedJson<SuggestRequest>,
) -> AppResult<impl IntoResponse> {
    let post = PostRepo::find_by_id(&state.pool, input.post_id)
        .await?
        .ok_or_else(|| AppError::not_found("Post", input.post_id))?;

    let similar = if input.use_rag {
        let candidates = ResponseRepo::candidates_for_suggestion(
            &state.pool,
            post.id,
            post.category_id,
            SUGGEST_CANDIDATE_LIMIT,
        )
        .await?;
        let mut ranked = rank_by_similarity(
            post.embedding.as_deref(),
            candidates
                .into_iter()
                .map(|c| (c.response.content, c.post_embedding))
                .collect(),
        );
        ranked.truncate(input.max_similar);
        ranked
    } else {
        Vec::new()
    };

    let mut templates = TemplateRepo::list(&state.pool, post.category_id).await?;
    templates.truncate(MAX_PROMPT_TEMPLATES);

    let context = SuggestContext {
        post: SuggestPost {
            title: &post.title,
            body_content: &post.body_content,
            priority: post.priority,
            sentiment_label: post.sentiment_label,
            author_post_count: post.author_post_count,
        },
        similar_responses: similar.iter().map(String::as_str).collect(),
        templates: templates.iter().map(|t| t.content.as_str()).collect(),
    };
    let suggestion = build_suggestion(&context);

    tracing::info!(
        post_id = %post.id,
        similar = suggestion.similar_response_count,
        templates = suggestion.template_count,
        "Suggestion drafted"
    );

    Ok(Json(DataResponse { data: suggestion }))
}
