//! Handler for attachment uploads.
//!
//! The client sends the file base64-encoded in a JSON body together with its
//! declared metadata. Nothing touches the disk until the metadata, the
//! decoded size and the optional checksum all agree.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use modus_core::error::CoreError;
use modus_core::security::sanitize_filename;
use modus_core::types::{DbId, Timestamp};
use modus_core::uploads::validate_file_metadata;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /uploads`.
#[derive(Debug, Deserialize, Validate)]
pub struct UploadRequest {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    pub mime_type: String,
    /// Declared size in bytes of the decoded content.
    pub size: u64,
    /// Base64 (standard alphabet, padded) file content.
    pub data: String,
    /// Optional SHA-256 hex digest of the decoded content.
    #[validate(length(equal = 64))]
    pub checksum: Option<String>,
}

/// Metadata of a stored upload.
#[derive(Debug, Serialize)]
pub struct StoredUpload {
    pub id: DbId,
    pub filename: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size: u64,
    pub checksum: String,
    pub uploaded_by: DbId,
    pub uploaded_at: Timestamp,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// POST /api/v1/uploads
pub async fn upload_file(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<UploadRequest>,
) -> AppResult<impl IntoResponse> {
    validate_file_metadata(&input.filename, &input.mime_type, input.size)?;

    let bytes = STANDARD
        .decode(input.data.trim())
        .map_err(|e| AppError::Core(CoreError::Validation(format!("data: invalid base64 ({e})"))))?;

    if bytes.len() as u64 != input.size {
        return Err(AppError::Core(CoreError::Validation(format!(
            "size: declared {} bytes but received {}",
            input.size,
            bytes.len()
        ))));
    }

    let checksum = sha256_hex(&bytes);
    if let Some(expected) = &input.checksum {
        if !expected.eq_ignore_ascii_case(&checksum) {
            return Err(AppError::Core(CoreError::Validation(
                "checksum: does not match file content".into(),
            )));
        }
    }

    let id = DbId::new_v4();
    let filename = sanitize_filename(&input.filename);
    let stored_name = format!("{id}_{filename}");

    let upload_dir = &state.config.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;
    tokio::fs::write(upload_dir.join(&stored_name), &bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to write upload: {e}")))?;

    tracing::info!(upload_id = %id, size = input.size, mime_type = %input.mime_type, agent_id = %auth.agent_id, "File uploaded");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: StoredUpload {
                id,
                filename,
                stored_name,
                mime_type: input.mime_type,
                size: input.size,
                checksum,
                uploaded_by: auth.agent_id,
                uploaded_at: Utc::now(),
            },
        }),
    ))
}
