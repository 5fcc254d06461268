//! Summary API routes
//!
//! Wires the summary commands and queries to Axum HTTP handlers.
//!
//! # Route Structure
//!
//! - `POST /upload` - Accept a book-cover image (multipart field `data`)
//! - `GET /summary/:id` - Current record state for polling
//! - `POST /summary/:id` - Completion callback from the processing service
//!
//! The completion callback carries no sender verification; any caller
//! who knows the id may complete or overwrite a record.

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::shared::{parse_record_id, RecordIdError};
use crate::features::FeatureState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::commands::{
    complete, upload, CompleteSummaryBody, CompleteSummaryCommand, CompleteSummaryError,
    UploadCoverCommand, UploadCoverError,
};
use super::commands::upload::{is_allowed_image_type, DEFAULT_BOOK_NAME, MAX_IMAGE_BYTES};
use super::queries::{get_summary, GetSummaryError, GetSummaryQuery};

// ============================================================================
// Router Configuration
// ============================================================================

/// Creates the summaries router with all routes configured
pub fn summaries_routes() -> Router<FeatureState> {
    Router::new()
        .route("/upload", post(upload_cover))
        .route("/summary/:id", get(get_summary_status).post(complete_summary))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Accept a book-cover upload
///
/// # Endpoint
///
/// `POST /upload` with a multipart body whose `data` field is the image.
///
/// # Response
///
/// - `200 OK` - Record created and forwarded; body carries the id
/// - `400 Bad Request` - Missing file, disallowed media type, or oversize
/// - `500 Internal Server Error` - Record created but forwarding failed,
///   or a storage error
#[tracing::instrument(skip(state, multipart))]
async fn upload_cover(
    State(state): State<FeatureState>,
    mut multipart: Multipart,
) -> Result<Response, SummaryApiError> {
    let mut command: Option<UploadCoverCommand> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| SummaryApiError::Multipart(e.to_string()))?
    {
        if field.name() != Some("data") {
            continue;
        }

        // Media type is checked before any bytes are buffered.
        let content_type = field.content_type().unwrap_or("").to_string();
        if !is_allowed_image_type(&content_type) {
            return Err(UploadCoverError::UnsupportedMediaType(content_type).into());
        }

        let book_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_BOOK_NAME)
            .to_string();

        // Stream the field in and bail as soon as the cap is crossed
        // rather than buffering the whole body first.
        let mut content: Vec<u8> = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| SummaryApiError::Multipart(e.to_string()))?
        {
            if content.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(UploadCoverError::TooLarge.into());
            }
            content.extend_from_slice(&chunk);
        }

        command = Some(UploadCoverCommand {
            book_name,
            content_type,
            content,
        });
        break;
    }

    let command = command.ok_or(UploadCoverError::FileMissing)?;
    let response = upload::handle(state.store.clone(), state.forwarder.clone(), command).await?;

    tracing::info!(id = response.id, "Cover upload accepted via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Complete a summary record (webhook callback)
///
/// # Endpoint
///
/// `POST /summary/:id` with JSON body `{"summary": "..."}` (the field is
/// optional; omitting it clears the stored summary).
///
/// # Response
///
/// - `200 OK` - Updated record
/// - `400 Bad Request` - Malformed id
/// - `404 Not Found` - Unknown id
#[tracing::instrument(skip(state, body), fields(id = %id))]
async fn complete_summary(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
    Json(body): Json<CompleteSummaryBody>,
) -> Result<Response, SummaryApiError> {
    let id = parse_record_id(&id)?;

    let command = CompleteSummaryCommand {
        id,
        summary: body.summary,
    };
    let summary = complete::handle(state.store.clone(), command).await?;

    tracing::info!(id = summary.id, "Summary completed via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(summary))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// Get the current state of a summary record
///
/// # Endpoint
///
/// `GET /summary/:id`
///
/// # Response
///
/// - `200 OK` - Full record including `statusProcessing` and
///   `generatedSummary`
/// - `400 Bad Request` - Malformed id
/// - `404 Not Found` - Unknown id
#[tracing::instrument(skip(state), fields(id = %id))]
async fn get_summary_status(
    State(state): State<FeatureState>,
    Path(id): Path<String>,
) -> Result<Response, SummaryApiError> {
    let id = parse_record_id(&id)?;

    let summary = get_summary::handle(state.store.clone(), GetSummaryQuery { id }).await?;

    tracing::debug!(id = summary.id, status_processing = summary.status_processing, "Summary retrieved via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(summary))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for summary API endpoints
#[derive(Debug)]
enum SummaryApiError {
    InvalidId(RecordIdError),
    Multipart(String),
    Upload(UploadCoverError),
    Complete(CompleteSummaryError),
    Get(GetSummaryError),
}

impl From<RecordIdError> for SummaryApiError {
    fn from(err: RecordIdError) -> Self {
        Self::InvalidId(err)
    }
}

impl From<UploadCoverError> for SummaryApiError {
    fn from(err: UploadCoverError) -> Self {
        Self::Upload(err)
    }
}

impl From<CompleteSummaryError> for SummaryApiError {
    fn from(err: CompleteSummaryError) -> Self {
        Self::Complete(err)
    }
}

impl From<GetSummaryError> for SummaryApiError {
    fn from(err: GetSummaryError) -> Self {
        Self::Get(err)
    }
}

impl IntoResponse for SummaryApiError {
    fn into_response(self) -> Response {
        match self {
            SummaryApiError::InvalidId(_) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            SummaryApiError::Multipart(ref detail) => {
                let error = ErrorResponse::new(
                    "VALIDATION_ERROR",
                    format!("Malformed multipart body: {}", detail),
                );
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            SummaryApiError::Upload(UploadCoverError::FileMissing)
            | SummaryApiError::Upload(UploadCoverError::UnsupportedMediaType(_))
            | SummaryApiError::Upload(UploadCoverError::TooLarge) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            SummaryApiError::Upload(UploadCoverError::Forward { id, .. }) => {
                // The record exists; callers must not read this 500 as
                // "nothing happened".
                tracing::error!(id = id, "Webhook forwarding failed after record creation: {}", self);
                let error = ErrorResponse::with_details(
                    "FORWARD_FAILED",
                    self.to_string(),
                    json!({ "id": id }),
                );
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            SummaryApiError::Upload(UploadCoverError::Store(_)) => {
                tracing::error!("Storage error during cover upload: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            SummaryApiError::Complete(CompleteSummaryError::NotFound(_))
            | SummaryApiError::Get(GetSummaryError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            SummaryApiError::Complete(CompleteSummaryError::Store(_)) => {
                tracing::error!("Storage error during summary completion: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            SummaryApiError::Get(GetSummaryError::Store(_)) => {
                tracing::error!("Storage error during summary retrieval: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for SummaryApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(e) => write!(f, "{}", e),
            Self::Multipart(detail) => write!(f, "Malformed multipart body: {}", detail),
            Self::Upload(e) => write!(f, "{}", e),
            Self::Complete(e) => write!(f, "{}", e),
            Self::Get(e) => write!(f, "{}", e),
        }
    }
}
