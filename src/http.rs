//! HTTP surface: routes, wire DTOs, and the error-to-status mapping.
//!
//! Both POST endpoints parse their bodies by hand instead of using the
//! `Json` extractor so that every failure, including malformed JSON, comes
//! back in the same `{"error": "..."}` shape the page expects. Panics in a
//! handler are caught at the outermost layer and reported the same way.
//!
//! Provider availability is checked before either body is read: a service
//! with no credential gives the same unavailable answer for every payload,
//! well-formed or not.

use crate::error::ClarityError;
use crate::pipeline::source::ExtractionRequest;
use crate::service::{AnalysisService, FollowupContext};
use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Request body cap, shared by JSON and multipart payloads.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The orchestration core; one instance serves every request.
    pub service: Arc<AnalysisService>,
}

impl AppState {
    pub fn new(service: AnalysisService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

// ── Wire DTOs ────────────────────────────────────────────────────────────────

/// JSON body of `POST /clarify`.
#[derive(Debug, Deserialize)]
pub struct ClarifyRequest {
    /// Raw text or an absolute URL.
    #[serde(default)]
    pub text: String,
}

/// Success body of `POST /clarify`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClarifyResponse {
    /// Normalized model reply; a JSON candidate the page parses itself.
    pub ai_response: String,
    /// Echo of the analyzed text, truncated for display.
    pub original_text: String,
}

/// JSON body of `POST /followup`.
#[derive(Debug, Deserialize)]
pub struct FollowupRequest {
    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub previous_analysis: String,
    #[serde(default)]
    pub question: String,
}

/// Success body of `POST /followup`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FollowupResponse {
    /// Normalized model reply to the follow-up question.
    pub ai_response: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl IntoResponse for ClarityError {
    fn into_response(self) -> Response {
        let status = match &self {
            ClarityError::ServiceUnavailable
            | ClarityError::GenerationFailed { .. }
            | ClarityError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ClarityError::MissingField { .. }
            | ClarityError::NoFileSelected
            | ClarityError::UnsupportedFileType { .. }
            | ClarityError::FetchError { .. }
            | ClarityError::ExtractionFailure { .. }
            | ClarityError::InsufficientContent => StatusCode::BAD_REQUEST,
        };

        if status.is_server_error() {
            error!("Request failed: {self}");
        } else {
            debug!("Rejected request: {self}");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET / - the single-page front end
async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// POST /clarify - analyze raw text, a URL, or an uploaded file
async fn clarify(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ClarifyResponse>, ClarityError> {
    // Gate first: degraded mode answers before the body is read.
    state.service.ensure_available()?;

    let extraction = parse_clarify_request(request).await?;
    let result = state.service.analyze(extraction).await?;

    Ok(Json(ClarifyResponse {
        ai_response: result.normalized_json,
        original_text: result.original_text_echo,
    }))
}

/// POST /followup - one follow-up question against a previous analysis
async fn followup(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<FollowupResponse>, ClarityError> {
    state.service.ensure_available()?;

    let body = read_body(request).await?;
    let payload: FollowupRequest = serde_json::from_slice(&body).map_err(|_| {
        ClarityError::MissingField {
            field: "original_text",
        }
    })?;

    let answer = state
        .service
        .followup(FollowupContext {
            original_text: payload.original_text,
            previous_analysis: payload.previous_analysis,
            question: payload.question,
        })
        .await?;

    Ok(Json(FollowupResponse {
        ai_response: answer,
    }))
}

// ── Request parsing ──────────────────────────────────────────────────────────

/// Classify a `/clarify` body into an extraction request.
///
/// A `multipart/form-data` content type means a file upload; anything else
/// is treated as the JSON `{"text": ...}` form, whatever the header says.
async fn parse_clarify_request(request: Request) -> Result<ExtractionRequest, ClarityError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if is_multipart {
        let multipart =
            Multipart::from_request(request, &())
                .await
                .map_err(|e| ClarityError::ExtractionFailure {
                    kind: "upload",
                    detail: e.to_string(),
                })?;
        return file_from_multipart(multipart).await;
    }

    let body = read_body(request).await?;
    let payload: ClarifyRequest = serde_json::from_slice(&body)
        .map_err(|_| ClarityError::MissingField { field: "text" })?;
    if payload.text.trim().is_empty() {
        return Err(ClarityError::MissingField { field: "text" });
    }
    Ok(ExtractionRequest::RawText(payload.text))
}

/// Pull the `file` part out of a multipart stream.
///
/// A part named `file` with an empty filename is how browsers submit an
/// empty picker, so that case falls through to `NoFileSelected` downstream.
async fn file_from_multipart(mut multipart: Multipart) -> Result<ExtractionRequest, ClarityError> {
    while let Some(field) =
        multipart
            .next_field()
            .await
            .map_err(|e| ClarityError::ExtractionFailure {
                kind: "upload",
                detail: e.to_string(),
            })?
    {
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ClarityError::ExtractionFailure {
                kind: "upload",
                detail: e.to_string(),
            })?;

        return Ok(ExtractionRequest::UploadedFile {
            name,
            bytes: bytes.to_vec(),
        });
    }

    Err(ClarityError::NoFileSelected)
}

async fn read_body(request: Request) -> Result<axum::body::Bytes, ClarityError> {
    axum::body::to_bytes(request.into_body(), MAX_UPLOAD_BYTES)
        .await
        .map_err(|e| ClarityError::ExtractionFailure {
            kind: "request",
            detail: e.to_string(),
        })
}

// ── Router ───────────────────────────────────────────────────────────────────

/// Create the axum router with all routes and layers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/clarify", post(clarify))
        .route("/followup", post(followup))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Convert an escaped handler panic into the standard error shape.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {detail}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error.".to_string(),
        }),
    )
        .into_response()
}
