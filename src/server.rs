/*!
 * HTTP boundary.
 *
 * Routes:
 * - `GET /` - health check
 * - `POST /api/translate` - multipart upload, responds with the translated
 *   SRT file as an attachment
 *
 * Unknown routes answer 404 and unsupported methods on a known route answer
 * 405, both with a JSON body.
 */

use anyhow::Context;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Request, State};
use axum::http::{header, HeaderName, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::app_config::Config;
use crate::errors::{AppError, RequestError};
use crate::translation::{TranslatedDocument, TranslationRequest, TranslationService, UploadForm};

/// Room for multipart boundaries and the text fields on top of the file limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

const X_PROCESSING_TIME: HeaderName = HeaderName::from_static("x-processing-time");
const X_ENTRIES_COUNT: HeaderName = HeaderName::from_static("x-entries-count");
const X_FAILED_ENTRIES: HeaderName = HeaderName::from_static("x-failed-entries");

/// Shared state of the HTTP server
#[derive(Clone)]
pub struct AppState {
    /// Read-only configuration
    pub config: Arc<Config>,
    /// Service running the translation jobs
    pub service: TranslationService,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            service: TranslationService::new(config.clone()),
            config,
        }
    }

    pub fn with_service(config: Arc<Config>, service: TranslationService) -> Self {
        Self { config, service }
    }
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<String>,
}

/// Health check body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// An error on its way out of the HTTP boundary
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                details: None,
            },
        }
    }

    /// Map an application error; internal details only leave the server in development
    pub fn from_app_error(err: AppError, development: bool) -> Self {
        let message = match &err {
            AppError::Request(e) => Some(e.to_string()),
            AppError::Subtitle(e) => Some(e.to_string()),
            _ => None,
        };

        match message {
            Some(message) if err.is_client_error() => Self::new(StatusCode::BAD_REQUEST, message),
            _ => {
                error!("Translation failed: {}", err);
                let mut api_error = Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Translation failed");
                if development {
                    api_error.body.details = Some(err.to_string());
                }
                api_error
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Build the router with all routes and layers
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(health_check).fallback(method_not_allowed))
        .route("/api/translate", post(translate).fallback(method_not_allowed))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until Ctrl+C
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(Arc::new(config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Subtitle translation server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start_time = Instant::now();

    let response = next.run(request).await;

    info!("{} {} {} {}ms", method, path, response.status().as_u16(), start_time.elapsed().as_millis());
    response
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Subtitle translation API".to_string(),
    })
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not found")
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// Collect the known form fields; unknown parts are ignored
async fn read_form(mut multipart: Multipart) -> Result<UploadForm, RequestError> {
    let mut form = UploadForm::default();
    let malformed = |e: axum::extract::multipart::MultipartError| RequestError::MalformedRequest(e.body_text());

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(malformed)?;
                debug!("Received file '{}' ({} bytes)", file_name, bytes.len());
                form.file = Some((file_name, bytes));
            }
            "translationService" => form.provider = Some(field.text().await.map_err(malformed)?),
            "sourceLanguage" => form.source_language = Some(field.text().await.map_err(malformed)?),
            "targetLanguage" => form.target_language = Some(field.text().await.map_err(malformed)?),
            other => debug!("Ignoring form field '{}'", other),
        }
    }

    Ok(form)
}

async fn translate(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let development = state.config.server.is_development();
    let to_api_error = |err: AppError| ApiError::from_app_error(err, development);

    let multipart = multipart
        .map_err(|e| to_api_error(RequestError::MalformedRequest(e.body_text()).into()))?;
    let form = read_form(multipart).await.map_err(|e| to_api_error(e.into()))?;
    let request = TranslationRequest::from_form(form, state.config.server.max_upload_bytes).map_err(|e| {
        warn!("Rejected upload: {}", e);
        to_api_error(e.into())
    })?;
    let output_name = request.output_file_name();

    // Dropping this handler (client gone) cancels the remaining batches
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let service = state.service.clone();
    let job = tokio::spawn(async move { service.translate_document(&request, &cancel).await });

    let document = job
        .await
        .map_err(|e| to_api_error(AppError::Unknown(format!("Translation task failed: {}", e))))?
        .map_err(to_api_error)?;

    Ok(attachment_response(&output_name, document))
}

fn attachment_response(file_name: &str, document: TranslatedDocument) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file_name.replace('"', "'"));
    let headers = [
        (header::CONTENT_TYPE, "text/srt; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
        (header::CONTENT_LENGTH, document.content.len().to_string()),
        (X_PROCESSING_TIME, document.elapsed.as_millis().to_string()),
        (X_ENTRIES_COUNT, document.entry_count.to_string()),
        (X_FAILED_ENTRIES, document.failed_count.to_string()),
    ];

    (StatusCode::OK, headers, document.content).into_response()
}
