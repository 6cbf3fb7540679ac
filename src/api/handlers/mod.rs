use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::content::ContentError;

// ============================================================
// Error Handling
// ============================================================

/// Errors surfaced at the HTTP boundary.
///
/// The underlying error is logged server-side; clients only ever see one
/// of the fixed messages below.
#[derive(Debug)]
pub enum ApiError {
    Content(ContentError),
    DocumentNotFound(String),
    /// The path segment could not be extracted, e.g. it is not valid UTF-8.
    InvalidPath(PathRejection),
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        ApiError::Content(e)
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        ApiError::InvalidPath(e)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Content(ContentError::PathSecurity(_)) | ApiError::InvalidPath(_) => {
                (StatusCode::BAD_REQUEST, "Invalid file path")
            }
            // Missing and unparseable documents look the same from outside.
            ApiError::Content(ContentError::FileNotFound(_))
            | ApiError::Content(ContentError::Serialization { .. }) => {
                (StatusCode::NOT_FOUND, "File not found")
            }
            ApiError::DocumentNotFound(_) => (StatusCode::NOT_FOUND, "Document not found"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        match &self {
            ApiError::Content(ContentError::PathSecurity(_)) | ApiError::InvalidPath(_) => {
                tracing::warn!("Rejected request: {:?}", self)
            }
            ApiError::Content(ContentError::Serialization { .. }) => {
                tracing::error!("Request failed: {:?}", self)
            }
            _ => tracing::debug!("Request failed: {:?}", self),
        }

        (
            status,
            [(header::CACHE_CONTROL, "no-store")],
            Json(serde_json::json!({ "error": message })),
        )
            .into_response()
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Documents
// ============================================================

/// Fetch endpoint: raw content, serialized tree and title of one document.
pub async fn get_document(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(file) = path?;
    let document = state.pipeline.load(&file)?;
    if document.recovered {
        tracing::info!("Served {} from original-body fallback", file);
    }
    Ok(([(header::CACHE_CONTROL, "no-store")], Json(document)).into_response())
}

/// Raw markdown as a file download named after the document.
pub async fn download_document(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(file) = path?;
    let raw = state.pipeline.fetcher().load(&file)?;

    let name: String = file
        .rsplit('/')
        .next()
        .unwrap_or(file.as_str())
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/markdown; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        raw.text,
    )
        .into_response())
}

// ============================================================
// Catalog
// ============================================================

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub file: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn list_catalog(State(state): State<AppState>) -> Response {
    Json(state.catalog.listings()).into_response()
}

pub async fn list_featured(State(state): State<AppState>) -> Response {
    Json(state.catalog.featured()).into_response()
}

pub async fn get_entry(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> Result<Response, ApiError> {
    let entry = state
        .catalog
        .get(&query.file)
        .ok_or_else(|| ApiError::DocumentNotFound(query.file.clone()))?;
    Ok(Json(entry).into_response())
}

pub async fn get_neighbors(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> Result<Response, ApiError> {
    let neighbors = state
        .catalog
        .neighbors(&query.file)
        .ok_or_else(|| ApiError::DocumentNotFound(query.file.clone()))?;
    Ok(Json(neighbors).into_response())
}

pub async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Response {
    Json(state.catalog.search(&query.q)).into_response()
}
