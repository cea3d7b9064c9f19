//! Segment route
//!
//! `GET /segment/{id}` serves segment bytes from the local cache, fetching
//! from origin on a miss. Unknown ids are 404; exhausted fetch-through
//! retries surface as 500 with the aggregate error message.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::http::error::{AppError, AppResult};
use crate::http::AppState;

/// GET /segment/{id} - segment bytes via the fetch-through cache
pub async fn segment(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    let path = state.segments.materialize(&id).await?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::internal_server_error(format!("failed to read cached segment: {e}")))?;

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response())
}
