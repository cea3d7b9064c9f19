//! Playlist routes
//!
//! `GET /master-entry?url=...` rewrites the origin master playlist so every
//! variant points back at this server. `GET /{id}/proxy-playlist` serves the
//! rewritten media playlist for a previously registered master.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use hlsproxy_core::{Error as CoreError, Namespace};

use crate::http::error::AppResult;
use crate::http::AppState;

pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

#[derive(Debug, Deserialize)]
pub struct MasterEntryParams {
    /// Absolute origin master playlist URL.
    pub url: String,
}

/// GET /master-entry - rewrite an origin master playlist
///
/// Internal rewrite failures keep the success status with an empty document;
/// clients see an empty playlist rather than an error.
pub async fn master_entry(
    State(state): State<AppState>,
    Query(params): Query<MasterEntryParams>,
) -> Response {
    let body = state.rewriter.rewrite_master(&params.url).await;
    playlist_response(body)
}

/// GET /{id}/proxy-playlist - rewritten media playlist for a registered id
pub async fn proxy_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let url = state
        .store
        .lookup(Namespace::Playlist, &id)
        .ok_or_else(|| CoreError::PlaylistNotFound(id))?;

    let body = state.rewriter.rewrite_media(&url).await;
    Ok(playlist_response(body))
}

fn playlist_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, PLAYLIST_CONTENT_TYPE)], body).into_response()
}
