// Module: http
// HTTP surface for the playlist rewriter and the segment fetch-through cache

pub mod error;
pub mod health;
pub mod playlist;
pub mod segment;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use hlsproxy_core::{MappingStore, PlaylistRewriter, SegmentCache};

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MappingStore>,
    pub rewriter: Arc<PlaylistRewriter>,
    pub segments: Arc<SegmentCache>,
}

/// Create the HTTP router with all routes
pub fn create_router(
    store: Arc<MappingStore>,
    rewriter: Arc<PlaylistRewriter>,
    segments: Arc<SegmentCache>,
) -> Router {
    let state = AppState {
        store,
        rewriter,
        segments,
    };

    // Browser HLS players fetch playlists and segments cross-origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/master-entry", get(playlist::master_entry))
        .route("/{id}/proxy-playlist", get(playlist::proxy_playlist))
        .route("/segment/{id}", get(segment::segment))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
