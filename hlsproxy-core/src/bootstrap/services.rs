//! Service wiring

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::{Config, MappingStore, PlaylistRewriter, SegmentCache};

/// Container for shared services
pub struct Services {
    pub store: Arc<MappingStore>,
    pub rewriter: Arc<PlaylistRewriter>,
    pub segments: Arc<SegmentCache>,
}

/// Ensure the segment cache directory exists before serving.
pub async fn init_cache_dir(config: &Config) -> Result<()> {
    tokio::fs::create_dir_all(&config.cache.dir).await?;
    info!(dir = %config.cache.dir, "cache directory ready");
    Ok(())
}

/// Build the shared HTTP client, the mapping store, and the two services
/// that consume them. The mapping store is the only shared mutable state.
pub fn init_services(config: &Config) -> Result<Services> {
    let client = reqwest::Client::builder().build()?;
    let store = Arc::new(MappingStore::new());

    let rewriter = Arc::new(PlaylistRewriter::new(client.clone(), store.clone()));
    let segments = Arc::new(SegmentCache::new(
        client,
        store.clone(),
        &config.cache.dir,
        config.cache.max_attempts,
        config.retry_delay(),
    ));

    info!("Services initialized");
    Ok(Services {
        store,
        rewriter,
        segments,
    })
}
