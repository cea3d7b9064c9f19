mod server;

use anyhow::Result;
use tracing::info;

use hlsproxy_core::{
    bootstrap::{init_cache_dir, init_services, load_config},
    logging,
};

use server::HlsProxyServer;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = load_config()?;

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("HLS proxy starting...");
    info!("HTTP address: {}", config.http_address());

    // 3. Prepare the segment cache directory
    init_cache_dir(&config).await?;

    // 4. Initialize services
    let services = init_services(&config)?;

    // 5. Start the HTTP server and wait for shutdown
    HlsProxyServer::new(config, services).run().await
}
