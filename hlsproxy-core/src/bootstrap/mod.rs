//! Process bootstrap: configuration loading, cache directory setup, and
//! service wiring.

mod config;
mod services;

pub use config::load_config;
pub use services::{init_cache_dir, init_services, Services};
