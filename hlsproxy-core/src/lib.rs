pub mod bootstrap;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod mapping;
pub mod playlist;
pub mod resolve;
pub mod segment;

pub use config::Config;
pub use error::{Error, Result};
pub use mapping::{MappingStore, Namespace};
pub use playlist::PlaylistRewriter;
pub use segment::SegmentCache;
