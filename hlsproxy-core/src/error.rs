use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Upstream request error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Upstream returned {status} for {url}")]
    UpstreamStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Playlist parse error: {0}")]
    PlaylistParse(String),

    #[error("Expected a {expected} playlist at {url}")]
    WrongPlaylistKind { url: String, expected: &'static str },

    #[error("Master playlist at {0} has no variants")]
    NoVariants(String),

    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    #[error("Segment not found: {0}")]
    SegmentNotFound(String),

    #[error("Download of {url} failed after {attempts} attempt(s): {last}")]
    DownloadFailed {
        url: String,
        attempts: u32,
        last: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
