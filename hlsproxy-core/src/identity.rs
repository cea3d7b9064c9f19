//! Content identity derivation
//!
//! Remote resources are addressed locally by a hash of their absolute URL.
//! The id is a pure function of the URL, so re-registration after a restart
//! regenerates identical ids.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Derive the content id for a remote URL.
///
/// SHA-256 over the URL bytes, encoded with the URL-safe base64 alphabet so
/// the result can be embedded as a path segment without escaping.
#[must_use]
pub fn content_id(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    URL_SAFE.encode(digest)
}
