//! Relative URL resolution
//!
//! Playlist entries may reference children by absolute URL, root-relative
//! path, or plain relative path. Resolution never fails: an unparseable
//! input degrades to a best-effort link rather than aborting the rewrite.

use url::Url;

/// Resolve a possibly-relative playlist reference against its base URL.
///
/// An absolute candidate is returned unchanged (the input string, not a
/// re-serialization). Anything else is joined against `base` per RFC 3986:
/// the candidate replaces the last path segment of the base unless it is
/// root-relative.
#[must_use]
pub fn resolve(base: &str, candidate: &str) -> String {
    if Url::parse(candidate).is_ok() {
        return candidate.to_string();
    }

    match Url::parse(base) {
        Ok(base_url) => match base_url.join(candidate) {
            Ok(joined) => joined.to_string(),
            Err(_) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                candidate.trim_start_matches('/')
            ),
        },
        // Without a usable base the candidate is the best link we have.
        Err(_) => candidate.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_candidate_unchanged() {
        assert_eq!(
            resolve("https://host/a/b.m3u8", "https://other/seg.ts"),
            "https://other/seg.ts"
        );
    }

    #[test]
    fn test_relative_replaces_last_segment() {
        assert_eq!(
            resolve("https://host/path/master.m3u8", "seg0.ts"),
            "https://host/path/seg0.ts"
        );
    }

    #[test]
    fn test_root_relative() {
        assert_eq!(
            resolve("https://host/path/master.m3u8", "/abs/seg0.ts"),
            "https://host/abs/seg0.ts"
        );
    }

    #[test]
    fn test_relative_with_query() {
        assert_eq!(
            resolve("https://host/path/media.m3u8?token=t", "seg0.ts?v=2"),
            "https://host/path/seg0.ts?v=2"
        );
    }

    #[test]
    fn test_unparseable_base_degrades() {
        assert_eq!(resolve("not a url", "seg0.ts"), "seg0.ts");
    }
}
