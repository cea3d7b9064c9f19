//! Segment fetch-through cache
//!
//! Resolves a segment id to its origin URL through the mapping store and
//! guarantees a complete local copy before returning. Content is immutable
//! once an id is assigned (the id is a hash of the exact resolved URL), so a
//! cache hit never revalidates. Downloads write to a private `.tmp` sibling
//! and atomically rename into place, so a file visible at its canonical path
//! is never truncated. Concurrent misses for one id download redundantly;
//! the last rename wins with identical content.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::mapping::{MappingStore, Namespace};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct SegmentCache {
    client: reqwest::Client,
    store: Arc<MappingStore>,
    dir: PathBuf,
    max_attempts: u32,
    retry_delay: Duration,
}

impl SegmentCache {
    pub fn new(
        client: reqwest::Client,
        store: Arc<MappingStore>,
        dir: impl Into<PathBuf>,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            client,
            store,
            dir: dir.into(),
            max_attempts,
            retry_delay,
        }
    }

    /// Ensure the segment for `id` exists locally and return its path.
    ///
    /// An unregistered id is terminal: no network access is attempted.
    pub async fn materialize(&self, id: &str) -> Result<PathBuf> {
        let url = self
            .store
            .lookup(Namespace::Segment, id)
            .ok_or_else(|| Error::SegmentNotFound(id.to_string()))?;

        let dest = self.dir.join(id);
        if tokio::fs::try_exists(&dest).await? {
            debug!(id, "segment cache hit");
            return Ok(dest);
        }

        self.download_with_retry(&url, &dest).await?;
        Ok(dest)
    }

    async fn download_with_retry(&self, url: &str, dest: &Path) -> Result<()> {
        let mut last_error = String::from("no attempts made");

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.retry_delay).await;
            }
            match self.download_once(url, dest).await {
                Ok(()) => {
                    debug!(url, attempt, "segment downloaded");
                    return Ok(());
                }
                Err(e) => {
                    warn!(url, attempt, error = %e, "segment download attempt failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(Error::DownloadFailed {
            url: url.to_string(),
            attempts: self.max_attempts,
            last: last_error,
        })
    }

    async fn download_once(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::UpstreamStatus {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let tmp = tmp_path(dest);
        if let Err(e) = write_body(response, &tmp).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }

        // The rename publishes the file only once the body is complete.
        tokio::fs::rename(&tmp, dest).await?;
        Ok(())
    }
}

async fn write_body(response: reqwest::Response, tmp: &Path) -> Result<()> {
    let mut file = tokio::fs::File::create(tmp).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(())
}

// Each download owns a private temp file; concurrent writers for one id
// never share an inode.
fn tmp_path(dest: &Path) -> PathBuf {
    let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = dest.as_os_str().to_owned();
    name.push(format!(".{n}.tmp"));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BODY: &[u8] = b"\x47\x40\x00\x10segment payload bytes";

    fn cache(store: Arc<MappingStore>, dir: &Path, max_attempts: u32) -> SegmentCache {
        SegmentCache::new(
            reqwest::Client::new(),
            store,
            dir,
            max_attempts,
            Duration::from_millis(50),
        )
    }

    #[tokio::test]
    async fn test_unknown_id_is_terminal_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(MappingStore::new());
        let cache = cache(store, dir.path(), 3);

        let err = cache.materialize("unregistered").await.unwrap_err();
        assert!(matches!(err, Error::SegmentNotFound(_)));
    }

    #[tokio::test]
    async fn test_existing_file_is_served_without_refetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(MappingStore::new());
        store.register(
            Namespace::Segment,
            "cached",
            format!("{}/seg.ts", server.uri()),
        );
        tokio::fs::write(dir.path().join("cached"), BODY)
            .await
            .expect("seed cache file");

        let cache = cache(store, dir.path(), 3);
        let path = cache.materialize("cached").await.expect("materialize");
        assert_eq!(tokio::fs::read(&path).await.expect("read"), BODY);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_attempts_and_delay() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/seg.ts"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(MappingStore::new());
        let url = format!("{}/seg.ts", server.uri());
        store.register(Namespace::Segment, "seg", url.clone());

        let cache = cache(store, dir.path(), 3);
        let started = Instant::now();
        let err = cache.materialize("seg").await.unwrap_err();

        // Two inter-attempt delays of 50ms each.
        assert!(started.elapsed() >= Duration::from_millis(100));
        match err {
            Error::DownloadFailed { url: u, attempts, .. } => {
                assert_eq!(u, url);
                assert_eq!(attempts, 3);
            }
            other => panic!("expected DownloadFailed, got {other}"),
        }
        assert!(!dir.path().join("seg").exists());
    }

    #[tokio::test]
    async fn test_failed_attempts_then_success_yields_origin_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/seg.ts"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/seg.ts"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(BODY))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(MappingStore::new());
        store.register(Namespace::Segment, "seg", format!("{}/seg.ts", server.uri()));

        let cache = cache(store, dir.path(), 3);
        let path = cache.materialize("seg").await.expect("materialize");
        assert_eq!(tokio::fs::read(&path).await.expect("read"), BODY);
    }

    #[tokio::test]
    async fn test_concurrent_materialize_same_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/seg.ts"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(BODY))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(MappingStore::new());
        store.register(Namespace::Segment, "seg", format!("{}/seg.ts", server.uri()));

        let cache = Arc::new(cache(store, dir.path(), 3));
        let (a, b) = tokio::join!(cache.materialize("seg"), cache.materialize("seg"));

        let a = a.expect("first materialize");
        let b = b.expect("second materialize");
        assert_eq!(tokio::fs::read(&a).await.expect("read a"), BODY);
        assert_eq!(tokio::fs::read(&b).await.expect("read b"), BODY);
    }
}
