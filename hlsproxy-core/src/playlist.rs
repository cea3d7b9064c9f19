//! Playlist fetching and rewriting
//!
//! Fetches origin master/media playlists, rewrites every child URI to a
//! locally-addressed path, and registers the id→URL mappings the segment
//! cache resolves later. Rewrites are all-or-nothing per call: any fetch,
//! parse, or document-kind failure degrades to an empty document with a
//! logged diagnostic instead of crashing the request path.

use std::sync::Arc;

use m3u8_rs::{MasterPlaylist, Playlist};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::identity::content_id;
use crate::mapping::{MappingStore, Namespace};
use crate::resolve::resolve;

pub struct PlaylistRewriter {
    client: reqwest::Client,
    store: Arc<MappingStore>,
}

impl PlaylistRewriter {
    #[must_use]
    pub fn new(client: reqwest::Client, store: Arc<MappingStore>) -> Self {
        Self { client, store }
    }

    /// Rewrite an origin master playlist so every variant points at the
    /// local proxy-playlist route. Registers the playlist id as a side
    /// effect. Returns an empty document on failure.
    pub async fn rewrite_master(&self, stream_url: &str) -> String {
        match self.try_rewrite_master(stream_url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(url = stream_url, error = %e, "master playlist rewrite failed");
                String::new()
            }
        }
    }

    /// Rewrite the media playlist behind the first variant of the given
    /// master so every segment points at the local segment route. Registers
    /// one segment id per entry. Returns an empty document on failure.
    pub async fn rewrite_media(&self, stream_url: &str) -> String {
        match self.try_rewrite_media(stream_url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(url = stream_url, error = %e, "media playlist rewrite failed");
                String::new()
            }
        }
    }

    async fn try_rewrite_master(&self, stream_url: &str) -> Result<String> {
        let mut master = self.fetch_master(stream_url).await?;
        debug!(
            url = stream_url,
            variants = master.variants.len(),
            "rewriting master playlist"
        );

        let id = content_id(stream_url);
        self.store
            .register(Namespace::Playlist, id.clone(), stream_url);

        // Every variant maps to the same playlist-level id; the variant is
        // picked again at proxy-playlist time.
        let local_uri = format!("/{id}/proxy-playlist");
        for variant in &mut master.variants {
            variant.uri = local_uri.clone();
        }

        let mut out = Vec::new();
        master.write_to(&mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    async fn try_rewrite_media(&self, stream_url: &str) -> Result<String> {
        let master = self.fetch_master(stream_url).await?;

        let variant = master
            .variants
            .first()
            .ok_or_else(|| Error::NoVariants(stream_url.to_string()))?;
        let media_url = resolve(stream_url, &variant.uri);
        debug!(url = %media_url, "selected first variant");

        let mut media = match self.fetch_playlist(&media_url).await? {
            Playlist::MediaPlaylist(media) => media,
            Playlist::MasterPlaylist(_) => {
                return Err(Error::WrongPlaylistKind {
                    url: media_url,
                    expected: "media",
                })
            }
        };

        for segment in &mut media.segments {
            let segment_url = resolve(&media_url, &segment.uri);
            let segment_id = content_id(&segment_url);
            self.store
                .register(Namespace::Segment, segment_id.clone(), segment_url);
            segment.uri = format!("/segment/{segment_id}");
        }

        let mut out = Vec::new();
        media.write_to(&mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    async fn fetch_master(&self, url: &str) -> Result<MasterPlaylist> {
        match self.fetch_playlist(url).await? {
            Playlist::MasterPlaylist(master) => Ok(master),
            Playlist::MediaPlaylist(_) => Err(Error::WrongPlaylistKind {
                url: url.to_string(),
                expected: "master",
            }),
        }
    }

    async fn fetch_playlist(&self, url: &str) -> Result<Playlist> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::UpstreamStatus {
                url: url.to_string(),
                status: response.status(),
            });
        }
        let body = response.bytes().await?;
        m3u8_rs::parse_playlist_res(&body).map_err(|e| Error::PlaylistParse(format!("{e:?}")))
    }
}
