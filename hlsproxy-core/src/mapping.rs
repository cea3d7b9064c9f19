//! Content id to remote URL mapping
//!
//! Two independent namespaces share one lock: playlist ids registered by the
//! master rewrite, segment ids registered by the media rewrite. Entries live
//! for the process lifetime; there is no eviction. Because an id is a pure
//! function of its URL, re-registration always writes the same value, so
//! overwrites are silently accepted.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Which table an id lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Playlist,
    Segment,
}

#[derive(Default)]
struct Tables {
    playlists: HashMap<String, String>,
    segments: HashMap<String, String>,
}

impl Tables {
    fn table(&self, ns: Namespace) -> &HashMap<String, String> {
        match ns {
            Namespace::Playlist => &self.playlists,
            Namespace::Segment => &self.segments,
        }
    }

    fn table_mut(&mut self, ns: Namespace) -> &mut HashMap<String, String> {
        match ns {
            Namespace::Playlist => &mut self.playlists,
            Namespace::Segment => &mut self.segments,
        }
    }
}

/// Concurrent id→URL store, shared by the rewriter and the segment cache.
#[derive(Default)]
pub struct MappingStore {
    tables: RwLock<Tables>,
}

impl MappingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry.
    pub fn register(&self, ns: Namespace, id: impl Into<String>, url: impl Into<String>) {
        self.tables
            .write()
            .table_mut(ns)
            .insert(id.into(), url.into());
    }

    /// Look up the remote URL for an id, if registered.
    #[must_use]
    pub fn lookup(&self, ns: Namespace, id: &str) -> Option<String> {
        self.tables.read().table(ns).get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_register_and_lookup() {
        let store = MappingStore::new();
        store.register(Namespace::Segment, "id0", "https://host/seg0.ts");

        assert_eq!(
            store.lookup(Namespace::Segment, "id0").as_deref(),
            Some("https://host/seg0.ts")
        );
        assert_eq!(store.lookup(Namespace::Segment, "missing"), None);
    }

    #[test]
    fn test_namespaces_are_independent() {
        let store = MappingStore::new();
        store.register(Namespace::Playlist, "id0", "https://host/master.m3u8");

        assert!(store.lookup(Namespace::Playlist, "id0").is_some());
        assert!(store.lookup(Namespace::Segment, "id0").is_none());
    }

    #[test]
    fn test_reregistration_overwrites() {
        let store = MappingStore::new();
        store.register(Namespace::Playlist, "id0", "https://host/a.m3u8");
        store.register(Namespace::Playlist, "id0", "https://host/b.m3u8");

        assert_eq!(
            store.lookup(Namespace::Playlist, "id0").as_deref(),
            Some("https://host/b.m3u8")
        );
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let store = Arc::new(MappingStore::new());

        let writers: Vec<_> = (0..8)
            .map(|w| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let id = format!("id-{w}-{i}");
                        let url = format!("https://host/{w}/{i}.ts");
                        store.register(Namespace::Segment, id.clone(), url.clone());
                        assert_eq!(store.lookup(Namespace::Segment, &id), Some(url));
                    }
                })
            })
            .collect();

        for handle in writers {
            handle.join().expect("writer thread panicked");
        }
    }
}
