//! Session Store: holds generated documents between `/generate` and `/download`.
//!
//! Pluggable via the `DocumentStore` trait; `AppState` carries an `Arc<dyn DocumentStore>`.
//! The lock only guards the map, never the generation call that produces the value.
//! Entries live for the session TTL after their last `put`, so abandoned sessions do
//! not pin documents in memory.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::documents::{DocType, SessionDocuments};
use crate::session::SessionKey;

pub trait DocumentStore: Send + Sync {
    /// Replaces whatever was stored for `key`.
    fn put(&self, key: SessionKey, documents: SessionDocuments);

    /// `None` when nothing is stored for `key` or the stored text is empty.
    fn get(&self, key: SessionKey, doc_type: DocType) -> Option<String>;
}

#[derive(Debug)]
struct Entry {
    documents: SessionDocuments,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct InMemoryDocumentStore {
    entries: RwLock<HashMap<SessionKey, Entry>>,
    ttl: Duration,
}

impl InMemoryDocumentStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn is_live(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.stored_at) < self.ttl
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn put(&self, key: SessionKey, documents: SessionDocuments) {
        let now = Instant::now();
        // A poisoned lock still holds a consistent map: writers only insert or remove.
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        let before = entries.len();
        entries.retain(|_, entry| self.is_live(entry, now));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!("Evicted {evicted} expired document set(s)");
        }

        entries.insert(
            key,
            Entry {
                documents,
                stored_at: now,
            },
        );
    }

    /// Expired entries read as absent; the next `put` drops them.
    fn get(&self, key: SessionKey, doc_type: DocType) -> Option<String> {
        let now = Instant::now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(&key)
            .filter(|entry| self.is_live(entry, now))
            .map(|entry| entry.documents.text(doc_type))
            .filter(|text| !text.is_empty())
            .map(String::from)
    }
}
