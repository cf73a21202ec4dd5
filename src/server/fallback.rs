//! On-demand rendering of posts missing from the build

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// How a background fetch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The page was written to disk
    Rendered,
    /// The API has no post with this uid
    NotFound,
    /// Any other failure; the message is shown once
    Failed(String),
}

/// What a request for a missing page should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// No fetch was running; the caller must start one
    Started,
    /// A fetch is in flight
    Pending,
    NotFound,
    Failed(String),
}

/// How long a missing post keeps answering 404 without asking the API again
pub const NOT_FOUND_TTL: Duration = Duration::from_secs(30);

/// Finished outcomes kept at most; the oldest are dropped first
pub const MAX_SETTLED: usize = 256;

#[derive(Debug)]
enum Entry {
    Pending,
    Settled {
        resolution: Resolution,
        at: Instant,
        /// Insertion order, for eviction
        seq: u64,
    },
}

impl Entry {
    fn is_expired(&self, ttl: Duration) -> bool {
        match self {
            Entry::Pending => false,
            Entry::Settled { at, .. } => at.elapsed() >= ttl,
        }
    }
}

/// Tracks uids being fetched by the server
///
/// A `NotFound` outcome is served from memory until it expires, so repeated
/// requests for a missing post do not reach the API. A failure is reported
/// once and then forgotten, so the next request starts a fresh fetch.
#[derive(Debug)]
pub struct FallbackRegistry {
    entries: RwLock<HashMap<String, Entry>>,
    next_seq: AtomicU64,
    ttl: Duration,
    capacity: usize,
}

impl Default for FallbackRegistry {
    fn default() -> Self {
        Self::with_limits(NOT_FOUND_TTL, MAX_SETTLED)
    }
}

impl FallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry keeping at most `capacity` finished outcomes for `ttl`
    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            ttl,
            capacity,
        }
    }

    /// Register interest in `uid`
    pub async fn lookup(&self, uid: &str) -> Lookup {
        if let Some(Entry::Pending) = self.entries.read().await.get(uid) {
            return Lookup::Pending;
        }

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired(self.ttl));
        match entries.remove(uid) {
            Some(Entry::Pending) => {
                entries.insert(uid.to_string(), Entry::Pending);
                Lookup::Pending
            }
            Some(
                entry @ Entry::Settled {
                    resolution: Resolution::NotFound,
                    ..
                },
            ) => {
                entries.insert(uid.to_string(), entry);
                Lookup::NotFound
            }
            Some(Entry::Settled {
                resolution: Resolution::Failed(message),
                ..
            }) => Lookup::Failed(message),
            // A rendered page that is gone from disk is fetched again
            Some(Entry::Settled {
                resolution: Resolution::Rendered,
                ..
            })
            | None => {
                entries.insert(uid.to_string(), Entry::Pending);
                Lookup::Started
            }
        }
    }

    /// Record the outcome of the fetch started for `uid`
    pub async fn resolve(&self, uid: &str, resolution: Resolution) {
        let mut entries = self.entries.write().await;
        if resolution == Resolution::Rendered {
            entries.remove(uid);
            return;
        }

        entries.insert(
            uid.to_string(),
            Entry::Settled {
                resolution,
                at: Instant::now(),
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            },
        );
        entries.retain(|_, entry| !entry.is_expired(self.ttl));
        evict_oldest(&mut entries, self.capacity);
    }

    pub async fn is_pending(&self, uid: &str) -> bool {
        matches!(self.entries.read().await.get(uid), Some(Entry::Pending))
    }
}

/// Drop settled entries, oldest first, until at most `capacity` remain
fn evict_oldest(entries: &mut HashMap<String, Entry>, capacity: usize) {
    let mut settled: Vec<(u64, String)> = entries
        .iter()
        .filter_map(|(uid, entry)| match entry {
            Entry::Settled { seq, .. } => Some((*seq, uid.clone())),
            Entry::Pending => None,
        })
        .collect();
    if settled.len() <= capacity {
        return;
    }

    settled.sort();
    let excess = settled.len() - capacity;
    for (_, uid) in settled.into_iter().take(excess) {
        entries.remove(&uid);
    }
    tracing::debug!("Evicted {} settled fallback entries", excess);
}
