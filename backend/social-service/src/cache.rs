//! Query cache for feed, profile and analytics reads
//!
//! Entries are stored as serialized JSON and expire after a fixed TTL.
//! Mutations invalidate whole query families; there is no background
//! refresh. Every invalidation bumps a generation counter so that a read
//! which started before the mutation cannot store its stale result.
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// Query identity, one variant per query family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Feed { viewer: Option<Uuid> },
    ProfilePosts { author: Uuid, viewer: Option<Uuid> },
    Profile(Uuid),
    ProfileAnalytics(Uuid),
    TrendingUsers,
}

impl QueryKey {
    fn is_posts(&self) -> bool {
        matches!(self, QueryKey::Feed { .. } | QueryKey::ProfilePosts { .. })
    }
}

struct Entry {
    payload: String,
    stored_at: Instant,
}

/// Entry count above which `put` sweeps expired entries
const DEFAULT_SWEEP_THRESHOLD: usize = 1024;

/// Snapshot of the invalidation counter taken before a query runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

pub struct QueryCache {
    entries: DashMap<QueryKey, Entry>,
    ttl: Duration,
    generation: AtomicU64,
    sweep_threshold: usize,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_sweep_threshold(ttl, DEFAULT_SWEEP_THRESHOLD)
    }

    pub fn with_sweep_threshold(ttl: Duration, sweep_threshold: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            generation: AtomicU64::new(0),
            sweep_threshold,
        }
    }

    /// Current invalidation generation; pass it to `put_if_current`
    pub fn generation(&self) -> Generation {
        Generation(self.generation.load(Ordering::SeqCst))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let fresh = {
            let entry = self.entries.get(key)?;
            if entry.stored_at.elapsed() < self.ttl {
                Some(serde_json::from_str::<T>(&entry.payload))
            } else {
                None
            }
        };

        match fresh {
            Some(Ok(value)) => {
                debug!(?key, "query cache HIT");
                Some(value)
            }
            Some(Err(e)) => {
                warn!(?key, "dropping undecodable cache entry: {}", e);
                self.entries.remove(key);
                None
            }
            None => {
                self.entries.remove(key);
                None
            }
        }
    }

    pub fn put<T: Serialize>(&self, key: QueryKey, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(?key, "failed to serialize cache entry: {}", e);
                return;
            }
        };

        if self.entries.len() >= self.sweep_threshold {
            self.evict_expired();
        }
        self.entries.insert(
            key,
            Entry {
                payload,
                stored_at: Instant::now(),
            },
        );
    }

    /// Store a query result unless an invalidation ran since `seen` was taken
    pub fn put_if_current<T: Serialize>(&self, key: QueryKey, value: &T, seen: Generation) {
        if self.generation() != seen {
            debug!(?key, "discarding result of a query superseded by invalidation");
            return;
        }
        self.put(key, value);
        // An invalidation may have landed between the check and the insert
        if self.generation() != seen {
            self.entries.remove(&key);
        }
    }

    /// Drop entries older than the TTL
    pub fn evict_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }

    /// Drop every feed and profile-posts entry
    pub fn invalidate_posts(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.retain(|key, _| !key.is_posts());
        debug!("posts queries invalidated");
    }

    /// Drop a user's profile entry and the trending list it may appear in
    pub fn invalidate_profile(&self, user_id: Uuid) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.remove(&QueryKey::Profile(user_id));
        self.entries.remove(&QueryKey::TrendingUsers);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let cache = QueryCache::new(Duration::from_secs(30));
        cache.put(QueryKey::TrendingUsers, &vec!["ada".to_string()]);
        let hit: Option<Vec<String>> = cache.get(&QueryKey::TrendingUsers);
        assert_eq!(hit, Some(vec!["ada".to_string()]));
    }

    #[test]
    fn test_expired_entries_are_misses() {
        let cache = QueryCache::new(Duration::ZERO);
        cache.put(QueryKey::TrendingUsers, &1u32);
        assert_eq!(cache.get::<u32>(&QueryKey::TrendingUsers), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_posts_keeps_other_families() {
        let cache = QueryCache::new(Duration::from_secs(30));
        let user = Uuid::new_v4();
        cache.put(QueryKey::Feed { viewer: None }, &Vec::<u8>::new());
        cache.put(
            QueryKey::ProfilePosts { author: user, viewer: Some(user) },
            &Vec::<u8>::new(),
        );
        cache.put(QueryKey::Profile(user), &"profile");

        cache.invalidate_posts();

        assert_eq!(cache.len(), 1);
        assert!(cache.get::<String>(&QueryKey::Profile(user)).is_some());
    }

    #[test]
    fn test_result_read_before_invalidation_is_discarded() {
        let cache = QueryCache::new(Duration::from_secs(30));
        let seen = cache.generation();

        cache.invalidate_posts();
        cache.put_if_current(QueryKey::Feed { viewer: None }, &vec![1u8], seen);
        assert!(cache.is_empty());

        let seen = cache.generation();
        cache.put_if_current(QueryKey::Feed { viewer: None }, &vec![2u8], seen);
        assert_eq!(cache.get::<Vec<u8>>(&QueryKey::Feed { viewer: None }), Some(vec![2u8]));
    }

    #[test]
    fn test_put_sweeps_expired_entries_of_other_keys() {
        let cache = QueryCache::with_sweep_threshold(Duration::from_millis(20), 2);
        cache.put(QueryKey::Profile(Uuid::new_v4()), &"ada");
        cache.put(QueryKey::ProfileAnalytics(Uuid::new_v4()), &"bob");
        assert_eq!(cache.len(), 2);

        std::thread::sleep(Duration::from_millis(40));
        let fresh = Uuid::new_v4();
        cache.put(QueryKey::Profile(fresh), &"cy");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get::<String>(&QueryKey::Profile(fresh)), Some("cy".to_string()));
    }
}
