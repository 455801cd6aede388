//! # Format Cache
//!
//! Short-lived cache mapping a content id to the last known-good direct
//! media URL, so a repeat request can skip strategy selection entirely.
//! Entries expire on a fixed TTL and the cache is bounded by entry count;
//! a cached URL that fails on use is evicted by the orchestrator.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use moka::sync::Cache as MokaCache;
use tracing::debug;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A resolved direct media URL remembered from a prior successful
/// acquisition. Entries are replaced, never mutated.
#[derive(Debug, Clone)]
pub struct CachedFormat {
    /// Content id this entry belongs to
    pub content_id: String,
    /// Time-limited direct media URL
    pub direct_url: String,
    /// MIME type the URL served last time
    pub mime_type: String,
    /// When the entry was created (unix seconds)
    pub obtained_at: u64,
    /// When the entry stops being reusable (unix seconds)
    pub expires_at: u64,
}

impl CachedFormat {
    /// Check if the entry has expired
    pub fn is_expired(&self) -> bool {
        now_secs() >= self.expires_at
    }
}

/// Bounded, TTL-expiring cache of resolved direct URLs
pub struct FormatCache {
    entries: MokaCache<String, CachedFormat>,
    ttl: Duration,
}

impl FormatCache {
    /// Create a new cache with the given TTL and maximum entry count
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        let mut builder = MokaCache::builder().max_capacity(capacity);

        // Only add TTL if it's non-zero
        if !ttl.is_zero() {
            builder = builder.time_to_live(ttl);
        }

        Self {
            entries: builder.build(),
            ttl,
        }
    }

    /// Look up an unexpired entry for a content id
    pub fn get(&self, content_id: &str) -> Option<CachedFormat> {
        let entry = self.entries.get(content_id)?;

        // Moka enforces the TTL on its own clock; re-check expires_at so an
        // entry created under a shorter effective lifetime is never returned
        if entry.is_expired() {
            debug!(content_id = content_id, "Cached format expired at read");
            self.entries.invalidate(content_id);
            return None;
        }

        Some(entry)
    }

    /// Remember a resolved direct URL for a content id, replacing any
    /// previous entry
    pub fn put(&self, content_id: &str, direct_url: &str, mime_type: &str) {
        let obtained_at = now_secs();
        let entry = CachedFormat {
            content_id: content_id.to_string(),
            direct_url: direct_url.to_string(),
            mime_type: mime_type.to_string(),
            obtained_at,
            expires_at: obtained_at + self.ttl.as_secs(),
        };

        debug!(
            content_id = content_id,
            expires_at = entry.expires_at,
            "Cached resolved format URL"
        );
        self.entries.insert(content_id.to_string(), entry);
    }

    /// Drop the entry for a content id (e.g. after the URL failed on use)
    pub fn evict(&self, content_id: &str) {
        if self.entries.contains_key(content_id) {
            self.entries.invalidate(content_id);
            debug!(content_id = content_id, "Evicted cached format");
        }
    }

    /// Number of live entries (approximate until pending maintenance runs)
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_hit() {
        let cache = FormatCache::new(Duration::from_secs(3600), 16);
        cache.put("dQw4w9WgXcQ", "https://host/media/1", "audio/mp4");

        let entry = cache.get("dQw4w9WgXcQ").expect("expected cache hit");
        assert_eq!(entry.direct_url, "https://host/media/1");
        assert_eq!(entry.mime_type, "audio/mp4");
        assert_eq!(entry.expires_at, entry.obtained_at + 3600);
    }

    #[test]
    fn test_get_miss() {
        let cache = FormatCache::new(Duration::from_secs(3600), 16);
        assert!(cache.get("non_existent").is_none());
    }

    #[test]
    fn test_put_replaces_entry() {
        let cache = FormatCache::new(Duration::from_secs(3600), 16);
        cache.put("id1", "https://host/old", "audio/webm");
        cache.put("id1", "https://host/new", "audio/mp4");

        let entry = cache.get("id1").unwrap();
        assert_eq!(entry.direct_url, "https://host/new");
        assert_eq!(entry.mime_type, "audio/mp4");

        cache.run_pending_tasks();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evict_removes_entry() {
        let cache = FormatCache::new(Duration::from_secs(3600), 16);
        cache.put("id1", "https://host/media", "audio/mp4");
        assert!(cache.get("id1").is_some());

        cache.evict("id1");
        assert!(cache.get("id1").is_none());
    }

    #[test]
    fn test_evict_non_existent_is_noop() {
        let cache = FormatCache::new(Duration::from_secs(3600), 16);
        cache.evict("ghost");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entry_is_dropped_at_read() {
        let cache = FormatCache::new(Duration::from_secs(0), 16);
        cache.put("id1", "https://host/media", "audio/mp4");

        // TTL of zero expires immediately
        assert!(cache.get("id1").is_none());
        cache.run_pending_tasks();
        assert!(cache.get("id1").is_none());
    }

    #[test]
    fn test_capacity_is_bounded() {
        let cache = FormatCache::new(Duration::from_secs(3600), 2);
        for i in 0..8 {
            cache.put(&format!("id{i}"), "https://host/media", "audio/mp4");
        }

        cache.run_pending_tasks();
        assert!(cache.len() <= 2, "cache must not exceed its capacity");
    }
}
