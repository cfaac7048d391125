use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Default time an id stays recorded (30 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);
/// Default maximum number of recorded ids
pub const DEFAULT_CAPACITY: usize = 2048;

/// Ids of messages this session sent itself.
///
/// A realtime `message:new` that echoes one of these ids is a confirmation of
/// an optimistic send and is dropped. Entries expire after `ttl` and the
/// oldest entries are evicted once `capacity` is reached.
#[derive(Debug, Clone)]
pub struct SentIdCache {
    ttl: Duration,
    capacity: usize,
    inserted_at: HashMap<String, Instant>,
    /// Insertion order; may hold stale entries for re-inserted ids.
    order: VecDeque<(String, Instant)>,
}

impl Default for SentIdCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl SentIdCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            inserted_at: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.insert_at(id, Instant::now());
    }

    pub fn insert_at(&mut self, id: impl Into<String>, now: Instant) {
        let id = id.into();
        self.evict_expired(now);
        self.inserted_at.insert(id.clone(), now);
        self.order.push_back((id, now));
        while self.inserted_at.len() > self.capacity {
            if !self.pop_oldest() {
                break;
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.contains_at(id, Instant::now())
    }

    /// True when `id` was recorded and has not expired at `now`.
    pub fn contains_at(&self, id: &str, now: Instant) -> bool {
        self.inserted_at
            .get(id)
            .map(|at| now.saturating_duration_since(*at) < self.ttl)
            .unwrap_or(false)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.inserted_at.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.inserted_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inserted_at.is_empty()
    }

    /// Drop every entry older than the TTL.
    pub fn evict_expired(&mut self, now: Instant) {
        while let Some((_, at)) = self.order.front() {
            if now.saturating_duration_since(*at) < self.ttl {
                break;
            }
            self.pop_oldest();
        }
    }

    /// Remove the front of the order queue. Returns false when empty.
    fn pop_oldest(&mut self) -> bool {
        match self.order.pop_front() {
            Some((id, at)) => {
                // Only the latest insertion of an id owns the map entry
                if self.inserted_at.get(&id) == Some(&at) {
                    self.inserted_at.remove(&id);
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let mut cache = SentIdCache::default();
        cache.insert("temp-1");
        cache.insert("3EB0");
        assert!(cache.contains("3EB0"));
        assert!(!cache.contains("other"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_expiry() {
        let mut cache = SentIdCache::new(Duration::from_secs(60), 10);
        let start = Instant::now();
        cache.insert_at("A", start);
        assert!(cache.contains_at("A", start + Duration::from_secs(59)));
        assert!(!cache.contains_at("A", start + Duration::from_secs(60)));

        cache.insert_at("B", start + Duration::from_secs(61));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_at("B", start + Duration::from_secs(62)));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut cache = SentIdCache::new(DEFAULT_TTL, 2);
        let start = Instant::now();
        cache.insert_at("A", start);
        cache.insert_at("B", start + Duration::from_millis(1));
        cache.insert_at("C", start + Duration::from_millis(2));
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains_at("A", start + Duration::from_millis(3)));
        assert!(cache.contains_at("C", start + Duration::from_millis(3)));
    }

    #[test]
    fn test_reinsert_refreshes_entry() {
        let mut cache = SentIdCache::new(Duration::from_secs(10), 10);
        let start = Instant::now();
        cache.insert_at("A", start);
        cache.insert_at("A", start + Duration::from_secs(8));
        cache.evict_expired(start + Duration::from_secs(11));
        assert!(cache.contains_at("A", start + Duration::from_secs(12)));
    }

    #[test]
    fn test_remove() {
        let mut cache = SentIdCache::default();
        cache.insert("temp-1");
        assert!(cache.remove("temp-1"));
        assert!(!cache.remove("temp-1"));
        assert!(cache.is_empty());
    }
}
