//! Session caches with eviction.

mod sent_ids;

pub use sent_ids::{SentIdCache, DEFAULT_CAPACITY, DEFAULT_TTL};
