//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, DELETE, multipart)
//! - [`KeyValueStore`] - persisted local preferences and token
//! - [`RealtimeConnection`] - push channel for server events
//! - [`MediaFetcher`] - media download for sticker hashing

pub mod http;
pub mod media;
pub mod realtime;
pub mod store;

pub use http::{Headers, HttpClient, HttpError, MultipartField, MultipartValue, Response};
pub use media::MediaFetcher;
pub use realtime::RealtimeConnection;
pub use store::KeyValueStore;
