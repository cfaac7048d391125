//! Mock implementations for testing.
//!
//! Test doubles for every trait abstraction, so the console can be driven
//! without network access or file system state.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`MemoryStore`] - in-memory key-value store
//! - [`MockRealtime`] - realtime bridge with event injection

pub mod http;
pub mod realtime;
pub mod store;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use realtime::MockRealtime;
pub use store::MemoryStore;
