//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`TungsteniteRealtime`] - realtime bridge over tokio-tungstenite
//! - [`FileStore`] - JSON file-backed key-value store
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - configurable HTTP responses
//! - [`mock::MockRealtime`] - event injection for testing
//! - [`mock::MemoryStore`] - in-memory key-value store

pub mod file_store;
pub mod mock;
pub mod reqwest_http;
pub mod tungstenite_ws;

pub use file_store::FileStore;
pub use mock::{MemoryStore, MockHttpClient, MockRealtime};
pub use reqwest_http::ReqwestHttpClient;
pub use tungstenite_ws::TungsteniteRealtime;
