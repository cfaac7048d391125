//! Zapdesk - agent console for a WhatsApp-style messaging backend
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod api;
pub mod bootstrap;
pub mod cache;
pub mod cli;
pub mod cli_output;
pub mod config;
pub mod console;
pub mod error;
pub mod format;
pub mod models;
pub mod preferences;
pub mod realtime;
pub mod reconcile;
pub mod session;
pub mod state;
pub mod sync;
pub mod traits;
pub mod view_state;
pub mod workflow;
