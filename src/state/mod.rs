//! Console state management
//!
//! - UiState: open conversation, current tab, per-conversation caches and the
//!   bookkeeping the reconciliation needs (sent ids, temp ids, known counts)

pub mod ui;

pub use ui::UiState;
