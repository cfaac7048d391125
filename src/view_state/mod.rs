//! View model of the console.
//!
//! The console mutates these structures; a front end only reads them. Rows
//! and timeline entries are updated in place so a renderer can keep per-row
//! state (hover, scroll) across refreshes.
//!
//! ## Components
//!
//! - [`ConsoleView`]: root view, window title and alert queue
//! - [`ConversationList`]: conversation rows of the current tab
//! - [`Timeline`]: rendered messages of the open conversation
//! - [`Composer`]: message input enabled state and placeholder

mod composer;
mod console_view;
mod conversation_list;
mod timeline;

pub use composer::{Composer, PLACEHOLDER_ACTIVE, PLACEHOLDER_CLOSED, PLACEHOLDER_QUEUE};
pub use console_view::{ChatHeader, ConsoleView, HEADER_LOADING};
pub use conversation_list::{ConversationList, ConversationRow};
pub use timeline::{Rekey, Timeline, TimelineEntry, AUDIO_UNAVAILABLE, STICKER_UNAVAILABLE};
