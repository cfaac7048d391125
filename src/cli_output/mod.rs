//! Terminal output.
//!
//! - `boxes`: headers and status lines for the one-shot commands
//! - `screen`: incremental rendering of the running console

mod boxes;
mod screen;

pub use boxes::*;
pub use screen::Screen;
