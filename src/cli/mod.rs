//! Command-line front end.
//!
//! - `args`: process arguments (`--version`, `login`, `logout`, `pair`)
//! - `commands`: lines typed into the running console
//! - `version`: version display

pub mod args;
pub mod commands;
pub mod version;

pub use args::{parse_args, CliCommand, USAGE};
pub use commands::{parse_command, CommandError, HELP};
pub use version::{handle_version_command, VERSION};
