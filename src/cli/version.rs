//! `zapdesk --version`.

/// Read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version_line() -> String {
    format!("zapdesk {}", VERSION)
}

pub fn handle_version_command() {
    println!("{}", version_line());
}
