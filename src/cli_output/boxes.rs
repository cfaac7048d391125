//! Line-based output for the one-shot commands (`login`, `logout`, `pair`).

use std::io::{self, Write};

use crate::bootstrap::PairingCode;
use crate::models::ConnectionStatus;

const RULE_WIDTH: usize = 60;

const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const FAILURE: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const PHONE: &str = "📱";
}

/// ```text
/// ZAPDESK PAIRING
/// ════════════════════════════════════════════════════════════
/// ```
pub fn print_header(title: &str) {
    println!("\n{}\n{}\n", title, "═".repeat(RULE_WIDTH));
}

/// `  ✓ Token salvo`
pub fn print_step_line(icon: &str, message: &str) {
    println!("  {} {}", icon, message);
}

/// Redraws the waiting line in place while the phone has not scanned yet.
pub fn print_pairing_wait(poll: usize, status: &ConnectionStatus) {
    print!("\r  {} {:<40}", spinner_frame(poll), connection_label(status));
    io::stdout().flush().ok();
}

pub fn print_pairing_code(code: &PairingCode) {
    print_header("ZAPDESK PAIRING");
    print_step_line(icons::PHONE, "Escaneie o QR code no WhatsApp do celular:");
    println!("\n    {}\n", code.image_url);
}

fn spinner_frame(poll: usize) -> char {
    SPINNER_FRAMES[poll % SPINNER_FRAMES.len()]
}

pub fn connection_label(status: &ConnectionStatus) -> String {
    match status {
        ConnectionStatus::Connected => "conectado".to_string(),
        ConnectionStatus::Reconnecting => "reconectando".to_string(),
        ConnectionStatus::Disconnected => "aguardando leitura do QR code".to_string(),
        ConnectionStatus::Unknown(other) => other.clone(),
    }
}
