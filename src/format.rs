//! Text formatting shared by the views and the outgoing message path.

use chrono::{DateTime, Local, TimeZone, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

static BOLD_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*]+)\*").expect("Invalid bold marker regex"));
static STICKER_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/stickers/([^.]+)\.webp").expect("Invalid sticker file regex"));

const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";
const QR_SERVICE: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// `hh:mm AM` clock label for an epoch-millisecond timestamp, local time.
///
/// A zero or out-of-range timestamp shows the current time.
pub fn format_time_12h(timestamp_ms: i64) -> String {
    let when = if timestamp_ms > 0 {
        Local.timestamp_millis_opt(timestamp_ms).single()
    } else {
        None
    };
    clock_label(&when.unwrap_or_else(Local::now))
}

pub fn clock_label<Tz: TimeZone>(when: &DateTime<Tz>) -> String {
    let (pm, hour) = when.hour12();
    format!(
        "{:02}:{:02} {}",
        hour,
        when.minute(),
        if pm { "PM" } else { "AM" }
    )
}

pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Outgoing text as the customer sees it: `*Username:*` line, then the body.
pub fn agent_signature(username: &str, body: &str) -> String {
    format!("*{}:*\n{}", capitalize_first(username), body)
}

/// Conversation-list preview: bold markers dropped, lines joined.
pub fn preview_text(text: &str) -> String {
    let plain = BOLD_MARKERS.replace_all(text, "$1");
    plain.lines().collect::<Vec<_>>().join(" ")
}

pub fn default_avatar_url(name: &str) -> String {
    format!(
        "{}?name={}&background=random",
        AVATAR_SERVICE,
        urlencoding::encode(name)
    )
}

/// Path under which the backend serves a stored profile picture.
pub fn stored_avatar_path(jid: &str) -> String {
    format!("/profile-pics/{}.jpg", urlencoding::encode(jid))
}

pub fn qr_image_url(qr: &str) -> String {
    format!("{}?data={}", QR_SERVICE, urlencoding::encode(qr))
}

/// `Chat - <brand> (<n>)`, without the counter when nothing is unread.
pub fn window_title(brand: &str, unread: u32) -> String {
    if unread > 0 {
        format!("Chat - {} ({})", brand, unread)
    } else {
        format!("Chat - {}", brand)
    }
}

/// Message id encoded in a served sticker file name.
pub fn sticker_id_from_url(url: &str) -> Option<String> {
    STICKER_FILE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
