//! Message reconciliation.
//!
//! Pure bookkeeping over a [`Timeline`] and the [`SentIdCache`]: optimistic
//! entries, their confirmation or rollback, and one merge path shared by the
//! realtime handler and the fallback poll.

use tracing::debug;

use crate::cache::SentIdCache;
use crate::models::{Jid, Message, MessageStatus};
use crate::view_state::{Rekey, Timeline, TimelineEntry};

pub const TEMP_ID_PREFIX: &str = "temp-";

/// Issues `temp-<ms>` ids, never the same one twice even within one
/// millisecond.
#[derive(Debug, Clone, Default)]
pub struct TempIdGenerator {
    last: i64,
}

impl TempIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, now_ms: i64) -> String {
        let stamp = if now_ms > self.last { now_ms } else { self.last + 1 };
        self.last = stamp;
        format!("{}{}", TEMP_ID_PREFIX, stamp)
    }
}

/// Build the optimistic entry for an outgoing message and render it.
///
/// The temporary id is recorded as sent so an early realtime echo of the
/// same id is suppressed.
pub fn begin_send(
    timeline: &mut Timeline,
    sent: &mut SentIdCache,
    message: Message,
    author: Option<&str>,
) -> String {
    let id = message.message_id.clone();
    sent.insert(id.clone());
    let mut entry = TimelineEntry::new(message.with_status(MessageStatus::Pending));
    if let Some(author) = author {
        entry = entry.with_author(author);
    }
    timeline.render(entry);
    debug!("Optimistic entry {} rendered", id);
    id
}

/// How a send confirmation was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// The temporary entry now carries the backend id.
    Rekeyed(String),
    /// The backend id was already rendered (realtime won the race); the
    /// temporary entry was dropped.
    Deduplicated(String),
    /// The backend returned no id; the temporary entry stays as is.
    Unconfirmed,
    /// The temporary entry is gone (chat switched or already removed).
    Orphaned(String),
}

/// Apply the backend's answer to an optimistic send.
pub fn confirm_send(
    timeline: &mut Timeline,
    sent: &mut SentIdCache,
    temp_id: &str,
    backend_id: Option<&str>,
    status: MessageStatus,
) -> Confirmation {
    let Some(real_id) = backend_id.filter(|id| !id.is_empty()) else {
        debug!("Send of {} confirmed without id", temp_id);
        return Confirmation::Unconfirmed;
    };
    sent.insert(real_id.to_string());
    match timeline.rekey(temp_id, real_id, status) {
        Rekey::Rekeyed => {
            debug!("Rekeyed {} -> {}", temp_id, real_id);
            Confirmation::Rekeyed(real_id.to_string())
        }
        Rekey::DroppedDuplicate => {
            debug!("{} already rendered, dropped {}", real_id, temp_id);
            Confirmation::Deduplicated(real_id.to_string())
        }
        Rekey::Missing => Confirmation::Orphaned(real_id.to_string()),
    }
}

/// Undo an optimistic send after a failure.
pub fn rollback_send(timeline: &mut Timeline, sent: &mut SentIdCache, temp_id: &str) -> bool {
    sent.remove(temp_id);
    let removed = timeline.remove(temp_id).is_some();
    debug!("Rolled back {} (removed: {})", temp_id, removed);
    removed
}

/// What to do with a realtime `message:new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arrival {
    /// Echo of a message this session sent; already rendered.
    OwnEcho,
    /// Belongs to the open conversation: render it.
    OpenChat,
    /// Belongs to another conversation: preview and unread only.
    Background(Jid),
    /// Carries no usable jid.
    Unroutable,
}

pub fn classify_arrival(message: &Message, sent: &SentIdCache, open: Option<&Jid>) -> Arrival {
    if message.from_me && sent.contains(&message.message_id) {
        return Arrival::OwnEcho;
    }
    match &message.jid {
        None => Arrival::Unroutable,
        Some(jid) if Some(jid) == open => Arrival::OpenChat,
        Some(jid) => Arrival::Background(jid.clone()),
    }
}

/// Result of merging a batch into the timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Ids appended to the timeline.
    pub rendered: Vec<String>,
    /// Own echoes skipped through the sent-id set.
    pub suppressed: usize,
    /// Ids already present.
    pub duplicates: usize,
}

/// Merge a batch of messages, from any source, into the timeline.
///
/// Own messages whose id was sent this session are skipped; everything else
/// renders once. Safe to re-apply.
pub fn merge<'a>(
    timeline: &mut Timeline,
    sent: &SentIdCache,
    batch: impl IntoIterator<Item = &'a Message>,
) -> MergeReport {
    let mut report = MergeReport::default();
    for message in batch {
        if message.from_me && sent.contains(&message.message_id) {
            report.suppressed += 1;
        } else if timeline.render(TimelineEntry::new(message.clone())) {
            report.rendered.push(message.message_id.clone());
        } else {
            report.duplicates += 1;
        }
    }
    report
}

/// Messages past the `known` count of an authoritative history.
pub fn unseen(history: &[Message], known: usize) -> &[Message] {
    history.get(known..).unwrap_or(&[])
}

/// Known count after a poll: advances only when something new arrived.
pub fn advance_known(known: usize, history_len: usize) -> usize {
    if history_len > known {
        history_len
    } else {
        known
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jid(raw: &str) -> Jid {
        Jid::parse(raw).unwrap()
    }

    fn incoming(id: &str, chat: &str) -> Message {
        Message::text(id, jid(chat), false, "oi", 1)
    }

    fn outgoing(id: &str, chat: &str) -> Message {
        Message::text(id, jid(chat), true, "Olá", 1)
    }

    #[test]
    fn test_temp_ids_are_unique() {
        let mut ids = TempIdGenerator::new();
        assert_eq!(ids.next_id(1000), "temp-1000");
        assert_eq!(ids.next_id(1000), "temp-1001");
        assert_eq!(ids.next_id(999), "temp-1002");
        assert_eq!(ids.next_id(5000), "temp-5000");
    }

    #[test]
    fn test_send_then_realtime_echo_renders_once() {
        let chat = "a@s.whatsapp.net";
        let mut timeline = Timeline::new();
        let mut sent = SentIdCache::default();

        let temp = begin_send(&mut timeline, &mut sent, outgoing("temp-1", chat), Some("Ana"));
        let outcome = confirm_send(&mut timeline, &mut sent, &temp, Some("3EB0"), MessageStatus::Sent);
        assert_eq!(outcome, Confirmation::Rekeyed("3EB0".to_string()));

        let echo = outgoing("3EB0", chat);
        assert_eq!(
            classify_arrival(&echo, &sent, Some(&jid(chat))),
            Arrival::OwnEcho
        );
        let report = merge(&mut timeline, &sent, [&echo]);
        assert_eq!(report.suppressed, 1);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.entries()[0].id(), "3EB0");
    }

    #[test]
    fn test_echo_before_confirmation_is_deduplicated() {
        let chat = "a@s.whatsapp.net";
        let mut timeline = Timeline::new();
        let mut sent = SentIdCache::default();

        let temp = begin_send(&mut timeline, &mut sent, outgoing("temp-1", chat), None);
        // The echo is not yet known as ours and renders.
        merge(&mut timeline, &sent, [&outgoing("3EB0", chat)]);
        assert_eq!(timeline.len(), 2);

        let outcome = confirm_send(&mut timeline, &mut sent, &temp, Some("3EB0"), MessageStatus::Sent);
        assert_eq!(outcome, Confirmation::Deduplicated("3EB0".to_string()));
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_rollback_removes_entry() {
        let mut timeline = Timeline::new();
        let mut sent = SentIdCache::default();
        let temp = begin_send(
            &mut timeline,
            &mut sent,
            outgoing("temp-1", "a@s.whatsapp.net"),
            None,
        );
        assert!(rollback_send(&mut timeline, &mut sent, &temp));
        assert!(timeline.is_empty());
        assert!(!sent.contains(&temp));
    }

    #[test]
    fn test_confirmation_without_id_keeps_entry() {
        let mut timeline = Timeline::new();
        let mut sent = SentIdCache::default();
        let temp = begin_send(
            &mut timeline,
            &mut sent,
            outgoing("temp-1", "a@s.whatsapp.net"),
            None,
        );
        assert_eq!(
            confirm_send(&mut timeline, &mut sent, &temp, None, MessageStatus::Sent),
            Confirmation::Unconfirmed
        );
        assert!(timeline.contains(&temp));
    }

    #[test]
    fn test_classify_arrival_routes_by_jid() {
        let sent = SentIdCache::default();
        let open = jid("a@s.whatsapp.net");
        assert_eq!(
            classify_arrival(&incoming("1", "a@s.whatsapp.net"), &sent, Some(&open)),
            Arrival::OpenChat
        );
        assert_eq!(
            classify_arrival(&incoming("2", "b@s.whatsapp.net"), &sent, Some(&open)),
            Arrival::Background(jid("b@s.whatsapp.net"))
        );
        let mut orphan = incoming("3", "a@s.whatsapp.net");
        orphan.jid = None;
        assert_eq!(classify_arrival(&orphan, &sent, Some(&open)), Arrival::Unroutable);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut timeline = Timeline::new();
        let sent = SentIdCache::default();
        let batch = vec![incoming("1", "a@s.whatsapp.net"), incoming("2", "a@s.whatsapp.net")];
        let first = merge(&mut timeline, &sent, &batch);
        let second = merge(&mut timeline, &sent, &batch);
        assert_eq!(first.rendered, vec!["1", "2"]);
        assert_eq!(second.duplicates, 2);
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_unseen_and_known_count() {
        let history = vec![
            incoming("1", "a@s.whatsapp.net"),
            incoming("2", "a@s.whatsapp.net"),
            incoming("3", "a@s.whatsapp.net"),
        ];
        assert_eq!(unseen(&history, 2).len(), 1);
        assert!(unseen(&history, 3).is_empty());
        assert!(unseen(&history, 10).is_empty());
        assert_eq!(advance_known(2, 3), 3);
        assert_eq!(advance_known(5, 3), 5);
    }
}
