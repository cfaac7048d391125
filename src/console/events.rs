use tracing::{debug, warn};

use super::Console;
use crate::format::preview_text;
use crate::models::{Jid, Message};
use crate::realtime::RealtimeEvent;
use crate::reconcile::{classify_arrival, merge, Arrival};
use crate::traits::HttpClient;

impl<H: HttpClient> Console<H> {
    /// Apply one event from the realtime bridge.
    pub async fn handle_realtime_event(&mut self, event: RealtimeEvent) {
        match event {
            RealtimeEvent::NewMessage(message) => self.on_new_message(message).await,
            RealtimeEvent::StatusUpdate { message_id, status } => {
                if !self.view.timeline.set_status(&message_id, status) {
                    debug!("Status {} for {} not rendered", status, message_id);
                }
            }
            RealtimeEvent::UnreadUpdate { jid, unread_count } => {
                self.on_unread_update(&jid, unread_count).await
            }
        }
    }

    async fn on_new_message(&mut self, message: Message) {
        match classify_arrival(&message, &self.state.sent_ids, self.state.current_chat()) {
            Arrival::OwnEcho => debug!("Skipping echo of {}", message.message_id),
            Arrival::OpenChat => {
                merge(
                    &mut self.view.timeline,
                    &self.state.sent_ids,
                    std::iter::once(&message),
                );
            }
            Arrival::Background(jid) => {
                if let Some(row) = self.view.list.row_mut(&jid) {
                    if !message.from_me {
                        row.unread = row.unread.saturating_add(1);
                    }
                }
                if let Some(text) = message.preview_source() {
                    let preview = preview_text(text);
                    self.bump_preview(&jid, &preview);
                } else {
                    self.view.list.move_to_top(&jid);
                }
                self.refresh_unread().await;
            }
            Arrival::Unroutable => warn!("Dropping message {} without jid", message.message_id),
        }
    }

    /// Row badge from the event; the title total from `GET /unread-count`,
    /// or the event count when that fails.
    async fn on_unread_update(&mut self, jid: &Jid, unread_count: u32) {
        if let Some(row) = self.view.list.row_mut(jid) {
            row.unread = unread_count;
        }
        match self.api.unread_count().await {
            Ok(total) => self.set_unread_total(total),
            Err(e) => {
                debug!("Unread total unavailable ({}), using event count", e);
                self.set_unread_total(unread_count);
            }
        }
    }
}
