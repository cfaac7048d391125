use tracing::{debug, warn};

use super::Console;
use crate::error::{AuthError, ConsoleResult, ErrorContext, ResultExt};
use crate::models::ConversationStatus;
use crate::sync::{avatar_from, reconcile_rows, valid_conversations, RowChanges};
use crate::traits::HttpClient;

impl<H: HttpClient> Console<H> {
    /// Re-fetch the conversation list and reconcile the rows of the current tab.
    pub async fn refresh_list(&mut self) -> ConsoleResult<RowChanges> {
        if !self.session.is_authenticated() {
            self.end_session();
            return Err(AuthError::NotAuthenticated.into());
        }

        let records = match self.api.conversations().await {
            Ok(records) => records,
            Err(e) => return Err(self.absorb_auth(e)),
        };

        let tab = self.state.tab();
        let mut visible = Vec::new();
        for conversation in valid_conversations(records) {
            if let Some(status) = conversation.status {
                self.state.record_status(conversation.jid.clone(), status);
            }
            if conversation.status == Some(tab) {
                visible.push(conversation);
            }
        }

        let changes = reconcile_rows(&mut self.view.list, &visible, self.state.current_chat());

        for jid in &changes.added {
            let name = visible
                .iter()
                .find(|c| &c.jid == jid)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            match self.api.profile_picture(jid).await {
                Ok(picture) => {
                    let url = avatar_from(&picture, jid, &name);
                    if let Some(row) = self.view.list.row_mut(jid) {
                        row.avatar_url = url;
                    }
                }
                Err(e) => debug!("Keeping initial avatar of {}: {}", jid, e),
            }
        }
        Ok(changes)
    }

    /// Periodic list refresh. Errors are logged; auth failures end the session.
    pub async fn refresh_tick(&mut self) {
        let tab = self.state.tab();
        let refreshed = self
            .refresh_list()
            .await
            .with_context(|| ErrorContext::new(format!("refresh {} tab", tab)));
        if let Err(e) = refreshed {
            let category = e.category();
            if category.is_transient() {
                debug!("Conversation list refresh failed [{}]: {}", category, e);
            } else if !e.requires_reauth() {
                warn!("Conversation list refresh failed [{}]: {}", category, e);
            }
        }
    }

    /// Switch the list to another status tab.
    pub async fn change_tab(&mut self, tab: ConversationStatus) -> ConsoleResult<RowChanges> {
        if self.state.tab() != tab {
            debug!("Switching to tab {}", tab);
            self.state.set_tab(tab);
        }
        self.refresh_list().await
    }

    /// Refresh the total unread count shown in the window title.
    pub async fn refresh_unread(&mut self) {
        match self.api.unread_count().await {
            Ok(total) => self.set_unread_total(total),
            Err(e) => warn!("Unread count refresh failed: {}", e),
        }
    }

    pub(super) fn set_unread_total(&mut self, total: u32) {
        self.state.set_unread_total(total);
        self.view.set_unread_total(total);
    }
}
