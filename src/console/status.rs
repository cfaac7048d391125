use tracing::{debug, info, warn};

use super::Console;
use crate::error::{ConsoleResult, UserAction, WorkflowError};
use crate::models::{ConversationStatus, Jid};
use crate::traits::HttpClient;
use crate::view_state::Composer;
use crate::workflow::{plan, ClosePath, Transition};

pub const DELETED: &str = "Conversa deletada com sucesso";
pub const NOT_FOUND: &str = "Conversa não encontrada";

impl<H: HttpClient> Console<H> {
    /// Request a status change for `raw_jid`.
    ///
    /// Moving to `closed` only opens the close confirmation; everything else
    /// is persisted right away.
    pub async fn update_status(
        &mut self,
        raw_jid: &str,
        to: ConversationStatus,
    ) -> ConsoleResult<Transition> {
        let jid = match Jid::parse(raw_jid) {
            Ok(jid) => jid,
            Err(e) => {
                self.view.alert(e.user_message());
                return Err(e);
            }
        };
        let transition = plan(self.state.status_of(&jid), to).map_err(|e| {
            debug!("Ignoring status change of {}: {}", jid, e);
            e
        })?;

        match transition {
            Transition::ConfirmClose => {
                debug!("Awaiting close confirmation for {}", jid);
                self.state.close.open(jid);
                self.view.close_menu_open = true;
            }
            Transition::Immediate(status) => self.apply_status(&jid, status).await?,
        }
        Ok(transition)
    }

    /// Persist `status`, then show the tab it moved to.
    async fn apply_status(&mut self, jid: &Jid, status: ConversationStatus) -> ConsoleResult<()> {
        self.require_token()?;
        if let Err(e) = self.api.update_status(jid, status).await {
            return Err(self.action_failed(UserAction::UpdateStatus, e));
        }
        info!("{} moved to {}", jid, status);
        self.state.record_status(jid.clone(), status);
        if self.state.is_open(jid) {
            self.view.composer = Composer::for_status(Some(status));
        }
        self.change_tab(status).await?;
        Ok(())
    }

    /// Leave the close confirmation through `path`.
    ///
    /// The canned message (if any) goes out first; failing to send it does
    /// not stop the close. A failed status update keeps the confirmation open.
    pub async fn close_conversation(&mut self, path: ClosePath) -> ConsoleResult<()> {
        let jid = self
            .state
            .close
            .pending()
            .cloned()
            .ok_or(WorkflowError::NoPendingClose)?;
        self.require_token()?;

        if let Some(text) = path.canned_message() {
            if let Err(e) = self.send_signed_text(&jid, text).await {
                if self.signed_out {
                    return Err(e);
                }
                warn!("Closing message to {} not delivered: {}", jid, e);
            }
        }

        if let Err(e) = self.api.update_status(&jid, ConversationStatus::Closed).await {
            return Err(self.action_failed(UserAction::CloseConversation, e));
        }
        info!("{} closed ({:?})", jid, path);

        self.state.close.confirm()?;
        self.view.close_menu_open = false;
        self.state.record_status(jid.clone(), ConversationStatus::Closed);
        if self.state.is_open(&jid) {
            self.view.composer = Composer::for_status(Some(ConversationStatus::Closed));
        }
        self.change_tab(ConversationStatus::Closed).await?;
        Ok(())
    }

    /// Dismiss the close confirmation without changing anything.
    pub fn cancel_close(&mut self) -> Option<Jid> {
        self.view.close_menu_open = false;
        self.state.close.cancel()
    }

    /// Delete a conversation, by default the open one.
    pub async fn delete_conversation(&mut self, raw_jid: Option<&str>) -> ConsoleResult<()> {
        let parsed = match raw_jid {
            Some(raw) => Jid::parse(raw),
            None => self
                .state
                .current_chat()
                .cloned()
                .ok_or_else(|| crate::error::ConsoleError::InvalidJid(String::new())),
        };
        let jid = match parsed {
            Ok(jid) => jid,
            Err(e) => {
                self.view.alert(e.user_message());
                return Err(e);
            }
        };
        self.require_token()?;

        let id = match self.api.conversation_id(&jid).await {
            Ok(found) if found.success => found.id,
            Ok(_) => None,
            Err(e) if e.requires_reauth() => return Err(self.absorb_auth(e)),
            Err(e) => {
                warn!("Conversation id lookup for {} failed: {}", jid, e);
                None
            }
        };
        let Some(id) = id else {
            return Err(self.precondition(UserAction::DeleteConversation, NOT_FOUND));
        };

        if let Err(e) = self.api.delete_conversation(&id).await {
            return Err(self.action_failed(UserAction::DeleteConversation, e));
        }
        info!("Deleted conversation {} ({})", jid, id);

        let was_open = self.state.is_open(&jid);
        self.state.forget(&jid);
        if self.state.close.pending() == Some(&jid) {
            self.cancel_close();
        }
        if was_open {
            self.view.clear_chat();
        }
        self.view.list.remove(&jid);
        self.view.alert(DELETED);
        self.refresh_list().await?;
        Ok(())
    }
}
