use bytes::Bytes;
use tracing::{debug, warn};

use super::{now_ms, Console, NO_OPEN_CHAT};
use crate::api::AUDIO_MIME;
use crate::error::{ConsoleResult, ErrorContext, ResultExt, UserAction};
use crate::format::{agent_signature, preview_text};
use crate::models::{Jid, Message, MessageBody, MessageStatus, SentMessageRef};
use crate::preferences::{sticker_mime, validate_sticker_upload};
use crate::reconcile::{
    advance_known, begin_send, confirm_send, merge, rollback_send, unseen, Confirmation,
    MergeReport,
};
use crate::sync::avatar_from;
use crate::traits::{HttpClient, MediaFetcher};
use crate::view_state::{ChatHeader, Composer, TimelineEntry};

impl<H: HttpClient> Console<H> {
    /// Open a conversation: header, composer and full history.
    pub async fn open_chat(&mut self, raw_jid: &str) -> ConsoleResult<()> {
        let jid = Jid::parse(raw_jid).map_err(|e| {
            warn!("Not opening conversation: {}", e);
            e
        })?;
        if !self.session.is_authenticated() {
            self.end_session();
            return Err(crate::error::AuthError::NotAuthenticated.into());
        }

        self.state.open_chat(jid.clone());
        self.view.list.select(Some(&jid));
        self.view.timeline.reset(Some(jid.clone()));
        self.view.close_menu_open = false;
        self.view.header = Some(
            self.state
                .header(&jid)
                .cloned()
                .unwrap_or_else(ChatHeader::loading),
        );

        let conversation = match self.api.conversation(&jid).await {
            Ok(conversation) => conversation,
            Err(e) => {
                warn!("Failed to load {}: {}", jid, e);
                return Err(self.absorb_auth(e));
            }
        };

        if let Err(e) = self.api.mark_as_read(&jid).await {
            warn!("Failed to mark {} as read: {}", jid, e);
        }
        if let Some(row) = self.view.list.row_mut(&jid) {
            row.unread = 0;
        }

        let avatar_url = match self.api.profile_picture(&jid).await {
            Ok(picture) => avatar_from(&picture, &jid, &conversation.name),
            Err(e) => {
                debug!("Avatar refresh failed for {}: {}", jid, e);
                crate::format::default_avatar_url(&conversation.name)
            }
        };
        let header = ChatHeader {
            name: conversation.name.clone(),
            avatar_url: Some(avatar_url),
        };
        self.state.cache_header(jid.clone(), header.clone());
        self.view.header = Some(header);

        if let Some(status) = conversation.status {
            self.state.record_status(jid.clone(), status);
        }
        self.view.composer = Composer::for_status(conversation.status);

        for message in &conversation.messages {
            self.view.timeline.render(TimelineEntry::new(message.clone()));
        }
        self.state
            .set_known_count(jid.clone(), conversation.messages.len());
        debug!("Opened {} with {} messages", jid, conversation.messages.len());

        self.refresh_unread().await;
        Ok(())
    }

    /// Send `body` to the open conversation, optimistically.
    ///
    /// Returns `None` when there was nothing to send.
    pub async fn send_text(&mut self, body: &str) -> ConsoleResult<Option<Confirmation>> {
        let body = body.trim();
        if body.is_empty() {
            return Ok(None);
        }
        self.require_token()?;
        let Some(jid) = self.state.current_chat().cloned() else {
            return Err(self.precondition(UserAction::SendMessage, NO_OPEN_CHAT));
        };
        if !self.view.composer.enabled {
            let placeholder = self.view.composer.placeholder;
            return Err(self.precondition(UserAction::SendMessage, placeholder));
        }
        self.send_signed_text(&jid, body).await.map(Some)
    }

    /// Full optimistic cycle for a signed text message.
    ///
    /// The bubble renders before the request; it is re-keyed on success and
    /// removed (with an alert) on failure. Nothing renders when `jid` is not
    /// the open conversation.
    pub(super) async fn send_signed_text(
        &mut self,
        jid: &Jid,
        body: &str,
    ) -> ConsoleResult<Confirmation> {
        let username = self.agent_name().await?;
        let now = now_ms();
        let temp_id = self.state.next_temp_id(now);
        if self.state.is_open(jid) {
            let message = Message::text(temp_id.clone(), jid.clone(), true, body, now);
            begin_send(
                &mut self.view.timeline,
                &mut self.state.sent_ids,
                message,
                Some(&username),
            );
        } else {
            self.state.sent_ids.insert(temp_id.clone());
        }

        let signed = agent_signature(&username, body);
        match self.api.send_text(jid, &signed).await {
            Ok(sent) => {
                let confirmation = confirm_send(
                    &mut self.view.timeline,
                    &mut self.state.sent_ids,
                    &temp_id,
                    sent.message_id.as_deref(),
                    MessageStatus::Sent,
                );
                self.bump_preview(jid, &preview_text(&signed));
                Ok(confirmation)
            }
            Err(e) => {
                rollback_send(&mut self.view.timeline, &mut self.state.sent_ids, &temp_id);
                Err(self.action_failed(UserAction::SendMessage, e))
            }
        }
    }

    /// Upload a sticker file to the open conversation.
    pub async fn send_sticker(
        &mut self,
        filename: &str,
        mime: Option<&str>,
        data: Bytes,
    ) -> ConsoleResult<Message> {
        if let Err(rejection) = validate_sticker_upload(filename, mime, data.len()) {
            return Err(self.precondition(UserAction::SendSticker, rejection.message()));
        }
        self.require_token()?;
        let Some(jid) = self.state.current_chat().cloned() else {
            return Err(self.precondition(UserAction::SendSticker, NO_OPEN_CHAT));
        };

        let mime = mime.unwrap_or_else(|| sticker_mime(filename));
        match self.api.send_sticker(&jid, filename, mime, data).await {
            Ok(sent) => {
                let url = sent.url.clone();
                Ok(self.render_sent_media(&jid, sent, MessageBody::Sticker { url }))
            }
            Err(e) => Err(self.action_failed(UserAction::SendSticker, e)),
        }
    }

    /// Send a favorite (already hosted) sticker to the open conversation.
    pub async fn send_sticker_from_url(
        &mut self,
        url: &str,
        name: Option<&str>,
    ) -> ConsoleResult<Message> {
        self.require_token()?;
        if self.state.current_chat().is_none() {
            return Err(self.precondition(UserAction::SendSticker, NO_OPEN_CHAT));
        }
        let data = match self.api.fetch(url).await {
            Ok(data) => data,
            Err(e) => return Err(self.action_failed(UserAction::SendSticker, e.into())),
        };
        let filename = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("sticker-{}.webp", now_ms()));
        self.send_sticker(&filename, None, data).await
    }

    /// Upload a recorded audio clip to the open conversation.
    pub async fn send_audio(&mut self, data: Bytes) -> ConsoleResult<Message> {
        self.require_token()?;
        let Some(jid) = self.state.current_chat().cloned() else {
            return Err(self.precondition(UserAction::SendAudio, NO_OPEN_CHAT));
        };
        debug!("Uploading {} bytes of {}", data.len(), AUDIO_MIME);
        match self.api.send_audio(&jid, data).await {
            Ok(sent) => {
                let url = sent.url.clone().or_else(|| sent.audio_url.clone());
                Ok(self.render_sent_media(&jid, sent, MessageBody::Audio { url }))
            }
            Err(e) => Err(self.action_failed(UserAction::SendAudio, e)),
        }
    }

    /// Render an outgoing media message once the backend accepted it.
    fn render_sent_media(&mut self, jid: &Jid, sent: SentMessageRef, body: MessageBody) -> Message {
        let now = now_ms();
        let message_id = sent
            .message_id
            .clone()
            .unwrap_or_else(|| self.state.next_temp_id(now));
        self.state.sent_ids.insert(message_id.clone());

        let message = Message::text(message_id, jid.clone(), true, "", sent.timestamp.unwrap_or(now))
            .with_body(body)
            .with_status(MessageStatus::Sent);
        if self.state.is_open(jid) {
            self.view.timeline.render(TimelineEntry::new(message.clone()));
        }
        message
    }

    /// Poll the open conversation and merge what is new since the last poll.
    pub async fn refresh_open_chat(&mut self) -> ConsoleResult<MergeReport> {
        let Some(jid) = self.state.current_chat().cloned() else {
            return Ok(MergeReport::default());
        };
        let conversation = match self.api.conversation(&jid).await {
            Ok(conversation) => conversation,
            Err(e) => return Err(self.absorb_auth(e)),
        };

        let known = self.state.known_count(&jid);
        let history = &conversation.messages;
        let report = merge(
            &mut self.view.timeline,
            &self.state.sent_ids,
            unseen(history, known),
        );
        self.state
            .set_known_count(jid, advance_known(known, history.len()));
        if !report.rendered.is_empty() {
            debug!("Fallback poll rendered {} messages", report.rendered.len());
        }
        Ok(report)
    }

    /// Fallback tick: polls the open chat only while the realtime bridge is down.
    pub async fn chat_fallback_tick(&mut self) {
        if self.realtime_connected {
            return;
        }
        let Some(jid) = self.state.current_chat().cloned() else {
            return;
        };
        let refreshed = self
            .refresh_open_chat()
            .await
            .context(ErrorContext::new("fallback chat refresh").with_jid(jid.as_str()));
        if let Err(e) = refreshed {
            match e.context() {
                Some(ctx) if !e.category().is_transient() => warn!("{} {}", ctx.to_log_string(), e),
                _ => debug!("{}", e),
            }
        }
    }

    /// New preview text for a row, which moves to the top.
    pub(super) fn bump_preview(&mut self, jid: &Jid, preview: &str) {
        if let Some(row) = self.view.list.row_mut(jid) {
            row.preview = preview.to_string();
            self.view.list.move_to_top(jid);
        }
    }
}
