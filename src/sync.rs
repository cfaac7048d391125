//! Conversation list synchronization.
//!
//! [`visible_conversations`] turns the raw `GET /conversations` answer into
//! the conversations of one tab; [`reconcile_rows`] applies them to the
//! rendered list without rebuilding rows that still exist.

use tracing::{debug, warn};

use crate::format::{default_avatar_url, preview_text, stored_avatar_path};
use crate::models::{Conversation, ConversationRecord, ConversationStatus, Jid, ProfilePicture};
use crate::view_state::{ConversationList, ConversationRow};

/// Conversations with a usable jid, in backend order. Group and broadcast
/// chats are left out.
pub fn valid_conversations(records: Vec<ConversationRecord>) -> Vec<Conversation> {
    records
        .into_iter()
        .filter_map(|record| match Conversation::try_from(record) {
            Ok(conversation) => Some(conversation),
            Err(e) => {
                warn!("Skipping conversation: {}", e);
                None
            }
        })
        .filter(|c| !c.jid.is_group())
        .collect()
}

/// Conversations that belong to `tab`, in backend order.
///
/// Besides what [`valid_conversations`] drops, conversations without a
/// recognised status are left out.
pub fn visible_conversations(
    records: Vec<ConversationRecord>,
    tab: ConversationStatus,
) -> Vec<Conversation> {
    valid_conversations(records)
        .into_iter()
        .filter(|c| c.status == Some(tab))
        .collect()
}

/// Preview line for a conversation: its last message's text, if any.
pub fn preview_for(conversation: &Conversation) -> String {
    conversation
        .last_message()
        .and_then(|m| m.preview_source())
        .map(preview_text)
        .unwrap_or_default()
}

/// Avatar for a freshly created row.
pub fn initial_avatar(conversation: &Conversation) -> String {
    conversation
        .profile_image_url
        .clone()
        .unwrap_or_else(|| stored_avatar_path(conversation.jid.as_str()))
}

/// Avatar URL after a `GET /update-profile-picture/:jid` answer.
pub fn avatar_from(picture: &ProfilePicture, jid: &Jid, name: &str) -> String {
    match picture {
        ProfilePicture::Generated => default_avatar_url(name),
        ProfilePicture::Url(url) => url.clone(),
        ProfilePicture::Stored => stored_avatar_path(jid.as_str()),
    }
}

/// Row-level changes made by one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowChanges {
    pub added: Vec<Jid>,
    pub updated: usize,
    pub removed: Vec<Jid>,
}

/// Bring the rendered rows in line with `visible`.
///
/// Existing rows keep their position and get name and preview updated;
/// new rows are appended; rows no longer visible are removed. Afterwards
/// exactly the row of `selected` (if rendered) is marked selected.
pub fn reconcile_rows(
    list: &mut ConversationList,
    visible: &[Conversation],
    selected: Option<&Jid>,
) -> RowChanges {
    let mut changes = RowChanges::default();

    for conversation in visible {
        let preview = preview_for(conversation);
        match list.row_mut(&conversation.jid) {
            Some(row) => {
                row.name = conversation.name.clone();
                row.preview = preview;
                changes.updated += 1;
            }
            None => {
                let mut row = ConversationRow::new(
                    conversation.jid.clone(),
                    conversation.name.clone(),
                    initial_avatar(conversation),
                );
                row.preview = preview;
                list.push(row);
                changes.added.push(conversation.jid.clone());
            }
        }
    }

    let stale: Vec<Jid> = list
        .jids()
        .into_iter()
        .filter(|jid| !visible.iter().any(|c| &c.jid == jid))
        .collect();
    for jid in stale {
        list.remove(&jid);
        changes.removed.push(jid);
    }

    list.select(selected);
    debug!(
        "Rows reconciled: {} added, {} updated, {} removed",
        changes.added.len(),
        changes.updated,
        changes.removed.len()
    );
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<ConversationRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn jid(raw: &str) -> Jid {
        Jid::parse(raw).unwrap()
    }

    #[test]
    fn test_tab_filter_keeps_matching_status_only() {
        let data = records(json!([
            {"jid": "a@s.whatsapp.net", "status": "active"},
            {"jid": "b@s.whatsapp.net", "status": "queue"},
            {"jid": "c@s.whatsapp.net", "status": "closed"},
        ]));
        let visible = visible_conversations(data, ConversationStatus::Active);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].jid, jid("a@s.whatsapp.net"));
    }

    #[test]
    fn test_filter_drops_groups_and_bad_jids() {
        let data = records(json!([
            {"jid": "g@g.us", "status": "active"},
            {"jid": "n@newsletter", "status": "active"},
            {"jid": "undefined", "status": "active"},
            {"status": "active"},
            {"jid": "x@s.whatsapp.net"},
            {"jid": "ok@s.whatsapp.net", "status": "active"},
        ]));
        let visible = visible_conversations(data, ConversationStatus::Active);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].jid, jid("ok@s.whatsapp.net"));
    }

    #[test]
    fn test_reconcile_updates_in_place_and_removes_stale() {
        let mut list = ConversationList::new();
        let first = visible_conversations(
            records(json!([
                {"jid": "a@s.whatsapp.net", "name": "Ana", "status": "active"},
                {"jid": "b@s.whatsapp.net", "name": "Bia", "status": "active"},
            ])),
            ConversationStatus::Active,
        );
        let changes = reconcile_rows(&mut list, &first, None);
        assert_eq!(changes.added.len(), 2);

        let second = visible_conversations(
            records(json!([
                {"jid": "c@s.whatsapp.net", "name": "Caio", "status": "active"},
                {"jid": "b@s.whatsapp.net", "name": "Beatriz", "status": "active",
                 "messages": [{"messageId": "1", "text": "*Ana:*\nBom dia"}]},
            ])),
            ConversationStatus::Active,
        );
        let selected = jid("b@s.whatsapp.net");
        let changes = reconcile_rows(&mut list, &second, Some(&selected));
        assert_eq!(changes.added, vec![jid("c@s.whatsapp.net")]);
        assert_eq!(changes.removed, vec![jid("a@s.whatsapp.net")]);
        assert_eq!(changes.updated, 1);

        // b kept its slot ahead of the newly appended c
        let names: Vec<_> = list.rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Beatriz", "Caio"]);
        let b = list.row(&selected).unwrap();
        assert!(b.selected);
        assert_eq!(b.preview, "Ana: Bom dia");
    }

    #[test]
    fn test_avatar_from_profile_picture() {
        let a = jid("a@s.whatsapp.net");
        assert_eq!(
            avatar_from(&ProfilePicture::Generated, &a, "Ana Paula"),
            "https://ui-avatars.com/api/?name=Ana%20Paula&background=random"
        );
        assert_eq!(
            avatar_from(&ProfilePicture::Url("https://pps/a.jpg".into()), &a, "Ana"),
            "https://pps/a.jpg"
        );
        assert_eq!(
            avatar_from(&ProfilePicture::Stored, &a, "Ana"),
            "/profile-pics/a%40s.whatsapp.net.jpg"
        );
    }

    #[test]
    fn test_new_row_avatar() {
        let visible = visible_conversations(
            records(json!([
                {"jid": "a@s.whatsapp.net", "img": "https://pps/a.jpg", "status": "queue"},
                {"jid": "b@s.whatsapp.net", "status": "queue"},
            ])),
            ConversationStatus::Queue,
        );
        assert_eq!(initial_avatar(&visible[0]), "https://pps/a.jpg");
        assert_eq!(
            initial_avatar(&visible[1]),
            "/profile-pics/b%40s.whatsapp.net.jpg"
        );
    }
}
