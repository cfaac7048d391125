//! Rendered rows of the conversation list.

use crate::models::Jid;

/// One row of the conversation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRow {
    pub jid: Jid,
    pub name: String,
    /// Last message text, bold markers stripped.
    pub preview: String,
    pub avatar_url: String,
    pub unread: u32,
    pub selected: bool,
}

impl ConversationRow {
    pub fn new(jid: Jid, name: impl Into<String>, avatar_url: impl Into<String>) -> Self {
        Self {
            jid,
            name: name.into(),
            preview: String::new(),
            avatar_url: avatar_url.into(),
            unread: 0,
            selected: false,
        }
    }

    pub fn display_line(&self) -> String {
        let marker = if self.selected { '>' } else { ' ' };
        let mut line = format!("{} {}", marker, self.name);
        if self.unread > 0 {
            line.push_str(&format!(" ({})", self.unread));
        }
        if !self.preview.is_empty() {
            line.push_str(" - ");
            line.push_str(&self.preview);
        }
        line
    }
}

/// Rows in display order. Rows are mutated in place across refreshes so
/// their position and selection survive.
#[derive(Debug, Clone, Default)]
pub struct ConversationList {
    rows: Vec<ConversationRow>,
}

impl ConversationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[ConversationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn jids(&self) -> Vec<Jid> {
        self.rows.iter().map(|r| r.jid.clone()).collect()
    }

    pub fn row(&self, jid: &Jid) -> Option<&ConversationRow> {
        self.rows.iter().find(|r| &r.jid == jid)
    }

    pub fn row_mut(&mut self, jid: &Jid) -> Option<&mut ConversationRow> {
        self.rows.iter_mut().find(|r| &r.jid == jid)
    }

    pub fn push(&mut self, row: ConversationRow) {
        self.rows.push(row);
    }

    pub fn remove(&mut self, jid: &Jid) -> Option<ConversationRow> {
        let index = self.rows.iter().position(|r| &r.jid == jid)?;
        Some(self.rows.remove(index))
    }

    pub fn retain(&mut self, keep: impl FnMut(&ConversationRow) -> bool) {
        self.rows.retain(keep);
    }

    /// Move a row to the top of the list.
    pub fn move_to_top(&mut self, jid: &Jid) -> bool {
        match self.rows.iter().position(|r| &r.jid == jid) {
            Some(index) => {
                let row = self.rows.remove(index);
                self.rows.insert(0, row);
                true
            }
            None => false,
        }
    }

    /// Mark the row for `jid` selected and every other row unselected.
    pub fn select(&mut self, jid: Option<&Jid>) {
        for row in &mut self.rows {
            row.selected = Some(&row.jid) == jid;
        }
    }

    pub fn selected(&self) -> Option<&ConversationRow> {
        self.rows.iter().find(|r| r.selected)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
