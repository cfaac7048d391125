//! Incremental console rendering.
//!
//! stdout is append-only, so [`Screen`] remembers what it already printed
//! and only writes what changed since the last frame: title, list, header,
//! new or updated timeline lines, composer state, alerts and notices.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::models::Jid;
use crate::view_state::ConsoleView;

const CLOSE_MENU: &str =
    "Encerrar conversa: /close resolved | /close timeout | /close silent | /cancel";

pub struct Screen<W: Write> {
    out: W,
    title: String,
    list: Vec<String>,
    chat: Option<Jid>,
    header: Option<String>,
    /// Last line printed per message id in the open chat.
    lines: HashMap<String, String>,
    placeholder: Option<&'static str>,
    close_menu_open: bool,
}

impl<W: Write> Screen<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            title: String::new(),
            list: Vec::new(),
            chat: None,
            header: None,
            lines: HashMap::new(),
            placeholder: None,
            close_menu_open: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print what changed in `view`, draining its alerts and notices.
    pub fn render(&mut self, view: &mut ConsoleView) -> io::Result<()> {
        if view.title() != self.title {
            self.title = view.title().to_string();
            writeln!(self.out, "== {} ==", self.title)?;
        }

        let list: Vec<String> = view.list.rows().iter().map(|r| r.display_line()).collect();
        if list != self.list {
            for line in &list {
                writeln!(self.out, "{}", line)?;
            }
            if list.is_empty() {
                writeln!(self.out, "  (nenhuma conversa)")?;
            }
            self.list = list;
        }

        if view.timeline.jid() != self.chat.as_ref() {
            self.chat = view.timeline.jid().cloned();
            self.header = None;
            self.lines.clear();
        }
        let header = view.header.as_ref().map(|h| h.name.clone());
        if header != self.header {
            if let Some(name) = &header {
                writeln!(self.out, "── {} ──", name)?;
            }
            self.header = header;
        }

        for entry in view.timeline.entries() {
            let line = entry.display_line();
            if self.lines.get(entry.id()) != Some(&line) {
                writeln!(self.out, "{}", line)?;
                self.lines.insert(entry.id().to_string(), line);
            }
        }

        let placeholder = self.chat.as_ref().map(|_| view.composer.placeholder);
        if placeholder != self.placeholder {
            if let Some(text) = placeholder.filter(|_| !view.composer.enabled) {
                writeln!(self.out, "[{}]", text)?;
            }
            self.placeholder = placeholder;
        }

        if view.close_menu_open && !self.close_menu_open {
            writeln!(self.out, "{}", CLOSE_MENU)?;
        }
        self.close_menu_open = view.close_menu_open;

        for alert in view.take_alerts() {
            writeln!(self.out, "⚠ {}", alert)?;
        }
        for notice in view.take_notices() {
            writeln!(self.out, "  {}", notice)?;
        }
        self.out.flush()
    }
}
