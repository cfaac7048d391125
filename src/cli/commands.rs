//! Parsing of the lines typed into the interactive console.
//!
//! Lines starting with `/` are commands; anything else is message text.

use std::path::PathBuf;

use thiserror::Error;

use crate::console::Command;
use crate::models::ConversationStatus;
use crate::workflow::ClosePath;

pub const HELP: &str = "\
/open <jid>            abrir conversa
/tab <active|queue|closed>
/status <active|queue|closed>
/close <resolved|timeout|silent>
/cancel                fechar o menu de encerramento
/sticker <arquivo>     /audio <arquivo>
/fav <url> [id]        /unfav <url>
/favorites             /favsend <n>
/emoji <emoji>         /emojis [clear]
/delete [jid]          /logout   /quit";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command '/{0}'")]
    Unknown(String),

    #[error("/{command} requires {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("Invalid {what} '{value}'")]
    InvalidArgument { what: &'static str, value: String },
}

/// Parse one input line.
///
/// Returns `Ok(None)` for blank lines. A leading `//` escapes a message that
/// starts with a slash.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if let Some(escaped) = line.strip_prefix("//") {
        return Ok(Some(Command::Text(format!("/{}", escaped))));
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Text(line.to_string())));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    let mut words = args.split_whitespace();

    let command = match name {
        "open" => Command::Open(required(&mut words, "open", "a jid")?),
        "tab" => Command::Tab(status_arg(&mut words, "tab")?),
        "status" => Command::Status(status_arg(&mut words, "status")?),
        "close" => {
            let raw = required(&mut words, "close", "a close path")?;
            match ClosePath::parse(&raw) {
                Some(path) => Command::Close(path),
                None => {
                    return Err(CommandError::InvalidArgument {
                        what: "close path",
                        value: raw,
                    })
                }
            }
        }
        "cancel" => Command::CancelClose,
        "sticker" => Command::Sticker(PathBuf::from(non_empty(args, "sticker", "a file")?)),
        "audio" => Command::Audio(PathBuf::from(non_empty(args, "audio", "a file")?)),
        "fav" => Command::Favorite {
            url: required(&mut words, "fav", "a sticker url")?,
            message_id: words.next().map(str::to_string),
        },
        "unfav" => Command::Unfavorite(required(&mut words, "unfav", "a sticker url")?),
        "favorites" => Command::Favorites,
        "favsend" => {
            let raw = required(&mut words, "favsend", "a number")?;
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => Command::SendFavorite(n),
                _ => {
                    return Err(CommandError::InvalidArgument {
                        what: "number",
                        value: raw,
                    })
                }
            }
        }
        "emoji" => Command::Emoji(non_empty(args, "emoji", "an emoji")?.to_string()),
        "emojis" => match words.next() {
            Some("clear") => Command::ClearEmojis,
            _ => Command::Emojis,
        },
        "delete" => Command::Delete(words.next().map(str::to_string)),
        "logout" => Command::Logout,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn required<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    what: &'static str,
) -> Result<String, CommandError> {
    words
        .next()
        .map(str::to_string)
        .ok_or(CommandError::MissingArgument { command, what })
}

fn non_empty<'a>(
    args: &'a str,
    command: &'static str,
    what: &'static str,
) -> Result<&'a str, CommandError> {
    if args.is_empty() {
        Err(CommandError::MissingArgument { command, what })
    } else {
        Ok(args)
    }
}

fn status_arg<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
) -> Result<ConversationStatus, CommandError> {
    let raw = required(words, command, "a status")?;
    ConversationStatus::parse(&raw).ok_or(CommandError::InvalidArgument {
        what: "status",
        value: raw,
    })
}
