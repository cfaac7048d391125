use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConsoleError;

/// Suffixes of group and broadcast identifiers, never listed by the console.
const GROUP_SUFFIXES: [&str; 2] = ["@g.us", "@newsletter"];

/// Stable opaque identifier of a conversation (chat address).
///
/// Construction goes through [`Jid::parse`], which rejects the empty string
/// and the literal `"undefined"` / `"null"` values upstream data sometimes
/// carries. Holding a `Jid` means the guard already ran.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Jid(String);

impl Jid {
    pub fn parse(raw: &str) -> Result<Self, ConsoleError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "undefined" || trimmed == "null" {
            return Err(ConsoleError::InvalidJid(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Group chats and newsletters.
    pub fn is_group(&self) -> bool {
        GROUP_SUFFIXES.iter().any(|suffix| self.0.ends_with(suffix))
    }

    /// Address part before the `@`, usually the phone number.
    pub fn user_part(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Jid {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Jid::parse(s)
    }
}

impl AsRef<str> for Jid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Jid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Jid::parse(&raw).map_err(serde::de::Error::custom)
    }
}
