//! Context
//!
//!     The context is the accumulator commands are applied to: the currently selected model and
//!     the conversation history. It starts empty, is mutated once per command in file order by
//!     a single owner, and is handed over complete once the command stream is exhausted.
//!
//!     The history is a sink behind the [History] trait so the consumer decides how turns are
//!     stored. [Transcript] is the ordered in-memory sink used by the tooling in this crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversational speaker, fixed by the keyword that introduced a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::System => "SYSTEM",
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        };
        f.write_str(name)
    }
}

/// Opaque model name, preserved verbatim from the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelName(String);

impl ModelName {
    pub fn new(name: impl Into<String>) -> Self {
        ModelName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelName {
    fn from(name: &str) -> Self {
        ModelName::new(name)
    }
}

impl From<String> for ModelName {
    fn from(name: String) -> Self {
        ModelName(name)
    }
}

/// Sink for conversational turns. Call order is conversational order.
pub trait History {
    fn append(&mut self, role: Role, message: &str);
}

impl<H: History + ?Sized> History for &mut H {
    fn append(&mut self, role: Role, message: &str) {
        (**self).append(role, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub message: String,
}

impl HistoryEntry {
    pub fn new(role: Role, message: impl Into<String>) -> Self {
        HistoryEntry {
            role,
            message: message.into(),
        }
    }
}

impl History for Vec<HistoryEntry> {
    fn append(&mut self, role: Role, message: &str) {
        self.push(HistoryEntry::new(role, message));
    }
}

/// Ordered, append-only conversation history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<HistoryEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a complete history in front of this one, keeping the relative order of both.
    pub fn prepend(&mut self, header: Transcript) {
        let tail = std::mem::replace(&mut self.entries, header.entries);
        self.entries.extend(tail);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl History for Transcript {
    fn append(&mut self, role: Role, message: &str) {
        self.entries.push(HistoryEntry::new(role, message));
    }
}

impl FromIterator<HistoryEntry> for Transcript {
    fn from_iter<I: IntoIterator<Item = HistoryEntry>>(iter: I) -> Self {
        Transcript {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Current model plus the history sink. `current_model` is `None` until a FROM is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context<H = Transcript> {
    pub current_model: Option<ModelName>,
    pub history: H,
}

impl<H: History> Context<H> {
    pub fn new(history: H) -> Self {
        Context {
            current_model: None,
            history,
        }
    }
}
