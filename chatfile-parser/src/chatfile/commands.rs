//! Commands
//!
//!     A command is one compiled unit of a chatfile. Each command mutates a [Context] when
//!     applied; a chatfile is compiled by applying its commands in source order to a fresh
//!     context. The set of commands is fixed by the grammar, so it is a closed enum rather
//!     than a trait.

use crate::chatfile::context::{Context, History, ModelName, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "UPPERCASE")]
pub enum Command {
    From(FromCommand),
    Prompt(PromptCommand),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::From(_) => "FROM",
            Command::Prompt(_) => "PROMPT",
        }
    }

    pub fn apply<H: History>(&self, context: &mut Context<H>) {
        match self {
            Command::From(command) => command.apply(context),
            Command::Prompt(command) => command.apply(context),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::From(command) => write!(f, "{}: {}", self.name(), command.model_name),
            Command::Prompt(command) => {
                write!(f, "{}: {} {:?}", self.name(), command.role, command.message)
            }
        }
    }
}

/// Selects the model, overwriting any earlier selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FromCommand {
    pub model_name: String,
}

impl FromCommand {
    pub fn new(model_name: impl Into<String>) -> Self {
        FromCommand {
            model_name: model_name.into(),
        }
    }

    pub fn apply<H: History>(&self, context: &mut Context<H>) {
        context.current_model = Some(ModelName::new(self.model_name.clone()));
    }
}

/// Appends one conversational turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptCommand {
    pub role: Role,
    pub message: String,
}

impl PromptCommand {
    pub fn new(role: Role, message: impl Into<String>) -> Self {
        PromptCommand {
            role,
            message: message.into(),
        }
    }

    pub fn apply<H: History>(&self, context: &mut Context<H>) {
        context.history.append(self.role, &self.message);
    }
}
