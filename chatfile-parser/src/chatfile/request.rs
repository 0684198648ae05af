//! Chat-completion request building
//!
//! Translates a compiled context into the request body of an OpenAI style chat-completion
//! endpoint. Only the wire format lives here; sending the request is up to the caller.

use crate::chatfile::context::{Context, HistoryEntry, Role, Transcript};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Optional sampling parameters supplied outside the chatfile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequestParams {
    pub seed: Option<i64>,
    pub temperature: Option<f64>,
    pub stream: bool,
}

impl Default for RequestParams {
    fn default() -> Self {
        RequestParams {
            seed: None,
            temperature: None,
            stream: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl From<&HistoryEntry> for ChatMessage {
    fn from(entry: &HistoryEntry) -> Self {
        ChatMessage {
            role: entry.role,
            content: entry.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub temperature: Option<f64>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The chatfile never selected a model
    MissingModel,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingModel => write!(f, "no model selected: add a FROM command"),
        }
    }
}

impl std::error::Error for RequestError {}

impl ChatRequest {
    pub fn from_context(
        context: &Context<Transcript>,
        params: RequestParams,
    ) -> Result<Self, RequestError> {
        let model = context
            .current_model
            .as_ref()
            .ok_or(RequestError::MissingModel)?;

        Ok(ChatRequest {
            model: model.to_string(),
            messages: context.history.iter().map(ChatMessage::from).collect(),
            seed: params.seed,
            temperature: params.temperature,
            stream: params.stream,
        })
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatfile::loader::compile_str;
    use serde_json::json;

    #[test]
    fn test_request_body() {
        let context = compile_str("FROM gpt-4\nSYSTEM be brief\nASK hi\nANSWER hello\n").unwrap();
        let params = RequestParams {
            seed: Some(42),
            ..RequestParams::default()
        };
        let request = ChatRequest::from_context(&context, params).unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gpt-4",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"}
                ],
                "seed": 42,
                "stream": true
            })
        );
    }

    #[test]
    fn test_missing_model() {
        let context = compile_str("ASK hi\n").unwrap();
        assert_eq!(
            ChatRequest::from_context(&context, RequestParams::default()),
            Err(RequestError::MissingModel)
        );
    }
}
