use omniq_core::chunk::TerminalReason;
use serde::{Deserialize, Serialize};

use crate::impl_builder_methods;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatCompletionMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatCompletionMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            temperature: None,
            top_p: None,
            stop: None,
            stream: None,
        }
    }
}

impl_builder_methods!(
    ChatCompletionRequest,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    stop: Vec<String>,
    stream: bool
);

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    System,
    Assistant,
    Developer,
    Tool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ChatCompletionMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatCompletionMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    FunctionCall,
}

impl From<FinishReason> for TerminalReason {
    fn from(value: FinishReason) -> Self {
        match value {
            FinishReason::Stop | FinishReason::ToolCalls | FinishReason::FunctionCall => {
                TerminalReason::NaturalStop
            }
            FinishReason::Length => TerminalReason::LengthLimit,
            FinishReason::ContentFilter => TerminalReason::UpstreamError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_skips_unset_options() {
        let request = ChatCompletionRequest::new(
            "gpt-4o-mini",
            vec![ChatCompletionMessage::user("what is cat ?")],
        )
        .max_tokens(50)
        .stream(true);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "what is cat ?"}],
                "max_tokens": 50,
                "stream": true,
            })
        );
    }

    #[test]
    fn finish_reasons_map_onto_terminal_reasons() {
        assert_eq!(TerminalReason::from(FinishReason::Stop), TerminalReason::NaturalStop);
        assert_eq!(TerminalReason::from(FinishReason::ToolCalls), TerminalReason::NaturalStop);
        assert_eq!(TerminalReason::from(FinishReason::Length), TerminalReason::LengthLimit);
        assert_eq!(
            TerminalReason::from(FinishReason::ContentFilter),
            TerminalReason::UpstreamError
        );
    }
}
