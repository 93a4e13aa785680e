use serde::Deserialize;

use super::{
    chat_completion::{FinishReason, MessageRole},
    common::{ApiErrorBody, Usage},
};

/// A delta message as returned by OpenAI when `stream = true`.
#[derive(Debug, Deserialize, Default)]
pub struct ChatCompletionMessageDelta {
    pub role: Option<MessageRole>,
    pub content: Option<String>,
}

/// A single streaming choice payload.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunkChoice {
    pub index: i64,
    #[serde(default)]
    pub delta: ChatCompletionMessageDelta,
    pub finish_reason: Option<FinishReason>,
}

/// The outermost object sent by OpenAI for each SSE chunk.
///
/// Everything except `choices` is optional: usage reports arrive with an
/// empty choice list and error events carry only `error`.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunkResponse {
    pub id: Option<String>,
    pub object: Option<String>,
    pub created: Option<i64>,
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatCompletionChunkChoice>,
    pub usage: Option<Usage>,
    pub error: Option<ApiErrorBody>,
}
