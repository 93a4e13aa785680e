use omniq_core::{
    chunk::TerminalReason,
    error::BoxError,
    parser::{ChunkParser, ChunkPayload},
};

use crate::api_v1::ChatCompletionChunkResponse;

/// Maps `chat.completion.chunk` payloads onto [`ChunkPayload`]s.
///
/// * Only choice `0` is surfaced; other choices are ignored.
/// * Chunks without that choice (the trailing usage report) are skipped.
/// * An embedded `error` object ends the stream with
///   [`TerminalReason::UpstreamError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiChunkParser;

impl ChunkParser for OpenAiChunkParser {
    fn parse(&self, data: &str) -> Result<Option<ChunkPayload>, BoxError> {
        let chunk: ChatCompletionChunkResponse = serde_json::from_str(data)?;

        if let Some(error) = chunk.error {
            return Ok(Some(ChunkPayload {
                id: chunk.id,
                terminal_reason: Some(TerminalReason::UpstreamError),
                error: Some(error.message),
                ..ChunkPayload::default()
            }));
        }

        let Some(choice) = chunk.choices.into_iter().find(|choice| choice.index == 0) else {
            return Ok(None);
        };

        Ok(Some(ChunkPayload {
            id: chunk.id,
            seq: None,
            delta: choice.delta.content.unwrap_or_default(),
            terminal_reason: choice.finish_reason.map(Into::into),
            error: None,
        }))
    }
}
