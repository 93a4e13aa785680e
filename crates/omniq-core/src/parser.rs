//! Payload parsers: map the JSON text of one frame onto a [`ChunkPayload`].
//!
//! Framing, sentinel detection and ordering live in the
//! [`StreamDecoder`](crate::decoder::StreamDecoder); a parser only knows the
//! shape of a single provider's chunk object.
use serde::Deserialize;

use crate::{chunk::TerminalReason, error::BoxError, error::FrameError};

/// Provider-neutral content of one decoded frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkPayload {
    pub id: Option<String>,
    /// Explicit sequence index; the decoder numbers chunks itself when absent.
    pub seq: Option<u64>,
    pub delta: String,
    pub terminal_reason: Option<TerminalReason>,
    pub error: Option<String>,
}

/// Strategy for turning one frame's data into a [`ChunkPayload`].
pub trait ChunkParser: Send + Sync {
    /// Parse the data of a frame.
    ///
    /// Returns `Ok(None)` for payloads that carry nothing chunk-worthy
    /// (usage reports, keep-alives); those frames are skipped.
    fn parse(&self, data: &str) -> Result<Option<ChunkPayload>, BoxError>;
}

/// Parser for the generic chunk shape
/// `{"id", "seq"?, "delta"?, "terminal_reason" | "finish_reason"?, "error"?}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonChunkParser;

#[derive(Debug, Deserialize)]
struct WireChunk {
    id: Option<String>,
    seq: Option<i64>,
    delta: Option<String>,
    #[serde(alias = "finish_reason")]
    terminal_reason: Option<String>,
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireError {
    Message(String),
    Object { message: String },
}

impl ChunkParser for JsonChunkParser {
    fn parse(&self, data: &str) -> Result<Option<ChunkPayload>, BoxError> {
        let wire: WireChunk = serde_json::from_str(data)?;

        let seq = match wire.seq {
            Some(seq) => Some(u64::try_from(seq).map_err(|_| FrameError::NegativeSequence(seq))?),
            None => None,
        };

        let mut terminal_reason = wire
            .terminal_reason
            .map(|reason| reason.parse::<TerminalReason>())
            .transpose()?;

        let error = wire.error.map(|error| match error {
            WireError::Message(message) | WireError::Object { message } => message,
        });
        if error.is_some() && terminal_reason.is_none() {
            terminal_reason = Some(TerminalReason::UpstreamError);
        }

        Ok(Some(ChunkPayload {
            id: wire.id,
            seq,
            delta: wire.delta.unwrap_or_default(),
            terminal_reason,
            error,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generic_chunk() {
        let payload = JsonChunkParser
            .parse(r#"{"id":"r1","seq":3,"delta":"cat"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(payload.id.as_deref(), Some("r1"));
        assert_eq!(payload.seq, Some(3));
        assert_eq!(payload.delta, "cat");
        assert_eq!(payload.terminal_reason, None);
    }

    #[test]
    fn finish_reason_is_an_alias() {
        let payload = JsonChunkParser
            .parse(r#"{"id":"r1","finish_reason":"length"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(payload.delta, "");
        assert_eq!(payload.terminal_reason, Some(TerminalReason::LengthLimit));
    }

    #[test]
    fn error_payload_implies_upstream_error() {
        let payload = JsonChunkParser
            .parse(r#"{"id":"r1","error":{"message":"overloaded"}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(payload.terminal_reason, Some(TerminalReason::UpstreamError));
        assert_eq!(payload.error.as_deref(), Some("overloaded"));
    }

    #[test]
    fn rejects_negative_sequence() {
        let err = JsonChunkParser.parse(r#"{"id":"r1","seq":-1}"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FrameError>(),
            Some(FrameError::NegativeSequence(-1))
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = JsonChunkParser.parse(r#"{"id":"r1","delta":"#).unwrap_err();
        assert!(err.downcast_ref::<serde_json::Error>().is_some());
    }
}
