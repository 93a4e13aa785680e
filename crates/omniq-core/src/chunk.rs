//! Value types yielded by a streaming chat completion.
//!
//! A response arrives as a run of [`ChunkRecord`]s that share one id, carry
//! strictly increasing sequence indices and end with exactly one record whose
//! [`TerminalReason`] is set.
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// One incremental fragment of a streamed completion.
///
/// Records are immutable once built; ordering across records is enforced by
/// the [`StreamDecoder`](crate::decoder::StreamDecoder), not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    id: String,
    seq: u64,
    delta: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    terminal_reason: Option<TerminalReason>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    error: Option<String>,
}

impl ChunkRecord {
    pub fn new(id: impl Into<String>, seq: u64, delta: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            seq,
            delta: delta.into(),
            terminal_reason: None,
            error: None,
        }
    }

    pub fn with_terminal_reason(mut self, reason: TerminalReason) -> Self {
        self.terminal_reason = Some(reason);
        self
    }

    /// Attach the upstream error message. Only meaningful together with
    /// [`TerminalReason::UpstreamError`].
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Identifier shared by all chunks of one response.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Partial content; empty for role announcements and bare terminal frames.
    pub fn delta(&self) -> &str {
        &self.delta
    }

    pub fn terminal_reason(&self) -> Option<TerminalReason> {
        self.terminal_reason
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal_reason.is_some()
    }
}

/// Closed set of reasons a streamed response ends.
///
/// The `Display` implementation renders the canonical snake_case name, the
/// same string used on the wire by [`serde`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    /// The model finished on its own (stop sequence, end of turn, tool call).
    NaturalStop,
    /// The token budget of the request was exhausted.
    LengthLimit,
    /// The upstream service aborted generation (error event, content filter).
    UpstreamError,
    /// Generation was cancelled on the upstream side.
    Cancelled,
}

impl Display for TerminalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalReason::NaturalStop => write!(f, "natural_stop"),
            TerminalReason::LengthLimit => write!(f, "length_limit"),
            TerminalReason::UpstreamError => write!(f, "upstream_error"),
            TerminalReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for TerminalReason {
    type Err = FrameError;

    /// Accepts the canonical names plus the spellings common streaming APIs
    /// put into their `finish_reason` fields.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "natural_stop" | "stop" | "end_turn" | "stop_sequence" | "tool_calls"
            | "function_call" => Ok(TerminalReason::NaturalStop),
            "length_limit" | "length" | "max_tokens" => Ok(TerminalReason::LengthLimit),
            "upstream_error" | "error" | "content_filter" => Ok(TerminalReason::UpstreamError),
            "cancelled" | "canceled" => Ok(TerminalReason::Cancelled),
            other => Err(FrameError::UnknownTerminalReason(other.to_owned())),
        }
    }
}
