//! Unified error type exposed by **`omniq-core`**.
//!
//! Provider crates convert their internal errors into one of these variants
//! before handing them to the caller.  Every pull on a
//! [`ChunkSequence`](crate::sequence::ChunkSequence) surfaces exactly one of
//! them at the point of failure; nothing is retried or swallowed internally.

use thiserror::Error;

/// Convenient alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed, thread-safe error used to carry foreign causes (HTTP client,
/// JSON parser, …) without leaking their types into the public API.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    /// The request never entered the streaming state. Nothing was acquired,
    /// so there is nothing to clean up.
    #[error("request failed before streaming began: {0}")]
    Request(#[source] BoxError),

    /// The connection dropped or errored mid-stream. The connection has been
    /// released by the time the caller sees this.
    #[error("transport failed mid-stream: {0}")]
    Transport(#[source] BoxError),

    /// One well-framed unit could not be turned into a chunk. `frame` holds
    /// the offending raw text (lossily decoded, possibly truncated).
    #[error("malformed frame `{frame}`: {source}")]
    Decode {
        frame: String,
        #[source]
        source: BoxError,
    },

    /// Input was fed to a decoder that already saw its terminal frame.
    #[error("stream already finished; no further input is accepted")]
    StreamFinished,

    /// A second pull was issued while another one was still in flight.
    #[error("another pull is already in progress on this chunk sequence")]
    ConcurrentAccess,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn decode(frame: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Decode {
            frame: frame.into(),
            source: source.into(),
        }
    }

    /// `true` for misuse errors (`StreamFinished`, `ConcurrentAccess`) that
    /// point at a bug in the calling code rather than at the remote end.
    pub fn is_misuse(&self) -> bool {
        matches!(self, Error::StreamFinished | Error::ConcurrentAccess)
    }
}

/// Reasons a single frame is rejected by the decoder. Always wrapped in
/// [`Error::Decode`] together with the raw frame.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid UTF-8")]
    InvalidUtf8,

    #[error("incomplete frame exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("sequence index {got} does not follow {previous}")]
    OutOfOrder { previous: u64, got: u64 },

    #[error("sequence index {0} is negative")]
    NegativeSequence(i64),

    #[error("chunk id `{got}` does not match response id `{expected}`")]
    IdMismatch { expected: String, got: String },

    #[error("unknown terminal reason `{0}`")]
    UnknownTerminalReason(String),
}

/// The connection reported end-of-stream before the terminal frame arrived.
#[derive(Debug, Error)]
#[error("connection closed before the terminal frame")]
pub struct ConnectionClosed;
