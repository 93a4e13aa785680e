//! # `omniq-core`
//!
//! Provider-agnostic building blocks for consuming a streamed chat
//! completion:
//!
//! * [`decoder::StreamDecoder`] – incremental SSE / NDJSON framing and JSON
//!   chunk decoding, independent of how the bytes were fragmented.
//! * [`sequence::ChunkSequence`] – the pull-based sequence handed to
//!   callers; owns the decoder and the connection and releases the latter
//!   on every exit path.
//! * [`chunk::ChunkRecord`] – the immutable value yielded per step.
//!
//! Provider crates (e.g. `omniq-openai`) supply a [`connection::Connection`]
//! and a [`parser::ChunkParser`] for their wire format.
pub mod chunk;
pub mod connection;
pub mod decoder;
pub mod error;
pub mod parser;
pub mod sequence;

pub use chunk::{ChunkRecord, TerminalReason};
pub use connection::{Connection, StreamConnection};
pub use decoder::{DecoderConfig, Framing, StreamDecoder};
pub use error::{Error, Result};
pub use parser::{ChunkParser, ChunkPayload, JsonChunkParser};
pub use sequence::{ChunkSequence, SequenceState};
