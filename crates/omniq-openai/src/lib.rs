//! OpenAI-compatible request layer for **omniq**.
//!
//! Sends a streaming `chat/completions` request and hands the accepted
//! response body to an [`omniq_core::ChunkSequence`] decoding it with
//! [`OpenAiChunkParser`].
mod client;
mod config;
mod parser;

pub mod api_v1;
pub mod error;

pub use client::OpenAiClient;
pub use config::{API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL, OpenAiClientBuilder};
pub use parser::OpenAiChunkParser;
