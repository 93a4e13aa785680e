//! # `omniq` – The umbrella crate
//!
//! One import for the whole workspace:
//!
//! | Crate               | What it provides                                                           |
//! |---------------------|----------------------------------------------------------------------------|
//! | **`omniq-core`**    | `ChunkRecord`, the framing decoder, `ChunkSequence` and the error taxonomy |
//! | **`omniq-openai`**  | Streaming `chat/completions` request layer for OpenAI-compatible servers   |
//!
//! The `openai` feature is on by default. Turn it off to keep `reqwest` and
//! TLS out of the build and feed a [`ChunkSequence`] from your own
//! [`Connection`].
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use omniq::openai::{
//!     OpenAiClient,
//!     api_v1::{ChatCompletionMessage, ChatCompletionRequest},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OpenAiClient::from_env()?;
//!     let request = ChatCompletionRequest::new(
//!         "gpt-4o-mini",
//!         vec![ChatCompletionMessage::user("what is cat ?")],
//!     );
//!
//!     let sequence = client.chat_completions_create(request).await?;
//!     while let Some(chunk) = sequence.next_chunk().await? {
//!         print!("{}", chunk.delta());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Every record is handed out exactly once, in order. The last one carries
//! a [`TerminalReason`]; after it `next_chunk` keeps returning `Ok(None)`.
#![doc(html_root_url = "https://docs.rs/omniq/latest")]

pub use omniq_core::*;

#[cfg(feature = "openai")]
pub use omniq_openai as openai;
