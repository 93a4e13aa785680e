//! # Streaming Chat Completion – Chunk by Chunk
//!
//! Asks a model a short question and prints every decoded
//! [`ChunkRecord`](omniq::ChunkRecord) as JSON, exactly once and in order.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-…      # mandatory
//! cargo run -p omniq --example chat_stream
//! ```
//!
//! Expected output (truncated):
//!
//! ```text
//! Chunk 1: {"id":"chatcmpl-…","seq":0,"delta":""}
//! Chunk 2: {"id":"chatcmpl-…","seq":1,"delta":"A"}
//! …
//! Chunk 51: {"id":"chatcmpl-…","seq":50,"delta":"","terminal_reason":"length_limit"}
//! ```

use omniq::openai::{
    OpenAiClient,
    api_v1::{ChatCompletionMessage, ChatCompletionRequest},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = OpenAiClient::from_env()?;

    let request = ChatCompletionRequest::new(
        "gpt-4o-mini",
        vec![ChatCompletionMessage::user("what is cat ?")],
    )
    .max_tokens(50);

    // Fails here, before any chunk, if the server rejects the request.
    let sequence = client.chat_completions_create(request).await?;

    let mut n = 0;
    while let Some(chunk) = sequence.next_chunk().await? {
        n += 1;
        println!("Chunk {n}: {}", serde_json::to_string(&chunk)?);
    }

    Ok(())
}
