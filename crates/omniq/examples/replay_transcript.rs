//! # Replaying a Captured Transcript
//!
//! No network involved: a recorded SSE transcript is cut into awkward
//! fragments and fed through a [`ChunkSequence`] via [`StreamConnection`].
//! The records come out the same no matter where the cuts fall.
//!
//! ```bash
//! cargo run -p omniq --example replay_transcript
//! ```

use std::{convert::Infallible, pin::pin};

use bytes::Bytes;
use futures_util::{StreamExt as _, stream};
use omniq::{ChunkSequence, StreamConnection, StreamDecoder};

const TRANSCRIPT: &str = concat!(
    "data: {\"id\":\"r1\",\"seq\":0,\"delta\":\"cat\"}\n\n",
    ": upstream keep-alive\n\n",
    "data: {\"id\":\"r1\",\"seq\":1,\"delta\":\" is\"}\n\n",
    "data: {\"id\":\"r1\",\"seq\":2,\"delta\":\" a pet\"}\n\n",
    "data: [DONE]\n\n",
);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Seven-byte fragments split field names, UTF-8 and delimiters alike.
    let fragments: Vec<Result<Bytes, Infallible>> = TRANSCRIPT
        .as_bytes()
        .chunks(7)
        .map(|piece| Ok(Bytes::copy_from_slice(piece)))
        .collect();

    let sequence = ChunkSequence::new(
        StreamConnection::new(stream::iter(fragments)),
        StreamDecoder::sse(),
    );

    let mut records = pin!(sequence.into_stream());
    while let Some(record) = records.next().await {
        let record = record?;
        match record.terminal_reason() {
            Some(reason) => println!("#{} {:?} ({reason})", record.seq(), record.delta()),
            None => println!("#{} {:?}", record.seq(), record.delta()),
        }
    }

    Ok(())
}
