//! The transport seam between the request layer and a
//! [`ChunkSequence`](crate::sequence::ChunkSequence).
//!
//! A request layer hands over a live [`Connection`] once the remote end has
//! accepted a streaming request. From then on the sequence owns it
//! exclusively: nothing else reads from it, and the sequence decides when it
//! is released.
use std::{future::Future, pin::Pin};

use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;

use crate::error::BoxError;

/// Future returned by [`Connection::read`].
pub type ReadFuture<'c> = Pin<Box<dyn Future<Output = Option<Result<Bytes, BoxError>>> + Send + 'c>>;

/// A readable, releasable byte source.
pub trait Connection: Send {
    /// Wait for the next block of bytes.
    ///
    /// `None` signals end-of-stream; `Some(Err(_))` a transport failure.
    fn read(&mut self) -> ReadFuture<'_>;

    /// Give the underlying resource back (close the socket, return the
    /// pooled connection, …). Must not block; called at most once by the
    /// owning sequence.
    fn release(&mut self);
}

/// [`Connection`] over any fallible byte stream, e.g. a
/// `reqwest::Response::bytes_stream()`. Releasing drops the stream, which
/// aborts the underlying body.
pub struct StreamConnection {
    body: Option<Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>>,
}

impl StreamConnection {
    pub fn new<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        Self {
            body: Some(Box::pin(stream.map(|chunk| chunk.map_err(Into::<BoxError>::into)))),
        }
    }

    pub fn is_released(&self) -> bool {
        self.body.is_none()
    }
}

impl Connection for StreamConnection {
    fn read(&mut self) -> ReadFuture<'_> {
        Box::pin(async move {
            match self.body.as_mut() {
                Some(body) => body.next().await,
                None => None,
            }
        })
    }

    fn release(&mut self) {
        self.body = None;
    }
}

impl std::fmt::Debug for StreamConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamConnection")
            .field("released", &self.is_released())
            .finish()
    }
}
