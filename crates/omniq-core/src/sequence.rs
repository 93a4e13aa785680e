//! Pull-based sequence of [`ChunkRecord`]s over one streaming response.
//!
//! A [`ChunkSequence`] owns the [`Connection`] and the [`StreamDecoder`].
//! Each call to [`ChunkSequence::next_chunk`] returns the next record, an
//! error, or `Ok(None)` once the sequence reached a terminal state:
//!
//! ```text
//! Open ──pull*──▶ Exhausted   (terminal record yielded)
//!      ──pull*──▶ Failed      (decode or transport error)
//!      ──close──▶ Cancelled   (caller gave up, or the sequence was dropped)
//! ```
//!
//! The connection is released exactly once on whichever exit is taken
//! first, including drop.
//!
//! Only one pull may be in flight at a time. A second concurrent pull fails
//! immediately with [`Error::ConcurrentAccess`] and leaves the first one
//! untouched.
use std::fmt;

use futures_core::Stream;
use futures_util::lock::Mutex;

use crate::{
    chunk::ChunkRecord,
    connection::Connection,
    decoder::StreamDecoder,
    error::{ConnectionClosed, Error, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    Open,
    Exhausted,
    Failed,
    Cancelled,
}

impl SequenceState {
    pub fn is_terminal(self) -> bool {
        self != SequenceState::Open
    }
}

pub struct ChunkSequence {
    inner: Mutex<Inner>,
}

struct Inner {
    state: SequenceState,
    decoder: StreamDecoder,
    connection: Option<Box<dyn Connection>>,
    pending_error: Option<Error>,
}

impl ChunkSequence {
    pub fn new(connection: impl Connection + 'static, decoder: StreamDecoder) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: SequenceState::Open,
                decoder,
                connection: Some(Box::new(connection)),
                pending_error: None,
            }),
        }
    }

    /// Pull the next record.
    ///
    /// Returns `Ok(None)` once the sequence is exhausted, failed or cancelled.
    ///
    /// # Errors
    ///
    /// * [`Error::ConcurrentAccess`] – another pull is still in flight.
    /// * [`Error::Decode`] – a frame could not be decoded; the sequence is
    ///   failed and the connection released.
    /// * [`Error::Transport`] – the connection errored or ended before the
    ///   terminal frame; the sequence is failed and the connection released.
    pub async fn next_chunk(&self) -> Result<Option<ChunkRecord>> {
        let mut inner = self.inner.try_lock().ok_or(Error::ConcurrentAccess)?;
        inner.pull().await
    }

    /// Stop consuming and release the connection. Idempotent; a no-op once
    /// the sequence reached any terminal state.
    ///
    /// # Errors
    ///
    /// [`Error::ConcurrentAccess`] while a pull is in flight. Dropping that
    /// pull's future leaves the sequence open; dropping the sequence
    /// releases the connection.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.try_lock().ok_or(Error::ConcurrentAccess)?;
        inner.cancel();
        Ok(())
    }

    /// Current lifecycle state.
    ///
    /// # Errors
    ///
    /// [`Error::ConcurrentAccess`] while a pull is in flight.
    pub fn state(&self) -> Result<SequenceState> {
        let inner = self.inner.try_lock().ok_or(Error::ConcurrentAccess)?;
        Ok(inner.state)
    }

    /// Turn the sequence into a [`Stream`]. The stream ends after the
    /// terminal record or right after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<ChunkRecord>> + Send {
        async_stream::try_stream! {
            while let Some(record) = self.next_chunk().await? {
                yield record;
            }
        }
    }
}

impl Drop for ChunkSequence {
    fn drop(&mut self) {
        self.inner.get_mut().cancel();
    }
}

impl fmt::Debug for ChunkSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(inner) => f
                .debug_struct("ChunkSequence")
                .field("state", &inner.state)
                .field("decoder", &inner.decoder)
                .field("released", &inner.connection.is_none())
                .finish(),
            None => f.debug_struct("ChunkSequence").finish_non_exhaustive(),
        }
    }
}

impl Inner {
    async fn pull(&mut self) -> Result<Option<ChunkRecord>> {
        if let Some(err) = self.pending_error.take() {
            return Err(err);
        }
        if self.state.is_terminal() {
            return Ok(None);
        }

        loop {
            match self.decoder.next_record() {
                Some(Ok(record)) => {
                    if record.is_terminal() {
                        self.state = SequenceState::Exhausted;
                        self.release();
                    }
                    return Ok(Some(record));
                }
                Some(Err(err)) => return Err(self.fail(err)),
                None => {}
            }

            if self.decoder.is_input_closed() {
                return Err(self.fail(Error::Transport(Box::new(ConnectionClosed))));
            }

            let Some(connection) = self.connection.as_mut() else {
                return Err(self.fail(Error::Transport(Box::new(ConnectionClosed))));
            };

            let read = connection.read().await;
            match read {
                Some(Ok(bytes)) => {
                    if let Err(err) = self.decoder.feed(&bytes) {
                        return Err(self.fail(err));
                    }
                }
                Some(Err(source)) => {
                    let err = self.fail(Error::Transport(source));
                    // A record completed before the failure is still handed out.
                    if let Some(held) = self.decoder.take_held() {
                        self.pending_error = Some(err);
                        return Ok(Some(held));
                    }
                    return Err(err);
                }
                None => {
                    self.decoder.finish();
                }
            }
        }
    }

    fn fail(&mut self, err: Error) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(error = %err, "chunk sequence failed");

        self.state = SequenceState::Failed;
        self.release();
        err
    }

    fn cancel(&mut self) {
        if self.state == SequenceState::Open {
            self.state = SequenceState::Cancelled;
        }
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.release();

            #[cfg(feature = "tracing")]
            tracing::debug!(state = ?self.state, "connection released");
        }
    }
}
