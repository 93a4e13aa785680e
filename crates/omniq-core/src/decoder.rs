//! Incremental decoder turning raw transport bytes into [`ChunkRecord`]s.
//!
//! Bytes may arrive in arbitrary fragments; the decoder buffers at most one
//! incomplete frame and produces exactly the same records no matter how the
//! input was split.
//!
//! The most recent record is held back by one frame: the termination
//! sentinel (`data: [DONE]`) carries no content of its own, so the decoder
//! stamps [`TerminalReason::NaturalStop`] onto the record it is holding.
//!
//! ```rust
//! use omniq_core::decoder::StreamDecoder;
//!
//! let mut decoder = StreamDecoder::sse();
//! let wire = "data: {\"id\":\"r1\",\"seq\":0,\"delta\":\"cat\"}\n\n\
//!             data: {\"id\":\"r1\",\"seq\":1,\"delta\":\" is\"}\n\n\
//!             data: [DONE]\n\n";
//!
//! let records = decoder
//!     .feed(wire.as_bytes())
//!     .unwrap()
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//!
//! assert_eq!(records.len(), 2);
//! assert!(records[1].is_terminal());
//! assert!(decoder.is_finished());
//! ```
use std::fmt;

use bytes::BytesMut;

use crate::{
    chunk::{ChunkRecord, TerminalReason},
    error::{ConnectionClosed, Error, FrameError, Result},
    parser::{ChunkParser, ChunkPayload, JsonChunkParser},
};

pub const DEFAULT_SENTINEL: &str = "[DONE]";
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Upper bound on how much of an oversized or non-UTF-8 frame is copied
/// into a [`Error::Decode`].
const FRAME_PREVIEW_BYTES: usize = 512;

/// How frames are delimited on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// Server-sent events: `data:` lines, events separated by a blank line.
    #[default]
    Sse,
    /// Newline-delimited JSON: one object per line.
    Ndjson,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    pub framing: Framing,
    /// Frame data marking the end of the response.
    pub sentinel: String,
    /// Largest incomplete frame the decoder buffers before giving up.
    pub max_frame_bytes: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            framing: Framing::Sse,
            sentinel: DEFAULT_SENTINEL.to_owned(),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl DecoderConfig {
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Streaming,
    Finished,
    Failed,
}

enum Frame {
    Skip,
    Sentinel,
    Chunk(ChunkPayload),
}

pub struct StreamDecoder {
    config: DecoderConfig,
    parser: Box<dyn ChunkParser>,
    buf: BytesMut,
    /// Scan position for the next delimiter search; everything before it is
    /// known not to start a delimiter.
    cursor: usize,
    phase: Phase,
    input_closed: bool,
    held: Option<ChunkRecord>,
    pending_error: Option<Error>,
    response_id: Option<String>,
    last_seq: Option<u64>,
}

impl StreamDecoder {
    pub fn new(config: DecoderConfig, parser: impl ChunkParser + 'static) -> Self {
        Self {
            config,
            parser: Box::new(parser),
            buf: BytesMut::new(),
            cursor: 0,
            phase: Phase::Streaming,
            input_closed: false,
            held: None,
            pending_error: None,
            response_id: None,
            last_seq: None,
        }
    }

    /// SSE framing, `[DONE]` sentinel and the generic [`JsonChunkParser`].
    pub fn sse() -> Self {
        Self::new(DecoderConfig::default(), JsonChunkParser)
    }

    /// NDJSON framing with the generic [`JsonChunkParser`].
    pub fn ndjson() -> Self {
        Self::new(
            DecoderConfig::default().with_framing(Framing::Ndjson),
            JsonChunkParser,
        )
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Append transport bytes and iterate over the records they complete.
    ///
    /// The returned iterator is lazy: each step decodes at most the frames
    /// needed for one record. Frames left undecoded stay buffered and are
    /// picked up by the next call.
    ///
    /// # Errors
    ///
    /// [`Error::StreamFinished`] once the terminal frame was decoded, the
    /// decoder failed, or [`Self::finish`] was called.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Frames<'_>> {
        if self.phase != Phase::Streaming || self.input_closed {
            return Err(Error::StreamFinished);
        }

        self.buf.extend_from_slice(bytes);
        Ok(Frames { decoder: self })
    }

    /// Mark the input as closed. Buffered bytes without a trailing delimiter
    /// are decoded as one last frame; if they do not decode, the connection
    /// was cut mid-frame and [`Error::Transport`] is reported.
    pub fn finish(&mut self) -> Frames<'_> {
        self.input_closed = true;
        Frames { decoder: self }
    }

    /// The terminal record has been decoded.
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn is_failed(&self) -> bool {
        self.phase == Phase::Failed
    }

    pub fn is_input_closed(&self) -> bool {
        self.input_closed
    }

    /// Bytes currently buffered (at most one incomplete frame once the
    /// iterator returned by [`Self::feed`] has been drained).
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Hand out the held-back record without a terminal reason. Used when the
    /// input is abandoned because of a transport failure.
    pub fn take_held(&mut self) -> Option<ChunkRecord> {
        self.held.take_if(|held| !held.is_terminal())
    }

    /// Decode the next record from buffered bytes.
    ///
    /// `None` means more input is required, or the decoder is done.
    pub fn next_record(&mut self) -> Option<Result<ChunkRecord>> {
        if let Some(err) = self.pending_error.take() {
            return Some(Err(err));
        }

        loop {
            if self.phase != Phase::Streaming {
                return None;
            }

            if let Some(terminal) = self.held.take_if(|held| held.is_terminal()) {
                self.phase = Phase::Finished;
                self.buf.clear();
                self.cursor = 0;

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    id = terminal.id(),
                    seq = terminal.seq(),
                    reason = %terminal.terminal_reason().unwrap_or(TerminalReason::NaturalStop),
                    "terminal chunk decoded"
                );

                return Some(Ok(terminal));
            }

            let (raw, complete) = match self.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) if self.input_closed => return self.held.take().map(Ok),
                Ok(None) => return None,
                Err(err) => return Some(self.fail(err)),
            };

            match self.decode_frame(&raw) {
                Ok(Frame::Skip) => continue,
                Ok(Frame::Sentinel) => {
                    let terminal = match self.held.take() {
                        Some(held) => held,
                        None => {
                            let seq = self.next_seq();
                            self.last_seq = Some(seq);
                            ChunkRecord::new(self.response_id.clone().unwrap_or_default(), seq, "")
                        }
                    };
                    self.held = Some(terminal.with_terminal_reason(TerminalReason::NaturalStop));
                }
                Ok(Frame::Chunk(payload)) => match self.admit(payload, &raw) {
                    Ok(record) => {
                        if let Some(previous) = self.held.replace(record) {
                            return Some(Ok(previous));
                        }
                    }
                    Err(err) => return Some(self.fail(err)),
                },
                Err(_) if !complete => {
                    return Some(self.fail(Error::Transport(Box::new(ConnectionClosed))));
                }
                Err(err) => return Some(self.fail(err)),
            }
        }
    }

    fn fail(&mut self, err: Error) -> Result<ChunkRecord> {
        #[cfg(feature = "tracing")]
        tracing::warn!(error = %err, "chunk stream failed to decode");

        self.phase = Phase::Failed;
        self.buf.clear();
        self.cursor = 0;

        // Records that arrived intact before the bad frame are still owed to
        // the caller; the error follows on the next call.
        match self.held.take() {
            Some(held) => {
                self.pending_error = Some(err);
                Ok(held)
            }
            None => Err(err),
        }
    }

    fn next_seq(&self) -> u64 {
        self.last_seq.map_or(0, |seq| seq + 1)
    }

    /// Next raw frame, flagged `false` when it is the undelimited remainder
    /// left at end of input.
    fn next_frame(&mut self) -> Result<Option<(BytesMut, bool)>> {
        let found = match self.config.framing {
            Framing::Sse => find_event_end(&self.buf, self.cursor),
            Framing::Ndjson => find_line_end(&self.buf, self.cursor),
        };

        if let Some((end, consumed)) = found {
            let mut frame = self.buf.split_to(consumed);
            frame.truncate(end);
            self.cursor = 0;
            return Ok(Some((frame, true)));
        }

        if self.input_closed {
            self.cursor = 0;
            if self.buf.iter().all(u8::is_ascii_whitespace) {
                self.buf.clear();
                return Ok(None);
            }
            return Ok(Some((self.buf.split(), false)));
        }

        if self.buf.len() > self.config.max_frame_bytes {
            return Err(Error::decode(
                preview(&self.buf),
                FrameError::TooLarge {
                    limit: self.config.max_frame_bytes,
                },
            ));
        }

        // A delimiter is at most three bytes (`\n\r\n`) past its first newline.
        self.cursor = self.buf.len().saturating_sub(3);
        Ok(None)
    }

    fn decode_frame(&self, raw: &[u8]) -> Result<Frame> {
        let text = std::str::from_utf8(raw)
            .map_err(|_| Error::decode(preview(raw), FrameError::InvalidUtf8))?;

        match self.config.framing {
            Framing::Sse => self.decode_event(text),
            Framing::Ndjson => {
                let line = text.trim();
                if line.is_empty() {
                    return Ok(Frame::Skip);
                }
                self.decode_data(line, false, text)
            }
        }
    }

    fn decode_event(&self, text: &str) -> Result<Frame> {
        let mut data: Option<String> = None;
        let mut event = None;

        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };

            match field {
                "data" => match data.as_mut() {
                    Some(data) => {
                        data.push('\n');
                        data.push_str(value);
                    }
                    None => data = Some(value.to_owned()),
                },
                "event" => event = Some(value),
                _ => {}
            }
        }

        let Some(data) = data else {
            return Ok(Frame::Skip);
        };

        self.decode_data(&data, event == Some("error"), text)
    }

    fn decode_data(&self, data: &str, error_event: bool, raw: &str) -> Result<Frame> {
        if data.trim() == self.config.sentinel {
            return Ok(Frame::Sentinel);
        }

        if error_event {
            let mut payload = match self.parser.parse(data) {
                Ok(Some(payload)) => payload,
                _ => ChunkPayload::default(),
            };
            payload.terminal_reason = Some(TerminalReason::UpstreamError);
            payload.error.get_or_insert_with(|| data.to_owned());
            return Ok(Frame::Chunk(payload));
        }

        match self.parser.parse(data) {
            Ok(Some(payload)) => Ok(Frame::Chunk(payload)),
            Ok(None) => Ok(Frame::Skip),
            Err(source) => Err(Error::decode(raw, source)),
        }
    }

    fn admit(&mut self, payload: ChunkPayload, raw: &[u8]) -> Result<ChunkRecord> {
        let id = match (payload.id, &self.response_id) {
            (Some(got), Some(expected)) if &got != expected => {
                return Err(Error::decode(
                    String::from_utf8_lossy(raw),
                    FrameError::IdMismatch {
                        expected: expected.clone(),
                        got,
                    },
                ));
            }
            (Some(id), _) => id,
            (None, Some(expected)) => expected.clone(),
            (None, None) => String::new(),
        };

        let seq = match payload.seq {
            Some(got) => {
                if let Some(previous) = self.last_seq
                    && got <= previous
                {
                    return Err(Error::decode(
                        String::from_utf8_lossy(raw),
                        FrameError::OutOfOrder { previous, got },
                    ));
                }
                got
            }
            None => self.next_seq(),
        };

        // The first record fixes the id, even an empty one.
        if self.response_id.is_none() {
            self.response_id = Some(id.clone());
        }
        self.last_seq = Some(seq);

        let mut record = ChunkRecord::new(id, seq, payload.delta);
        if let Some(reason) = payload.terminal_reason {
            record = record.with_terminal_reason(reason);
        }
        if let Some(error) = payload.error {
            record = record.with_error(error);
        }
        Ok(record)
    }
}

impl fmt::Debug for StreamDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamDecoder")
            .field("config", &self.config)
            .field("buffered", &self.buf.len())
            .field("phase", &self.phase)
            .field("input_closed", &self.input_closed)
            .field("last_seq", &self.last_seq)
            .finish_non_exhaustive()
    }
}

/// Lazy iterator over the records completed by one [`StreamDecoder::feed`]
/// or [`StreamDecoder::finish`] call.
#[derive(Debug)]
pub struct Frames<'a> {
    decoder: &'a mut StreamDecoder,
}

impl Iterator for Frames<'_> {
    type Item = Result<ChunkRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.next_record()
    }
}

/// Locate the blank line ending an SSE event. Returns the frame length and
/// the number of bytes to consume including the delimiter.
fn find_event_end(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut start = from;
    while let Some(offset) = buf[start..].iter().position(|&b| b == b'\n') {
        let newline = start + offset;
        let rest = &buf[newline + 1..];
        if rest.starts_with(b"\n") {
            return Some((newline, newline + 2));
        }
        if rest.starts_with(b"\r\n") {
            return Some((newline, newline + 3));
        }
        start = newline + 1;
    }
    None
}

fn find_line_end(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let newline = from + buf[from..].iter().position(|&b| b == b'\n')?;
    let end = if newline > 0 && buf[newline - 1] == b'\r' {
        newline - 1
    } else {
        newline
    };
    Some((end, newline + 1))
}

fn preview(raw: &[u8]) -> String {
    String::from_utf8_lossy(&raw[..raw.len().min(FRAME_PREVIEW_BYTES)]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "data: {\"id\":\"r1\",\"seq\":0,\"delta\":\"cat\"}\n\n\
                           data: {\"id\":\"r1\",\"seq\":1,\"delta\":\" is\"}\n\n\
                           data: [DONE]\n\n";

    fn decode_in_parts(mut decoder: StreamDecoder, parts: &[&[u8]]) -> Vec<Result<ChunkRecord>> {
        let mut out = Vec::new();
        for part in parts {
            match decoder.feed(part) {
                Ok(frames) => out.extend(frames),
                Err(Error::StreamFinished) => break,
                Err(other) => panic!("unexpected feed error: {other}"),
            }
        }
        out.extend(decoder.finish());
        out
    }

    fn records(results: Vec<Result<ChunkRecord>>) -> Vec<ChunkRecord> {
        results.into_iter().collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn decodes_example_scenario() {
        let mut decoder = StreamDecoder::sse();
        let out = records(decoder.feed(EXAMPLE.as_bytes()).unwrap().collect());

        assert_eq!(
            out,
            vec![
                ChunkRecord::new("r1", 0, "cat"),
                ChunkRecord::new("r1", 1, " is").with_terminal_reason(TerminalReason::NaturalStop),
            ]
        );
        assert!(decoder.is_finished());
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn framing_is_independent_of_delivery_chunking() {
        let bytes = EXAMPLE.as_bytes();
        let whole = records(decode_in_parts(StreamDecoder::sse(), &[bytes]));

        let single_bytes: Vec<&[u8]> = bytes.chunks(1).collect();
        assert_eq!(records(decode_in_parts(StreamDecoder::sse(), &single_bytes)), whole);

        for split in 1..bytes.len() {
            let (head, tail) = bytes.split_at(split);
            assert_eq!(
                records(decode_in_parts(StreamDecoder::sse(), &[head, tail])),
                whole,
                "split at {split}"
            );
        }
    }

    #[test]
    fn buffers_only_the_incomplete_frame() {
        let mut decoder = StreamDecoder::sse();
        let first = "data: {\"id\":\"r1\",\"delta\":\"a\"}\n\n";
        let partial = "data: {\"id\":\"r1\",";

        let out: Vec<_> = decoder.feed(format!("{first}{partial}").as_bytes()).unwrap().collect();
        assert!(out.is_empty(), "first record is held back until the next frame");
        assert_eq!(decoder.buffered_len(), partial.len());
    }

    #[test]
    fn assigns_sequence_numbers_when_absent() {
        let wire = "data: {\"id\":\"x\",\"delta\":\"a\"}\n\n\
                    data: {\"id\":\"x\",\"delta\":\"b\"}\n\n\
                    data: [DONE]\n\n";
        let out = records(decode_in_parts(StreamDecoder::sse(), &[wire.as_bytes()]));
        let seqs: Vec<u64> = out.iter().map(ChunkRecord::seq).collect();
        assert_eq!(seqs, vec![0, 1]);
    }

    #[test]
    fn handles_crlf_comments_and_multiline_data() {
        let wire = ": keep-alive\r\n\r\n\
                    event: message\r\ndata: {\"id\":\"r\",\r\ndata: \"delta\":\"hi\"}\r\n\r\n\
                    data:[DONE]\r\n\r\n";
        let out = records(decode_in_parts(StreamDecoder::sse(), &[wire.as_bytes()]));
        assert_eq!(
            out,
            vec![ChunkRecord::new("r", 0, "hi").with_terminal_reason(TerminalReason::NaturalStop)]
        );
    }

    #[test]
    fn sentinel_without_content_yields_bare_terminal_record() {
        let out = records(decode_in_parts(StreamDecoder::sse(), &[b"data: [DONE]\n\n"]));
        assert_eq!(
            out,
            vec![ChunkRecord::new("", 0, "").with_terminal_reason(TerminalReason::NaturalStop)]
        );
    }

    #[test]
    fn payload_terminal_reason_ends_the_stream() {
        let wire = "data: {\"id\":\"r\",\"delta\":\"a\"}\n\n\
                    data: {\"id\":\"r\",\"delta\":\"b\",\"finish_reason\":\"length\"}\n\n\
                    data: {\"id\":\"r\",\"delta\":\"late\"}\n\n\
                    data: [DONE]\n\n";
        let mut decoder = StreamDecoder::sse();
        let out = records(decoder.feed(wire.as_bytes()).unwrap().collect());

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].terminal_reason(), None);
        assert_eq!(out[1].terminal_reason(), Some(TerminalReason::LengthLimit));
        assert!(matches!(decoder.feed(b"data: x\n\n"), Err(Error::StreamFinished)));
    }

    #[test]
    fn error_event_becomes_upstream_error_record() {
        let wire = "data: {\"id\":\"r\",\"delta\":\"a\"}\n\n\
                    event: error\ndata: rate limited\n\n";
        let out = records(decode_in_parts(StreamDecoder::sse(), &[wire.as_bytes()]));

        assert_eq!(out.len(), 2);
        assert_eq!(out[1].id(), "r");
        assert_eq!(out[1].seq(), 1);
        assert_eq!(out[1].terminal_reason(), Some(TerminalReason::UpstreamError));
        assert_eq!(out[1].error(), Some("rate limited"));
    }

    #[test]
    fn malformed_frame_fails_after_earlier_records() {
        let wire = "data: {\"id\":\"r\",\"delta\":\"a\"}\n\n\
                    data: {not json\n\n\
                    data: {\"id\":\"r\",\"delta\":\"c\"}\n\n";
        let mut decoder = StreamDecoder::sse();
        let mut frames = decoder.feed(wire.as_bytes()).unwrap();

        assert_eq!(frames.next().unwrap().unwrap(), ChunkRecord::new("r", 0, "a"));
        match frames.next() {
            Some(Err(Error::Decode { frame, .. })) => assert_eq!(frame, "data: {not json"),
            other => panic!("expected decode error, got {other:?}"),
        }
        assert!(frames.next().is_none());
        assert!(decoder.is_failed());
        assert!(matches!(decoder.feed(b"\n\n"), Err(Error::StreamFinished)));
    }

    #[test]
    fn rejects_out_of_order_sequence() {
        let wire = "data: {\"id\":\"r\",\"seq\":4,\"delta\":\"a\"}\n\n\
                    data: {\"id\":\"r\",\"seq\":4,\"delta\":\"b\"}\n\n";
        let out = decode_in_parts(StreamDecoder::sse(), &[wire.as_bytes()]);

        assert!(matches!(&out[0], Ok(record) if record.seq() == 4));
        let Err(Error::Decode { source, .. }) = &out[1] else {
            panic!("expected decode error");
        };
        assert!(matches!(
            source.downcast_ref::<FrameError>(),
            Some(FrameError::OutOfOrder { previous: 4, got: 4 })
        ));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn rejects_foreign_chunk_id() {
        let wire = "data: {\"id\":\"r1\",\"delta\":\"a\"}\n\n\
                    data: {\"id\":\"r2\",\"delta\":\"b\"}\n\n";
        let out = decode_in_parts(StreamDecoder::sse(), &[wire.as_bytes()]);
        let Err(Error::Decode { source, .. }) = &out[1] else {
            panic!("expected decode error");
        };
        assert!(matches!(
            source.downcast_ref::<FrameError>(),
            Some(FrameError::IdMismatch { .. })
        ));
    }

    #[test]
    fn late_chunk_id_is_rejected() {
        let wire = "data: {\"delta\":\"a\"}\n\n\
                    data: {\"id\":\"r\",\"delta\":\"b\"}\n\n";
        let out = decode_in_parts(StreamDecoder::sse(), &[wire.as_bytes()]);

        assert!(matches!(&out[0], Ok(record) if record.id().is_empty()));
        let Err(Error::Decode { source, .. }) = &out[1] else {
            panic!("expected decode error");
        };
        assert!(matches!(
            source.downcast_ref::<FrameError>(),
            Some(FrameError::IdMismatch { expected, got }) if expected.is_empty() && got == "r"
        ));
    }

    #[test]
    fn oversized_incomplete_frame_is_rejected() {
        let config = DecoderConfig::default().with_max_frame_bytes(16);
        let mut decoder = StreamDecoder::new(config, JsonChunkParser);

        let mut frames = decoder.feed(b"data: {\"id\":\"r\",\"delta\":\"aaaa").unwrap();
        let Some(Err(Error::Decode { source, .. })) = frames.next() else {
            panic!("expected decode error");
        };
        assert!(matches!(
            source.downcast_ref::<FrameError>(),
            Some(FrameError::TooLarge { limit: 16 })
        ));
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let out = decode_in_parts(StreamDecoder::sse(), &[b"data: \xff\xfe\n\n"]);
        let Err(Error::Decode { source, .. }) = &out[0] else {
            panic!("expected decode error");
        };
        assert!(matches!(source.downcast_ref::<FrameError>(), Some(FrameError::InvalidUtf8)));
    }

    #[test]
    fn ndjson_framing_with_trailing_unterminated_line() {
        let wire = "{\"id\":\"n\",\"delta\":\"a\"}\r\n\n{\"id\":\"n\",\"delta\":\"b\"}\n[DONE]";
        let out = records(decode_in_parts(StreamDecoder::ndjson(), &[wire.as_bytes()]));
        assert_eq!(
            out,
            vec![
                ChunkRecord::new("n", 0, "a"),
                ChunkRecord::new("n", 1, "b").with_terminal_reason(TerminalReason::NaturalStop),
            ]
        );
    }

    #[test]
    fn end_of_input_without_sentinel_flushes_held_record() {
        let mut decoder = StreamDecoder::sse();
        assert_eq!(decoder.feed(b"data: {\"id\":\"r\",\"delta\":\"a\"}\n\n").unwrap().count(), 0);

        let out = records(decoder.finish().collect());
        assert_eq!(out, vec![ChunkRecord::new("r", 0, "a")]);
        assert!(!decoder.is_finished());
        assert!(decoder.is_input_closed());
    }

    #[test]
    fn frame_cut_by_end_of_input_is_a_transport_error() {
        let mut decoder = StreamDecoder::ndjson();
        let wire = "{\"id\":\"n\",\"delta\":\"a\"}\n{\"id\":\"n\",\"del";
        assert_eq!(decoder.feed(wire.as_bytes()).unwrap().count(), 0);

        let out: Vec<_> = decoder.finish().collect();
        assert_eq!(out.len(), 2);
        assert!(matches!(&out[0], Ok(record) if record.delta() == "a"));
        let Err(Error::Transport(source)) = &out[1] else {
            panic!("expected transport error, got {:?}", out[1]);
        };
        assert!(source.downcast_ref::<ConnectionClosed>().is_some());
        assert!(decoder.is_failed());
    }

    #[test]
    fn custom_sentinel() {
        let config = DecoderConfig::default().with_sentinel("END");
        let mut decoder = StreamDecoder::new(config, JsonChunkParser);
        assert_eq!(decoder.config().sentinel, "END");
        let out = records(
            decoder
                .feed(b"data: {\"id\":\"r\",\"delta\":\"a\"}\n\ndata: END\n\n")
                .unwrap()
                .collect(),
        );
        assert_eq!(out.len(), 1);
        assert!(out[0].is_terminal());
    }
}
