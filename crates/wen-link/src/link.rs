//! The connection object and its poll engine.

use wen_core::{
    limits::{MAX_SLICE, RX_BUFFER, TX_BUFFER},
    Arena, ErrorKind, Event, EventQueue, Result, Slice, SliceFlags, Transport,
};

use wen_codec::{Codec, DecodeSink, Decoded, HandshakeStatus};

use crate::link_state::LinkState;

/// A single bidirectional byte-stream connection.
///
/// The link owns its buffers, arena, event queue and codec; the caller
/// owns the transport handle it was built from and drives everything by
/// calling [`poll`](Link::poll). Dropping the link after observing the
/// close event is the whole teardown.
pub struct Link<T: Transport> {
    state: LinkState,
    transport: T,

    rx_buf: Box<[u8]>,
    rx_len: usize,

    tx_buf: Box<[u8]>,
    tx_len: usize,

    codec: Option<Box<dyn Codec>>,

    /// Bytes still belonging to the frame the codec last recognized.
    frame_len: usize,
    /// True between the first and last slice of a multi-slice frame.
    frame_open: bool,

    arena: Arena,
    events: EventQueue,

    slice_outstanding: bool,
    close_queued: bool,
    close_code: u16,
}

impl<T: Transport> Link<T> {
    /// Creates a link over `transport`.
    ///
    /// All memory the link will ever use is allocated here: both stream
    /// buffers and the arena backing slices.
    pub fn new(transport: T) -> Self {
        Self {
            state: LinkState::Init,
            transport,
            rx_buf: vec![0u8; RX_BUFFER].into_boxed_slice(),
            rx_len: 0,
            tx_buf: vec![0u8; TX_BUFFER].into_boxed_slice(),
            tx_len: 0,
            codec: None,
            frame_len: 0,
            frame_open: false,
            arena: Arena::with_capacity(RX_BUFFER + TX_BUFFER),
            events: EventQueue::new(),
            slice_outstanding: false,
            close_queued: false,
            close_code: 0,
        }
    }

    /// Attaches the wire-protocol codec and enters the handshake phase.
    ///
    /// Must be called before polling can make progress.
    pub fn attach_codec<C: Codec + 'static>(&mut self, codec: C) {
        self.codec = Some(Box::new(codec));
        self.state = LinkState::Handshake;
        tracing::debug!("codec attached, entering handshake");
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Returns the number of unprocessed received bytes.
    pub fn rx_len(&self) -> usize {
        self.rx_len
    }

    /// Returns the number of bytes waiting to be flushed.
    pub fn tx_len(&self) -> usize {
        self.tx_len
    }

    /// Clears both stream buffers.
    pub fn reset_buffers(&mut self) {
        self.rx_len = 0;
        self.tx_len = 0;
    }

    /// Advances the link one step and returns at most one event.
    ///
    /// The internal order is load-bearing: drain the event queue, then
    /// flush pending TX, then take a single bounded read, then run the
    /// handshake or the decoder. Flushing before reading bounds write
    /// latency and keeps pending handshake responses, control frames and
    /// close frames from being starved by the RX side. At most one
    /// transport read and one transport write happen per call.
    pub fn poll(&mut self) -> Option<Event> {
        // Deliver queued events one per call before doing any new work.
        if let Some(event) = self.events.pop() {
            if matches!(event, Event::Close(_)) && self.state != LinkState::Closed {
                // Lazy destruction: the terminal transition happens when
                // the caller observes the close, not when it was queued.
                self.state = LinkState::Closed;
                self.arena.release();
                tracing::debug!("link closed");
            }
            return Some(event);
        }

        if self.state == LinkState::Closed {
            return None;
        }

        // A closing link with nothing left to flush retires as soon as
        // the outstanding slice (if any) has been released. This needs no
        // codec, so a close requested before attach still completes.
        if self.state == LinkState::Closing && self.tx_len == 0 {
            self.try_queue_close();
            return None;
        }

        if self.codec.is_none() {
            return Some(Event::Error(ErrorKind::Unsupported));
        }

        // Flush the whole pending TX buffer with a single write. The
        // flush consumes the poll whether or not it finished, and the
        // close event may only be queued once nothing is left to send;
        // a short write keeps the remainder for the next poll.
        if self.tx_len > 0 {
            match self.transport.write(&self.tx_buf[..self.tx_len]) {
                Err(err) => {
                    tracing::warn!("transport write failed: {}", err);
                    return Some(Event::Error(ErrorKind::Io));
                }
                Ok(n) if n < self.tx_len => {
                    self.tx_buf.copy_within(n..self.tx_len, 0);
                    self.tx_len -= n;
                }
                Ok(_) => {
                    self.tx_len = 0;
                    self.try_queue_close();
                }
            }
            return None;
        }

        // One bounded read into the free RX tail.
        if self.rx_len < self.rx_buf.len() {
            let rx_len = self.rx_len;
            match self.transport.read(&mut self.rx_buf[rx_len..]) {
                Err(err) => {
                    tracing::warn!("transport read failed: {}", err);
                    return Some(Event::Error(ErrorKind::Io));
                }
                Ok(0) => {
                    tracing::debug!("transport EOF, closing");
                    self.state = LinkState::Closing;
                    self.try_queue_close();
                    return None;
                }
                Ok(n) => self.rx_len += n,
            }
        }

        if self.state == LinkState::Handshake {
            return self.drive_handshake();
        }

        self.decode_and_slice()
    }

    /// Runs the codec handshake against the accumulated RX prefix.
    ///
    /// Response bytes land in the free TX tail so the next poll's flush
    /// sends them; consumed input is compacted out of RX.
    fn drive_handshake(&mut self) -> Option<Event> {
        let rx_len = self.rx_len;
        let tx_len = self.tx_len;
        let outcome = match self.codec.as_mut() {
            Some(codec) => codec.handshake(&self.rx_buf[..rx_len], &mut self.tx_buf[tx_len..]),
            None => return Some(Event::Error(ErrorKind::Unsupported)),
        };

        self.tx_len += outcome.written;
        if outcome.consumed > 0 {
            self.rx_buf.copy_within(outcome.consumed..self.rx_len, 0);
            self.rx_len -= outcome.consumed;
        }

        match outcome.status {
            HandshakeStatus::Complete => {
                self.state = LinkState::Open;
                tracing::debug!("handshake complete");
                Some(Event::Open)
            }
            // The link stays in handshake; abandoning is the caller's
            // decision, and nothing was consumed so a retry sees the
            // full request.
            HandshakeStatus::Failed => Some(Event::Error(ErrorKind::Protocol)),
            HandshakeStatus::Incomplete => None,
        }
    }

    /// Consults the decoder between frames, then emits at most one slice
    /// drawn from the RX prefix.
    fn decode_and_slice(&mut self) -> Option<Event> {
        let mut slice_len = if self.frame_len > 0 {
            self.frame_len.min(MAX_SLICE)
        } else {
            self.rx_len.min(MAX_SLICE)
        };

        // While a recognized frame is draining its remaining bytes are
        // already classified; re-parsing them as a header would corrupt
        // the stream, so the decoder only runs between frames.
        if self.frame_len == 0 {
            let rx_len = self.rx_len;
            let decoded = {
                let Some(codec) = self.codec.as_mut() else {
                    return Some(Event::Error(ErrorKind::Unsupported));
                };
                let mut sink = DecodeSink::new(&mut self.events, &mut self.frame_len);
                match codec.decode(&self.rx_buf[..rx_len], &mut sink) {
                    Ok(decoded) => decoded,
                    Err(kind) => return Some(Event::Error(kind)),
                }
            };
            if self.frame_len == 0 && decoded == Decoded::Incomplete {
                return None;
            }
        }

        if self.frame_len > 0 {
            slice_len = slice_len.min(self.frame_len);
        }
        slice_len = slice_len.min(self.rx_len).min(MAX_SLICE);

        if slice_len == 0 {
            return None;
        }

        assert!(
            !self.slice_outstanding,
            "poll would emit a second slice; release the previous one first"
        );

        let snapshot = self.arena.snapshot();
        let Some(offset) = self.arena.alloc(slice_len) else {
            return Some(Event::Error(ErrorKind::Overflow));
        };
        self.arena.bytes_mut(offset, slice_len).copy_from_slice(&self.rx_buf[..slice_len]);

        self.rx_buf.copy_within(slice_len..self.rx_len, 0);
        self.rx_len -= slice_len;
        self.slice_outstanding = true;

        let tracked = self.frame_len > 0;
        let begin = !tracked || !self.frame_open;
        let mut end = true;
        if tracked {
            self.frame_len -= slice_len;
            end = self.frame_len == 0;
            self.frame_open = !end;
        }

        let flags = match (begin, end) {
            (true, true) => SliceFlags::BEGIN | SliceFlags::END,
            (true, false) => SliceFlags::BEGIN,
            (false, true) => SliceFlags::END,
            (false, false) => SliceFlags::CONT,
        };

        Some(Event::Slice(Slice { offset, len: slice_len, flags, snapshot }))
    }

    /// Queues the close event once the link is closing, no slice is
    /// outstanding, and it has not been queued before.
    fn try_queue_close(&mut self) {
        if self.state == LinkState::Closing && !self.close_queued && !self.slice_outstanding {
            if self.events.push(Event::Close(self.close_code)) {
                self.close_queued = true;
            } else {
                tracing::warn!("event queue full, close delayed");
            }
        }
    }

    /// Returns the bytes of an emitted slice.
    pub fn slice_bytes(&self, slice: &Slice) -> &[u8] {
        self.arena.bytes(slice.offset, slice.len)
    }

    /// Returns the bytes of an emitted slice mutably.
    ///
    /// Received WebSocket slices start at the raw frame bytes with the
    /// masking key included, and the application unmasks in place.
    pub fn slice_bytes_mut(&mut self, slice: &Slice) -> &mut [u8] {
        self.arena.bytes_mut(slice.offset, slice.len)
    }

    /// Releases a slice, rolling the arena back to the mark taken when
    /// the slice was emitted.
    ///
    /// Calling this with no outstanding slice is a programmer error.
    pub fn release(&mut self, slice: Slice) {
        assert!(self.slice_outstanding, "release with no outstanding slice");
        self.arena.reset(slice.snapshot);
        self.slice_outstanding = false;
    }

    /// Encodes one outbound message into the TX buffer.
    ///
    /// Nothing is written to the transport here; the next poll flushes.
    /// Fails with `Overflow` when the TX buffer is already full or the
    /// encoded frame does not fit behind the pending bytes.
    pub fn send(&mut self, opcode: u8, data: &[u8]) -> Result<()> {
        let tx_len = self.tx_len;
        if tx_len >= self.tx_buf.len() {
            return Err(ErrorKind::Overflow);
        }
        let written = match self.codec.as_mut() {
            Some(codec) => codec.encode(opcode, data, &mut self.tx_buf[tx_len..])?,
            None => return Err(ErrorKind::State),
        };
        self.tx_len += written;
        Ok(())
    }

    /// Begins a caller-initiated close carrying `code`, encoding a close
    /// frame with `opcode` when the codec will produce one.
    ///
    /// Refused with `State` while TX bytes are pending: the protocol
    /// close must be the next thing to go out. Already-closed links are a
    /// no-op. The transition to closing holds even when the codec
    /// declines to encode a close frame.
    pub fn close(&mut self, code: u16, opcode: u8) -> Result<()> {
        if self.state == LinkState::Closed {
            return Ok(());
        }
        if self.tx_len != 0 {
            return Err(ErrorKind::State);
        }

        self.state = LinkState::Closing;
        self.close_code = code;
        tracing::debug!("close requested with code {}", code);

        if let Some(codec) = self.codec.as_mut() {
            let payload = code.to_be_bytes();
            if let Ok(written) = codec.encode(opcode, &payload, &mut self.tx_buf[..]) {
                self.tx_len = written;
            }
        }

        Ok(())
    }
}
