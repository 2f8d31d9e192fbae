#![warn(missing_docs)]

//! wen-codec: the codec contract and the reference WebSocket codec.
//!
//! A codec is the trio of operations that interprets a wire protocol on
//! behalf of a link:
//! - [`Codec::handshake`] drives the protocol-specific opening exchange,
//! - [`Codec::decode`] inspects received bytes and reports frame
//!   boundaries and metadata,
//! - [`Codec::encode`] serializes one outbound message.
//!
//! The link drives all three; codecs never touch the transport.

/// The reference WebSocket server codec.
pub mod ws;

use wen_core::{Event, EventQueue, Result};

/// Progress of a protocol handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStatus {
    /// More input is needed; the link keeps accumulating.
    Incomplete,
    /// The handshake finished; the link opens and emits `Open`.
    Complete,
    /// The peer sent an invalid opening; surfaced as a protocol error.
    Failed,
}

/// Outcome of one [`Codec::handshake`] call.
///
/// The codec may consume any prefix of its input and write any prefix of
/// its output window; the link compacts the consumed bytes out of RX and
/// queues the written bytes for transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeOutcome {
    /// Progress made by this call.
    pub status: HandshakeStatus,
    /// Input bytes the link should discard.
    pub consumed: usize,
    /// Output bytes the codec produced.
    pub written: usize,
}

impl HandshakeOutcome {
    /// More input required; nothing consumed or written.
    pub fn incomplete() -> Self {
        Self { status: HandshakeStatus::Incomplete, consumed: 0, written: 0 }
    }

    /// Handshake finished, consuming `consumed` input bytes and producing
    /// `written` response bytes.
    pub fn complete(consumed: usize, written: usize) -> Self {
        Self { status: HandshakeStatus::Complete, consumed, written }
    }

    /// Handshake failed; input is retained so a later retry sees it.
    pub fn failed() -> Self {
        Self { status: HandshakeStatus::Failed, consumed: 0, written: 0 }
    }
}

/// What [`Codec::decode`] concluded about the inspected prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// The bytes may flow to the application as they are; there is no
    /// boundary to wait for. Codecs that recognized a frame also return
    /// this, after recording the frame length on the link.
    Passthrough,
    /// A frame boundary is not yet visible; the link keeps accumulating
    /// input and emits nothing.
    Incomplete,
}

/// The narrow link capability handed to [`Codec::decode`].
///
/// Rather than a back-pointer from codec state to the link, decode receives
/// exactly the two effects it is allowed to have: emitting metadata events
/// into the link's queue and recording how many further bytes belong to
/// the current frame.
#[derive(Debug)]
pub struct DecodeSink<'a> {
    events: &'a mut EventQueue,
    frame_len: &'a mut usize,
}

impl<'a> DecodeSink<'a> {
    /// Bundles the link's event queue and frame-length cell.
    pub fn new(events: &'a mut EventQueue, frame_len: &'a mut usize) -> Self {
        Self { events, frame_len }
    }

    /// Enqueues a metadata event. Returns false when the queue is full and
    /// the event was dropped.
    pub fn emit(&mut self, event: Event) -> bool {
        self.events.push(event)
    }

    /// Records the total byte length of the frame just recognized.
    pub fn set_frame_len(&mut self, len: usize) {
        *self.frame_len = len;
    }
}

/// A wire protocol, expressed as the handshake/decode/encode trio.
///
/// Per-link protocol state lives inside the implementing value; the link
/// takes ownership of the codec when it is attached.
pub trait Codec {
    /// Advances the opening handshake against the received prefix `input`,
    /// writing any response bytes into `out` (the link's free TX tail).
    fn handshake(&mut self, input: &[u8], out: &mut [u8]) -> HandshakeOutcome;

    /// Inspects the received prefix `data` without consuming it.
    ///
    /// May emit metadata events and record a frame boundary through
    /// `sink`. How much input is then advanced is the link's decision,
    /// based on the slice it emits and the recorded frame length. A
    /// `Protocol` error becomes an error event on the same poll.
    fn decode(&mut self, data: &[u8], sink: &mut DecodeSink<'_>) -> Result<Decoded>;

    /// Serializes one outbound message into `out`, returning the encoded
    /// length. Fails with `Overflow` when the message does not fit.
    fn encode(&mut self, opcode: u8, data: &[u8], out: &mut [u8]) -> Result<usize>;
}
