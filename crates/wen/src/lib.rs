#![warn(missing_docs)]

//! Wen: a small public API facade for the workspace.
//!
//! This crate provides a clean, stable surface that re-exports the most
//! commonly used types to drive a single byte-stream connection through a
//! protocol state machine:
//!
//! - Link and events (`Link`, `Event`, `Slice`)
//! - The codec contract and the WebSocket reference codec
//! - Core pieces (`Transport`, `Arena`, limits)
//!
//! Example
//! ```ignore
//! use wen::{ws, Event, Link, WebSocketCodec};
//!
//! let stream = std::net::TcpStream::connect("127.0.0.1:9000")?;
//! let mut link = Link::new(stream);
//! link.attach_codec(WebSocketCodec::new());
//!
//! loop {
//!     match link.poll() {
//!         Some(Event::Open) => println!("handshake complete"),
//!         Some(Event::Slice(slice)) => {
//!             // consume the bytes, then hand them back
//!             link.release(slice);
//!         }
//!         Some(Event::Close(_)) => break,
//!         Some(Event::Error(kind)) => eprintln!("link error: {kind}"),
//!         _ => {}
//!     }
//! }
//! ```

// Core: limits, arena, events, transport
pub use wen_core::{
    limits, version, Arena, ArenaSnapshot, ErrorKind, Event, EventQueue, FrameInfo, Result, Slice,
    SliceFlags, Transport,
};
// Codec contract and the WebSocket reference codec
pub use wen_codec::{Codec, DecodeSink, Decoded, HandshakeOutcome, HandshakeStatus};
pub use wen_codec::ws::{self, WebSocketCodec};
// Link runtime
pub use wen_link::{Link, LinkState};

/// Convenience prelude with the most commonly used items.
pub mod prelude {
    pub use crate::{
        Codec, ErrorKind, Event, Link, LinkState, Slice, SliceFlags, Transport, WebSocketCodec,
    };
}
