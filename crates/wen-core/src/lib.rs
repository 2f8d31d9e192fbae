#![warn(missing_docs)]

//! wen-core: foundational types and utilities.
//!
//! This crate provides the minimal set of core pieces shared across all
//! layers:
//! - Compile-time resource limits
//! - Error handling
//! - The transport abstraction
//! - The arena allocator backing slice lifetimes
//! - Event types and the bounded event queue
//!
//! Protocol-specific logic lives in specialized crates:
//! - `wen-codec`: the codec contract and the WebSocket reference codec
//! - `wen-link`: the link runtime driving a single connection

/// Resource limits shared across layers.
///
/// All of them are compile-time constants; there is no runtime
/// configuration, no environment variables, no persisted state.
pub mod limits {
    /// Size of the receive buffer held by each link, in bytes.
    pub const RX_BUFFER: usize = 8192;
    /// Size of the transmit buffer held by each link, in bytes.
    pub const TX_BUFFER: usize = 8192;
    /// Maximum size of a slice handed to the application, in bytes.
    pub const MAX_SLICE: usize = 4096;
    /// Capacity of the per-link event queue. One cell is reserved to
    /// distinguish full from empty, so `EVENT_QUEUE_CAP - 1` events fit.
    pub const EVENT_QUEUE_CAP: usize = 16;

    const _: () = assert!(RX_BUFFER >= 1024, "rx buffer too small");
    const _: () = assert!(TX_BUFFER >= 1024, "tx buffer too small");
    const _: () = assert!(MAX_SLICE <= RX_BUFFER);
    const _: () = assert!(EVENT_QUEUE_CAP >= 2);
}

/// Version constants.
pub mod version {
    /// Major version.
    pub const MAJOR: u32 = 0;
    /// Minor version.
    pub const MINOR: u32 = 1;
    /// Patch version.
    pub const PATCH: u32 = 0;
    /// Version as a single monotonic integer, e.g. 0.1.0 becomes 1000.
    pub const NUMBER: u32 = MAJOR * 1_000_000 + MINOR * 1_000 + PATCH;
    /// Version as a display string.
    pub const STRING: &str = env!("CARGO_PKG_VERSION");
}

/// Arena allocator with snapshot/reset reclamation.
pub mod arena;
/// Error kinds and results.
pub mod error;
/// Event types delivered by the link.
pub mod event;
/// Bounded FIFO ring of events.
pub mod event_queue;
/// Transport abstraction for pluggable I/O.
pub mod transport;

pub use arena::{Arena, ArenaSnapshot};
pub use error::{ErrorKind, Result};
pub use event::{Event, FrameInfo, Slice, SliceFlags};
pub use event_queue::EventQueue;
pub use transport::Transport;
