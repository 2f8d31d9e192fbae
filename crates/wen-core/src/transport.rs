//! Transport abstraction for pluggable I/O.

use std::io::Result;

/// Blocking byte-stream transport driven by a link.
///
/// This trait allows various transports (TCP, an in-memory pipe for tests,
/// or anything else that moves bytes) to be plugged into the link without
/// coupling to a concrete implementation. The link performs at most one
/// `read` and one `write` call per poll.
///
/// Semantics:
/// - `Err(_)` means transport failure and surfaces as an I/O error event.
/// - `Ok(0)` from `read` means end of stream.
/// - `Ok(n)` is the number of bytes transferred; short writes are tolerated
///   and the link retains the remainder for the next poll.
pub trait Transport {
    /// Reads up to `buf.len()` bytes into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Writes a prefix of `buf`, returning how many bytes were accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;
}

impl Transport for std::net::TcpStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        std::io::Read::read(self, buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        std::io::Write::write(self, buf)
    }
}
