//! HTTP Upgrade handshake for the server side.
//!
//! Validates the client's upgrade request and produces the
//! `101 Switching Protocols` response carrying the accept token:
//! Base64 of SHA-1 over the client key concatenated with the protocol
//! GUID.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha1::{Digest, Sha1};

use super::WS_GUID;
use crate::HandshakeOutcome;

/// Upper bound on the request prefix the handshake examines. A request
/// that reaches this bound without completing is rejected.
pub const SCRATCH_BOUND: usize = 2048;

const KEY_HEADER: &[u8] = b"sec-websocket-key:";
const RESPONSE_HEAD: &[u8] = b"HTTP/1.1 101 Switching Protocols\r\n\
                               Upgrade: websocket\r\n\
                               Connection: Upgrade\r\n\
                               Sec-WebSocket-Accept: ";

/// Advances the handshake against the accumulated request prefix.
///
/// The required headers are checked as literal substrings (`Upgrade` and
/// `Connection` case-insensitively); a prefix missing any of them fails,
/// but consumes nothing, so a retry sees the full accumulated request. A
/// prefix whose key header has not arrived yet is incomplete. On success
/// the entire received prefix is treated as the request and consumed.
pub fn respond(input: &[u8], out: &mut [u8]) -> HandshakeOutcome {
    if input.len() >= SCRATCH_BOUND {
        return HandshakeOutcome::failed();
    }

    if !contains(input, b"GET ")
        || !contains_ignore_case(input, b"upgrade: websocket")
        || !contains_ignore_case(input, b"connection: upgrade")
        || !contains(input, b"Sec-WebSocket-Version: 13")
    {
        return HandshakeOutcome::failed();
    }

    let key = match key_value(input) {
        Some(key) => key,
        None => return HandshakeOutcome::incomplete(),
    };

    let mut digest = Sha1::new();
    digest.update(key);
    digest.update(WS_GUID.as_bytes());
    let accept = BASE64.encode(digest.finalize());

    let written = RESPONSE_HEAD.len() + accept.len() + 4;
    if written > out.len() {
        return HandshakeOutcome::failed();
    }

    out[..RESPONSE_HEAD.len()].copy_from_slice(RESPONSE_HEAD);
    let mut at = RESPONSE_HEAD.len();
    out[at..at + accept.len()].copy_from_slice(accept.as_bytes());
    at += accept.len();
    out[at..at + 4].copy_from_slice(b"\r\n\r\n");

    HandshakeOutcome::complete(input.len(), written)
}

/// Extracts the `Sec-WebSocket-Key` value: matched case-insensitively,
/// leading spaces stripped, terminated at CR or LF. Returns `None` when
/// the header or its terminator has not arrived yet.
fn key_value(input: &[u8]) -> Option<&[u8]> {
    let start = find_ignore_case(input, KEY_HEADER)? + KEY_HEADER.len();
    let value = &input[start..];
    let value = &value[value.iter().take_while(|&&b| b == b' ').count()..];
    let end = value.iter().position(|&b| b == b'\r' || b == b'\n')?;
    Some(&value[..end])
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

fn contains_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    find_ignore_case(haystack, needle).is_some()
}

fn find_ignore_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window.eq_ignore_ascii_case(needle))
}
