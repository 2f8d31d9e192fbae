//! WebSocket frame serialization for the server side.

use byteorder::{BigEndian, ByteOrder};

use wen_core::{ErrorKind, Result};

use super::is_control;

/// Serializes single unmasked server-to-client frames.
pub struct FrameEncoder;

impl FrameEncoder {
    /// Encodes one frame into `out`, returning the encoded length.
    ///
    /// The frame always carries FIN. The length encoding is selected by
    /// payload size: up to 125 literal, up to `0xFFFF` as `126` plus a
    /// 16-bit big-endian field, beyond that as `127` plus a 64-bit
    /// big-endian field. Control frames are limited to 125 payload bytes
    /// (`Protocol`); a frame that does not fit in `out` is an `Overflow`.
    pub fn encode(opcode: u8, payload: &[u8], out: &mut [u8]) -> Result<usize> {
        if is_control(opcode) && payload.len() > 125 {
            return Err(ErrorKind::Protocol);
        }

        let header = if payload.len() <= 125 {
            2
        } else if payload.len() <= 0xFFFF {
            4
        } else {
            10
        };

        if out.len() < header + payload.len() {
            return Err(ErrorKind::Overflow);
        }

        out[0] = 0x80 | (opcode & 0x0F);
        match header {
            2 => out[1] = payload.len() as u8,
            4 => {
                out[1] = 126;
                BigEndian::write_u16(&mut out[2..], payload.len() as u16);
            }
            _ => {
                out[1] = 127;
                BigEndian::write_u64(&mut out[2..], payload.len() as u64);
            }
        }

        out[header..header + payload.len()].copy_from_slice(payload);
        Ok(header + payload.len())
    }
}
