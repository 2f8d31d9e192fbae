//! WebSocket frame-header parsing.

use byteorder::{BigEndian, ByteOrder};

use wen_core::{ErrorKind, Event, FrameInfo, Result};

use super::{is_control, OP_PING, OP_PONG};
use crate::{DecodeSink, Decoded};

/// Parses one RFC 6455 frame from the received prefix.
///
/// Pure inspection: the decoder never consumes input and never unmasks
/// payload bytes. When a complete frame is visible it emits the frame
/// metadata (plus `Ping`/`Pong` for those opcodes) and records the total
/// frame length on the link; the link then drains exactly those bytes as
/// slices.
pub struct FrameDecoder;

impl FrameDecoder {
    /// Inspects `data` for one complete frame.
    ///
    /// Too-short input is `Incomplete` and records no frame length, so
    /// the link keeps accumulating. Malformed framing is a `Protocol`
    /// error: unmasked client frames, or control frames that are
    /// fragmented or carry more than 125 payload bytes.
    pub fn decode(data: &[u8], sink: &mut DecodeSink<'_>) -> Result<Decoded> {
        if data.len() < 2 {
            return Ok(Decoded::Incomplete);
        }

        let fin = data[0] & 0x80 != 0;
        let opcode = data[0] & 0x0F;
        let masked = data[1] & 0x80 != 0;
        let mut payload_len = u64::from(data[1] & 0x7F);
        let mut header = 2usize;

        // Client-to-server frames must be masked.
        if !masked {
            return Err(ErrorKind::Protocol);
        }

        if payload_len == 126 {
            if data.len() < header + 2 {
                return Ok(Decoded::Incomplete);
            }
            payload_len = u64::from(BigEndian::read_u16(&data[header..]));
            header += 2;
        } else if payload_len == 127 {
            if data.len() < header + 8 {
                return Ok(Decoded::Incomplete);
            }
            payload_len = BigEndian::read_u64(&data[header..]);
            header += 8;
            // The most significant bit of the 64-bit length must be zero.
            if payload_len > i64::MAX as u64 {
                return Err(ErrorKind::Protocol);
            }
        }

        if is_control(opcode) && (!fin || payload_len > 125) {
            return Err(ErrorKind::Protocol);
        }

        // Header, the 4-byte masking key, and the payload must all be
        // buffered before the frame is recognized.
        let total = header as u64 + 4 + payload_len;
        if (data.len() as u64) < total {
            return Ok(Decoded::Incomplete);
        }

        sink.emit(Event::Frame(FrameInfo { fin, masked: true, opcode, length: payload_len }));

        match opcode {
            OP_PING => {
                sink.emit(Event::Ping);
            }
            OP_PONG => {
                sink.emit(Event::Pong);
            }
            _ => {}
        }

        sink.set_frame_len(total as usize);
        Ok(Decoded::Passthrough)
    }
}
