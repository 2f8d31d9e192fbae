//! WebSocket echo server over a plain TCP listener.
//!
//! Run:
//! - cargo run -p wen --example echo_server
//! - cargo run -p wen --example echo_server -- 0.0.0.0:8080
//!
//! Point a browser at the bound address with any WebSocket client; text
//! messages are echoed back and pings are answered.

use std::{
    env,
    net::{TcpListener, TcpStream},
};

use wen::{ws, Event, Link, WebSocketCodec};

const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Unmasks a raw client frame in place, returning its opcode and payload.
///
/// Slices handed out by the link begin at the raw frame bytes, masking
/// key included, so this is the application-side XOR.
fn unmask(frame: &mut [u8]) -> Option<(u8, &[u8])> {
    if frame.len() < 6 {
        return None;
    }
    let opcode = frame[0] & 0x0F;
    let (mask_at, payload_len) = match frame[1] & 0x7F {
        126 => (4usize, u16::from_be_bytes([frame[2], frame[3]]) as usize),
        127 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&frame[2..10]);
            (10, u64::from_be_bytes(raw) as usize)
        }
        n => (2, n as usize),
    };

    if frame.len() < mask_at + 4 {
        return None;
    }
    let (head, payload) = frame.split_at_mut(mask_at + 4);
    let key = [head[mask_at], head[mask_at + 1], head[mask_at + 2], head[mask_at + 3]];
    let payload = payload.get_mut(..payload_len)?;
    for (index, byte) in payload.iter_mut().enumerate() {
        *byte ^= key[index & 3];
    }
    Some((opcode, payload))
}

fn run_link(stream: TcpStream) {
    let mut link = Link::new(stream);
    link.attach_codec(WebSocketCodec::new());

    loop {
        let event = match link.poll() {
            Some(event) => event,
            None => continue,
        };

        match event {
            Event::Open => {
                println!("[ws] handshake complete");
                let _ = link.send(ws::OP_TEXT, b"Hello from wen!");
            }
            Event::Slice(slice) => {
                let mut message: Option<(u8, Vec<u8>)> = None;
                if let Some((opcode, payload)) = unmask(link.slice_bytes_mut(&slice)) {
                    message = Some((opcode, payload.to_vec()));
                }
                link.release(slice);

                match message {
                    Some((ws::OP_PING, payload)) => {
                        let _ = link.send(ws::OP_PONG, &payload);
                    }
                    Some((ws::OP_TEXT, mut payload)) => {
                        if payload.last() == Some(&b'\n') {
                            payload.pop();
                        }
                        println!("[ws] {}", String::from_utf8_lossy(&payload));
                        let _ = link.send(ws::OP_TEXT, &payload);
                    }
                    Some((ws::OP_CLOSE, _)) => {
                        let _ = link.close(1000, ws::OP_CLOSE);
                    }
                    _ => {}
                }
            }
            Event::Frame(info) => {
                println!("[ws] frame fin={} opcode={:#x} len={}", info.fin, info.opcode, info.length);
            }
            Event::Close(code) => {
                println!("[ws] closed (code {})", code);
                break;
            }
            Event::Error(kind) => {
                eprintln!("[ws] error: {}", kind);
                break;
            }
            Event::Ping | Event::Pong => {}
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr = env::args().nth(1).unwrap_or_else(|| DEFAULT_BIND.to_string());
    let listener = TcpListener::bind(bind_addr.as_str())?;
    println!("wen echo server listening on {}", listener.local_addr()?);

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => run_link(stream),
            Err(err) => eprintln!("accept failed: {}", err),
        }
    }

    Ok(())
}
