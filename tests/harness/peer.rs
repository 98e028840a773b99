//! Byte-level remote endpoint.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use wsock::Error;
use wsock::protocol::{Frame, OpCode};

const PEER_MASK: [u8; 4] = [0x5A, 0xC3, 0x11, 0x7E];

/// Encode one frame the way a remote endpoint would.
///
/// `opcode` is raw so reserved values can be sent too.
pub fn encode_frame(fin: bool, opcode: u8, payload: &[u8], masked: bool) -> Vec<u8> {
    let mut frame = vec![opcode | if fin { 0x80 } else { 0 }];
    let mask_bit = if masked { 0x80 } else { 0 };

    match payload.len() {
        n if n <= 125 => frame.push(mask_bit | n as u8),
        n if n <= 65535 => {
            frame.push(mask_bit | 126);
            frame.extend_from_slice(&(n as u16).to_be_bytes());
        }
        n => {
            frame.push(mask_bit | 127);
            frame.extend_from_slice(&(n as u64).to_be_bytes());
        }
    }

    if masked {
        frame.extend_from_slice(&PEER_MASK);
        frame.extend(
            payload
                .iter()
                .enumerate()
                .map(|(i, b)| b ^ PEER_MASK[i % 4]),
        );
    } else {
        frame.extend_from_slice(payload);
    }
    frame
}

/// Remote end of a socket under test.
pub struct Peer {
    io: DuplexStream,
    masked: bool,
    buf: Vec<u8>,
}

impl Peer {
    /// `masked` should be true when the socket under test is the acceptor.
    pub fn new(io: DuplexStream, masked: bool) -> Self {
        Self {
            io,
            masked,
            buf: Vec::new(),
        }
    }

    pub async fn send(&mut self, fin: bool, opcode: u8, payload: &[u8]) {
        let frame = encode_frame(fin, opcode, payload, self.masked);
        self.io.write_all(&frame).await.unwrap();
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.io.write_all(bytes).await.unwrap();
    }

    pub async fn text(&mut self, text: &str) {
        self.send(true, 0x1, text.as_bytes()).await;
    }

    pub async fn binary(&mut self, data: &[u8]) {
        self.send(true, 0x2, data).await;
    }

    pub async fn ping(&mut self, data: &[u8]) {
        self.send(true, 0x9, data).await;
    }

    pub async fn close(&mut self, code: u16, reason: &str) {
        let mut payload = code.to_be_bytes().to_vec();
        payload.extend_from_slice(reason.as_bytes());
        self.send(true, 0x8, &payload).await;
    }

    /// Next frame written by the socket, unmasked. Panics at end of stream.
    pub async fn recv(&mut self) -> Frame {
        loop {
            match Frame::parse(&self.buf) {
                Ok((frame, consumed)) => {
                    self.buf.drain(..consumed);
                    return frame;
                }
                Err(Error::IncompleteFrame { .. }) => {}
                Err(e) => panic!("socket wrote a malformed frame: {e}"),
            }

            let mut chunk = [0u8; 4096];
            let n = self.io.read(&mut chunk).await.unwrap();
            assert!(n > 0, "socket side closed while a frame was expected");
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }

    /// Like [`recv`](Self::recv) but gives up after `wait`.
    pub async fn try_recv(&mut self, wait: Duration) -> Option<Frame> {
        tokio::time::timeout(wait, self.recv()).await.ok()
    }

    /// Expect a frame with the given opcode and payload.
    pub async fn expect(&mut self, opcode: OpCode, payload: &[u8]) {
        let frame = self.recv().await;
        assert_eq!(frame.opcode, opcode);
        assert_eq!(frame.payload(), payload);
        assert!(frame.fin);
    }

    /// Everything the socket writes until its side of the pipe is gone.
    pub async fn drain(mut self) -> Vec<u8> {
        let mut rest = std::mem::take(&mut self.buf);
        self.io.read_to_end(&mut rest).await.unwrap();
        rest
    }

    pub fn into_inner(self) -> DuplexStream {
        self.io
    }
}
