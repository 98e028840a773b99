use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::config::Config;
use crate::connection::Side;
use crate::error::Result;
use crate::protocol::OpCode;
use crate::protocol::frame::{encode, encoded_len};
use crate::protocol::mask::random_mask;

/// Seed for mask generation when the OS random source fails.
fn mask_fallback_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(0x1234_5678)
}

/// Frame encoder over the write half of a stream.
///
/// Each call writes one complete frame and flushes it. Frames are masked
/// with a fresh key when `side` requires it.
#[derive(Debug)]
pub struct FrameWriter<W> {
    io: W,
    buf: BytesMut,
    side: Side,
    write_buffer_size: usize,
    mask_fallback: u32,
}

impl<W> FrameWriter<W> {
    /// Create a writer for frames sent from `side`.
    #[must_use]
    pub fn new(io: W, side: Side, config: &Config) -> Self {
        Self {
            io,
            buf: BytesMut::with_capacity(config.write_buffer_size),
            side,
            write_buffer_size: config.write_buffer_size,
            mask_fallback: mask_fallback_seed(),
        }
    }

    /// Consume the writer, returning the stream.
    pub fn into_inner(self) -> W {
        self.io
    }
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Encode, write and flush one frame.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` (or `Error::Timeout`) if the stream fails.
    pub async fn write_frame(&mut self, fin: bool, opcode: OpCode, payload: &[u8]) -> Result<()> {
        let mask = self
            .side
            .must_mask()
            .then(|| random_mask(&mut self.mask_fallback));

        let size = encoded_len(payload.len(), mask.is_some());
        self.buf.clear();
        self.buf.resize(size, 0);
        let written = encode(&mut self.buf, fin, opcode, payload, mask)?;

        self.io.write_all(&self.buf[..written]).await?;
        self.io.flush().await?;

        // don't pin memory from one oversized message
        if self.buf.capacity() > self.write_buffer_size.saturating_mul(4) {
            self.buf = BytesMut::with_capacity(self.write_buffer_size);
        }
        Ok(())
    }
}
