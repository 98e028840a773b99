use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::Instant;

use crate::config::Config;
use crate::connection::Side;
use crate::error::{Error, Result};
use crate::protocol::mask::apply_mask_fast;
use crate::protocol::{FrameHeader, FrameValidator};

/// Incremental frame decoder over the read half of a stream.
///
/// Frames are read in two steps: [`next_header`](Self::next_header) decodes
/// and validates a header, then the caller either pulls the payload with
/// [`read_payload`](Self::read_payload) or drops it with
/// [`discard`](Self::discard). A payload left unread is skipped by the next
/// `next_header` call.
///
/// Waiting for a header is cancel safe: bytes already received stay buffered
/// when the deadline passes, so the next call resumes where this one stopped.
#[derive(Debug)]
pub struct FrameReader<R> {
    io: R,
    buf: BytesMut,
    validator: FrameValidator,
    read_buffer_size: usize,
    deadline: Option<Instant>,
    pending: Option<FrameHeader>,
    skip: usize,
}

impl<R> FrameReader<R> {
    /// Create a reader for frames arriving on `side`.
    #[must_use]
    pub fn new(io: R, side: Side, config: &Config) -> Self {
        let validator = FrameValidator::new(side, config.limits.clone())
            .with_accept_unmasked(config.accept_unmasked_frames);
        Self {
            io,
            buf: BytesMut::with_capacity(config.read_buffer_size),
            validator,
            read_buffer_size: config.read_buffer_size.max(1),
            deadline: None,
            pending: None,
            skip: 0,
        }
    }

    /// Set or clear the deadline applied to every stream read.
    pub fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.deadline = deadline;
    }

    /// Header of the frame whose payload has not been consumed yet.
    #[must_use]
    pub fn pending(&self) -> Option<&FrameHeader> {
        self.pending.as_ref()
    }

    /// Consume the reader, returning the stream. Buffered bytes are lost.
    pub fn into_inner(self) -> R {
        self.io
    }
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Read and validate the next frame header.
    ///
    /// # Errors
    ///
    /// - `Error::ConnectionClosed(None)` at end of stream
    /// - `Error::Timeout` if the deadline passes first
    /// - any protocol error raised by header validation
    pub async fn next_header(&mut self) -> Result<FrameHeader> {
        self.discard().await?;

        loop {
            match FrameHeader::parse(&self.buf) {
                Ok(header) => {
                    self.validator.validate(&header)?;
                    self.buf.advance(header.header_len);
                    self.pending = Some(header);
                    return Ok(header);
                }
                Err(Error::IncompleteFrame { .. }) => self.fill().await?,
                Err(e) => return Err(e),
            }
        }
    }

    /// Read the payload of the pending frame, unmasked.
    ///
    /// # Errors
    ///
    /// - `Error::ProtocolViolation` if no header is pending
    /// - `Error::ConnectionClosed(None)` if the stream ends mid-payload
    /// - `Error::Timeout` / `Error::Io` from the stream
    pub async fn read_payload(&mut self) -> Result<Vec<u8>> {
        let Some(header) = self.pending else {
            return Err(Error::ProtocolViolation("no frame header pending".into()));
        };

        let len = header.payload_len;
        if self.buf.len() < len {
            self.buf.reserve(len - self.buf.len());
        }
        while self.buf.len() < len {
            self.fill().await?;
        }

        self.pending = None;
        let mut payload = self.buf.split_to(len).to_vec();
        if let Some(key) = header.mask {
            apply_mask_fast(&mut payload, key);
        }
        Ok(payload)
    }

    /// Skip the payload of the pending frame without buffering it whole.
    ///
    /// # Errors
    ///
    /// Returns the stream error that interrupted skipping. The remaining
    /// count is kept, so a later call picks up where this one stopped.
    pub async fn discard(&mut self) -> Result<()> {
        if let Some(header) = self.pending.take() {
            self.skip += header.payload_len;
        }

        while self.skip > 0 {
            if self.buf.is_empty() {
                self.fill().await?;
            }
            let n = self.skip.min(self.buf.len());
            self.buf.advance(n);
            self.skip -= n;
        }
        Ok(())
    }

    async fn fill(&mut self) -> Result<()> {
        self.buf.reserve(self.read_buffer_size);

        let read = self.io.read_buf(&mut self.buf);
        let n = match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, read).await??,
            None => read.await?,
        };

        if n == 0 {
            return Err(Error::ConnectionClosed(None));
        }
        Ok(())
    }
}
