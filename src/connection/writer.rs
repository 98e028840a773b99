use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::io::AsyncWrite;
use tokio::sync::Mutex;

use crate::codec::FrameWriter;
use crate::error::{Error, Result};
use crate::protocol::{MAX_CONTROL_FRAME_PAYLOAD, OpCode};

/// Cloneable handle to a socket's write path.
///
/// Every clone shares one lock around the frame writer, so frames written
/// from different tasks never interleave on the wire. Keepalive pings and
/// control replies go through the same lock.
#[derive(Debug)]
pub struct SocketWriter<W> {
    inner: Arc<Mutex<Shared<W>>>,
}

#[derive(Debug)]
struct Shared<W> {
    frames: FrameWriter<W>,
    // set while a frame is being written, kept if the write did not finish
    closed: bool,
}

impl<W> Clone for SocketWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W> SocketWriter<W> {
    /// Wrap a frame writer.
    #[must_use]
    pub fn new(frames: FrameWriter<W>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Shared {
                frames,
                closed: false,
            })),
        }
    }

    /// Whether an earlier write failed and the write path is unusable.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.closed
    }

    /// Recover the stream if this is the last handle.
    pub fn into_inner(self) -> Option<W> {
        let shared = Arc::try_unwrap(self.inner).ok()?.into_inner();
        Some(shared.frames.into_inner())
    }

    /// A handle that does not keep the write path alive.
    pub(crate) fn downgrade(&self) -> WeakWriter<W> {
        WeakWriter {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Non-owning counterpart of [`SocketWriter`], so background tasks do not
/// block [`SocketWriter::into_inner`].
#[derive(Debug)]
pub(crate) struct WeakWriter<W> {
    inner: Weak<Mutex<Shared<W>>>,
}

impl<W> WeakWriter<W> {
    pub(crate) fn upgrade(&self) -> Option<SocketWriter<W>> {
        self.inner.upgrade().map(|inner| SocketWriter { inner })
    }
}

impl<W: AsyncWrite + Unpin> SocketWriter<W> {
    /// Write `body` as one binary frame.
    ///
    /// A zero `timeout` waits indefinitely.
    ///
    /// # Errors
    ///
    /// - `Error::Timeout` if the write does not finish in time
    /// - `Error::Io` if the stream fails
    /// - `Error::ConnectionClosed(None)` after an earlier failed write
    pub async fn write_binary(&self, body: &[u8], timeout: Duration) -> Result<()> {
        self.write_frame(OpCode::Binary, body, timeout).await
    }

    /// Write `body` as one text frame.
    ///
    /// # Errors
    ///
    /// Same as [`write_binary`](Self::write_binary).
    pub async fn write_text(&self, body: &str, timeout: Duration) -> Result<()> {
        self.write_frame(OpCode::Text, body.as_bytes(), timeout).await
    }

    /// Write a control frame (close, ping or pong).
    ///
    /// # Errors
    ///
    /// - `Error::ProtocolViolation` if `opcode` is not a control opcode
    /// - `Error::ControlFrameTooLarge` if `body` exceeds 125 bytes; nothing is
    ///   written in either case
    /// - otherwise as [`write_binary`](Self::write_binary)
    pub async fn write_control(&self, body: &[u8], opcode: OpCode, timeout: Duration) -> Result<()> {
        if !opcode.is_control() {
            return Err(Error::ProtocolViolation(format!(
                "{opcode} is not a control opcode"
            )));
        }
        self.write_frame(opcode, body, timeout).await
    }

    async fn write_frame(&self, opcode: OpCode, payload: &[u8], timeout: Duration) -> Result<()> {
        if opcode.is_control() && payload.len() > MAX_CONTROL_FRAME_PAYLOAD {
            return Err(Error::ControlFrameTooLarge(payload.len()));
        }

        let mut shared = self.inner.lock().await;
        if shared.closed {
            return Err(Error::ConnectionClosed(None));
        }

        // stays set if this future is dropped mid-frame
        shared.closed = true;
        let write = shared.frames.write_frame(true, opcode, payload);
        let result = if timeout.is_zero() {
            write.await
        } else {
            tokio::time::timeout(timeout, write)
                .await
                .unwrap_or(Err(Error::Timeout))
        };

        shared.closed = result.is_err();
        result
    }
}
