//! Automatic replies to control frames.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::codec::FrameReader;
use crate::connection::SocketWriter;
use crate::error::{Error, Result};
use crate::message::CloseFrame;
use crate::protocol::OpCode;

/// Answers the control frame whose header the reader just returned.
///
/// Ping is answered with a pong carrying the same payload, pong is dropped,
/// close is echoed and ends the read loop with `ConnectionClosed`.
pub(crate) struct ControlResponder<'a, W> {
    writer: &'a SocketWriter<W>,
    timeout: Duration,
}

impl<'a, W: AsyncWrite + Unpin> ControlResponder<'a, W> {
    pub(crate) fn new(writer: &'a SocketWriter<W>, timeout: Duration) -> Self {
        Self { writer, timeout }
    }

    /// Consume the pending control frame from `reader` and react to it.
    ///
    /// # Errors
    ///
    /// - `Error::ConnectionClosed(Some(code))` after a close frame
    /// - `Error::ProtocolViolation` / `Error::InvalidUtf8` for a malformed close body
    /// - I/O errors while reading the payload or writing the pong
    pub(crate) async fn handle<R>(&self, opcode: OpCode, reader: &mut FrameReader<R>) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        match opcode {
            OpCode::Ping => {
                let payload = reader.read_payload().await?;
                self.writer
                    .write_control(&payload, OpCode::Pong, self.timeout)
                    .await
            }
            OpCode::Pong => {
                reader.discard().await?;
                #[cfg(feature = "logging")]
                log::debug!("pong received");
                Ok(())
            }
            OpCode::Close => {
                let payload = reader.read_payload().await?;
                let close = CloseFrame::parse(&payload)?;

                #[cfg(feature = "logging")]
                log::debug!(
                    "close received: code={} reason={:?}",
                    close.code.as_u16(),
                    close.reason
                );

                let echo = CloseFrame::new(close.code, String::new()).to_payload();
                if let Err(_err) = self
                    .writer
                    .write_control(&echo, OpCode::Close, self.timeout)
                    .await
                {
                    #[cfg(feature = "logging")]
                    log::debug!("echoing close failed: {_err}");
                }

                Err(Error::ConnectionClosed(Some(close.code.as_u16())))
            }
            data => Err(Error::ProtocolViolation(format!(
                "{data} is not a control opcode"
            ))),
        }
    }
}
