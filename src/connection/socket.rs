use std::future::Future;
use std::time::Duration;

use http::Request;
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::time::Instant;

use crate::codec::{FrameReader, FrameWriter};
use crate::config::Config;
use crate::connection::control::ControlResponder;
use crate::connection::keepalive::IdleTimer;
use crate::connection::{Side, SocketState, SocketWriter};
use crate::error::{Error, Result};
use crate::message::MessageKind;
use crate::protocol::{Frame, FrameHeader, MessageAssembler, OpCode};

/// A WebSocket connection over an established byte stream.
///
/// The socket owns the stream and never shuts it down; use
/// [`into_inner`](Self::into_inner) to take it back. Reads go through
/// [`read_message`](Self::read_message), which answers control frames on its
/// own and pings the peer when the connection sits idle. Writes can come from
/// any task through cloned [`SocketWriter`] handles.
///
/// ## Example
///
/// ```rust,ignore
/// use std::future::Future;
/// use std::time::Duration;
/// use wsock::{Config, Side, Socket};
///
/// let stream = tokio::net::TcpStream::connect("example.com:80").await?;
/// // ... HTTP upgrade already done ...
/// let mut socket = Socket::new(stream, Side::Initiator, Config::default());
///
/// socket.write_text("hello", Duration::from_secs(5)).await?;
/// let (payload, kind) = socket.read_message(Duration::ZERO).await?;
/// ```
#[derive(Debug)]
pub struct Socket<S> {
    reader: FrameReader<ReadHalf<S>>,
    pub(crate) writer: SocketWriter<WriteHalf<S>>,
    assembler: MessageAssembler,
    side: Side,
    keepalive: Duration,
    idle: Option<IdleTimer>,
    state: SocketState,
    request: Option<Request<()>>,
    protocol: Option<String>,
}

impl<S: AsyncRead + AsyncWrite> Socket<S> {
    /// Wrap an already upgraded stream.
    ///
    /// No bytes are exchanged. `config.keepalive` of zero disables the idle
    /// ping.
    pub fn new(io: S, side: Side, config: Config) -> Self {
        let (read, write) = tokio::io::split(io);
        Self {
            reader: FrameReader::new(read, side, &config),
            writer: SocketWriter::new(FrameWriter::new(write, side, &config)),
            assembler: MessageAssembler::new(config.limits.clone()),
            side,
            keepalive: config.keepalive,
            idle: None,
            state: SocketState::Open,
            request: None,
            protocol: None,
        }
    }
}

impl<S> Socket<S> {
    /// Attach the HTTP request that was upgraded.
    #[must_use]
    pub fn with_request(mut self, request: Request<()>) -> Self {
        self.request = Some(request);
        self
    }

    /// Record the negotiated sub-protocol.
    #[must_use]
    pub fn with_protocol(mut self, protocol: Option<String>) -> Self {
        self.protocol = protocol;
        self
    }

    /// The upgraded request, if the socket came from an upgrade.
    #[must_use]
    pub fn request(&self) -> Option<&Request<()>> {
        self.request.as_ref()
    }

    /// The negotiated sub-protocol.
    #[must_use]
    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    /// Which end of the connection this socket is.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Idle period after which a ping is sent; zero when disabled.
    #[must_use]
    pub fn keepalive(&self) -> Duration {
        self.keepalive
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SocketState {
        self.state
    }

    /// A handle for writing from other tasks.
    #[must_use]
    pub fn writer(&self) -> SocketWriter<WriteHalf<S>> {
        self.writer.clone()
    }

    /// Take the stream back.
    ///
    /// Returns `None` while any [`SocketWriter`] handle is still alive, or
    /// while a keepalive ping is being written. Bytes the reader had buffered
    /// are lost.
    pub fn into_inner(self) -> Option<S>
    where
        S: Unpin,
    {
        let write = self.writer.into_inner()?;
        Some(self.reader.into_inner().unsplit(write))
    }
}

impl<S> Socket<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Read the next text or binary message.
    ///
    /// Control frames are handled on the way: pings get a pong, pongs are
    /// dropped, a close frame is echoed and ends the socket. Frames with a
    /// reserved opcode are skipped. If `keepalive` is set and no frame header
    /// arrives within it, an empty ping is sent.
    ///
    /// A non-zero `timeout` bounds each wait for a frame; zero waits forever.
    ///
    /// # Errors
    ///
    /// - `Error::Timeout` if no frame header arrived in time; the socket stays
    ///   usable
    /// - `Error::ConnectionClosed(Some(code))` once the peer sent a close frame,
    ///   `Error::ConnectionClosed(None)` at end of stream or after any other
    ///   terminal error
    /// - protocol errors for malformed frames, masking violations, invalid
    ///   UTF-8 or exceeded limits
    /// - `Error::Io` if the stream fails
    ///
    /// Every error except a header `Timeout` closes the socket, and every
    /// later call fails with `ConnectionClosed`. So does dropping this future
    /// after it started on a frame payload or a fragmented message.
    pub async fn read_message(&mut self, timeout: Duration) -> Result<(Vec<u8>, MessageKind)> {
        if let SocketState::Closed(code) = self.state {
            return Err(Error::ConnectionClosed(code));
        }
        if !self.between_frames() {
            // an earlier read was dropped inside a frame or message
            #[cfg(feature = "logging")]
            log::debug!("read interrupted mid-frame, closing socket");
            self.close(None);
            return Err(Error::ConnectionClosed(None));
        }

        let result = self.next_message(timeout).await;
        if let Err(err) = &result {
            if !(err.is_timeout() && self.between_frames()) {
                self.close(match err {
                    Error::ConnectionClosed(code) => *code,
                    _ => None,
                });
            }
        }
        result
    }

    /// Write `body` as one binary frame. A zero `timeout` waits forever.
    ///
    /// # Errors
    ///
    /// See [`SocketWriter::write_binary`].
    pub fn write_binary<'a>(
        &'a self,
        body: &'a [u8],
        timeout: Duration,
    ) -> impl Future<Output = Result<()>> + Send + 'a {
        self.writer.write_binary(body, timeout)
    }

    /// Write `body` as one text frame. A zero `timeout` waits forever.
    ///
    /// # Errors
    ///
    /// See [`SocketWriter::write_text`].
    pub fn write_text<'a>(
        &'a self,
        body: &'a str,
        timeout: Duration,
    ) -> impl Future<Output = Result<()>> + Send + 'a {
        self.writer.write_text(body, timeout)
    }

    /// Write a close, ping or pong frame. A zero `timeout` waits forever.
    ///
    /// # Errors
    ///
    /// See [`SocketWriter::write_control`].
    pub fn write_control<'a>(
        &'a self,
        body: &'a [u8],
        opcode: OpCode,
        timeout: Duration,
    ) -> impl Future<Output = Result<()>> + Send + 'a {
        self.writer.write_control(body, opcode, timeout)
    }

    // Nothing of a frame or message has been consumed yet.
    fn between_frames(&self) -> bool {
        self.reader.pending().is_none() && !self.assembler.is_assembling()
    }

    fn close(&mut self, code: Option<u16>) {
        self.state = SocketState::Closed(code);
        self.assembler.reset();
    }

    async fn next_message(&mut self, timeout: Duration) -> Result<(Vec<u8>, MessageKind)> {
        loop {
            let header = self.next_header(timeout).await?;
            match header.opcode() {
                Ok(opcode) if opcode.is_control() => self.respond(opcode, timeout).await?,
                Ok(opcode) => return self.read_data(header, opcode, timeout).await,
                Err(Error::ReservedOpcode(raw)) => self.skip_reserved(raw).await?,
                Err(e) => return Err(e),
            }
        }
    }

    async fn read_data(
        &mut self,
        mut header: FrameHeader,
        mut opcode: OpCode,
        timeout: Duration,
    ) -> Result<(Vec<u8>, MessageKind)> {
        loop {
            let payload = self.reader.read_payload().await?;
            if let Some(message) = self.assembler.push(Frame::new(header.fin, opcode, payload))? {
                return Ok((message.payload, message.kind));
            }

            // control frames may sit between fragments
            loop {
                header = self.next_header(timeout).await?;
                match header.opcode() {
                    Ok(op) if op.is_control() => self.respond(op, timeout).await?,
                    Ok(op) => {
                        opcode = op;
                        break;
                    }
                    Err(Error::ReservedOpcode(raw)) => self.skip_reserved(raw).await?,
                    Err(e) => return Err(e),
                }
            }
        }
    }

    async fn next_header(&mut self, timeout: Duration) -> Result<FrameHeader> {
        let deadline = (!timeout.is_zero()).then(|| Instant::now() + timeout);
        self.reader.set_deadline(deadline);

        if self.idle.is_none() && !self.keepalive.is_zero() {
            self.idle = Some(IdleTimer::spawn(self.writer.downgrade(), self.keepalive));
        }
        let _armed = self.idle.as_ref().map(IdleTimer::arm);
        self.reader.next_header().await
    }

    async fn respond(&mut self, opcode: OpCode, timeout: Duration) -> Result<()> {
        ControlResponder::new(&self.writer, timeout)
            .handle(opcode, &mut self.reader)
            .await
    }

    async fn skip_reserved(&mut self, _raw: u8) -> Result<()> {
        #[cfg(feature = "logging")]
        log::debug!("discarding frame with reserved opcode {_raw:#x}");
        self.reader.discard().await
    }
}
