use std::future::Future;
use std::time::Duration;

use http::Request;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::connection::Socket;
use crate::error::Result;
use crate::message::MessageKind;

/// What a host environment needs from an upgraded WebSocket.
///
/// Code that only moves messages (a bridge to a scripting runtime, a proxy)
/// can be written against this trait instead of a concrete [`Socket`].
pub trait HostSocket: Send {
    /// The raw stream the socket runs over.
    type Stream;

    /// The upgraded HTTP request, if any.
    fn request(&self) -> Option<&Request<()>>;

    /// Read the next text or binary message.
    fn read_message(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Vec<u8>, MessageKind)>> + Send;

    /// Write one binary frame.
    fn write_binary(&self, body: &[u8], timeout: Duration)
    -> impl Future<Output = Result<()>> + Send;

    /// Write one text frame.
    fn write_text(&self, body: &str, timeout: Duration) -> impl Future<Output = Result<()>> + Send;

    /// Give up the socket and take back the raw stream.
    ///
    /// Returns `None` while another handle still shares the write path, such
    /// as a [`SocketWriter`](crate::SocketWriter) clone or a keepalive ping in
    /// flight. Bytes read but not yet decoded are lost.
    fn into_inner(self) -> Option<Self::Stream>
    where
        Self: Sized;
}

impl<S> HostSocket for Socket<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    type Stream = S;

    fn request(&self) -> Option<&Request<()>> {
        Socket::request(self)
    }

    fn read_message(
        &mut self,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Vec<u8>, MessageKind)>> + Send {
        Socket::read_message(self, timeout)
    }

    fn write_binary(&self, body: &[u8], timeout: Duration) -> impl Future<Output = Result<()>> + Send {
        self.writer.write_binary(body, timeout)
    }

    fn write_text(&self, body: &str, timeout: Duration) -> impl Future<Output = Result<()>> + Send {
        self.writer.write_text(body, timeout)
    }

    fn into_inner(self) -> Option<S> {
        Socket::into_inner(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::connection::Side;
    use std::cell::Cell;
    use std::io;
    use std::marker::PhantomData;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, ReadBuf};

    /// A stream that may move between threads but not be shared by them.
    struct Unshared {
        io: DuplexStream,
        _not_sync: PhantomData<Cell<()>>,
    }

    impl Unshared {
        fn new(io: DuplexStream) -> Self {
            Self {
                io,
                _not_sync: PhantomData,
            }
        }
    }

    impl AsyncRead for Unshared {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Pin::new(&mut self.io).poll_read(cx, buf)
        }
    }

    impl AsyncWrite for Unshared {
        fn poll_write(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Pin::new(&mut self.io).poll_write(cx, buf)
        }

        fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Pin::new(&mut self.io).poll_flush(cx)
        }

        fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Pin::new(&mut self.io).poll_shutdown(cx)
        }
    }

    async fn echo_once<H: HostSocket>(host: &mut H) -> Result<()> {
        let (payload, kind) = host.read_message(Duration::ZERO).await?;
        match kind {
            MessageKind::Text => {
                let text = String::from_utf8(payload).unwrap();
                host.write_text(&text, Duration::ZERO).await
            }
            MessageKind::Binary => host.write_binary(&payload, Duration::ZERO).await,
        }
    }

    fn quiet() -> Config {
        Config::default().with_keepalive(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_generic_echo() {
        let (io, mut peer) = tokio::io::duplex(256);
        let mut socket = Socket::new(io, Side::Initiator, quiet());

        peer.write_all(&[0x82, 0x02, 9, 8]).await.unwrap();
        echo_once(&mut socket).await.unwrap();
        assert!(HostSocket::request(&socket).is_none());

        // initiator masks: 2 header + 4 key + 2 payload
        let mut wire = [0u8; 8];
        peer.read_exact(&mut wire).await.unwrap();
        assert_eq!(&wire[..2], &[0x82, 0x82]);
        let key = [wire[2], wire[3], wire[4], wire[5]];
        assert_eq!([wire[6] ^ key[0], wire[7] ^ key[1]], [9, 8]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stream_without_sync_runs_on_spawned_task() {
        let (io, mut peer) = tokio::io::duplex(256);
        let mut socket = Socket::new(Unshared::new(io), Side::Initiator, quiet());

        let host = tokio::spawn(async move {
            echo_once(&mut socket).await?;
            echo_once(&mut socket).await?;
            Ok::<_, crate::Error>(socket)
        });

        peer.write_all(&[0x81, 0x02, b'h', b'i']).await.unwrap();
        peer.write_all(&[0x82, 0x01, 7]).await.unwrap();

        let socket = host.await.unwrap().unwrap();
        let stream = HostSocket::into_inner(socket).unwrap();
        drop(stream);

        // text echo (2 + 4 + 2) then binary echo (2 + 4 + 1)
        let mut wire = Vec::new();
        peer.read_to_end(&mut wire).await.unwrap();
        assert_eq!(wire.len(), 15);
        assert_eq!(wire[0], 0x81);
        assert_eq!(wire[8], 0x82);
    }

    #[tokio::test]
    async fn test_into_inner_blocked_by_writer_handle() {
        let (io, _peer) = tokio::io::duplex(64);
        let socket = Socket::new(io, Side::Acceptor, quiet());
        let _writer = socket.writer();
        assert!(HostSocket::into_inner(socket).is_none());
    }

    #[tokio::test]
    async fn test_into_inner_after_reads_with_keepalive() {
        let (io, mut peer) = tokio::io::duplex(64);
        let mut socket = Socket::new(io, Side::Acceptor, Config::default());

        // masked "a" with a zero key
        peer.write_all(&[0x81, 0x81, 0, 0, 0, 0, b'a']).await.unwrap();
        let (payload, _) = socket.read_message(Duration::ZERO).await.unwrap();
        assert_eq!(payload, b"a");

        // the idle timer task does not pin the stream
        let mut stream = HostSocket::into_inner(socket).unwrap();
        stream.write_all(b"raw").await.unwrap();
        let mut buf = [0u8; 3];
        peer.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"raw");
    }
}
