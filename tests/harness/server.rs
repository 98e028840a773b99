//! Echo server over TCP for concurrency testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use wsock::{Config, MessageKind, Side, Socket};

/// Accepts TCP connections and echoes every message back on an acceptor
/// socket. The HTTP upgrade is skipped; both ends start framing right away.
pub struct TestServer {
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> (Self, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(echo(stream));
            }
        });

        (Self { handle }, addr)
    }

    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}

async fn echo(stream: TcpStream) {
    let config = Config::default().with_keepalive(Duration::ZERO);
    let mut socket = Socket::new(stream, Side::Acceptor, config);

    while let Ok((payload, kind)) = socket.read_message(Duration::ZERO).await {
        let written = match kind {
            MessageKind::Text => match String::from_utf8(payload) {
                Ok(text) => socket.write_text(&text, Duration::ZERO).await,
                Err(_) => break,
            },
            MessageKind::Binary => socket.write_binary(&payload, Duration::ZERO).await,
        };
        if written.is_err() {
            break;
        }
    }
}

/// Initiator socket connected to `addr`.
pub async fn connect(addr: SocketAddr) -> Socket<TcpStream> {
    let stream = TcpStream::connect(addr).await.unwrap();
    let config = Config::default().with_keepalive(Duration::ZERO);
    Socket::new(stream, Side::Initiator, config)
}
