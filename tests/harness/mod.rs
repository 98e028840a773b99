//! Test harness utilities for socket integration tests.
//!
//! [`Peer`] plays the remote end of a connection at the byte level, so tests
//! can send exactly the frames they want and inspect exactly what the socket
//! wrote. [`TestServer`] runs acceptor sockets over real TCP.

#![allow(dead_code)]

mod peer;
mod server;

use std::time::Duration;

use tokio::io::DuplexStream;
use wsock::{Config, Side, Socket};

pub use peer::{Peer, encode_frame};
pub use server::{TestServer, connect};

/// Socket on `side` wired to a raw peer over an in-memory pipe.
pub fn pair(side: Side, config: Config) -> (Socket<DuplexStream>, Peer) {
    let (io, remote) = tokio::io::duplex(1 << 16);
    let peer = Peer::new(remote, side == Side::Acceptor);
    (Socket::new(io, side, config), peer)
}

/// Acceptor socket with keepalive disabled.
pub fn quiet_acceptor() -> (Socket<DuplexStream>, Peer) {
    pair(Side::Acceptor, Config::default().with_keepalive(Duration::ZERO))
}
