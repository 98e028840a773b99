//! The socket and its read, write and keepalive machinery.
//!
//! ## Socket Lifecycle
//!
//! 1. **Open** - from construction until the first terminal read error
//! 2. **Closed** - every later read fails with `ConnectionClosed`
//!
//! The socket never starts a close handshake of its own. A caller that wants
//! one sends a close frame with [`Socket::write_control`] before dropping it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use wsock::{Config, Side, Socket};
//!
//! let mut socket = Socket::new(stream, Side::Acceptor, Config::default());
//! let writer = socket.writer();
//!
//! tokio::spawn(async move {
//!     writer.write_text("tick", Duration::from_secs(1)).await
//! });
//!
//! while let Ok((payload, kind)) = socket.read_message(Duration::ZERO).await {
//!     println!("{kind}: {} bytes", payload.len());
//! }
//! ```

mod capability;
mod control;
mod keepalive;
mod side;
mod socket;
mod state;
mod writer;

pub use capability::HostSocket;
pub use side::Side;
pub use socket::Socket;
pub use state::SocketState;
pub use writer::SocketWriter;
