//! # wsock - Connection-level WebSocket sockets
//!
//! `wsock` takes a byte stream that has already been through the HTTP upgrade
//! and speaks RFC 6455 framing over it.
//!
//! ## Features
//!
//! - **Message reads** that reassemble fragments and validate UTF-8 text
//! - **Automatic control replies**: ping is answered with pong, close is echoed
//! - **Idle keepalive**: a ping goes out when nothing has been read for a while
//! - **Serialized writes** from any number of tasks, one whole frame at a time
//! - **Upgrade adapter** that wraps the stream of an external HTTP upgrade
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use wsock::{Config, Side, Socket};
//!
//! let mut socket = Socket::new(stream, Side::Acceptor, Config::default());
//! loop {
//!     let (payload, kind) = socket.read_message(Duration::ZERO).await?;
//!     socket.write_binary(&payload, Duration::from_secs(5)).await?;
//! }
//! ```

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod message;
pub mod protocol;
pub mod upgrade;

pub use config::{Config, DEFAULT_KEEPALIVE, Limits};
pub use connection::{HostSocket, Side, Socket, SocketState, SocketWriter};
pub use error::{Error, ErrorKind, Result};
pub use message::{CloseCode, CloseFrame, MessageKind};
pub use protocol::OpCode;
pub use upgrade::{HttpUpgrade, Upgraded, Upgrader};
