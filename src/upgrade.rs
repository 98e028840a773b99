//! Turning an upgraded HTTP request into an acceptor [`Socket`].
//!
//! The HTTP side (header checks, the 101 response, sub-protocol selection)
//! belongs to an external collaborator behind [`HttpUpgrade`]. The
//! [`Upgrader`] only hands it the request and wraps whatever stream comes
//! back.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use http::Request;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::Config;
use crate::connection::{Side, Socket};
use crate::error::{Error, Result};

/// Stream and negotiated details produced by a successful upgrade.
#[derive(Debug)]
pub struct Upgraded<T> {
    /// The raw duplex stream, positioned after the HTTP exchange.
    pub io: T,
    /// The sub-protocol agreed on during the upgrade, if any.
    pub protocol: Option<String>,
}

impl<T> Upgraded<T> {
    /// An upgrade without a sub-protocol.
    pub fn new(io: T) -> Self {
        Self { io, protocol: None }
    }

    /// Record the negotiated sub-protocol.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }
}

/// Performs the HTTP side of a WebSocket upgrade.
///
/// `Sink` is whatever the server framework uses to answer the request (a
/// response writer, a hijack handle). On success the returned stream has the
/// handshake behind it and is ready for frames.
pub trait HttpUpgrade {
    /// The upgraded stream.
    type Io: AsyncRead + AsyncWrite + Send + 'static;
    /// Response channel handed through from the caller.
    type Sink;
    /// Failure reported by the collaborator.
    type Error: Display;

    /// Complete the upgrade of `request`, answering through `sink`.
    fn upgrade(
        &self,
        request: &Request<()>,
        sink: Self::Sink,
    ) -> impl Future<Output = std::result::Result<Upgraded<Self::Io>, Self::Error>> + Send;
}

/// Builds acceptor sockets from upgradable HTTP requests.
///
/// ## Example
///
/// ```rust,ignore
/// use wsock::Upgrader;
///
/// let upgrader = Upgrader::new(my_http_upgrade);
/// let mut socket = upgrader.upgrade(request, response_writer).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Upgrader<U> {
    inner: U,
    config: Config,
}

impl<U: HttpUpgrade> Upgrader<U> {
    /// Wrap a collaborator. Sockets get the default keepalive of 15 seconds.
    pub fn new(inner: U) -> Self {
        Self {
            inner,
            config: Config::default(),
        }
    }

    /// Set the keepalive of produced sockets; zero disables it.
    #[must_use]
    pub fn with_keepalive(mut self, keepalive: Duration) -> Self {
        self.config = self.config.with_keepalive(keepalive);
        self
    }

    /// Use `config` for produced sockets.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Configuration applied to produced sockets.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Upgrade `request` and wrap the resulting stream in an acceptor socket.
    ///
    /// The socket keeps `request` and the negotiated sub-protocol. No frames
    /// are exchanged here.
    ///
    /// # Errors
    ///
    /// Returns `Error::UpgradeFailed` carrying the collaborator's message if
    /// the upgrade fails; no socket is created then.
    pub async fn upgrade(&self, request: Request<()>, sink: U::Sink) -> Result<Socket<U::Io>> {
        match self.inner.upgrade(&request, sink).await {
            Ok(upgraded) => Ok(Socket::new(upgraded.io, Side::Acceptor, self.config.clone())
                .with_request(request)
                .with_protocol(upgraded.protocol)),
            Err(err) => {
                #[cfg(feature = "logging")]
                log::error!("upgrading {}: {}", request.uri(), err);
                Err(Error::UpgradeFailed(err.to_string()))
            }
        }
    }
}
