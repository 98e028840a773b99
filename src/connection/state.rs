//! Socket lifecycle state.

/// Lifecycle state of a [`Socket`](crate::Socket).
///
/// A socket starts `Open` and moves to `Closed` on the first terminal read
/// error. There is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SocketState {
    /// Reads and writes are possible.
    #[default]
    Open,
    /// The read loop has terminated. Carries the close code if the peer sent
    /// a close frame, `None` for end of stream or any other terminal error.
    Closed(Option<u16>),
}

impl SocketState {
    /// Check if the socket can still be read.
    #[must_use]
    #[inline]
    pub const fn is_open(&self) -> bool {
        matches!(self, SocketState::Open)
    }

    /// Close code carried by a closed socket.
    #[must_use]
    #[inline]
    pub const fn close_code(&self) -> Option<u16> {
        match self {
            SocketState::Closed(code) => *code,
            SocketState::Open => None,
        }
    }
}

impl std::fmt::Display for SocketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SocketState::Open => write!(f, "Open"),
            SocketState::Closed(Some(code)) => write!(f, "Closed ({code})"),
            SocketState::Closed(None) => write!(f, "Closed"),
        }
    }
}
