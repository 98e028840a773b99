//! Error types for the socket core.
//!
//! Every failure is surfaced to the caller of the operation that hit it; nothing
//! in this crate retries. [`Error::kind`] groups the variants into the four
//! categories callers usually branch on.

use thiserror::Error;

/// Result type alias for socket operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The HTTP upgrade collaborator rejected or could not finish the upgrade.
    Upgrade,
    /// The peer closed the connection or the stream reached end-of-input.
    Closed,
    /// The peer violated the framing protocol.
    Protocol,
    /// Transport failure or an elapsed deadline.
    Io,
}

/// Errors that can occur on a WebSocket socket.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The upgrade collaborator failed; carries its message verbatim.
    #[error("Upgrade failed: {0}")]
    UpgradeFailed(String),

    /// Connection has been closed.
    ///
    /// `None` means the stream ended without a close frame, `Some(code)` carries
    /// the status code of the peer's close frame (1005 if it had none).
    #[error("Connection closed: {0:?}")]
    ConnectionClosed(Option<u16>),

    /// Protocol violation detected.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Invalid UTF-8 in text frame.
    #[error("Invalid UTF-8 in text frame")]
    InvalidUtf8,

    /// Frame size exceeds configured maximum.
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge {
        /// Actual frame size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Message size exceeds configured maximum.
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge {
        /// Actual message size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Too many fragments in a single message.
    #[error("Too many fragments: {count} (max: {max})")]
    TooManyFragments {
        /// Actual fragment count.
        count: usize,
        /// Maximum allowed fragments.
        max: usize,
    },

    /// Payload length does not fit in `usize` on this platform.
    #[error("Payload too large for platform: {size} bytes (max: {max})")]
    PayloadTooLargeForPlatform {
        /// Declared payload length.
        size: u64,
        /// Largest representable length.
        max: u64,
    },

    /// Reserved opcode used.
    #[error("Reserved opcode: {0:#x}")]
    ReservedOpcode(u8),

    /// Invalid opcode value.
    #[error("Invalid opcode: {0:#x}")]
    InvalidOpcode(u8),

    /// Control frame fragmented (RFC violation).
    #[error("Control frames cannot be fragmented")]
    FragmentedControlFrame,

    /// Control frame payload too large (>125 bytes).
    #[error("Control frame payload too large: {0} bytes (max: 125)")]
    ControlFrameTooLarge(usize),

    /// Acceptor received an unmasked frame.
    #[error("Frames from the initiator must be masked")]
    UnmaskedFrame,

    /// Initiator received a masked frame.
    #[error("Frames from the acceptor must not be masked")]
    MaskedFrame,

    /// Reserved bits set without extension.
    #[error("Reserved bits set without negotiated extension")]
    ReservedBitsSet,

    /// Incomplete frame data.
    #[error("Incomplete frame: need {needed} more bytes")]
    IncompleteFrame {
        /// Number of additional bytes needed.
        needed: usize,
    },

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// A read or write deadline elapsed.
    #[error("I/O deadline exceeded")]
    Timeout,
}

impl Error {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::UpgradeFailed(_) => ErrorKind::Upgrade,
            Error::ConnectionClosed(_) => ErrorKind::Closed,
            Error::Io(_) | Error::Timeout => ErrorKind::Io,
            _ => ErrorKind::Protocol,
        }
    }

    /// Whether this error is an elapsed deadline.
    #[inline]
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => Error::Timeout,
            std::io::ErrorKind::UnexpectedEof => Error::ConnectionClosed(None),
            _ => Error::Io(err.to_string()),
        }
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Error::Timeout
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FrameTooLarge {
            size: 20_000_000,
            max: 16_000_000,
        };
        assert_eq!(
            err.to_string(),
            "Frame too large: 20000000 bytes (max: 16000000)"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_error_from_io_timeout() {
        let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "deadline");
        let err: Error = io_err.into();
        assert!(err.is_timeout());
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_error_from_unexpected_eof() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = io_err.into();
        assert_eq!(err, Error::ConnectionClosed(None));
        assert_eq!(err.kind(), ErrorKind::Closed);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::UpgradeFailed("nope".into()).kind(), ErrorKind::Upgrade);
        assert_eq!(Error::InvalidUtf8.kind(), ErrorKind::Protocol);
        assert_eq!(Error::UnmaskedFrame.kind(), ErrorKind::Protocol);
        assert_eq!(
            Error::ProtocolViolation("x".into()).kind(),
            ErrorKind::Protocol
        );
        assert_eq!(Error::ConnectionClosed(Some(1000)).kind(), ErrorKind::Closed);
    }

    #[test]
    fn test_error_clone() {
        let err = Error::InvalidUtf8;
        let cloned = err.clone();
        assert_eq!(err, cloned);
    }
}
