//! Which end of the connection a socket is.

/// Role a socket plays on its connection, fixed at construction.
///
/// The side decides masking for the whole connection lifetime: the initiator
/// masks every frame it sends, the acceptor never does, and each expects the
/// opposite from its peer (RFC 6455 Section 5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The end that started the upgrade (client).
    Initiator,
    /// The end that accepted the upgrade (server).
    Acceptor,
}

impl Side {
    /// Whether frames sent from this side are masked.
    #[inline]
    #[must_use]
    pub const fn must_mask(&self) -> bool {
        matches!(self, Side::Initiator)
    }

    /// Whether frames received on this side must be masked.
    #[inline]
    #[must_use]
    pub const fn expects_masked(&self) -> bool {
        matches!(self, Side::Acceptor)
    }

    /// The side of the peer.
    #[inline]
    #[must_use]
    pub const fn peer(&self) -> Side {
        match self {
            Side::Initiator => Side::Acceptor,
            Side::Acceptor => Side::Initiator,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Initiator => f.write_str("initiator"),
            Side::Acceptor => f.write_str("acceptor"),
        }
    }
}
