//! Header checks applied to every incoming frame.
//!
//! - Masking rules per RFC 6455 Section 5.1
//! - RSV bits, since no extension is ever negotiated
//! - Control frame constraints per Section 5.5
//! - Frame size limits

use crate::config::Limits;
use crate::connection::Side;
use crate::error::{Error, Result};
use crate::protocol::FrameHeader;
use crate::protocol::frame::MAX_CONTROL_FRAME_PAYLOAD;

/// Validator for incoming frame headers, bound to the receiving side.
#[derive(Debug, Clone)]
pub struct FrameValidator {
    side: Side,
    limits: Limits,
    accept_unmasked_frames: bool,
}

impl FrameValidator {
    /// Create a validator for frames received on `side`.
    #[must_use]
    pub fn new(side: Side, limits: Limits) -> Self {
        Self {
            side,
            limits,
            accept_unmasked_frames: false,
        }
    }

    /// Let an acceptor take unmasked frames (non-RFC compliant).
    #[must_use]
    pub fn with_accept_unmasked(mut self, accept: bool) -> Self {
        self.accept_unmasked_frames = accept;
        self
    }

    /// Validate a freshly decoded header before its payload is read.
    ///
    /// Checks run in order: masking, RSV bits, control constraints, size.
    ///
    /// # Errors
    ///
    /// - `Error::UnmaskedFrame` / `Error::MaskedFrame` on a masking violation
    /// - `Error::ReservedBitsSet` if any RSV bit is set
    /// - `Error::FragmentedControlFrame` / `Error::ControlFrameTooLarge`
    /// - `Error::FrameTooLarge` if the payload exceeds the limit
    pub fn validate(&self, header: &FrameHeader) -> Result<()> {
        self.validate_masking(header.mask.is_some())?;

        if header.has_rsv() {
            return Err(Error::ReservedBitsSet);
        }

        if header.is_control() {
            if !header.fin {
                return Err(Error::FragmentedControlFrame);
            }
            if header.payload_len > MAX_CONTROL_FRAME_PAYLOAD {
                return Err(Error::ControlFrameTooLarge(header.payload_len));
            }
        }

        self.limits.check_frame_size(header.payload_len)
    }

    fn validate_masking(&self, masked: bool) -> Result<()> {
        match self.side {
            Side::Acceptor if !masked && !self.accept_unmasked_frames => Err(Error::UnmaskedFrame),
            Side::Initiator if masked => Err(Error::MaskedFrame),
            _ => Ok(()),
        }
    }
}
