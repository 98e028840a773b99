//! Frame opcodes (RFC 6455 Section 5.2).

use crate::error::{Error, Result};

/// Bit that marks an opcode as a control opcode, reserved ones included.
const CONTROL_BIT: u8 = 0x8;

/// WebSocket frame opcode.
///
/// Only the six opcodes defined by RFC 6455 are representable. The remaining
/// values of the 4-bit field are reserved; the reader reports them through
/// [`FrameHeader::opcode`](crate::protocol::FrameHeader::opcode) and skips
/// such frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Continuation of a fragmented message (0x0).
    Continuation = 0x0,
    /// Text frame (0x1); payload must be valid UTF-8.
    Text = 0x1,
    /// Binary frame (0x2).
    Binary = 0x2,
    /// Close frame (0x8); may carry a status code and reason.
    Close = 0x8,
    /// Ping frame (0x9); the receiver answers with a pong.
    Ping = 0x9,
    /// Pong frame (0xA).
    Pong = 0xA,
}

impl OpCode {
    /// Create an opcode from the low four bits of a frame's first byte.
    ///
    /// # Errors
    ///
    /// Returns `Error::ReservedOpcode` for the reserved values 0x3-0x7 and
    /// 0xB-0xF, and `Error::InvalidOpcode` for anything wider than four bits.
    pub fn from_u8(byte: u8) -> Result<Self> {
        match byte {
            0x0 => Ok(OpCode::Continuation),
            0x1 => Ok(OpCode::Text),
            0x2 => Ok(OpCode::Binary),
            0x8 => Ok(OpCode::Close),
            0x9 => Ok(OpCode::Ping),
            0xA => Ok(OpCode::Pong),
            0x3..=0x7 | 0xB..=0xF => Err(Error::ReservedOpcode(byte)),
            _ => Err(Error::InvalidOpcode(byte)),
        }
    }

    /// Raw 4-bit value.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Close, Ping or Pong.
    #[inline]
    #[must_use]
    pub const fn is_control(self) -> bool {
        is_control_bits(self as u8)
    }

    /// Get human-readable name for this opcode.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            OpCode::Continuation => "Continuation",
            OpCode::Text => "Text",
            OpCode::Binary => "Binary",
            OpCode::Close => "Close",
            OpCode::Ping => "Ping",
            OpCode::Pong => "Pong",
        }
    }
}

/// Whether a raw opcode falls in the control range (0x8-0xF).
#[inline]
pub(crate) const fn is_control_bits(raw: u8) -> bool {
    raw & CONTROL_BIT != 0
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
