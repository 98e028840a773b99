//! Reassembly of fragmented data messages (RFC 6455 Section 5.4).

use bytes::BytesMut;

use crate::config::Limits;
use crate::error::{Error, Result};
use crate::message::MessageKind;
use crate::protocol::utf8::Utf8Validator;
use crate::protocol::{Frame, OpCode};

/// Collects data frames until one carries FIN.
///
/// Control frames never reach the assembler; the socket answers them between
/// fragments.
#[derive(Debug)]
pub struct MessageAssembler {
    buffer: BytesMut,
    fragment_count: usize,
    kind: Option<MessageKind>,
    utf8_validator: Option<Utf8Validator>,
    limits: Limits,
}

impl MessageAssembler {
    /// Create an empty assembler bounded by `limits`.
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        Self {
            buffer: BytesMut::new(),
            fragment_count: 0,
            kind: None,
            utf8_validator: None,
            limits,
        }
    }

    /// Add a frame to the message being assembled.
    ///
    /// Returns the finished message once a frame with FIN arrives.
    ///
    /// # Errors
    ///
    /// - `Error::ProtocolViolation` for a continuation with nothing to continue,
    ///   a new data frame while a message is open, or a control frame
    /// - `Error::TooManyFragments` / `Error::MessageTooLarge` past the limits
    /// - `Error::InvalidUtf8` if a text message stops being valid UTF-8
    pub fn push(&mut self, frame: Frame) -> Result<Option<AssembledMessage>> {
        match frame.opcode {
            OpCode::Continuation => {
                if self.kind.is_none() {
                    return Err(Error::ProtocolViolation(
                        "unexpected continuation frame".into(),
                    ));
                }
            }
            OpCode::Text | OpCode::Binary => {
                if self.kind.is_some() {
                    return Err(Error::ProtocolViolation(
                        "expected continuation frame".into(),
                    ));
                }
                if frame.opcode == OpCode::Text {
                    self.utf8_validator = Some(Utf8Validator::new());
                }
                self.kind = MessageKind::from_opcode(frame.opcode);
            }
            control => {
                return Err(Error::ProtocolViolation(format!(
                    "{control} frame is not part of a message"
                )));
            }
        }

        self.limits.check_fragment_count(self.fragment_count + 1)?;
        self.limits
            .check_message_size(self.buffer.len() + frame.payload().len())?;

        if let Some(validator) = self.utf8_validator.as_mut() {
            validator.validate(frame.payload(), frame.fin)?;
        }

        self.buffer.extend_from_slice(frame.payload());
        self.fragment_count += 1;

        if !frame.fin {
            return Ok(None);
        }

        let kind = self
            .kind
            .take()
            .ok_or_else(|| Error::ProtocolViolation("no message in progress".into()))?;
        let payload = self.buffer.split().to_vec();
        self.fragment_count = 0;
        self.utf8_validator = None;
        Ok(Some(AssembledMessage { kind, payload }))
    }

    /// Whether a fragmented message is in progress.
    #[must_use]
    pub fn is_assembling(&self) -> bool {
        self.kind.is_some()
    }

    /// Drop any partially assembled message.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.fragment_count = 0;
        self.kind = None;
        self.utf8_validator = None;
    }
}

/// A fully assembled data message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledMessage {
    pub kind: MessageKind,
    pub payload: Vec<u8>,
}
