//! Incremental UTF-8 validation for text messages.
//!
//! A text message may be split across continuation frames at any byte, so a
//! multi-byte character can straddle two fragments. The validator carries the
//! unfinished character over to the next fragment instead of copying the
//! fragments together.

use crate::error::{Error, Result};

/// Incremental UTF-8 validator for fragmented text messages.
#[derive(Debug, Clone, Default)]
pub struct Utf8Validator {
    /// Leading bytes of a character cut off at a fragment boundary.
    partial: [u8; 4],
    partial_len: usize,
}

impl Utf8Validator {
    /// Create a new UTF-8 validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the next fragment of a text message.
    ///
    /// A character left unfinished at the end of a non-final fragment is kept
    /// for the next call. On the final fragment everything must be complete.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` on any invalid or, for the final
    /// fragment, truncated sequence.
    pub fn validate(&mut self, mut data: &[u8], is_final: bool) -> Result<()> {
        if self.partial_len > 0 {
            let want = sequence_len(self.partial[0]);
            let take = (want - self.partial_len).min(data.len());
            self.partial[self.partial_len..self.partial_len + take].copy_from_slice(&data[..take]);
            self.partial_len += take;
            data = &data[take..];

            if self.partial_len < want {
                return match std::str::from_utf8(&self.partial[..self.partial_len]) {
                    Err(e) if e.error_len().is_none() && !is_final => Ok(()),
                    _ => Err(Error::InvalidUtf8),
                };
            }

            std::str::from_utf8(&self.partial[..want])?;
            self.partial_len = 0;
        }

        match std::str::from_utf8(data) {
            Ok(_) => Ok(()),
            // error_len() is None only for a truncated sequence at the very end
            Err(e) if e.error_len().is_none() && !is_final => {
                let tail = &data[e.valid_up_to()..];
                self.partial[..tail.len()].copy_from_slice(tail);
                self.partial_len = tail.len();
                Ok(())
            }
            Err(_) => Err(Error::InvalidUtf8),
        }
    }
}

/// Encoded length of a character from its lead byte.
const fn sequence_len(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}
