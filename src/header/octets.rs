// SPDX-License-Identifier: MIT
//! Bounds-checked cursor over encoded octets

use crate::format::FormatError;

/// Sequential reader over a borrowed octet slice
///
/// Every read is bounds checked and reports the offset it failed at, so a
/// truncated or adversarial stream surfaces as [`FormatError::UnexpectedEof`]
/// instead of a panic.
#[derive(Debug, Clone)]
pub struct OctetReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> OctetReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current offset from the start of the input
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    pub fn peek_octet(&self) -> Result<u8, FormatError> {
        self.data
            .get(self.position)
            .copied()
            .ok_or(FormatError::UnexpectedEof {
                offset: self.position,
            })
    }

    #[inline]
    pub fn read_octet(&mut self) -> Result<u8, FormatError> {
        let octet = self.peek_octet()?;
        self.position += 1;
        Ok(octet)
    }

    /// Borrow the next `len` octets
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(FormatError::UnexpectedEof {
                offset: self.data.len(),
            })?;
        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }

    /// Read a 32-bit big-endian unsigned integer
    pub fn read_u32_be(&mut self) -> Result<u32, FormatError> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Build the error for an octet that does not fit the expected layout
    pub fn unexpected(&self, octet: u8, context: &'static str) -> FormatError {
        FormatError::UnexpectedOctet {
            octet,
            offset: self.position.saturating_sub(1),
            context,
        }
    }
}
