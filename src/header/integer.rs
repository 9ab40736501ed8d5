// SPDX-License-Identifier: MIT
//! Graduated integer and length encodings
//!
//! Table indices and octet-string lengths are packed into the low bits of the
//! octet that identifies an item, spilling into continuation octets as they
//! grow. Each function is named after the bit the value starts on; `prefix`
//! carries the already-decided high bits of that first octet.

use super::octets::OctetReader;
use crate::format::FormatError;

/// Exclusive upper bound of every vocabulary index on the wire
pub const MAX_INDEX: usize = 1 << 20;

const SECOND_BIT_SMALL: usize = 64;
const SECOND_BIT_MEDIUM: usize = 8256;

const THIRD_BIT_SMALL: usize = 32;
const THIRD_BIT_MEDIUM: usize = 2080;
const THIRD_BIT_LARGE: usize = 526_368;

const FOURTH_BIT_SMALL: usize = 16;
const FOURTH_BIT_MEDIUM: usize = 1040;
const FOURTH_BIT_LARGE: usize = 263_184;

#[inline]
fn check_index(index: usize) -> Result<(), FormatError> {
    if index >= MAX_INDEX {
        return Err(FormatError::IndexOutOfRange(index));
    }
    Ok(())
}

#[inline]
fn push_u32(buffer: &mut Vec<u8>, value: usize) -> Result<(), FormatError> {
    let value = u32::try_from(value).map_err(|_| FormatError::LengthOutOfRange(value))?;
    buffer.extend_from_slice(&value.to_be_bytes());
    Ok(())
}

#[inline]
fn read_u16_tail(high: u8, reader: &mut OctetReader<'_>) -> Result<usize, FormatError> {
    let middle = reader.read_octet()?;
    let low = reader.read_octet()?;
    Ok(((high as usize) << 16) | ((middle as usize) << 8) | low as usize)
}

/// Write an index starting on the second bit of a new octet
pub fn write_index_second_bit(
    buffer: &mut Vec<u8>,
    prefix: u8,
    index: usize,
) -> Result<(), FormatError> {
    check_index(index)?;
    if index < SECOND_BIT_SMALL {
        buffer.push(prefix | index as u8);
    } else if index < SECOND_BIT_MEDIUM {
        let value = index - SECOND_BIT_SMALL;
        buffer.push(prefix | 0x40 | (value >> 8) as u8);
        buffer.push(value as u8);
    } else {
        let value = index - SECOND_BIT_MEDIUM;
        buffer.push(prefix | 0x60 | (value >> 16) as u8);
        buffer.push((value >> 8) as u8);
        buffer.push(value as u8);
    }
    Ok(())
}

/// Read an index whose first octet (already consumed) is `first`
pub fn read_index_second_bit(
    first: u8,
    reader: &mut OctetReader<'_>,
) -> Result<usize, FormatError> {
    let bits = first & 0x7F;
    if bits & 0x40 == 0 {
        Ok(bits as usize)
    } else if bits & 0x60 == 0x40 {
        let low = reader.read_octet()?;
        Ok((((bits & 0x1F) as usize) << 8 | low as usize) + SECOND_BIT_SMALL)
    } else if bits & 0x70 == 0x60 {
        Ok(read_u16_tail(bits & 0x0F, reader)? + SECOND_BIT_MEDIUM)
    } else {
        Err(reader.unexpected(first, "index on second bit"))
    }
}

/// Write an index starting on the third bit of a new octet
pub fn write_index_third_bit(
    buffer: &mut Vec<u8>,
    prefix: u8,
    index: usize,
) -> Result<(), FormatError> {
    check_index(index)?;
    if index < THIRD_BIT_SMALL {
        buffer.push(prefix | index as u8);
    } else if index < THIRD_BIT_MEDIUM {
        let value = index - THIRD_BIT_SMALL;
        buffer.push(prefix | 0x20 | (value >> 8) as u8);
        buffer.push(value as u8);
    } else if index < THIRD_BIT_LARGE {
        let value = index - THIRD_BIT_MEDIUM;
        buffer.push(prefix | 0x28 | (value >> 16) as u8);
        buffer.push((value >> 8) as u8);
        buffer.push(value as u8);
    } else {
        let value = index - THIRD_BIT_LARGE;
        buffer.push(prefix | 0x30);
        buffer.push((value >> 16) as u8 & 0x0F);
        buffer.push((value >> 8) as u8);
        buffer.push(value as u8);
    }
    Ok(())
}

/// True when the low six bits of an element octet hold an index
#[inline]
pub fn is_index_third_bit(first: u8) -> bool {
    first & 0x3F <= 0x30
}

pub fn read_index_third_bit(first: u8, reader: &mut OctetReader<'_>) -> Result<usize, FormatError> {
    let bits = first & 0x3F;
    if bits & 0x20 == 0 {
        Ok(bits as usize)
    } else if bits & 0x38 == 0x20 {
        let low = reader.read_octet()?;
        Ok((((bits & 0x07) as usize) << 8 | low as usize) + THIRD_BIT_SMALL)
    } else if bits & 0x38 == 0x28 {
        Ok(read_u16_tail(bits & 0x07, reader)? + THIRD_BIT_MEDIUM)
    } else if bits == 0x30 {
        let high = reader.read_octet()?;
        Ok(read_u16_tail(high & 0x0F, reader)? + THIRD_BIT_LARGE)
    } else {
        Err(reader.unexpected(first, "index on third bit"))
    }
}

/// Write an index starting on the fourth bit of a new octet
pub fn write_index_fourth_bit(
    buffer: &mut Vec<u8>,
    prefix: u8,
    index: usize,
) -> Result<(), FormatError> {
    check_index(index)?;
    if index < FOURTH_BIT_SMALL {
        buffer.push(prefix | index as u8);
    } else if index < FOURTH_BIT_MEDIUM {
        let value = index - FOURTH_BIT_SMALL;
        buffer.push(prefix | 0x10 | (value >> 8) as u8);
        buffer.push(value as u8);
    } else if index < FOURTH_BIT_LARGE {
        let value = index - FOURTH_BIT_MEDIUM;
        buffer.push(prefix | 0x14 | (value >> 16) as u8);
        buffer.push((value >> 8) as u8);
        buffer.push(value as u8);
    } else {
        let value = index - FOURTH_BIT_LARGE;
        buffer.push(prefix | 0x18);
        buffer.push((value >> 16) as u8 & 0x0F);
        buffer.push((value >> 8) as u8);
        buffer.push(value as u8);
    }
    Ok(())
}

pub fn read_index_fourth_bit(
    first: u8,
    reader: &mut OctetReader<'_>,
) -> Result<usize, FormatError> {
    let bits = first & 0x1F;
    if bits & 0x10 == 0 {
        Ok(bits as usize)
    } else if bits & 0x1C == 0x10 {
        let low = reader.read_octet()?;
        Ok((((bits & 0x03) as usize) << 8 | low as usize) + FOURTH_BIT_SMALL)
    } else if bits & 0x1C == 0x14 {
        Ok(read_u16_tail(bits & 0x03, reader)? + FOURTH_BIT_MEDIUM)
    } else if bits == 0x18 {
        let high = reader.read_octet()?;
        Ok(read_u16_tail(high & 0x0F, reader)? + FOURTH_BIT_LARGE)
    } else {
        Err(reader.unexpected(first, "index on fourth bit"))
    }
}

/// Write a non-empty octet string length starting on the second bit
pub fn write_length_second_bit(
    buffer: &mut Vec<u8>,
    prefix: u8,
    len: usize,
) -> Result<(), FormatError> {
    match len {
        0 => return Err(FormatError::EmptyValue),
        1..=64 => buffer.push(prefix | (len - 1) as u8),
        65..=320 => {
            buffer.push(prefix | 0x40);
            buffer.push((len - 65) as u8);
        }
        _ => {
            buffer.push(prefix | 0x60);
            push_u32(buffer, len - 321)?;
        }
    }
    Ok(())
}

pub fn read_length_second_bit(
    first: u8,
    reader: &mut OctetReader<'_>,
) -> Result<usize, FormatError> {
    let bits = first & 0x7F;
    if bits & 0x40 == 0 {
        Ok((bits & 0x3F) as usize + 1)
    } else if bits == 0x40 {
        Ok(reader.read_octet()? as usize + 65)
    } else if bits == 0x60 {
        Ok(reader.read_u32_be()? as usize + 321)
    } else {
        Err(reader.unexpected(first, "length on second bit"))
    }
}

/// Write a non-empty octet string length starting on the fifth bit
pub fn write_length_fifth_bit(
    buffer: &mut Vec<u8>,
    prefix: u8,
    len: usize,
) -> Result<(), FormatError> {
    match len {
        0 => return Err(FormatError::EmptyValue),
        1..=8 => buffer.push(prefix | (len - 1) as u8),
        9..=264 => {
            buffer.push(prefix | 0x08);
            buffer.push((len - 9) as u8);
        }
        _ => {
            buffer.push(prefix | 0x0C);
            push_u32(buffer, len - 265)?;
        }
    }
    Ok(())
}

pub fn read_length_fifth_bit(
    first: u8,
    reader: &mut OctetReader<'_>,
) -> Result<usize, FormatError> {
    let bits = first & 0x0F;
    if bits & 0x08 == 0 {
        Ok(bits as usize + 1)
    } else if bits == 0x08 {
        Ok(reader.read_octet()? as usize + 9)
    } else if bits == 0x0C {
        Ok(reader.read_u32_be()? as usize + 265)
    } else {
        Err(reader.unexpected(first, "length on fifth bit"))
    }
}

/// Write a non-empty octet string length starting on the seventh bit
pub fn write_length_seventh_bit(
    buffer: &mut Vec<u8>,
    prefix: u8,
    len: usize,
) -> Result<(), FormatError> {
    match len {
        0 => return Err(FormatError::EmptyValue),
        1..=2 => buffer.push(prefix | (len - 1) as u8),
        3..=258 => {
            buffer.push(prefix | 0x02);
            buffer.push((len - 3) as u8);
        }
        _ => {
            buffer.push(prefix | 0x03);
            push_u32(buffer, len - 259)?;
        }
    }
    Ok(())
}

pub fn read_length_seventh_bit(
    first: u8,
    reader: &mut OctetReader<'_>,
) -> Result<usize, FormatError> {
    match first & 0x03 {
        bits @ (0 | 1) => Ok(bits as usize + 1),
        2 => Ok(reader.read_octet()? as usize + 3),
        _ => Ok(reader.read_u32_be()? as usize + 259),
    }
}
