// SPDX-License-Identifier: MIT
//! Built-in encoding algorithms (identifiers 0-9)

use base64::Engine as _;
use uuid::Uuid;

use super::{AlgorithmError, AlgorithmValue};

/// The fixed set of algorithms every encoder and decoder understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BuiltinAlgorithm {
    /// Octets, character form is upper-case hexadecimal
    Hexadecimal = 0,
    /// Octets, character form is standard base64
    Base64 = 1,
    /// Big-endian 16-bit signed integers
    Short = 2,
    /// Big-endian 32-bit signed integers
    Int = 3,
    /// Big-endian 64-bit signed integers
    Long = 4,
    /// Bit-packed booleans after a 4-bit unused-bit count
    Boolean = 5,
    /// IEEE-754 single precision, big-endian
    Float = 6,
    /// IEEE-754 double precision, big-endian
    Double = 7,
    /// 16-octet UUIDs
    Uuid = 8,
    /// UTF-8 text that must not be whitespace-normalized
    Cdata = 9,
}

impl BuiltinAlgorithm {
    /// Get all built-in algorithms in identifier order
    pub fn all() -> &'static [BuiltinAlgorithm] {
        &[
            BuiltinAlgorithm::Hexadecimal,
            BuiltinAlgorithm::Base64,
            BuiltinAlgorithm::Short,
            BuiltinAlgorithm::Int,
            BuiltinAlgorithm::Long,
            BuiltinAlgorithm::Boolean,
            BuiltinAlgorithm::Float,
            BuiltinAlgorithm::Double,
            BuiltinAlgorithm::Uuid,
            BuiltinAlgorithm::Cdata,
        ]
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::all().get(id as usize).copied()
    }

    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltinAlgorithm::Hexadecimal => "hexadecimal",
            BuiltinAlgorithm::Base64 => "base64",
            BuiltinAlgorithm::Short => "short",
            BuiltinAlgorithm::Int => "int",
            BuiltinAlgorithm::Long => "long",
            BuiltinAlgorithm::Boolean => "boolean",
            BuiltinAlgorithm::Float => "float",
            BuiltinAlgorithm::Double => "double",
            BuiltinAlgorithm::Uuid => "uuid",
            BuiltinAlgorithm::Cdata => "cdata",
        }
    }

    fn unsupported(self, value: &AlgorithmValue) -> AlgorithmError {
        AlgorithmError::UnsupportedValue {
            algorithm: self.name().to_string(),
            found: value.kind(),
        }
    }

    fn invalid_length(self, len: usize, unit: usize) -> AlgorithmError {
        AlgorithmError::InvalidLength {
            algorithm: self.name().to_string(),
            len,
            unit,
        }
    }

    fn invalid_text(self, reason: impl std::fmt::Display) -> AlgorithmError {
        AlgorithmError::InvalidText {
            algorithm: self.name().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn encode_to_octets(self, value: &AlgorithmValue) -> Result<Vec<u8>, AlgorithmError> {
        match (self, value) {
            (BuiltinAlgorithm::Hexadecimal | BuiltinAlgorithm::Base64, AlgorithmValue::Octets(v)) => {
                Ok(v.clone())
            }
            (BuiltinAlgorithm::Short, AlgorithmValue::Shorts(v)) => {
                Ok(v.iter().flat_map(|x| x.to_be_bytes()).collect())
            }
            (BuiltinAlgorithm::Int, AlgorithmValue::Ints(v)) => {
                Ok(v.iter().flat_map(|x| x.to_be_bytes()).collect())
            }
            (BuiltinAlgorithm::Long, AlgorithmValue::Longs(v)) => {
                Ok(v.iter().flat_map(|x| x.to_be_bytes()).collect())
            }
            (BuiltinAlgorithm::Boolean, AlgorithmValue::Booleans(v)) => Ok(pack_booleans(v)),
            (BuiltinAlgorithm::Float, AlgorithmValue::Floats(v)) => {
                Ok(v.iter().flat_map(|x| x.to_bits().to_be_bytes()).collect())
            }
            (BuiltinAlgorithm::Double, AlgorithmValue::Doubles(v)) => {
                Ok(v.iter().flat_map(|x| x.to_bits().to_be_bytes()).collect())
            }
            (BuiltinAlgorithm::Uuid, AlgorithmValue::Uuids(v)) => {
                Ok(v.iter().flat_map(|x| *x.as_bytes()).collect())
            }
            (BuiltinAlgorithm::Cdata, AlgorithmValue::Text(v)) => Ok(v.as_bytes().to_vec()),
            _ => Err(self.unsupported(value)),
        }
    }

    pub fn decode_from_octets(self, octets: &[u8]) -> Result<AlgorithmValue, AlgorithmError> {
        let value = match self {
            BuiltinAlgorithm::Hexadecimal | BuiltinAlgorithm::Base64 => {
                AlgorithmValue::Octets(octets.to_vec())
            }
            BuiltinAlgorithm::Short => AlgorithmValue::Shorts(
                self.fixed_width::<2>(octets)?
                    .map(i16::from_be_bytes)
                    .collect(),
            ),
            BuiltinAlgorithm::Int => AlgorithmValue::Ints(
                self.fixed_width::<4>(octets)?
                    .map(i32::from_be_bytes)
                    .collect(),
            ),
            BuiltinAlgorithm::Long => AlgorithmValue::Longs(
                self.fixed_width::<8>(octets)?
                    .map(i64::from_be_bytes)
                    .collect(),
            ),
            BuiltinAlgorithm::Boolean => AlgorithmValue::Booleans(unpack_booleans(octets)?),
            BuiltinAlgorithm::Float => AlgorithmValue::Floats(
                self.fixed_width::<4>(octets)?
                    .map(|b| f32::from_bits(u32::from_be_bytes(b)))
                    .collect(),
            ),
            BuiltinAlgorithm::Double => AlgorithmValue::Doubles(
                self.fixed_width::<8>(octets)?
                    .map(|b| f64::from_bits(u64::from_be_bytes(b)))
                    .collect(),
            ),
            BuiltinAlgorithm::Uuid => AlgorithmValue::Uuids(
                self.fixed_width::<16>(octets)?
                    .map(Uuid::from_bytes)
                    .collect(),
            ),
            BuiltinAlgorithm::Cdata => AlgorithmValue::Text(
                String::from_utf8(octets.to_vec()).map_err(|e| AlgorithmError::InvalidOctets {
                    algorithm: self.name().to_string(),
                    reason: e.to_string(),
                })?,
            ),
        };
        Ok(value)
    }

    fn fixed_width<const N: usize>(
        self,
        octets: &[u8],
    ) -> Result<impl Iterator<Item = [u8; N]> + '_, AlgorithmError> {
        if octets.len() % N != 0 {
            return Err(self.invalid_length(octets.len(), N));
        }
        Ok(octets.chunks_exact(N).map(|chunk| {
            let mut bytes = [0u8; N];
            bytes.copy_from_slice(chunk);
            bytes
        }))
    }

    /// Render a value in its character form
    pub fn to_text(self, value: &AlgorithmValue) -> Result<String, AlgorithmError> {
        let text = match (self, value) {
            (BuiltinAlgorithm::Hexadecimal, AlgorithmValue::Octets(v)) => hex::encode_upper(v),
            (BuiltinAlgorithm::Base64, AlgorithmValue::Octets(v)) => {
                base64::engine::general_purpose::STANDARD.encode(v)
            }
            (BuiltinAlgorithm::Short, AlgorithmValue::Shorts(v)) => join(v.iter()),
            (BuiltinAlgorithm::Int, AlgorithmValue::Ints(v)) => join(v.iter()),
            (BuiltinAlgorithm::Long, AlgorithmValue::Longs(v)) => join(v.iter()),
            (BuiltinAlgorithm::Boolean, AlgorithmValue::Booleans(v)) => join(v.iter()),
            (BuiltinAlgorithm::Float, AlgorithmValue::Floats(v)) => {
                join(v.iter().map(|x| format_float(*x as f64, x.to_string())))
            }
            (BuiltinAlgorithm::Double, AlgorithmValue::Doubles(v)) => {
                join(v.iter().map(|x| format_float(*x, x.to_string())))
            }
            (BuiltinAlgorithm::Uuid, AlgorithmValue::Uuids(v)) => join(v.iter()),
            (BuiltinAlgorithm::Cdata, AlgorithmValue::Text(v)) => v.clone(),
            _ => return Err(self.unsupported(value)),
        };
        Ok(text)
    }

    /// Parse a value from its character form
    pub fn from_text(self, text: &str) -> Result<AlgorithmValue, AlgorithmError> {
        let value = match self {
            BuiltinAlgorithm::Hexadecimal => {
                AlgorithmValue::Octets(hex::decode(text.trim()).map_err(|e| self.invalid_text(e))?)
            }
            BuiltinAlgorithm::Base64 => AlgorithmValue::Octets(
                base64::engine::general_purpose::STANDARD
                    .decode(text.trim())
                    .map_err(|e| self.invalid_text(e))?,
            ),
            BuiltinAlgorithm::Short => AlgorithmValue::Shorts(self.parse_list(text, str::parse)?),
            BuiltinAlgorithm::Int => AlgorithmValue::Ints(self.parse_list(text, str::parse)?),
            BuiltinAlgorithm::Long => AlgorithmValue::Longs(self.parse_list(text, str::parse)?),
            BuiltinAlgorithm::Boolean => {
                AlgorithmValue::Booleans(self.parse_list(text, parse_boolean)?)
            }
            BuiltinAlgorithm::Float => AlgorithmValue::Floats(self.parse_list(text, |s| {
                parse_float(s).map(|x| x as f32).ok_or("invalid float")
            })?),
            BuiltinAlgorithm::Double => AlgorithmValue::Doubles(
                self.parse_list(text, |s| parse_float(s).ok_or("invalid double"))?,
            ),
            BuiltinAlgorithm::Uuid => AlgorithmValue::Uuids(self.parse_list(text, Uuid::parse_str)?),
            BuiltinAlgorithm::Cdata => AlgorithmValue::Text(text.to_string()),
        };
        Ok(value)
    }

    fn parse_list<T, E: std::fmt::Display>(
        self,
        text: &str,
        parse: impl Fn(&str) -> Result<T, E>,
    ) -> Result<Vec<T>, AlgorithmError> {
        text.split_whitespace()
            .map(|token| {
                parse(token).map_err(|e| self.invalid_text(format!("{:?}: {}", token, e)))
            })
            .collect()
    }
}

fn join<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    let mut out = String::new();
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&item.to_string());
    }
    out
}

fn format_float(value: f64, display: String) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "INF".to_string()
    } else if value == f64::NEG_INFINITY {
        "-INF".to_string()
    } else {
        display
    }
}

fn parse_float(token: &str) -> Option<f64> {
    match token {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => token.parse().ok(),
    }
}

fn parse_boolean(token: &str) -> Result<bool, &'static str> {
    match token {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err("expected true, false, 1 or 0"),
    }
}

/// Pack booleans after a leading 4-bit count of unused trailing bits
fn pack_booleans(values: &[bool]) -> Vec<u8> {
    let total_bits = 4 + values.len();
    let len = total_bits.div_ceil(8);
    let unused = len * 8 - total_bits;

    let mut octets = vec![0u8; len];
    octets[0] = (unused as u8) << 4;
    for (i, value) in values.iter().enumerate() {
        if *value {
            let bit = 4 + i;
            octets[bit / 8] |= 0x80 >> (bit % 8);
        }
    }
    octets
}

fn unpack_booleans(octets: &[u8]) -> Result<Vec<bool>, AlgorithmError> {
    let invalid = |reason: &str| AlgorithmError::InvalidOctets {
        algorithm: BuiltinAlgorithm::Boolean.name().to_string(),
        reason: reason.to_string(),
    };

    let first = *octets.first().ok_or_else(|| invalid("no octets"))?;
    let unused = (first >> 4) as usize;
    let total_bits = octets.len() * 8;
    if unused > 7 || 4 + unused > total_bits {
        return Err(invalid("unused bit count exceeds the available bits"));
    }

    let count = total_bits - 4 - unused;
    Ok((0..count)
        .map(|i| {
            let bit = 4 + i;
            octets[bit / 8] & (0x80 >> (bit % 8)) != 0
        })
        .collect())
}
