// SPDX-License-Identifier: MIT
//! Component header codec
//!
//! Renders the representation chosen for one string, name or content item as
//! octets and reads it back. Which representation to choose, and which table
//! an index refers to, is decided by the writer and the decoder; this layer
//! only knows the bit layouts.
//!
//! ```text
//! identifying string (first bit)      0 length(2nd bit) utf-8   | 1 index(2nd bit)
//! non-identifying string (first bit)  0 add enc enc ...         | 1 index(2nd bit)
//! character chunk (third bit)         1 0 0 add enc enc ...     | 1 0 1 index(4th bit)
//! ```

pub mod integer;
pub mod octets;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use octets::OctetReader;

use crate::format::{item, FormatError};
use integer::{
    is_index_third_bit, read_index_fourth_bit, read_index_second_bit, read_index_third_bit,
    read_length_fifth_bit, read_length_second_bit, read_length_seventh_bit,
    write_index_fourth_bit, write_index_second_bit, write_index_third_bit,
    write_length_fifth_bit, write_length_second_bit, write_length_seventh_bit,
};

const ALPHABET_DISCRIMINANT: u8 = 2;
const ALGORITHM_DISCRIMINANT: u8 = 3;

const NON_IDENTIFYING_ADD_FLAG: u8 = 0x40;
const CHUNK_ADD_FLAG: u8 = 0x10;
const CHUNK_INDEX_FLAG: u8 = 0x20;

/// Character encoding scheme of literal non-identifying strings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterEncoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "utf-16", alias = "utf16")]
    Utf16,
}

impl CharacterEncoding {
    pub fn name(self) -> &'static str {
        match self {
            CharacterEncoding::Utf8 => "utf-8",
            CharacterEncoding::Utf16 => "utf-16",
        }
    }

    #[inline]
    fn discriminant(self) -> u8 {
        match self {
            CharacterEncoding::Utf8 => 0,
            CharacterEncoding::Utf16 => 1,
        }
    }

    fn encode(self, value: &str) -> Vec<u8> {
        match self {
            CharacterEncoding::Utf8 => value.as_bytes().to_vec(),
            CharacterEncoding::Utf16 => value.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        }
    }

    fn decode(self, octets: &[u8]) -> Result<String, FormatError> {
        match self {
            CharacterEncoding::Utf8 => decode_utf8(octets),
            CharacterEncoding::Utf16 => {
                if octets.len() % 2 != 0 {
                    return Err(FormatError::InvalidCharacters {
                        encoding: self.name(),
                        reason: format!("odd length {}", octets.len()),
                    });
                }
                let units = octets
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
                char::decode_utf16(units)
                    .collect::<Result<String, _>>()
                    .map_err(|e| FormatError::InvalidCharacters {
                        encoding: self.name(),
                        reason: e.to_string(),
                    })
            }
        }
    }
}

impl FromStr for CharacterEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(CharacterEncoding::Utf8),
            "utf-16" | "utf16" => Ok(CharacterEncoding::Utf16),
            other => Err(format!("unknown character encoding: {}", other)),
        }
    }
}

fn decode_utf8(octets: &[u8]) -> Result<String, FormatError> {
    String::from_utf8(octets.to_vec()).map_err(|e| FormatError::InvalidCharacters {
        encoding: "utf-8",
        reason: e.to_string(),
    })
}

/// How one string or content item is represented on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentHeader {
    /// Characters written in full; `add_to_table` tells the decoder to index them
    Literal { value: String, add_to_table: bool },

    /// Reference to an entry already in the relevant table
    Indexed(usize),

    /// Octets produced by an encoding algorithm
    AlgorithmEncoded {
        id: u8,
        octets: Vec<u8>,
        add_to_table: bool,
    },

    /// Octets packed with a restricted alphabet
    AlphabetEncoded {
        id: u8,
        octets: Vec<u8>,
        add_to_table: bool,
    },
}

impl ComponentHeader {
    pub fn literal(value: impl Into<String>, add_to_table: bool) -> Self {
        ComponentHeader::Literal {
            value: value.into(),
            add_to_table,
        }
    }

    pub fn adds_to_table(&self) -> bool {
        match self {
            ComponentHeader::Literal { add_to_table, .. }
            | ComponentHeader::AlgorithmEncoded { add_to_table, .. }
            | ComponentHeader::AlphabetEncoded { add_to_table, .. } => *add_to_table,
            ComponentHeader::Indexed(_) => false,
        }
    }

    fn representation(&self) -> &'static str {
        match self {
            ComponentHeader::Literal { .. } => "literal",
            ComponentHeader::Indexed(_) => "index",
            ComponentHeader::AlgorithmEncoded { .. } => "encoding algorithm",
            ComponentHeader::AlphabetEncoded { .. } => "restricted alphabet",
        }
    }

    /// Write an identifying string starting on the first bit
    ///
    /// Identifying strings are always UTF-8 and always added by the decoder.
    pub fn write_identifying(&self, buffer: &mut Vec<u8>) -> Result<(), FormatError> {
        match self {
            ComponentHeader::Literal { value, .. } => {
                write_length_second_bit(buffer, 0x00, value.len())?;
                buffer.extend_from_slice(value.as_bytes());
                Ok(())
            }
            ComponentHeader::Indexed(index) => write_index_second_bit(buffer, 0x80, *index),
            other => Err(FormatError::UnsupportedRepresentation {
                context: "identifying string",
                representation: other.representation(),
            }),
        }
    }

    pub fn read_identifying(reader: &mut OctetReader<'_>) -> Result<Self, FormatError> {
        let first = reader.read_octet()?;
        if first & 0x80 != 0 {
            return read_index_second_bit(first, reader).map(ComponentHeader::Indexed);
        }
        let len = read_length_second_bit(first, reader)?;
        let value = decode_utf8(reader.read_slice(len)?)?;
        Ok(ComponentHeader::literal(value, true))
    }

    /// Write a non-identifying string starting on the first bit
    pub fn write_non_identifying(
        &self,
        buffer: &mut Vec<u8>,
        encoding: CharacterEncoding,
    ) -> Result<(), FormatError> {
        match self {
            ComponentHeader::Literal { value, .. } if value.is_empty() => {
                buffer.push(item::EMPTY_STRING);
                Ok(())
            }
            ComponentHeader::Literal {
                value,
                add_to_table,
            } => {
                let octets = encoding.encode(value);
                let prefix =
                    flag(*add_to_table, NON_IDENTIFYING_ADD_FLAG) | encoding.discriminant() << 4;
                write_length_fifth_bit(buffer, prefix, octets.len())?;
                buffer.extend_from_slice(&octets);
                Ok(())
            }
            ComponentHeader::Indexed(index) => write_index_second_bit(buffer, 0x80, *index),
            ComponentHeader::AlgorithmEncoded {
                id,
                octets,
                add_to_table,
            } => write_encoded_first_bit(buffer, ALGORITHM_DISCRIMINANT, *id, octets, *add_to_table),
            ComponentHeader::AlphabetEncoded {
                id,
                octets,
                add_to_table,
            } => write_encoded_first_bit(buffer, ALPHABET_DISCRIMINANT, *id, octets, *add_to_table),
        }
    }

    pub fn read_non_identifying(reader: &mut OctetReader<'_>) -> Result<Self, FormatError> {
        let first = reader.read_octet()?;
        if first == item::EMPTY_STRING {
            return Ok(ComponentHeader::literal(String::new(), false));
        }
        if first & 0x80 != 0 {
            return read_index_second_bit(first, reader).map(ComponentHeader::Indexed);
        }

        let add_to_table = first & NON_IDENTIFYING_ADD_FLAG != 0;
        match (first >> 4) & 0x03 {
            discriminant @ (ALPHABET_DISCRIMINANT | ALGORITHM_DISCRIMINANT) => {
                let second = reader.read_octet()?;
                let id = (first & 0x0F) << 4 | second >> 4;
                let len = read_length_fifth_bit(second, reader)?;
                let octets = reader.read_slice(len)?.to_vec();
                Ok(encoded(discriminant, id, octets, add_to_table))
            }
            discriminant => {
                let len = read_length_fifth_bit(first, reader)?;
                let value = text_encoding(discriminant).decode(reader.read_slice(len)?)?;
                Ok(ComponentHeader::literal(value, add_to_table))
            }
        }
    }

    /// Write a character chunk item, identification bits included
    pub fn write_chunk(
        &self,
        buffer: &mut Vec<u8>,
        encoding: CharacterEncoding,
    ) -> Result<(), FormatError> {
        match self {
            ComponentHeader::Literal {
                value,
                add_to_table,
            } => {
                if value.is_empty() {
                    return Err(FormatError::EmptyValue);
                }
                let octets = encoding.encode(value);
                let prefix = item::CHARACTER_CHUNK
                    | flag(*add_to_table, CHUNK_ADD_FLAG)
                    | encoding.discriminant() << 2;
                write_length_seventh_bit(buffer, prefix, octets.len())?;
                buffer.extend_from_slice(&octets);
                Ok(())
            }
            ComponentHeader::Indexed(index) => {
                write_index_fourth_bit(buffer, item::CHARACTER_CHUNK | CHUNK_INDEX_FLAG, *index)
            }
            ComponentHeader::AlgorithmEncoded {
                id,
                octets,
                add_to_table,
            } => write_encoded_chunk(buffer, ALGORITHM_DISCRIMINANT, *id, octets, *add_to_table),
            ComponentHeader::AlphabetEncoded {
                id,
                octets,
                add_to_table,
            } => write_encoded_chunk(buffer, ALPHABET_DISCRIMINANT, *id, octets, *add_to_table),
        }
    }

    /// Read a character chunk whose identification octet `first` was consumed
    pub fn read_chunk(first: u8, reader: &mut OctetReader<'_>) -> Result<Self, FormatError> {
        if first & item::CHARACTER_CHUNK_MASK != item::CHARACTER_CHUNK {
            return Err(reader.unexpected(first, "character chunk"));
        }
        if first & CHUNK_INDEX_FLAG != 0 {
            return read_index_fourth_bit(first, reader).map(ComponentHeader::Indexed);
        }

        let add_to_table = first & CHUNK_ADD_FLAG != 0;
        match (first >> 2) & 0x03 {
            discriminant @ (ALPHABET_DISCRIMINANT | ALGORITHM_DISCRIMINANT) => {
                let second = reader.read_octet()?;
                let id = (first & 0x03) << 6 | second >> 2;
                let len = read_length_seventh_bit(second, reader)?;
                let octets = reader.read_slice(len)?.to_vec();
                Ok(encoded(discriminant, id, octets, add_to_table))
            }
            discriminant => {
                let len = read_length_seventh_bit(first, reader)?;
                let value = text_encoding(discriminant).decode(reader.read_slice(len)?)?;
                Ok(ComponentHeader::literal(value, add_to_table))
            }
        }
    }
}

#[inline]
fn flag(set: bool, bit: u8) -> u8 {
    if set {
        bit
    } else {
        0
    }
}

#[inline]
fn text_encoding(discriminant: u8) -> CharacterEncoding {
    if discriminant == 0 {
        CharacterEncoding::Utf8
    } else {
        CharacterEncoding::Utf16
    }
}

fn encoded(discriminant: u8, id: u8, octets: Vec<u8>, add_to_table: bool) -> ComponentHeader {
    if discriminant == ALPHABET_DISCRIMINANT {
        ComponentHeader::AlphabetEncoded {
            id,
            octets,
            add_to_table,
        }
    } else {
        ComponentHeader::AlgorithmEncoded {
            id,
            octets,
            add_to_table,
        }
    }
}

// The 8-bit identifier straddles the first two octets
fn write_encoded_first_bit(
    buffer: &mut Vec<u8>,
    discriminant: u8,
    id: u8,
    octets: &[u8],
    add_to_table: bool,
) -> Result<(), FormatError> {
    if octets.is_empty() {
        return Err(FormatError::EmptyValue);
    }
    buffer.push(flag(add_to_table, NON_IDENTIFYING_ADD_FLAG) | discriminant << 4 | id >> 4);
    write_length_fifth_bit(buffer, (id & 0x0F) << 4, octets.len())?;
    buffer.extend_from_slice(octets);
    Ok(())
}

fn write_encoded_chunk(
    buffer: &mut Vec<u8>,
    discriminant: u8,
    id: u8,
    octets: &[u8],
    add_to_table: bool,
) -> Result<(), FormatError> {
    if octets.is_empty() {
        return Err(FormatError::EmptyValue);
    }
    buffer.push(
        item::CHARACTER_CHUNK | flag(add_to_table, CHUNK_ADD_FLAG) | discriminant << 2 | id >> 6,
    );
    write_length_seventh_bit(buffer, (id & 0x3F) << 2, octets.len())?;
    buffer.extend_from_slice(octets);
    Ok(())
}

/// How an element or attribute name is represented on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameHeader {
    /// Reference to the element-name or attribute-name table
    Indexed(usize),

    /// Components written one by one, each itself literal or indexed
    Literal {
        prefix: Option<ComponentHeader>,
        namespace: Option<ComponentHeader>,
        local: ComponentHeader,
    },
}

impl NameHeader {
    /// Write an element name starting on the third bit
    ///
    /// `prefix` carries the two leading bits of the octet.
    pub fn write_element(&self, buffer: &mut Vec<u8>, prefix: u8) -> Result<(), FormatError> {
        match self {
            NameHeader::Indexed(index) => write_index_third_bit(buffer, prefix, *index),
            NameHeader::Literal { .. } => {
                let flags = self.literal_flags()?;
                buffer.push(prefix | item::ELEMENT_LITERAL_QNAME | flags);
                self.write_literal_parts(buffer)
            }
        }
    }

    pub fn read_element(first: u8, reader: &mut OctetReader<'_>) -> Result<Self, FormatError> {
        if is_index_third_bit(first) {
            read_index_third_bit(first, reader).map(NameHeader::Indexed)
        } else if first & item::ELEMENT_LITERAL_QNAME == item::ELEMENT_LITERAL_QNAME {
            Self::read_literal_parts(first, reader)
        } else {
            Err(reader.unexpected(first, "element name"))
        }
    }

    /// Write an attribute name starting on the second bit
    pub fn write_attribute(&self, buffer: &mut Vec<u8>) -> Result<(), FormatError> {
        match self {
            NameHeader::Indexed(index) => write_index_second_bit(buffer, 0x00, *index),
            NameHeader::Literal { .. } => {
                let flags = self.literal_flags()?;
                buffer.push(item::ATTRIBUTE_LITERAL_QNAME | flags);
                self.write_literal_parts(buffer)
            }
        }
    }

    pub fn read_attribute(first: u8, reader: &mut OctetReader<'_>) -> Result<Self, FormatError> {
        if first & 0xFC == item::ATTRIBUTE_LITERAL_QNAME {
            Self::read_literal_parts(first, reader)
        } else if first & 0x80 == 0 {
            read_index_second_bit(first, reader).map(NameHeader::Indexed)
        } else {
            Err(reader.unexpected(first, "attribute name"))
        }
    }

    fn literal_flags(&self) -> Result<u8, FormatError> {
        match self {
            NameHeader::Literal {
                prefix, namespace, ..
            } => {
                if prefix.is_some() && namespace.is_none() {
                    return Err(FormatError::PrefixWithoutNamespace);
                }
                Ok(flag(prefix.is_some(), item::LITERAL_QNAME_PREFIX_FLAG)
                    | flag(namespace.is_some(), item::LITERAL_QNAME_NAMESPACE_FLAG))
            }
            NameHeader::Indexed(_) => Ok(0),
        }
    }

    fn write_literal_parts(&self, buffer: &mut Vec<u8>) -> Result<(), FormatError> {
        if let NameHeader::Literal {
            prefix,
            namespace,
            local,
        } = self
        {
            for part in [prefix.as_ref(), namespace.as_ref(), Some(local)]
                .into_iter()
                .flatten()
            {
                part.write_identifying(buffer)?;
            }
        }
        Ok(())
    }

    fn read_literal_parts(first: u8, reader: &mut OctetReader<'_>) -> Result<Self, FormatError> {
        let has_prefix = first & item::LITERAL_QNAME_PREFIX_FLAG != 0;
        let has_namespace = first & item::LITERAL_QNAME_NAMESPACE_FLAG != 0;
        if has_prefix && !has_namespace {
            return Err(FormatError::PrefixWithoutNamespace);
        }

        let prefix = has_prefix
            .then(|| ComponentHeader::read_identifying(reader))
            .transpose()?;
        let namespace = has_namespace
            .then(|| ComponentHeader::read_identifying(reader))
            .transpose()?;
        let local = ComponentHeader::read_identifying(reader)?;
        Ok(NameHeader::Literal {
            prefix,
            namespace,
            local,
        })
    }
}

/// Write a namespace attribute; absent components leave their flag clear
pub fn write_namespace_attribute(
    buffer: &mut Vec<u8>,
    prefix: Option<&ComponentHeader>,
    namespace: Option<&ComponentHeader>,
) -> Result<(), FormatError> {
    if prefix.is_some() && namespace.is_none() {
        return Err(FormatError::PrefixWithoutNamespace);
    }
    buffer.push(
        item::NAMESPACE_ATTRIBUTE
            | flag(prefix.is_some(), item::NAMESPACE_ATTRIBUTE_PREFIX_FLAG)
            | flag(namespace.is_some(), item::NAMESPACE_ATTRIBUTE_NAME_FLAG),
    );
    for part in [prefix, namespace].into_iter().flatten() {
        part.write_identifying(buffer)?;
    }
    Ok(())
}

/// Read a namespace attribute whose identification octet `first` was consumed
pub fn read_namespace_attribute(
    first: u8,
    reader: &mut OctetReader<'_>,
) -> Result<(Option<ComponentHeader>, Option<ComponentHeader>), FormatError> {
    if first & item::NAMESPACE_ATTRIBUTE_MASK != item::NAMESPACE_ATTRIBUTE {
        return Err(reader.unexpected(first, "namespace attribute"));
    }
    let has_prefix = first & item::NAMESPACE_ATTRIBUTE_PREFIX_FLAG != 0;
    let has_namespace = first & item::NAMESPACE_ATTRIBUTE_NAME_FLAG != 0;
    if has_prefix && !has_namespace {
        return Err(FormatError::PrefixWithoutNamespace);
    }

    let prefix = has_prefix
        .then(|| ComponentHeader::read_identifying(reader))
        .transpose()?;
    let namespace = has_namespace
        .then(|| ComponentHeader::read_identifying(reader))
        .transpose()?;
    Ok((prefix, namespace))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_identifying(header: &ComponentHeader, encoding: CharacterEncoding) -> Vec<u8> {
        let mut buffer = Vec::new();
        header.write_non_identifying(&mut buffer, encoding).unwrap();
        buffer
    }

    fn read_back_non_identifying(buffer: &[u8]) -> ComponentHeader {
        let mut reader = OctetReader::new(buffer);
        let header = ComponentHeader::read_non_identifying(&mut reader).unwrap();
        assert!(reader.is_empty());
        header
    }

    #[test]
    fn test_identifying_literal_layout() {
        let mut buffer = Vec::new();
        ComponentHeader::literal("abc", true)
            .write_identifying(&mut buffer)
            .unwrap();
        assert_eq!(buffer, vec![0x02, b'a', b'b', b'c']);

        let mut reader = OctetReader::new(&buffer);
        assert_eq!(
            ComponentHeader::read_identifying(&mut reader).unwrap(),
            ComponentHeader::literal("abc", true)
        );
    }

    #[test]
    fn test_identifying_rejects_encoded() {
        let header = ComponentHeader::AlgorithmEncoded {
            id: 0,
            octets: vec![1],
            add_to_table: false,
        };
        assert!(matches!(
            header.write_identifying(&mut Vec::new()),
            Err(FormatError::UnsupportedRepresentation { .. })
        ));
    }

    #[test]
    fn test_non_identifying_literal_with_add_flag() {
        let header = ComponentHeader::literal("abc", true);
        let buffer = non_identifying(&header, CharacterEncoding::Utf8);
        assert_eq!(buffer, vec![0x42, b'a', b'b', b'c']);
        assert_eq!(read_back_non_identifying(&buffer), header);
    }

    #[test]
    fn test_non_identifying_utf16() {
        let header = ComponentHeader::literal("hé", false);
        let buffer = non_identifying(&header, CharacterEncoding::Utf16);
        assert_eq!(buffer, vec![0x13, 0x00, b'h', 0x00, 0xE9]);
        assert_eq!(read_back_non_identifying(&buffer), header);
    }

    #[test]
    fn test_non_identifying_empty_string() {
        let header = ComponentHeader::literal("", false);
        let buffer = non_identifying(&header, CharacterEncoding::Utf8);
        assert_eq!(buffer, vec![item::EMPTY_STRING]);
        assert_eq!(read_back_non_identifying(&buffer), header);
    }

    #[test]
    fn test_non_identifying_index() {
        let buffer = non_identifying(&ComponentHeader::Indexed(70), CharacterEncoding::Utf8);
        assert_eq!(buffer, vec![0xC0, 0x06]);
        assert_eq!(read_back_non_identifying(&buffer), ComponentHeader::Indexed(70));
    }

    #[test]
    fn test_non_identifying_algorithm_id_straddles_octets() {
        let header = ComponentHeader::AlgorithmEncoded {
            id: 0xA5,
            octets: vec![1, 2, 3],
            add_to_table: false,
        };
        let buffer = non_identifying(&header, CharacterEncoding::Utf8);
        assert_eq!(&buffer[..2], &[0x3A, 0x52]);
        assert_eq!(read_back_non_identifying(&buffer), header);
    }

    #[test]
    fn test_chunk_layouts() {
        let mut buffer = Vec::new();
        ComponentHeader::literal("hi", true)
            .write_chunk(&mut buffer, CharacterEncoding::Utf8)
            .unwrap();
        assert_eq!(buffer, vec![0x91, b'h', b'i']);

        let mut buffer = Vec::new();
        ComponentHeader::AlgorithmEncoded {
            id: 1,
            octets: vec![7, 8, 9],
            add_to_table: false,
        }
        .write_chunk(&mut buffer, CharacterEncoding::Utf8)
        .unwrap();
        assert_eq!(buffer, vec![0x8C, 0x06, 0x00, 7, 8, 9]);

        let mut buffer = Vec::new();
        ComponentHeader::Indexed(3)
            .write_chunk(&mut buffer, CharacterEncoding::Utf8)
            .unwrap();
        assert_eq!(buffer, vec![0xA3]);
    }

    #[test]
    fn test_chunk_read_back() {
        for header in [
            ComponentHeader::literal("text", false),
            ComponentHeader::Indexed(5000),
            ComponentHeader::AlphabetEncoded {
                id: 200,
                octets: vec![0x23, 0x40],
                add_to_table: true,
            },
        ] {
            let mut buffer = Vec::new();
            header
                .write_chunk(&mut buffer, CharacterEncoding::Utf16)
                .unwrap();
            let mut reader = OctetReader::new(&buffer);
            let first = reader.read_octet().unwrap();
            assert_eq!(ComponentHeader::read_chunk(first, &mut reader).unwrap(), header);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn test_empty_chunk_rejected() {
        assert!(matches!(
            ComponentHeader::literal("", false).write_chunk(&mut Vec::new(), CharacterEncoding::Utf8),
            Err(FormatError::EmptyValue)
        ));
    }

    #[test]
    fn test_element_literal_name() {
        let name = NameHeader::Literal {
            prefix: Some(ComponentHeader::Indexed(0)),
            namespace: Some(ComponentHeader::Indexed(0)),
            local: ComponentHeader::literal("lang", true),
        };
        let mut buffer = Vec::new();
        name.write_element(&mut buffer, 0x40).unwrap();
        assert_eq!(buffer[..3], [0x7F, 0x80, 0x80]);

        let mut reader = OctetReader::new(&buffer);
        let first = reader.read_octet().unwrap();
        assert_eq!(NameHeader::read_element(first, &mut reader).unwrap(), name);
    }

    #[test]
    fn test_attribute_names() {
        for name in [
            NameHeader::Indexed(0),
            NameHeader::Indexed(9000),
            NameHeader::Literal {
                prefix: None,
                namespace: None,
                local: ComponentHeader::literal("id", true),
            },
        ] {
            let mut buffer = Vec::new();
            name.write_attribute(&mut buffer).unwrap();
            assert_eq!(buffer[0] & 0x80, 0);
            let mut reader = OctetReader::new(&buffer);
            let first = reader.read_octet().unwrap();
            assert_eq!(NameHeader::read_attribute(first, &mut reader).unwrap(), name);
        }
    }

    #[test]
    fn test_prefix_without_namespace_rejected() {
        let name = NameHeader::Literal {
            prefix: Some(ComponentHeader::literal("p", true)),
            namespace: None,
            local: ComponentHeader::literal("a", true),
        };
        assert!(matches!(
            name.write_element(&mut Vec::new(), 0),
            Err(FormatError::PrefixWithoutNamespace)
        ));

        let data = [0x3E, 0x00, b'p', 0x00, b'a'];
        let mut reader = OctetReader::new(&data);
        let first = reader.read_octet().unwrap();
        assert!(NameHeader::read_element(first, &mut reader).is_err());
    }

    #[test]
    fn test_namespace_attribute() {
        let prefix = ComponentHeader::literal("p", true);
        let namespace = ComponentHeader::Indexed(1);
        let mut buffer = Vec::new();
        write_namespace_attribute(&mut buffer, Some(&prefix), Some(&namespace)).unwrap();
        assert_eq!(buffer, vec![0xCF, 0x00, b'p', 0x81]);

        let mut reader = OctetReader::new(&buffer);
        let first = reader.read_octet().unwrap();
        let (read_prefix, read_namespace) = read_namespace_attribute(first, &mut reader).unwrap();
        assert_eq!(read_prefix, Some(prefix));
        assert_eq!(read_namespace, Some(namespace));

        let mut buffer = Vec::new();
        write_namespace_attribute(&mut buffer, None, None).unwrap();
        assert_eq!(buffer, vec![0xCC]);
    }

    #[test]
    fn test_invalid_utf16_rejected() {
        let data = [0x12, 0x00, b'a', 0x00];
        let mut reader = OctetReader::new(&data);
        assert!(matches!(
            ComponentHeader::read_non_identifying(&mut reader),
            Err(FormatError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("UTF-16".parse::<CharacterEncoding>(), Ok(CharacterEncoding::Utf16));
        assert_eq!("utf8".parse::<CharacterEncoding>(), Ok(CharacterEncoding::Utf8));
        assert!("latin1".parse::<CharacterEncoding>().is_err());
    }
}
