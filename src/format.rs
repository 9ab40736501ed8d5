// SPDX-License-Identifier: MIT
//! Binary infoset wire format constants and the document header
//!
//! Every item of the document starts on an octet boundary and is identified by
//! its leading bits. The constants below name those bit patterns; the
//! [`DocumentHeader`] covers the fixed identification plus the optional
//! components that precede the document children.

use crate::header::OctetReader;

/// Identification octets at the start of every document
pub const DOCUMENT_MAGIC: &[u8; 4] = &[0xE0, 0x00, 0x00, 0x01];

/// Namespace URI bound to the `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace URI bound to the `xmlns` prefix
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Optional document component presence bits
pub mod components {
    pub const ADDITIONAL_DATA: u8 = 0x40;
    pub const INITIAL_VOCABULARY: u8 = 0x20;
    pub const NOTATIONS: u8 = 0x10;
    pub const UNPARSED_ENTITIES: u8 = 0x08;
    pub const CHARACTER_ENCODING_SCHEME: u8 = 0x04;
    pub const STANDALONE: u8 = 0x02;
    pub const VERSION: u8 = 0x01;

    /// Components this codec reads and writes
    pub const SUPPORTED: u8 = INITIAL_VOCABULARY | STANDALONE | VERSION;

    /// External vocabulary bit of the first initial-vocabulary octet
    pub const EXTERNAL_VOCABULARY: u8 = 0x10;
}

/// Identification bits of items
pub mod item {
    pub const ELEMENT_ATTRIBUTE_FLAG: u8 = 0x40;
    pub const ELEMENT_NAMESPACES: u8 = 0x38;
    pub const ELEMENT_LITERAL_QNAME: u8 = 0x3C;
    pub const ATTRIBUTE_LITERAL_QNAME: u8 = 0x78;

    pub const NAMESPACE_ATTRIBUTE: u8 = 0xCC;
    pub const NAMESPACE_ATTRIBUTE_MASK: u8 = 0xFC;
    pub const NAMESPACE_ATTRIBUTE_PREFIX_FLAG: u8 = 0x02;
    pub const NAMESPACE_ATTRIBUTE_NAME_FLAG: u8 = 0x01;

    pub const LITERAL_QNAME_PREFIX_FLAG: u8 = 0x02;
    pub const LITERAL_QNAME_NAMESPACE_FLAG: u8 = 0x01;

    pub const CHARACTER_CHUNK: u8 = 0x80;
    pub const CHARACTER_CHUNK_MASK: u8 = 0xC0;

    pub const PROCESSING_INSTRUCTION: u8 = 0xE1;
    pub const COMMENT: u8 = 0xE2;
    pub const DOCUMENT_TYPE_DECLARATION_MASK: u8 = 0xFC;
    pub const DOCUMENT_TYPE_DECLARATION: u8 = 0xC4;
    pub const UNEXPANDED_ENTITY_REFERENCE_MASK: u8 = 0xFE;
    pub const UNEXPANDED_ENTITY_REFERENCE: u8 = 0xC8;

    pub const TERMINATOR: u8 = 0xF0;
    pub const DOUBLE_TERMINATOR: u8 = 0xFF;

    /// Non-identifying string holding the empty string
    pub const EMPTY_STRING: u8 = 0xFF;
}

/// Errors raised by malformed or unsupported input
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("Invalid identification: expected {expected:02X?}, got {found:02X?}", expected = DOCUMENT_MAGIC)]
    InvalidMagic { found: Vec<u8> },

    #[error("Unexpected octet {octet:#04x} at offset {offset} while reading {context}")]
    UnexpectedOctet {
        octet: u8,
        offset: usize,
        context: &'static str,
    },

    #[error("Unsupported document component flags: {0:#04x}")]
    UnsupportedComponent(u8),

    #[error("Unknown external vocabulary: {0}")]
    UnknownExternalVocabulary(String),

    #[error("Invalid {encoding} content: {reason}")]
    InvalidCharacters {
        encoding: &'static str,
        reason: String,
    },

    #[error("Octet string length {0} is outside the encodable range")]
    LengthOutOfRange(usize),

    #[error("Index {0} is outside the encodable range")]
    IndexOutOfRange(usize),

    #[error("Literal qualified name has a prefix but no namespace name")]
    PrefixWithoutNamespace,

    #[error("Empty value cannot be encoded as a non-empty octet string")]
    EmptyValue,

    #[error("{context} cannot be written as {representation}")]
    UnsupportedRepresentation {
        context: &'static str,
        representation: &'static str,
    },

    #[error("{0} trailing octets after the document terminator")]
    TrailingData(usize),
}

/// Properties carried by the optional document components
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentHeader {
    /// URI of the external vocabulary the document was encoded against
    pub external_vocabulary: Option<String>,

    /// XML declaration `standalone` value
    pub standalone: Option<bool>,

    /// XML declaration `version` value
    pub version: Option<String>,
}

impl DocumentHeader {
    /// Presence bits for the optional components this header carries
    pub fn component_flags(&self) -> u8 {
        let mut flags = 0;
        if self.external_vocabulary.is_some() {
            flags |= components::INITIAL_VOCABULARY;
        }
        if self.standalone.is_some() {
            flags |= components::STANDALONE;
        }
        if self.version.is_some() {
            flags |= components::VERSION;
        }
        flags
    }

    /// Read the identification octets and the component presence octet
    ///
    /// Returns the presence bits; the components themselves are read by the
    /// decoder because the version string goes through the vocabulary.
    pub fn read_preamble(reader: &mut OctetReader<'_>) -> Result<u8, FormatError> {
        let magic = reader.read_slice(DOCUMENT_MAGIC.len())?;
        if magic != DOCUMENT_MAGIC {
            return Err(FormatError::InvalidMagic {
                found: magic.to_vec(),
            });
        }

        let flags = reader.read_octet()?;
        if flags & 0x80 != 0 || flags & !components::SUPPORTED != 0 {
            return Err(FormatError::UnsupportedComponent(flags));
        }
        Ok(flags)
    }

    /// Write the identification octets and the component presence octet
    #[inline]
    pub fn write_preamble(&self, buffer: &mut Vec<u8>) {
        buffer.reserve(DOCUMENT_MAGIC.len() + 1);
        buffer.extend_from_slice(DOCUMENT_MAGIC);
        buffer.push(self.component_flags());
    }
}
