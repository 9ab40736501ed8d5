// SPDX-License-Identifier: MIT
//! # Binary Infoset
//!
//! A tokenized binary encoding for XML information sets. Documents keep XML's
//! data model (elements, attributes, namespaces, text, comments, processing
//! instructions) but drop its textual overhead: repeated names and strings are
//! replaced by small table indices, and typed content is written as binary
//! values instead of decimal text.
//!
//! ## Format Overview
//!
//! Every item starts on an octet boundary and is identified by its leading
//! bits, so a decoder never needs lookahead. Names and strings are either
//! written literally (optionally telling the decoder to add them to a table)
//! or as an index into a table both sides fill in the same order.
//!
//! ## Key Features
//!
//! - **Vocabulary Tables**: per-document tables deduplicate names and strings
//! - **Initial Vocabularies**: shared read-only tables seed many documents
//! - **Encoding Algorithms**: built-in numeric, binary and UUID encodings plus
//!   caller-registered ones
//! - **Restricted Alphabets**: bit-packed text drawn from small character sets
//! - **Checked Streaming Writer**: out-of-order calls are rejected, never
//!   written
//!
//! ## Format Specification
//!
//! ```text
//! Document
//! ========
//!
//! Header:
//! - Identification: E0 00 00 01 (4 bytes)
//! - Components: presence bits (1 byte)
//!     0x20 initial vocabulary   10 00 + external URI
//!     0x02 standalone           00 | 01
//!     0x01 version              non-identifying string
//!
//! Children (each starts on an octet boundary):
//! - 0xxxxxxx  element        a=bit 2 attributes, 111000 namespace declarations
//! - 10xxxxxx  character chunk
//! - 11100001  processing instruction
//! - 11100010  comment
//! - 11110000  termination (end of element, attributes or document)
//! - 11111111  double termination
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use binary_infoset::{Codec, DocumentHeader, InfosetEvent, QualifiedName};
//!
//! let codec = Codec::default();
//! let events = vec![
//!     InfosetEvent::StartDocument(DocumentHeader::default()),
//!     InfosetEvent::start(QualifiedName::local("greeting")),
//!     InfosetEvent::characters("hello"),
//!     InfosetEvent::EndElement,
//!     InfosetEvent::EndDocument,
//! ];
//!
//! let data = codec.encode(&events).unwrap();
//! let decoded = codec.decode(&data).unwrap();
//! assert_eq!(decoded, events);
//! ```
//!
//! Callers that precompute indices drive [`LowLevelWriter`] directly:
//!
//! ```rust
//! use binary_infoset::{Codec, DocumentHeader, QualifiedName};
//!
//! let codec = Codec::default();
//! let mut writer = codec.writer(Vec::new());
//! writer.start_document(&DocumentHeader::default()).unwrap();
//! writer.initiate_low_level_writing().unwrap();
//!
//! let item = writer.get_next_element_index();
//! writer.termination_and_mark().unwrap();
//! writer.start_element(&QualifiedName::local("item")).unwrap();
//! writer.end_start_element().unwrap();
//! writer.end_element().unwrap();
//!
//! writer.termination_and_mark().unwrap();
//! writer.start_element_indexed(item).unwrap();
//! writer.end_start_element().unwrap();
//! writer.end_element().unwrap();
//!
//! let data = writer.end_document().unwrap();
//! assert_eq!(codec.decode(&data).unwrap().len(), 6);
//! ```

pub mod algorithm;
pub mod alphabet;
pub mod codec;
pub mod config;
pub mod encoder;
pub mod error;
pub mod event;
pub mod format;
pub mod header;
pub mod name;
pub mod namespace;
pub mod reader;
pub mod vocabulary;
pub mod writer;

// Re-export main types
pub use algorithm::{
    AlgorithmError, AlgorithmRegistry, AlgorithmValue, BuiltinAlgorithm, EncodingAlgorithm,
};
pub use alphabet::{AlphabetError, AlphabetTable, RestrictedAlphabet};
pub use codec::{Codec, CodecBuilder};
pub use config::{
    CharacterEncoding, CodecConfig, ConfigError, IndexingPolicy, LengthThresholdPolicy,
    SizeLimits, UnknownRepresentationPolicy,
};
pub use encoder::InfosetEncoder;
pub use error::{CodecError, Result};
pub use event::{Attribute, CharacterContent, InfosetEvent, NamespaceDeclaration, OpaqueKind};
pub use format::{DocumentHeader, FormatError};
pub use header::{ComponentHeader, NameHeader};
pub use name::QualifiedName;
pub use namespace::{NamespaceContext, NamespaceError};
pub use reader::Decoder;
pub use vocabulary::{
    InitialVocabulary, TableKind, Vocabulary, VocabularyDefinition, VocabularyError,
    VocabularyTable,
};
pub use writer::{LowLevelWriter, NameKind, ProtocolError};
