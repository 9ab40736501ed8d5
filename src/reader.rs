// SPDX-License-Identifier: MIT
//! Document decoder
//!
//! Reads a complete document into its [`InfosetEvent`]s. Vocabulary tables are
//! filled in the order items appear, so every index resolves against entries
//! the encoder had established at the same point. Decoding is iterative: the
//! element depth is a counter, not the call stack.

use crate::algorithm::AlgorithmError;
use crate::alphabet::AlphabetError;
use crate::codec::Codec;
use crate::config::UnknownRepresentationPolicy;
use crate::error::{CodecError, Result};
use crate::event::{Attribute, CharacterContent, InfosetEvent, NamespaceDeclaration, OpaqueKind};
use crate::format::{components, item, DocumentHeader, FormatError};
use crate::header::integer::read_length_second_bit;
use crate::header::{read_namespace_attribute, ComponentHeader, NameHeader, OctetReader};
use crate::name::QualifiedName;
use crate::vocabulary::{Vocabulary, VocabularyTable};
use crate::writer::NameKind;

/// Decodes one document
pub struct Decoder<'a> {
    codec: &'a Codec,
    reader: OctetReader<'a>,
    vocabulary: Vocabulary,
    depth: usize,
    events: Vec<InfosetEvent>,
}

impl<'a> Decoder<'a> {
    pub fn new(codec: &'a Codec, data: &'a [u8]) -> Self {
        Self {
            codec,
            reader: OctetReader::new(data),
            vocabulary: Vocabulary::new(),
            depth: 0,
            events: Vec::new(),
        }
    }

    /// Decode the whole document
    ///
    /// Either every event is returned or none is.
    pub fn decode(mut self) -> Result<Vec<InfosetEvent>> {
        let header = self.read_header()?;
        self.events.push(InfosetEvent::StartDocument(header));

        loop {
            let octet = self.reader.read_octet()?;
            match octet {
                item::TERMINATOR => {
                    if self.close() {
                        break;
                    }
                }
                item::DOUBLE_TERMINATOR => {
                    if self.close() {
                        return Err(self.reader.unexpected(octet, "document end").into());
                    }
                    if self.close() {
                        break;
                    }
                }
                item::PROCESSING_INSTRUCTION => self.processing_instruction()?,
                item::COMMENT => self.comment()?,
                _ if octet & 0x80 == 0 => self.element(octet)?,
                _ if octet & item::CHARACTER_CHUNK_MASK == item::CHARACTER_CHUNK
                    && self.depth > 0 =>
                {
                    self.characters(octet)?
                }
                _ => {
                    let context = if self.depth == 0 {
                        "document children"
                    } else {
                        "element children"
                    };
                    return Err(self.reader.unexpected(octet, context).into());
                }
            }
        }

        if !self.reader.is_empty() {
            return Err(FormatError::TrailingData(self.reader.remaining()).into());
        }

        tracing::debug!(events = self.events.len(), "decoded document");
        Ok(self.events)
    }

    fn read_header(&mut self) -> Result<DocumentHeader> {
        let flags = DocumentHeader::read_preamble(&mut self.reader)?;
        let mut header = DocumentHeader::default();

        if flags & components::INITIAL_VOCABULARY != 0 {
            let first = self.reader.read_octet()?;
            let second = self.reader.read_octet()?;
            if first != components::EXTERNAL_VOCABULARY || second != 0 {
                return Err(self.reader.unexpected(first, "initial vocabulary").into());
            }
            let octet = self.reader.read_octet()?;
            if octet & 0x80 != 0 {
                return Err(self.reader.unexpected(octet, "external vocabulary URI").into());
            }
            let len = read_length_second_bit(octet, &mut self.reader)?;
            let uri = std::str::from_utf8(self.reader.read_slice(len)?).map_err(|e| {
                FormatError::InvalidCharacters {
                    encoding: "utf-8",
                    reason: e.to_string(),
                }
            })?;

            let initial = self.codec.external_vocabulary(uri)?;
            self.vocabulary = Vocabulary::with_initial(initial);
            tracing::debug!(uri, "resolved external vocabulary");
            header.external_vocabulary = Some(uri.to_string());
        }

        if flags & components::STANDALONE != 0 {
            header.standalone = match self.reader.read_octet()? {
                0 => Some(false),
                1 => Some(true),
                other => return Err(self.reader.unexpected(other, "standalone").into()),
            };
        }

        if flags & components::VERSION != 0 {
            let component = ComponentHeader::read_non_identifying(&mut self.reader)?;
            let content = resolve_content(self.codec, &mut self.vocabulary.other_strings, component)?;
            header.version = Some(content_text(self.codec, content)?);
        }

        tracing::debug!(
            external_vocabulary = ?header.external_vocabulary,
            standalone = ?header.standalone,
            "read document header"
        );
        Ok(header)
    }

    /// Close the innermost open element, or the document at depth 0
    ///
    /// Returns `true` when the document was closed.
    fn close(&mut self) -> bool {
        if self.depth == 0 {
            self.events.push(InfosetEvent::EndDocument);
            return true;
        }
        self.depth -= 1;
        self.events.push(InfosetEvent::EndElement);
        false
    }

    fn element(&mut self, first: u8) -> Result<()> {
        let has_attributes = first & item::ELEMENT_ATTRIBUTE_FLAG != 0;

        let mut namespaces = Vec::new();
        let name_octet = if first & 0x3F == item::ELEMENT_NAMESPACES {
            loop {
                let octet = self.reader.read_octet()?;
                if octet == item::TERMINATOR {
                    break;
                }
                let (prefix, namespace) = read_namespace_attribute(octet, &mut self.reader)?;
                let prefix = prefix
                    .map(|c| resolve_identifying(&mut self.vocabulary.prefixes, c))
                    .transpose()?
                    .unwrap_or_default();
                let namespace = namespace
                    .map(|c| resolve_identifying(&mut self.vocabulary.namespace_names, c))
                    .transpose()?
                    .unwrap_or_default();
                namespaces.push(NamespaceDeclaration::new(prefix, namespace));
            }
            let octet = self.reader.read_octet()?;
            if octet & 0xC0 != 0 {
                return Err(self.reader.unexpected(octet, "element name").into());
            }
            octet
        } else {
            first & 0x3F
        };

        let header = NameHeader::read_element(name_octet, &mut self.reader)?;
        let name = resolve_name(&mut self.vocabulary, NameKind::Element, header)?;
        tracing::trace!(%name, depth = self.depth, "element");

        let mut attributes = Vec::new();
        let mut closed = false;
        if has_attributes {
            loop {
                let octet = self.reader.read_octet()?;
                match octet {
                    item::TERMINATOR => break,
                    item::DOUBLE_TERMINATOR => {
                        closed = true;
                        break;
                    }
                    _ => {}
                }
                let header = NameHeader::read_attribute(octet, &mut self.reader)?;
                let name = resolve_name(&mut self.vocabulary, NameKind::Attribute, header)?;
                let component = ComponentHeader::read_non_identifying(&mut self.reader)?;
                let value =
                    resolve_content(self.codec, &mut self.vocabulary.attribute_values, component)?;
                tracing::trace!(%name, "attribute");
                attributes.push(Attribute { name, value });
            }
        }

        self.events.push(InfosetEvent::StartElement {
            name,
            namespaces,
            attributes,
        });
        if closed {
            self.events.push(InfosetEvent::EndElement);
        } else {
            self.depth += 1;
        }
        Ok(())
    }

    fn characters(&mut self, first: u8) -> Result<()> {
        let component = ComponentHeader::read_chunk(first, &mut self.reader)?;
        let content = resolve_content(
            self.codec,
            &mut self.vocabulary.character_content_chunks,
            component,
        )?;
        tracing::trace!(depth = self.depth, "character chunk");
        self.events.push(InfosetEvent::Characters(content));
        Ok(())
    }

    fn comment(&mut self) -> Result<()> {
        let component = ComponentHeader::read_non_identifying(&mut self.reader)?;
        let content = resolve_content(self.codec, &mut self.vocabulary.other_strings, component)?;
        self.events
            .push(InfosetEvent::Comment(content_text(self.codec, content)?));
        Ok(())
    }

    fn processing_instruction(&mut self) -> Result<()> {
        let target = ComponentHeader::read_identifying(&mut self.reader)?;
        let target = resolve_identifying(&mut self.vocabulary.other_ncnames, target)?;
        let data = ComponentHeader::read_non_identifying(&mut self.reader)?;
        let data = resolve_content(self.codec, &mut self.vocabulary.other_strings, data)?;
        self.events.push(InfosetEvent::ProcessingInstruction {
            target,
            data: content_text(self.codec, data)?,
        });
        Ok(())
    }
}

fn resolve_identifying(
    table: &mut VocabularyTable<String>,
    component: ComponentHeader,
) -> Result<String> {
    match component {
        ComponentHeader::Literal { value, .. } => {
            if !table.is_full() {
                table.add(value.clone())?;
            }
            Ok(value)
        }
        ComponentHeader::Indexed(index) => Ok(table.get(index)?.clone()),
        ComponentHeader::AlgorithmEncoded { .. } | ComponentHeader::AlphabetEncoded { .. } => {
            Err(FormatError::UnsupportedRepresentation {
                context: "identifying string",
                representation: "encoded octets",
            }
            .into())
        }
    }
}

fn names_mut(vocabulary: &mut Vocabulary, kind: NameKind) -> &mut VocabularyTable<QualifiedName> {
    match kind {
        NameKind::Element => &mut vocabulary.element_names,
        NameKind::Attribute => &mut vocabulary.attribute_names,
    }
}

fn resolve_name(
    vocabulary: &mut Vocabulary,
    kind: NameKind,
    header: NameHeader,
) -> Result<QualifiedName> {
    match header {
        NameHeader::Indexed(index) => Ok(names_mut(vocabulary, kind).get(index)?.clone()),
        NameHeader::Literal {
            prefix,
            namespace,
            local,
        } => {
            let prefix = prefix
                .map(|c| resolve_identifying(&mut vocabulary.prefixes, c))
                .transpose()?
                .unwrap_or_default();
            let namespace = namespace
                .map(|c| resolve_identifying(&mut vocabulary.namespace_names, c))
                .transpose()?
                .unwrap_or_default();
            let local = resolve_identifying(&mut vocabulary.local_names, local)?;

            let name = QualifiedName::new(prefix, namespace, local);
            let names = names_mut(vocabulary, kind);
            if !names.is_full() {
                names.add(name.clone())?;
            }
            Ok(name)
        }
    }
}

/// Turn a non-identifying component into content, adding it when flagged
///
/// Typed and restricted values are added in their character form. A full
/// table ignores the flag.
fn resolve_content(
    codec: &Codec,
    table: &mut VocabularyTable<String>,
    component: ComponentHeader,
) -> Result<CharacterContent> {
    let full = table.is_full();
    match component {
        ComponentHeader::Literal {
            value,
            add_to_table,
        } => {
            if add_to_table && !full {
                table.add(value.clone())?;
            }
            Ok(CharacterContent::Text(value))
        }
        ComponentHeader::Indexed(index) => Ok(CharacterContent::Text(table.get(index)?.clone())),
        ComponentHeader::AlgorithmEncoded {
            id,
            octets,
            add_to_table,
        } => match codec.algorithms().lookup(id) {
            Ok(algorithm) => {
                let value = algorithm.decode_from_octets(&octets)?;
                if add_to_table && !full {
                    table.add(algorithm.to_text(&value)?)?;
                }
                Ok(CharacterContent::Typed {
                    algorithm: id,
                    value,
                })
            }
            Err(err @ AlgorithmError::UnknownAlgorithm(_)) => {
                opaque(codec, OpaqueKind::Algorithm, id, octets, add_to_table, err.into())
            }
            Err(err) => Err(err.into()),
        },
        ComponentHeader::AlphabetEncoded {
            id,
            octets,
            add_to_table,
        } => match codec.alphabets().decode(id, &octets) {
            Ok(text) => {
                if add_to_table && !full {
                    table.add(text.clone())?;
                }
                Ok(CharacterContent::Restricted { alphabet: id, text })
            }
            Err(err @ AlphabetError::UnknownAlphabet(_)) => {
                opaque(codec, OpaqueKind::Alphabet, id, octets, add_to_table, err.into())
            }
            Err(err) => Err(err.into()),
        },
    }
}

/// Apply the unknown-representation policy to undecodable octets
fn opaque(
    codec: &Codec,
    kind: OpaqueKind,
    id: u8,
    octets: Vec<u8>,
    add_to_table: bool,
    err: CodecError,
) -> Result<CharacterContent> {
    if codec.config().unknown_representation != UnknownRepresentationPolicy::Opaque {
        return Err(err);
    }
    if add_to_table {
        // the table entry would be the character form, which is unknown
        return Err(FormatError::UnsupportedRepresentation {
            context: "indexed content",
            representation: "opaque octets",
        }
        .into());
    }
    tracing::warn!(?kind, id, octets = octets.len(), "passing through opaque content");
    Ok(CharacterContent::Opaque { kind, id, octets })
}

/// Character form of content that must be a plain string
fn content_text(codec: &Codec, content: CharacterContent) -> Result<String> {
    match content {
        CharacterContent::Text(text) | CharacterContent::Restricted { text, .. } => Ok(text),
        CharacterContent::Typed { algorithm, value } => {
            Ok(codec.algorithms().lookup(algorithm)?.to_text(&value)?)
        }
        CharacterContent::Opaque { kind, id, .. } => Err(match kind {
            OpaqueKind::Algorithm => AlgorithmError::UnknownAlgorithm(id).into(),
            OpaqueKind::Alphabet => AlphabetError::UnknownAlphabet(id).into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::vocabulary::VocabularyError;

    const PREAMBLE: [u8; 5] = [0xE0, 0x00, 0x00, 0x01, 0x00];

    fn document(body: &[u8]) -> Vec<u8> {
        let mut data = PREAMBLE.to_vec();
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn test_decode_empty_element() {
        let codec = Codec::default();
        let events = codec.decode(&document(&[0x3C, 0x00, b'a', 0xFF])).unwrap();
        assert_eq!(
            events,
            vec![
                InfosetEvent::StartDocument(DocumentHeader::default()),
                InfosetEvent::start(QualifiedName::local("a")),
                InfosetEvent::EndElement,
                InfosetEvent::EndDocument,
            ]
        );
    }

    #[test]
    fn test_attribute_list_double_terminator_closes_element() {
        let codec = Codec::default();
        let data = document(&[0x7C, 0x00, b'a', 0x78, 0x00, b'b', 0x40, b'c', 0xFF, 0xF0]);
        let events = codec.decode(&data).unwrap();
        assert_eq!(events.len(), 4);
        match &events[1] {
            InfosetEvent::StartElement { attributes, .. } => {
                assert_eq!(
                    attributes,
                    &vec![Attribute::new(QualifiedName::local("b"), "c")]
                );
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_index_out_of_range_rejected() {
        let codec = Codec::default();
        // element name index 3 before any name was added
        let result = codec.decode(&document(&[0x03, 0xFF]));
        assert!(matches!(
            result,
            Err(CodecError::Vocabulary(VocabularyError::OutOfRange { index: 3, .. }))
        ));
    }

    #[test]
    fn test_double_terminator_at_document_level_rejected() {
        let codec = Codec::default();
        assert!(codec.decode(&document(&[0xFF])).is_err());
        assert_eq!(codec.decode(&document(&[0xF0])).unwrap().len(), 2);
    }

    #[test]
    fn test_trailing_data_rejected() {
        let codec = Codec::default();
        let result = codec.decode(&document(&[0xF0, 0x00]));
        assert!(matches!(
            result,
            Err(CodecError::Format(FormatError::TrailingData(1)))
        ));
    }

    #[test]
    fn test_truncated_document_rejected() {
        let codec = Codec::default();
        let result = codec.decode(&document(&[0x3C, 0x00, b'a']));
        assert!(matches!(
            result,
            Err(CodecError::Format(FormatError::UnexpectedEof { .. }))
        ));
    }

    #[test]
    fn test_chunk_at_document_level_rejected() {
        let codec = Codec::default();
        let result = codec.decode(&document(&[0x80, b'x', 0xF0]));
        assert!(matches!(
            result,
            Err(CodecError::Format(FormatError::UnexpectedOctet { .. }))
        ));
    }

    #[test]
    fn test_unknown_external_vocabulary() {
        let codec = Codec::default();
        let mut data = vec![0xE0, 0x00, 0x00, 0x01, 0x20, 0x10, 0x00, 0x02];
        data.extend_from_slice(b"urn");
        data.push(0xF0);
        assert!(matches!(
            codec.decode(&data),
            Err(CodecError::Format(FormatError::UnknownExternalVocabulary(_)))
        ));
    }

    #[test]
    fn test_unknown_algorithm_policy() {
        // element "a" holding a chunk encoded with unregistered algorithm 40
        let body = [0x3C, 0x00, b'a', 0x8C, 0xA1, 0x01, 0x02, 0xFF];

        let strict = Codec::default();
        assert!(matches!(
            strict.decode(&document(&body)),
            Err(CodecError::Algorithm(AlgorithmError::UnknownAlgorithm(40)))
        ));

        let config = CodecConfig {
            unknown_representation: UnknownRepresentationPolicy::Opaque,
            ..Default::default()
        };
        let lenient = Codec::builder().config(config).build().unwrap();
        let events = lenient.decode(&document(&body)).unwrap();
        assert_eq!(
            events[2],
            InfosetEvent::Characters(CharacterContent::Opaque {
                kind: OpaqueKind::Algorithm,
                id: 40,
                octets: vec![0x01, 0x02],
            })
        );
    }
}
