// SPDX-License-Identifier: MIT
//! Low-level streaming writer
//!
//! The writer enforces the call sequence of a document and renders each call
//! straight to octets. Callers that already know table indices (two-pass
//! encoders, generated serializers) can bypass name lookups entirely.
//!
//! ```text
//! start_document initiate_low_level_writing
//!   ( termination_and_mark
//!       [ start_namespaces namespace* end_namespaces ]
//!       ( start_element_indexed | start_element | start_name_literal(Element) )
//!       [ start_attributes
//!           ( ( attribute_indexed | attribute | start_name_literal(Attribute) )
//!             attribute_value* )*          -- exactly one value per attribute
//!       ]
//!     end_start_element
//!       ( text | octets | typed_content | restricted_text | comment
//!       | processing_instruction | <nested element> )*
//!     end_element
//!   | comment | processing_instruction )*
//! end_document
//! ```
//!
//! Calling a method out of sequence is a [`ProtocolError`] and leaves the
//! writer poisoned: every later call fails. Errors raised before an item
//! reaches the output (a character outside a restricted alphabet, an unknown
//! algorithm, a duplicate table entry) leave the writer where it was.

use std::io::Write;

use crate::algorithm::{AlgorithmValue, BuiltinAlgorithm};
use crate::codec::Codec;
use crate::error::{CodecError, Result};
use crate::event::OpaqueKind;
use crate::format::{components, item, DocumentHeader};
use crate::header::integer::write_length_second_bit;
use crate::header::{write_namespace_attribute, CharacterEncoding, ComponentHeader, NameHeader};
use crate::name::QualifiedName;
use crate::vocabulary::{TableKind, Vocabulary, VocabularyError, VocabularyTable};

/// Buffered octets are handed to the sink once this many accumulate
const FLUSH_THRESHOLD: usize = 16 * 1024;

/// Errors raised by calls made out of sequence
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("{operation} is not allowed {state}")]
    UnexpectedCall {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Writer is unusable after an earlier error")]
    Poisoned,

    #[error("Document ended with {0} open elements")]
    UnclosedElements(usize),
}

/// Whether a literal name belongs to an element or an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Element,
    Attribute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Idle,
    DocumentStarted,
    Content,
    Marked,
    Namespaces,
    NamespacesDeclared,
    NameWritten,
    Attributes { awaiting_value: bool },
    Poisoned,
}

impl WriterState {
    fn describe(self) -> &'static str {
        match self {
            WriterState::Idle => "before the document is started",
            WriterState::DocumentStarted => "before low-level writing is initiated",
            WriterState::Content => "in element content",
            WriterState::Marked => "right after termination and mark",
            WriterState::Namespaces => "inside namespace declarations",
            WriterState::NamespacesDeclared => "after namespace declarations",
            WriterState::NameWritten => "after the element name",
            WriterState::Attributes {
                awaiting_value: true,
            } => "while an attribute value is pending",
            WriterState::Attributes { .. } => "inside attributes",
            WriterState::Poisoned => "after an earlier error",
        }
    }
}

/// Terminations are held back so two in a row fuse into one octet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    None,
    Single,
    Double,
}

fn identifying(table: &VocabularyTable<String>, value: &str) -> ComponentHeader {
    match table.wire_index(value) {
        Some(index) => ComponentHeader::Indexed(index),
        None => ComponentHeader::literal(value, true),
    }
}

/// Add a literal the decoder is told to add; returns the bytes added
///
/// A full table takes no more entries, matching the decoder.
fn record(
    table: &mut VocabularyTable<String>,
    component: &ComponentHeader,
) -> std::result::Result<usize, VocabularyError> {
    if !component.adds_to_table() || table.is_full() {
        return Ok(0);
    }
    match component {
        ComponentHeader::Literal { value, .. } => {
            table.add(value.clone())?;
            Ok(value.len())
        }
        _ => Ok(0),
    }
}

/// Streaming writer for one document
pub struct LowLevelWriter<'c, W: Write> {
    codec: &'c Codec,
    sink: W,
    buffer: Vec<u8>,
    scratch: Vec<u8>,
    vocabulary: Vocabulary,
    state: WriterState,
    depth: usize,
    termination: Termination,
    mark: Option<usize>,
    chunk_bytes: usize,
    attribute_value_bytes: usize,
}

impl<'c, W: Write> LowLevelWriter<'c, W> {
    pub fn new(codec: &'c Codec, sink: W) -> Self {
        Self {
            codec,
            sink,
            buffer: Vec::with_capacity(FLUSH_THRESHOLD),
            scratch: Vec::with_capacity(64),
            vocabulary: Vocabulary::for_document(codec.initial_vocabulary().map(|v| v.as_ref())),
            state: WriterState::Idle,
            depth: 0,
            termination: Termination::None,
            mark: None,
            chunk_bytes: 0,
            attribute_value_bytes: 0,
        }
    }

    pub fn codec(&self) -> &'c Codec {
        self.codec
    }

    /// Number of open elements
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.state == WriterState::Poisoned
    }

    fn state_description(&self) -> &'static str {
        if self.state == WriterState::Content && self.depth == 0 {
            "at document level"
        } else {
            self.state.describe()
        }
    }

    #[inline]
    fn in_element_content(&self) -> bool {
        self.state == WriterState::Content && self.depth > 0
    }

    /// Check the call is legal here; poisons the writer if not
    fn check_call(&mut self, operation: &'static str, allowed: bool) -> Result<()> {
        if self.state == WriterState::Poisoned {
            return Err(ProtocolError::Poisoned.into());
        }
        if !allowed {
            let state = self.state_description();
            tracing::debug!(operation, state, "writer protocol violation");
            self.state = WriterState::Poisoned;
            return Err(ProtocolError::UnexpectedCall { operation, state }.into());
        }
        Ok(())
    }

    /// Poison on failures that happen after octets were committed
    fn poison_on_error<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.state = WriterState::Poisoned;
        }
        result
    }

    #[inline]
    fn encoding(&self) -> CharacterEncoding {
        self.codec.config().character_encoding
    }

    fn indexed_bytes(&self, table: TableKind) -> usize {
        match table {
            TableKind::CharacterContentChunk => self.chunk_bytes,
            TableKind::AttributeValue => self.attribute_value_bytes,
            _ => 0,
        }
    }

    /// Index if present, otherwise a literal added when the policy agrees
    fn non_identifying(&self, table: &VocabularyTable<String>, value: &str) -> ComponentHeader {
        if let Some(index) = table.wire_index(value) {
            return ComponentHeader::Indexed(index);
        }
        let add_to_table = !value.is_empty()
            && !table.is_full()
            && self.codec.indexing_policy().should_index(
                table.kind(),
                value,
                self.indexed_bytes(table.kind()),
            );
        ComponentHeader::literal(value, add_to_table)
    }

    fn take_scratch(&mut self) -> Vec<u8> {
        let mut out = std::mem::take(&mut self.scratch);
        out.clear();
        out
    }

    fn terminate(&mut self) {
        self.termination = match self.termination {
            Termination::None => Termination::Single,
            Termination::Single => Termination::Double,
            Termination::Double => {
                self.buffer.push(item::DOUBLE_TERMINATOR);
                Termination::Single
            }
        };
    }

    fn flush_termination(&mut self) {
        match self.termination {
            Termination::None => {}
            Termination::Single => self.buffer.push(item::TERMINATOR),
            Termination::Double => self.buffer.push(item::DOUBLE_TERMINATOR),
        }
        self.termination = Termination::None;
    }

    /// Append a fully encoded item after any pending termination
    fn commit(&mut self, out: Vec<u8>) -> Result<()> {
        self.flush_termination();
        self.buffer.extend_from_slice(&out);
        self.scratch = out;
        self.flush_if_needed()
    }

    fn flush_if_needed(&mut self) -> Result<()> {
        if self.mark.is_some() || self.buffer.len() < FLUSH_THRESHOLD {
            return Ok(());
        }
        let result = self.sink.write_all(&self.buffer).map_err(CodecError::from);
        self.buffer.clear();
        self.poison_on_error(result)
    }

    /// Write the identification and optional document components
    ///
    /// The external vocabulary reference is taken from the codec's initial
    /// vocabulary; whatever `header` says about it is ignored.
    pub fn start_document(&mut self, header: &DocumentHeader) -> Result<()> {
        self.check_call("start_document", self.state == WriterState::Idle)?;

        let header = DocumentHeader {
            external_vocabulary: self
                .codec
                .initial_vocabulary()
                .and_then(|v| v.external_uri())
                .map(str::to_string),
            ..header.clone()
        };

        let mut out = self.take_scratch();
        header.write_preamble(&mut out);
        if let Some(uri) = &header.external_vocabulary {
            out.push(components::EXTERNAL_VOCABULARY);
            out.push(0x00);
            write_length_second_bit(&mut out, 0x00, uri.len())?;
            out.extend_from_slice(uri.as_bytes());
        }
        if let Some(standalone) = header.standalone {
            out.push(standalone as u8);
        }
        let version = header
            .version
            .as_deref()
            .map(|version| self.non_identifying(&self.vocabulary.other_strings, version));
        if let Some(version) = &version {
            version.write_non_identifying(&mut out, self.encoding())?;
        }

        self.commit(out)?;
        if let Some(version) = &version {
            let result = record(&mut self.vocabulary.other_strings, version).map_err(Into::into);
            self.poison_on_error(result)?;
        }

        tracing::debug!(
            external_vocabulary = ?header.external_vocabulary,
            standalone = ?header.standalone,
            "started document"
        );
        self.state = WriterState::DocumentStarted;
        Ok(())
    }

    /// One-time switch into item writing; must follow `start_document`
    pub fn initiate_low_level_writing(&mut self) -> Result<()> {
        self.check_call(
            "initiate_low_level_writing",
            self.state == WriterState::DocumentStarted,
        )?;
        self.state = WriterState::Content;
        Ok(())
    }

    /// Reserve the element-name index the next new element name will take
    pub fn get_next_element_index(&mut self) -> usize {
        self.vocabulary.element_names.reserve()
    }

    /// Reserve the attribute-name index the next new attribute name will take
    pub fn get_next_attribute_index(&mut self) -> usize {
        self.vocabulary.attribute_names.reserve()
    }

    /// Reserve the local-name index the next new local name will take
    pub fn get_next_local_name_index(&mut self) -> usize {
        self.vocabulary.local_names.reserve()
    }

    pub fn get_local_name_index(&self, local_name: &str) -> Option<usize> {
        self.vocabulary.local_names.wire_index(local_name)
    }

    /// Close whatever is pending and mark the start of a new element
    pub fn termination_and_mark(&mut self) -> Result<()> {
        self.check_call("termination_and_mark", self.state == WriterState::Content)?;
        self.flush_termination();
        self.mark = Some(self.buffer.len());
        self.state = WriterState::Marked;
        Ok(())
    }

    pub fn start_namespaces(&mut self) -> Result<()> {
        self.check_call("start_namespaces", self.state == WriterState::Marked)?;
        self.buffer.push(item::ELEMENT_NAMESPACES);
        self.state = WriterState::Namespaces;
        Ok(())
    }

    /// Declare `prefix` (empty for the default namespace) bound to `namespace`
    pub fn namespace(&mut self, prefix: &str, namespace: &str) -> Result<()> {
        self.check_call("namespace", self.state == WriterState::Namespaces)?;

        let prefix = (!prefix.is_empty()).then(|| identifying(&self.vocabulary.prefixes, prefix));
        let namespace = (!namespace.is_empty())
            .then(|| identifying(&self.vocabulary.namespace_names, namespace));

        let mut out = self.take_scratch();
        write_namespace_attribute(&mut out, prefix.as_ref(), namespace.as_ref())?;
        self.commit(out)?;

        let result = self.record_name_parts(prefix.as_ref(), namespace.as_ref(), None);
        self.poison_on_error(result)
    }

    pub fn end_namespaces(&mut self) -> Result<()> {
        self.check_call("end_namespaces", self.state == WriterState::Namespaces)?;
        self.buffer.push(item::TERMINATOR);
        self.state = WriterState::NamespacesDeclared;
        Ok(())
    }

    #[inline]
    fn expects_element_name(&self) -> bool {
        matches!(
            self.state,
            WriterState::Marked | WriterState::NamespacesDeclared
        )
    }

    /// Write an element name by its element-name table index
    pub fn start_element_indexed(&mut self, index: usize) -> Result<()> {
        self.check_call("start_element_indexed", self.expects_element_name())?;
        self.vocabulary.element_names.ensure_established(index)?;

        let mut out = self.take_scratch();
        NameHeader::Indexed(index).write_element(&mut out, 0x00)?;
        self.commit(out)?;
        tracing::trace!(index, "element name indexed");
        self.state = WriterState::NameWritten;
        Ok(())
    }

    /// Write an element name, by index when already known
    ///
    /// Returns `true` when the name was written as an index.
    pub fn start_element(&mut self, name: &QualifiedName) -> Result<bool> {
        self.check_call("start_element", self.expects_element_name())?;

        let indexed = match self.vocabulary.element_names.wire_index(name) {
            Some(index) => {
                let mut out = self.take_scratch();
                NameHeader::Indexed(index).write_element(&mut out, 0x00)?;
                self.commit(out)?;
                true
            }
            None => {
                let local = identifying(&self.vocabulary.local_names, &name.local);
                self.write_literal_name(NameKind::Element, name.clone(), local)?;
                false
            }
        };
        tracing::trace!(%name, indexed, "element name");
        self.state = WriterState::NameWritten;
        Ok(indexed)
    }

    /// Write a new literal name whose local part is already in the local-name table
    pub fn start_name_literal(
        &mut self,
        kind: NameKind,
        prefix: &str,
        namespace: &str,
        local_name_index: usize,
    ) -> Result<()> {
        let allowed = match kind {
            NameKind::Element => self.expects_element_name(),
            NameKind::Attribute => self.expects_attribute_name(),
        };
        self.check_call("start_name_literal", allowed)?;

        let local = self.vocabulary.local_names.get(local_name_index)?.clone();
        let name = QualifiedName::new(prefix, namespace, local);
        let names = match kind {
            NameKind::Element => &self.vocabulary.element_names,
            NameKind::Attribute => &self.vocabulary.attribute_names,
        };
        if names.contains(&name) {
            return Err(VocabularyError::DuplicateEntry {
                table: names.kind(),
                value: name.to_string(),
            }
            .into());
        }

        self.write_literal_name(kind, name, ComponentHeader::Indexed(local_name_index))?;
        self.state = match kind {
            NameKind::Element => WriterState::NameWritten,
            NameKind::Attribute => WriterState::Attributes {
                awaiting_value: true,
            },
        };
        Ok(())
    }

    fn write_literal_name(
        &mut self,
        kind: NameKind,
        name: QualifiedName,
        local: ComponentHeader,
    ) -> Result<()> {
        let prefix = name
            .has_prefix()
            .then(|| identifying(&self.vocabulary.prefixes, &name.prefix));
        let namespace = name
            .has_namespace()
            .then(|| identifying(&self.vocabulary.namespace_names, &name.namespace));
        let header = NameHeader::Literal {
            prefix,
            namespace,
            local,
        };

        let mut out = self.take_scratch();
        match kind {
            NameKind::Element => header.write_element(&mut out, 0x00)?,
            NameKind::Attribute => header.write_attribute(&mut out)?,
        }
        self.commit(out)?;

        let result = match &header {
            NameHeader::Literal {
                prefix,
                namespace,
                local,
            } => self.record_name_parts(prefix.as_ref(), namespace.as_ref(), Some(local)),
            NameHeader::Indexed(_) => Ok(()),
        }
        .and_then(|()| {
            let names = match kind {
                NameKind::Element => &mut self.vocabulary.element_names,
                NameKind::Attribute => &mut self.vocabulary.attribute_names,
            };
            if names.is_full() {
                return Ok(());
            }
            names.add(name).map(|_| ()).map_err(Into::into)
        });
        self.poison_on_error(result)
    }

    /// Add literal name parts in the order the decoder reads them
    fn record_name_parts(
        &mut self,
        prefix: Option<&ComponentHeader>,
        namespace: Option<&ComponentHeader>,
        local: Option<&ComponentHeader>,
    ) -> Result<()> {
        if let Some(prefix) = prefix {
            record(&mut self.vocabulary.prefixes, prefix)?;
        }
        if let Some(namespace) = namespace {
            record(&mut self.vocabulary.namespace_names, namespace)?;
        }
        if let Some(local) = local {
            record(&mut self.vocabulary.local_names, local)?;
        }
        Ok(())
    }

    /// Flag the marked element as carrying attributes
    pub fn start_attributes(&mut self) -> Result<()> {
        self.check_call("start_attributes", self.state == WriterState::NameWritten)?;
        if let Some(octet) = self.mark.and_then(|mark| self.buffer.get_mut(mark)) {
            *octet |= item::ELEMENT_ATTRIBUTE_FLAG;
        }
        self.state = WriterState::Attributes {
            awaiting_value: false,
        };
        Ok(())
    }

    #[inline]
    fn expects_attribute_name(&self) -> bool {
        self.state
            == WriterState::Attributes {
                awaiting_value: false,
            }
    }

    #[inline]
    fn expects_attribute_value(&self) -> bool {
        self.state
            == WriterState::Attributes {
                awaiting_value: true,
            }
    }

    /// Write an attribute name by its attribute-name table index
    pub fn attribute_indexed(&mut self, index: usize) -> Result<()> {
        self.check_call("attribute_indexed", self.expects_attribute_name())?;
        self.vocabulary.attribute_names.ensure_established(index)?;

        let mut out = self.take_scratch();
        NameHeader::Indexed(index).write_attribute(&mut out)?;
        self.commit(out)?;
        self.state = WriterState::Attributes {
            awaiting_value: true,
        };
        Ok(())
    }

    /// Write an attribute name, by index when already known
    ///
    /// Returns `true` when the name was written as an index.
    pub fn attribute(&mut self, name: &QualifiedName) -> Result<bool> {
        self.check_call("attribute", self.expects_attribute_name())?;

        let indexed = match self.vocabulary.attribute_names.wire_index(name) {
            Some(index) => {
                let mut out = self.take_scratch();
                NameHeader::Indexed(index).write_attribute(&mut out)?;
                self.commit(out)?;
                true
            }
            None => {
                let local = identifying(&self.vocabulary.local_names, &name.local);
                self.write_literal_name(NameKind::Attribute, name.clone(), local)?;
                false
            }
        };
        tracing::trace!(%name, indexed, "attribute name");
        self.state = WriterState::Attributes {
            awaiting_value: true,
        };
        Ok(indexed)
    }

    fn write_attribute_value(&mut self, component: ComponentHeader) -> Result<()> {
        let mut out = self.take_scratch();
        component.write_non_identifying(&mut out, self.encoding())?;
        self.commit(out)?;

        let result = record(&mut self.vocabulary.attribute_values, &component);
        let added = self.poison_on_error(result.map_err(Into::into))?;
        self.attribute_value_bytes += added;
        self.state = WriterState::Attributes {
            awaiting_value: false,
        };
        Ok(())
    }

    pub fn attribute_value(&mut self, value: &str) -> Result<()> {
        self.check_call("attribute_value", self.expects_attribute_value())?;
        let component = self.non_identifying(&self.vocabulary.attribute_values, value);
        self.write_attribute_value(component)
    }

    /// Attribute value encoded with encoding algorithm `algorithm`
    ///
    /// A value that encodes to no octets is written as the empty string.
    pub fn attribute_value_typed(&mut self, algorithm: u8, value: &AlgorithmValue) -> Result<()> {
        self.check_call("attribute_value_typed", self.expects_attribute_value())?;
        let octets = self.codec.algorithms().encode(algorithm, value)?;
        if octets.is_empty() {
            return self.attribute_value("");
        }
        self.write_attribute_value(ComponentHeader::AlgorithmEncoded {
            id: algorithm,
            octets,
            add_to_table: false,
        })
    }

    /// Attribute value packed with restricted alphabet `alphabet`
    ///
    /// Fails without writing anything if a character is outside the alphabet.
    /// Empty text is written as the empty string and reads back as
    /// [`CharacterContent::Text`](crate::event::CharacterContent::Text).
    pub fn attribute_value_restricted(&mut self, alphabet: u8, text: &str) -> Result<()> {
        self.check_call("attribute_value_restricted", self.expects_attribute_value())?;
        if text.is_empty() {
            return self.attribute_value(text);
        }
        let octets = self.codec.alphabets().encode(alphabet, text)?;
        self.write_attribute_value(ComponentHeader::AlphabetEncoded {
            id: alphabet,
            octets,
            add_to_table: false,
        })
    }

    /// Attribute value from octets produced elsewhere, written unchecked
    pub fn attribute_value_encoded(&mut self, kind: OpaqueKind, id: u8, octets: &[u8]) -> Result<()> {
        self.check_call("attribute_value_encoded", self.expects_attribute_value())?;
        self.write_attribute_value(encoded_component(kind, id, octets))
    }

    /// Finish the start of the element; content follows
    pub fn end_start_element(&mut self) -> Result<()> {
        let allowed = self.state == WriterState::NameWritten || self.expects_attribute_name();
        self.check_call("end_start_element", allowed)?;
        if self.expects_attribute_name() {
            self.terminate();
        }
        self.mark = None;
        self.depth += 1;
        self.state = WriterState::Content;
        self.flush_if_needed()
    }

    pub fn end_element(&mut self) -> Result<()> {
        self.check_call("end_element", self.in_element_content())?;
        self.terminate();
        self.depth -= 1;
        tracing::trace!(depth = self.depth, "end element");
        self.flush_if_needed()
    }

    fn write_chunk(&mut self, component: ComponentHeader) -> Result<()> {
        let mut out = self.take_scratch();
        component.write_chunk(&mut out, self.encoding())?;
        tracing::trace!(octets = out.len(), "character chunk");
        self.commit(out)?;

        let result = record(&mut self.vocabulary.character_content_chunks, &component);
        let added = self.poison_on_error(result.map_err(Into::into))?;
        self.chunk_bytes += added;
        Ok(())
    }

    /// Character content; empty text writes nothing
    pub fn text(&mut self, text: &str) -> Result<()> {
        self.check_call("text", self.in_element_content())?;
        if text.is_empty() {
            return Ok(());
        }
        let component = self.non_identifying(&self.vocabulary.character_content_chunks, text);
        self.write_chunk(component)
    }

    /// Binary content, written with the base64 algorithm
    pub fn octets(&mut self, data: &[u8]) -> Result<()> {
        self.typed_content(BuiltinAlgorithm::Base64.id(), &AlgorithmValue::Octets(data.to_vec()))
    }

    /// Content encoded with encoding algorithm `algorithm`
    ///
    /// A value that encodes to no octets writes nothing.
    pub fn typed_content(&mut self, algorithm: u8, value: &AlgorithmValue) -> Result<()> {
        self.check_call("typed_content", self.in_element_content())?;
        let octets = self.codec.algorithms().encode(algorithm, value)?;
        if octets.is_empty() {
            return Ok(());
        }
        self.write_chunk(ComponentHeader::AlgorithmEncoded {
            id: algorithm,
            octets,
            add_to_table: false,
        })
    }

    /// Content packed with restricted alphabet `alphabet`
    ///
    /// Fails without writing anything if a character is outside the alphabet.
    /// Empty text writes nothing.
    pub fn restricted_text(&mut self, alphabet: u8, text: &str) -> Result<()> {
        self.check_call("restricted_text", self.in_element_content())?;
        if text.is_empty() {
            return Ok(());
        }
        let octets = self.codec.alphabets().encode(alphabet, text)?;
        self.write_chunk(ComponentHeader::AlphabetEncoded {
            id: alphabet,
            octets,
            add_to_table: false,
        })
    }

    /// Content from octets produced elsewhere, written unchecked
    pub fn encoded_content(&mut self, kind: OpaqueKind, id: u8, octets: &[u8]) -> Result<()> {
        self.check_call("encoded_content", self.in_element_content())?;
        self.write_chunk(encoded_component(kind, id, octets))
    }

    pub fn comment(&mut self, text: &str) -> Result<()> {
        self.check_call("comment", self.state == WriterState::Content)?;

        let component = self.non_identifying(&self.vocabulary.other_strings, text);
        let mut out = self.take_scratch();
        out.push(item::COMMENT);
        component.write_non_identifying(&mut out, self.encoding())?;
        self.commit(out)?;

        let result = record(&mut self.vocabulary.other_strings, &component).map_err(Into::into);
        self.poison_on_error(result).map(|_| ())
    }

    pub fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        self.check_call("processing_instruction", self.state == WriterState::Content)?;

        let target = identifying(&self.vocabulary.other_ncnames, target);
        let data = self.non_identifying(&self.vocabulary.other_strings, data);
        let mut out = self.take_scratch();
        out.push(item::PROCESSING_INSTRUCTION);
        target.write_identifying(&mut out)?;
        data.write_non_identifying(&mut out, self.encoding())?;
        self.commit(out)?;

        let result = record(&mut self.vocabulary.other_ncnames, &target)
            .and_then(|_| record(&mut self.vocabulary.other_strings, &data))
            .map_err(Into::into);
        self.poison_on_error(result).map(|_| ())
    }

    /// Terminate the document and hand back the sink
    pub fn end_document(mut self) -> Result<W> {
        if self.state == WriterState::Content && self.depth > 0 {
            self.state = WriterState::Poisoned;
            return Err(ProtocolError::UnclosedElements(self.depth).into());
        }
        self.check_call("end_document", self.state == WriterState::Content)?;

        self.terminate();
        self.flush_termination();
        self.sink.write_all(&self.buffer)?;
        self.sink.flush()?;
        tracing::debug!(
            element_names = self.vocabulary.element_names.len(),
            attribute_names = self.vocabulary.attribute_names.len(),
            "ended document"
        );
        Ok(self.sink)
    }
}

fn encoded_component(kind: OpaqueKind, id: u8, octets: &[u8]) -> ComponentHeader {
    match kind {
        OpaqueKind::Algorithm => ComponentHeader::AlgorithmEncoded {
            id,
            octets: octets.to_vec(),
            add_to_table: false,
        },
        OpaqueKind::Alphabet => ComponentHeader::AlphabetEncoded {
            id,
            octets: octets.to_vec(),
            add_to_table: false,
        },
    }
}
