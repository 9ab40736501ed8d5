// SPDX-License-Identifier: MIT
//! Event-driven encoder on top of the low-level writer

use std::io::Write;

use crate::codec::Codec;
use crate::error::{CodecError, Result};
use crate::event::{Attribute, CharacterContent, InfosetEvent, NamespaceDeclaration};
use crate::name::QualifiedName;
use crate::namespace::{NamespaceContext, NamespaceError};
use crate::writer::{LowLevelWriter, ProtocolError};

/// Encodes a stream of [`InfosetEvent`]s
///
/// Names that carry only a prefix are resolved against the namespace
/// declarations seen so far; unprefixed element names without a namespace
/// take the default namespace in scope.
pub struct InfosetEncoder<'c, W: Write> {
    writer: LowLevelWriter<'c, W>,
    namespaces: NamespaceContext,
    ended: bool,
}

impl<'c, W: Write> InfosetEncoder<'c, W> {
    pub fn new(codec: &'c Codec, sink: W) -> Self {
        Self {
            writer: LowLevelWriter::new(codec, sink),
            namespaces: NamespaceContext::new(),
            ended: false,
        }
    }

    /// The underlying writer, for inspecting its tables
    pub fn writer(&self) -> &LowLevelWriter<'c, W> {
        &self.writer
    }

    pub fn write_event(&mut self, event: &InfosetEvent) -> Result<()> {
        if self.ended {
            return Err(ProtocolError::UnexpectedCall {
                operation: "write_event",
                state: "after the end of the document",
            }
            .into());
        }

        match event {
            InfosetEvent::StartDocument(header) => {
                self.writer.start_document(header)?;
                self.writer.initiate_low_level_writing()
            }
            InfosetEvent::StartElement {
                name,
                namespaces,
                attributes,
            } => self.start_element(name, namespaces, attributes),
            InfosetEvent::Characters(content) => self.characters(content),
            InfosetEvent::Comment(text) => {
                if self.writer.codec().config().ignore_comments {
                    return Ok(());
                }
                self.writer.comment(text)
            }
            InfosetEvent::ProcessingInstruction { target, data } => {
                if self.writer.codec().config().ignore_processing_instructions {
                    return Ok(());
                }
                self.writer.processing_instruction(target, data)
            }
            InfosetEvent::EndElement => {
                self.writer.end_element()?;
                self.namespaces.pop_context()?;
                Ok(())
            }
            InfosetEvent::EndDocument => {
                self.ended = true;
                Ok(())
            }
        }
    }

    /// End the document and hand back the sink
    pub fn finish(self) -> Result<W> {
        self.writer.end_document()
    }

    fn start_element(
        &mut self,
        name: &QualifiedName,
        declarations: &[NamespaceDeclaration],
        attributes: &[Attribute],
    ) -> Result<()> {
        self.namespaces.push_context();
        for declaration in declarations {
            self.namespaces
                .declare_prefix(&declaration.prefix, &declaration.namespace)?;
        }
        let element = self.resolve(name, true)?;

        self.writer.termination_and_mark()?;
        if !declarations.is_empty() {
            self.writer.start_namespaces()?;
            for declaration in declarations {
                self.writer
                    .namespace(&declaration.prefix, &declaration.namespace)?;
            }
            self.writer.end_namespaces()?;
        }
        self.writer.start_element(&element)?;

        if !attributes.is_empty() {
            self.writer.start_attributes()?;
            for attribute in attributes {
                let name = self.resolve(&attribute.name, false)?;
                self.writer.attribute(&name)?;
                self.attribute_value(&attribute.value)?;
            }
        }
        self.writer.end_start_element()
    }

    /// Fill in the namespace of a name that carries only a prefix
    fn resolve(&self, name: &QualifiedName, is_element: bool) -> Result<QualifiedName> {
        if name.has_namespace() {
            return Ok(name.clone());
        }
        if name.has_prefix() {
            let uri = self.namespaces.get_namespace_uri(&name.prefix);
            if uri.is_empty() {
                return Err(NamespaceError::UnboundPrefix(name.prefix.clone()).into());
            }
            return Ok(QualifiedName::new(&name.prefix, uri, &name.local));
        }
        if is_element {
            let uri = self.namespaces.get_namespace_uri("");
            if !uri.is_empty() {
                return Ok(QualifiedName::namespaced(uri, &name.local));
            }
        }
        Ok(name.clone())
    }

    fn attribute_value(&mut self, value: &CharacterContent) -> Result<()> {
        match value {
            CharacterContent::Text(text) => self.writer.attribute_value(text),
            CharacterContent::Restricted { alphabet, text } => {
                match self.writer.attribute_value_restricted(*alphabet, text) {
                    Err(err) if falls_back(&err) => {
                        tracing::debug!(alphabet, error = %err, "attribute value written as literal");
                        self.writer.attribute_value(text)
                    }
                    other => other,
                }
            }
            CharacterContent::Typed { algorithm, value } => {
                self.writer.attribute_value_typed(*algorithm, value)
            }
            CharacterContent::Opaque { kind, id, octets } => {
                self.writer.attribute_value_encoded(*kind, *id, octets)
            }
        }
    }

    fn characters(&mut self, content: &CharacterContent) -> Result<()> {
        if self.writer.codec().config().ignore_whitespace_text && content.is_whitespace() {
            return Ok(());
        }
        match content {
            CharacterContent::Text(text) => self.writer.text(text),
            CharacterContent::Restricted { alphabet, text } => {
                match self.writer.restricted_text(*alphabet, text) {
                    Err(err) if falls_back(&err) => {
                        tracing::debug!(alphabet, error = %err, "content written as literal");
                        self.writer.text(text)
                    }
                    other => other,
                }
            }
            CharacterContent::Typed { algorithm, value } => {
                self.writer.typed_content(*algorithm, value)
            }
            CharacterContent::Opaque { kind, id, octets } => {
                self.writer.encoded_content(*kind, *id, octets)
            }
        }
    }
}

/// Restricted-alphabet failures that leave the writer usable
fn falls_back(err: &CodecError) -> bool {
    matches!(err, CodecError::Alphabet(_)) && err.is_recoverable()
}
