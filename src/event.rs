// SPDX-License-Identifier: MIT
//! Infoset events consumed by the encoder and produced by the decoder

use crate::algorithm::AlgorithmValue;
use crate::format::DocumentHeader;
use crate::name::QualifiedName;

/// Which registry an opaque value's identifier refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueKind {
    Algorithm,
    Alphabet,
}

/// Character data of an attribute value or a content chunk
#[derive(Debug, Clone, PartialEq)]
pub enum CharacterContent {
    Text(String),

    /// Text packed with a restricted alphabet
    Restricted { alphabet: u8, text: String },

    /// Value encoded with an encoding algorithm
    Typed { algorithm: u8, value: AlgorithmValue },

    /// Octets of an algorithm or alphabet the decoder does not know
    Opaque {
        kind: OpaqueKind,
        id: u8,
        octets: Vec<u8>,
    },
}

impl CharacterContent {
    pub fn text(text: impl Into<String>) -> Self {
        CharacterContent::Text(text.into())
    }

    /// The characters, when this content carries them directly
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CharacterContent::Text(text) | CharacterContent::Restricted { text, .. } => {
                Some(text)
            }
            CharacterContent::Typed { .. } | CharacterContent::Opaque { .. } => None,
        }
    }

    /// True for text made only of XML whitespace
    pub fn is_whitespace(&self) -> bool {
        self.as_text().is_some_and(|text| {
            text.chars()
                .all(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
        })
    }
}

impl From<&str> for CharacterContent {
    fn from(text: &str) -> Self {
        CharacterContent::Text(text.to_string())
    }
}

impl From<String> for CharacterContent {
    fn from(text: String) -> Self {
        CharacterContent::Text(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: QualifiedName,
    pub value: CharacterContent,
}

impl Attribute {
    pub fn new(name: QualifiedName, value: impl Into<CharacterContent>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// A namespace declaration; the empty prefix is the default namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDeclaration {
    pub prefix: String,
    pub namespace: String,
}

impl NamespaceDeclaration {
    pub fn new(prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            namespace: namespace.into(),
        }
    }
}

/// One item of a document, in document order
#[derive(Debug, Clone, PartialEq)]
pub enum InfosetEvent {
    StartDocument(DocumentHeader),
    StartElement {
        name: QualifiedName,
        namespaces: Vec<NamespaceDeclaration>,
        attributes: Vec<Attribute>,
    },
    Characters(CharacterContent),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
    EndElement,
    EndDocument,
}

impl InfosetEvent {
    /// Start of an element without namespace declarations or attributes
    pub fn start(name: QualifiedName) -> Self {
        InfosetEvent::StartElement {
            name,
            namespaces: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn characters(text: impl Into<String>) -> Self {
        InfosetEvent::Characters(CharacterContent::Text(text.into()))
    }
}
