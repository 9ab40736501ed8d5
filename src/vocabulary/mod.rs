// SPDX-License-Identifier: MIT
//! Per-document vocabulary tables
//!
//! An encoder and a decoder working on the same document populate these
//! tables in the same order, so every index written by one resolves to the
//! same entry in the other.

pub mod initial;
pub mod table;

use std::sync::Arc;

pub use initial::{InitialVocabulary, VocabularyDefinition};
pub use table::{BaseTable, TableKind, VocabularyError, VocabularyTable};

use crate::name::QualifiedName;
use initial::{BUILTIN_NAMESPACE_NAMES, BUILTIN_PREFIXES};

/// All tables used while coding one document
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub prefixes: VocabularyTable<String>,
    pub namespace_names: VocabularyTable<String>,
    pub local_names: VocabularyTable<String>,
    pub other_ncnames: VocabularyTable<String>,
    pub other_uris: VocabularyTable<String>,
    pub attribute_values: VocabularyTable<String>,
    pub character_content_chunks: VocabularyTable<String>,
    pub other_strings: VocabularyTable<String>,
    pub element_names: VocabularyTable<QualifiedName>,
    pub attribute_names: VocabularyTable<QualifiedName>,
}

impl Vocabulary {
    /// Tables holding only the built-in `xml` prefix and namespace
    pub fn new() -> Self {
        Self {
            prefixes: VocabularyTable::with_base(TableKind::Prefix, Arc::clone(&BUILTIN_PREFIXES)),
            namespace_names: VocabularyTable::with_base(
                TableKind::NamespaceName,
                Arc::clone(&BUILTIN_NAMESPACE_NAMES),
            ),
            local_names: VocabularyTable::new(TableKind::LocalName),
            other_ncnames: VocabularyTable::new(TableKind::OtherNcName),
            other_uris: VocabularyTable::new(TableKind::OtherUri),
            attribute_values: VocabularyTable::new(TableKind::AttributeValue),
            character_content_chunks: VocabularyTable::new(TableKind::CharacterContentChunk),
            other_strings: VocabularyTable::new(TableKind::OtherString),
            element_names: VocabularyTable::new(TableKind::ElementName),
            attribute_names: VocabularyTable::new(TableKind::AttributeName),
        }
    }

    /// Tables layered over a shared initial vocabulary
    pub fn with_initial(initial: &InitialVocabulary) -> Self {
        Self {
            prefixes: VocabularyTable::with_base(TableKind::Prefix, Arc::clone(&initial.prefixes)),
            namespace_names: VocabularyTable::with_base(
                TableKind::NamespaceName,
                Arc::clone(&initial.namespace_names),
            ),
            local_names: VocabularyTable::with_base(
                TableKind::LocalName,
                Arc::clone(&initial.local_names),
            ),
            other_ncnames: VocabularyTable::with_base(
                TableKind::OtherNcName,
                Arc::clone(&initial.other_ncnames),
            ),
            other_uris: VocabularyTable::with_base(
                TableKind::OtherUri,
                Arc::clone(&initial.other_uris),
            ),
            attribute_values: VocabularyTable::with_base(
                TableKind::AttributeValue,
                Arc::clone(&initial.attribute_values),
            ),
            character_content_chunks: VocabularyTable::with_base(
                TableKind::CharacterContentChunk,
                Arc::clone(&initial.character_content_chunks),
            ),
            other_strings: VocabularyTable::with_base(
                TableKind::OtherString,
                Arc::clone(&initial.other_strings),
            ),
            element_names: VocabularyTable::with_base(
                TableKind::ElementName,
                Arc::clone(&initial.element_names),
            ),
            attribute_names: VocabularyTable::with_base(
                TableKind::AttributeName,
                Arc::clone(&initial.attribute_names),
            ),
        }
    }

    /// Tables for a document, with or without an initial vocabulary
    pub fn for_document(initial: Option<&InitialVocabulary>) -> Self {
        match initial {
            Some(initial) => Self::with_initial(initial),
            None => Self::new(),
        }
    }

    /// Table of plain strings by kind
    ///
    /// Returns `None` for the qualified-name tables.
    pub fn strings(&self, kind: TableKind) -> Option<&VocabularyTable<String>> {
        match kind {
            TableKind::Prefix => Some(&self.prefixes),
            TableKind::NamespaceName => Some(&self.namespace_names),
            TableKind::LocalName => Some(&self.local_names),
            TableKind::OtherNcName => Some(&self.other_ncnames),
            TableKind::OtherUri => Some(&self.other_uris),
            TableKind::AttributeValue => Some(&self.attribute_values),
            TableKind::CharacterContentChunk => Some(&self.character_content_chunks),
            TableKind::OtherString => Some(&self.other_strings),
            TableKind::ElementName | TableKind::AttributeName => None,
        }
    }

    pub fn strings_mut(&mut self, kind: TableKind) -> Option<&mut VocabularyTable<String>> {
        match kind {
            TableKind::Prefix => Some(&mut self.prefixes),
            TableKind::NamespaceName => Some(&mut self.namespace_names),
            TableKind::LocalName => Some(&mut self.local_names),
            TableKind::OtherNcName => Some(&mut self.other_ncnames),
            TableKind::OtherUri => Some(&mut self.other_uris),
            TableKind::AttributeValue => Some(&mut self.attribute_values),
            TableKind::CharacterContentChunk => Some(&mut self.character_content_chunks),
            TableKind::OtherString => Some(&mut self.other_strings),
            TableKind::ElementName | TableKind::AttributeName => None,
        }
    }

    /// Drop all per-document entries so the tables can code another document
    pub fn reset(&mut self) {
        self.prefixes.clear();
        self.namespace_names.clear();
        self.local_names.clear();
        self.other_ncnames.clear();
        self.other_uris.clear();
        self.attribute_values.clear();
        self.character_content_chunks.clear();
        self.other_strings.clear();
        self.element_names.clear();
        self.attribute_names.clear();
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::XML_NAMESPACE;

    #[test]
    fn test_builtin_entries() {
        let vocabulary = Vocabulary::new();
        assert_eq!(vocabulary.prefixes.get_index("xml"), Some(0));
        assert_eq!(vocabulary.namespace_names.get_index(XML_NAMESPACE), Some(0));
        assert!(vocabulary.local_names.is_empty());
    }

    #[test]
    fn test_initial_vocabulary_shared_not_mutated() {
        let initial = InitialVocabulary::shared(VocabularyDefinition {
            local_names: vec!["a".into(), "b".into()],
            element_names: vec![QualifiedName::local("a")],
            attribute_names: vec![QualifiedName::local("a"), QualifiedName::local("b")],
            ..Default::default()
        })
        .unwrap();

        let mut first = Vocabulary::with_initial(&initial);
        let second = Vocabulary::with_initial(&initial);

        assert_eq!(first.local_names.add("c".into()).unwrap(), 2);
        assert_eq!(second.local_names.len(), 2);
        assert_eq!(second.element_names.get_index(&QualifiedName::local("a")), Some(0));
        assert_eq!(initial.element_name_count(), 1);
        assert_eq!(initial.attribute_name_count(), 2);
        assert_eq!(second.attribute_names.get_index(&QualifiedName::local("b")), Some(1));
    }

    #[test]
    fn test_reset_keeps_base() {
        let mut vocabulary = Vocabulary::new();
        vocabulary.prefixes.add("p".into()).unwrap();
        vocabulary.reset();
        assert_eq!(vocabulary.prefixes.len(), 1);
        assert!(vocabulary.strings(TableKind::ElementName).is_none());
    }
}
