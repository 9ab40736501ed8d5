// SPDX-License-Identifier: MIT
//! Initial vocabulary shared read-only across documents

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::table::{BaseTable, TableKind, VocabularyError};
use crate::config::ConfigError;
use crate::format::XML_NAMESPACE;
use crate::name::QualifiedName;

/// Built-in prefix table base: `xml` at index 0
pub(crate) static BUILTIN_PREFIXES: Lazy<Arc<BaseTable<String>>> =
    Lazy::new(|| Arc::new(builtin_base(TableKind::Prefix, "xml")));

/// Built-in namespace-name table base: the XML namespace at index 0
pub(crate) static BUILTIN_NAMESPACE_NAMES: Lazy<Arc<BaseTable<String>>> =
    Lazy::new(|| Arc::new(builtin_base(TableKind::NamespaceName, XML_NAMESPACE)));

fn builtin_base(kind: TableKind, entry: &str) -> BaseTable<String> {
    match BaseTable::build(kind, vec![entry.to_string()]) {
        Ok(table) => table,
        Err(_) => unreachable!("single-entry table cannot contain duplicates"),
    }
}

/// Serializable description of an initial vocabulary
///
/// Entries are listed per category in index order. The prefix and
/// namespace-name lists must not repeat the built-in `xml` binding, which
/// always occupies index 0 of those tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyDefinition {
    /// URI recorded in documents so decoders can locate this vocabulary
    pub external_uri: Option<String>,
    pub prefixes: Vec<String>,
    pub namespace_names: Vec<String>,
    pub local_names: Vec<String>,
    pub other_ncnames: Vec<String>,
    pub other_uris: Vec<String>,
    pub attribute_values: Vec<String>,
    pub character_content_chunks: Vec<String>,
    pub other_strings: Vec<String>,
    pub element_names: Vec<QualifiedName>,
    pub attribute_names: Vec<QualifiedName>,
}

impl VocabularyDefinition {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load a definition from a `.toml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_toml_str(&source),
        }
    }
}

/// Pre-indexed, immutable tables handed to every encoder and decoder
///
/// Built once from a [`VocabularyDefinition`] and shared through `Arc`; each
/// document layers its own dynamic entries on top without copying these.
#[derive(Debug)]
pub struct InitialVocabulary {
    external_uri: Option<String>,
    pub(crate) prefixes: Arc<BaseTable<String>>,
    pub(crate) namespace_names: Arc<BaseTable<String>>,
    pub(crate) local_names: Arc<BaseTable<String>>,
    pub(crate) other_ncnames: Arc<BaseTable<String>>,
    pub(crate) other_uris: Arc<BaseTable<String>>,
    pub(crate) attribute_values: Arc<BaseTable<String>>,
    pub(crate) character_content_chunks: Arc<BaseTable<String>>,
    pub(crate) other_strings: Arc<BaseTable<String>>,
    pub(crate) element_names: Arc<BaseTable<QualifiedName>>,
    pub(crate) attribute_names: Arc<BaseTable<QualifiedName>>,
}

impl InitialVocabulary {
    pub fn build(definition: VocabularyDefinition) -> Result<Self, VocabularyError> {
        let with_builtin = |builtin: &str, mut entries: Vec<String>| {
            entries.insert(0, builtin.to_string());
            entries
        };

        let table = |kind, entries: Vec<String>| BaseTable::build(kind, entries).map(Arc::new);

        Ok(Self {
            external_uri: definition.external_uri,
            prefixes: table(
                TableKind::Prefix,
                with_builtin("xml", definition.prefixes),
            )?,
            namespace_names: table(
                TableKind::NamespaceName,
                with_builtin(XML_NAMESPACE, definition.namespace_names),
            )?,
            local_names: table(TableKind::LocalName, definition.local_names)?,
            other_ncnames: table(TableKind::OtherNcName, definition.other_ncnames)?,
            other_uris: table(TableKind::OtherUri, definition.other_uris)?,
            attribute_values: table(TableKind::AttributeValue, definition.attribute_values)?,
            character_content_chunks: table(
                TableKind::CharacterContentChunk,
                definition.character_content_chunks,
            )?,
            other_strings: table(TableKind::OtherString, definition.other_strings)?,
            element_names: Arc::new(BaseTable::build(
                TableKind::ElementName,
                definition.element_names,
            )?),
            attribute_names: Arc::new(BaseTable::build(
                TableKind::AttributeName,
                definition.attribute_names,
            )?),
        })
    }

    /// Build and wrap for sharing
    pub fn shared(definition: VocabularyDefinition) -> Result<Arc<Self>, VocabularyError> {
        Self::build(definition).map(Arc::new)
    }

    pub fn external_uri(&self) -> Option<&str> {
        self.external_uri.as_deref()
    }

    /// Number of element names supplied by this vocabulary
    pub fn element_name_count(&self) -> usize {
        self.element_names.len()
    }

    /// Number of attribute names supplied by this vocabulary
    pub fn attribute_name_count(&self) -> usize {
        self.attribute_names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_prefix_first() {
        let vocabulary = InitialVocabulary::build(VocabularyDefinition {
            prefixes: vec!["soap".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(vocabulary.prefixes.entries(), &["xml", "soap"]);
        assert_eq!(vocabulary.namespace_names.entries(), &[XML_NAMESPACE]);
    }

    #[test]
    fn test_repeated_builtin_rejected() {
        let result = InitialVocabulary::build(VocabularyDefinition {
            prefixes: vec!["xml".into()],
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(VocabularyError::DuplicateEntry {
                table: TableKind::Prefix,
                ..
            })
        ));
    }

    #[test]
    fn test_definition_from_toml() {
        let definition = VocabularyDefinition::from_toml_str(
            r#"
            external_uri = "urn:example:vocabulary"
            local_names = ["order", "item"]

            [[element_names]]
            local = "order"
            "#,
        )
        .unwrap();
        assert_eq!(definition.external_uri.as_deref(), Some("urn:example:vocabulary"));
        assert_eq!(definition.local_names, vec!["order", "item"]);
        assert_eq!(definition.element_names, vec![QualifiedName::local("order")]);
    }

    #[test]
    fn test_definition_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocabulary.json");
        std::fs::write(&path, r#"{"other_strings": ["a", "b"]}"#).unwrap();

        let definition = VocabularyDefinition::from_file(&path).unwrap();
        assert_eq!(definition.other_strings, vec!["a", "b"]);
    }
}
