// SPDX-License-Identifier: MIT
//! Shared codec setup: configuration, registries and vocabularies

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use crate::algorithm::{AlgorithmRegistry, EncodingAlgorithm};
use crate::alphabet::AlphabetTable;
use crate::config::{CodecConfig, ConfigError, IndexingPolicy, LengthThresholdPolicy};
use crate::encoder::InfosetEncoder;
use crate::error::Result;
use crate::event::InfosetEvent;
use crate::format::FormatError;
use crate::reader::Decoder;
use crate::vocabulary::InitialVocabulary;
use crate::writer::LowLevelWriter;

/// Everything documents coded together must agree on
///
/// Cheap to clone; registries and vocabularies are shared read-only. Each
/// encoder, writer or decoder created from a codec owns its own per-document
/// tables.
#[derive(Debug, Clone)]
pub struct Codec {
    config: CodecConfig,
    algorithms: Arc<AlgorithmRegistry>,
    alphabets: Arc<AlphabetTable>,
    initial_vocabulary: Option<Arc<InitialVocabulary>>,
    external_vocabularies: Arc<HashMap<String, Arc<InitialVocabulary>>>,
    indexing: Arc<dyn IndexingPolicy>,
}

impl Codec {
    pub fn builder() -> CodecBuilder {
        CodecBuilder::new()
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn algorithms(&self) -> &AlgorithmRegistry {
        &self.algorithms
    }

    pub fn alphabets(&self) -> &AlphabetTable {
        &self.alphabets
    }

    /// Vocabulary every encoded document starts from
    pub fn initial_vocabulary(&self) -> Option<&Arc<InitialVocabulary>> {
        self.initial_vocabulary.as_ref()
    }

    /// Resolve a document's external vocabulary reference
    pub fn external_vocabulary(
        &self,
        uri: &str,
    ) -> std::result::Result<&Arc<InitialVocabulary>, FormatError> {
        self.external_vocabularies
            .get(uri)
            .ok_or_else(|| FormatError::UnknownExternalVocabulary(uri.to_string()))
    }

    pub fn indexing_policy(&self) -> &dyn IndexingPolicy {
        self.indexing.as_ref()
    }

    /// Low-level writer over `sink`
    pub fn writer<W: Write>(&self, sink: W) -> LowLevelWriter<'_, W> {
        LowLevelWriter::new(self, sink)
    }

    /// Event encoder over `sink`
    pub fn encoder<W: Write>(&self, sink: W) -> InfosetEncoder<'_, W> {
        InfosetEncoder::new(self, sink)
    }

    /// Encode a complete event sequence into a new buffer
    pub fn encode(&self, events: &[InfosetEvent]) -> Result<Vec<u8>> {
        let mut encoder = self.encoder(Vec::new());
        for event in events {
            encoder.write_event(event)?;
        }
        encoder.finish()
    }

    /// Decode a complete document into its events
    pub fn decode(&self, data: &[u8]) -> Result<Vec<InfosetEvent>> {
        Decoder::new(self, data).decode()
    }
}

impl Default for Codec {
    fn default() -> Self {
        let config = CodecConfig::default();
        Self {
            indexing: Arc::new(LengthThresholdPolicy::from_config(&config)),
            config,
            algorithms: Arc::new(AlgorithmRegistry::new()),
            alphabets: Arc::new(AlphabetTable::new()),
            initial_vocabulary: None,
            external_vocabularies: Arc::new(HashMap::new()),
        }
    }
}

/// Builder for [`Codec`]
///
/// Registrations are validated as they are made, so a built codec never
/// rejects an identifier it was configured with.
#[derive(Debug, Default)]
pub struct CodecBuilder {
    config: CodecConfig,
    algorithms: AlgorithmRegistry,
    alphabets: AlphabetTable,
    initial_vocabulary: Option<Arc<InitialVocabulary>>,
    external_vocabularies: HashMap<String, Arc<InitialVocabulary>>,
    indexing: Option<Arc<dyn IndexingPolicy>>,
}

impl CodecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn register_algorithm(
        mut self,
        id: u8,
        algorithm: Arc<dyn EncodingAlgorithm>,
    ) -> Result<Self> {
        self.algorithms.register_algorithm(id, algorithm)?;
        Ok(self)
    }

    pub fn register_alphabet(mut self, id: u8, characters: &str) -> Result<Self> {
        self.alphabets.register_alphabet(id, characters)?;
        Ok(self)
    }

    /// Vocabulary documents are encoded against
    ///
    /// It must carry an external URI, which is recorded in every document so
    /// decoders can find it; it is also made available for decoding.
    pub fn initial_vocabulary(mut self, vocabulary: Arc<InitialVocabulary>) -> Self {
        self.initial_vocabulary = Some(vocabulary);
        self
    }

    /// Make a vocabulary available to decoders by its external URI
    pub fn external_vocabulary(mut self, vocabulary: Arc<InitialVocabulary>) -> Result<Self> {
        let uri = vocabulary.external_uri().ok_or_else(|| {
            ConfigError::Invalid("external vocabulary has no external URI".to_string())
        })?;
        self.external_vocabularies.insert(uri.to_string(), vocabulary);
        Ok(self)
    }

    /// Replace the default length-threshold indexing policy
    pub fn indexing_policy(mut self, policy: Arc<dyn IndexingPolicy>) -> Self {
        self.indexing = Some(policy);
        self
    }

    pub fn build(mut self) -> Result<Codec> {
        self.config.validate()?;

        if let Some(initial) = &self.initial_vocabulary {
            let uri = initial.external_uri().ok_or_else(|| {
                ConfigError::Invalid("initial vocabulary has no external URI".to_string())
            })?;
            self.external_vocabularies
                .insert(uri.to_string(), Arc::clone(initial));
        }

        let indexing = self
            .indexing
            .unwrap_or_else(|| Arc::new(LengthThresholdPolicy::from_config(&self.config)));

        tracing::debug!(
            external_vocabularies = self.external_vocabularies.len(),
            initial_vocabulary = self.initial_vocabulary.is_some(),
            "built codec"
        );

        Ok(Codec {
            config: self.config,
            algorithms: Arc::new(self.algorithms),
            alphabets: Arc::new(self.alphabets),
            initial_vocabulary: self.initial_vocabulary,
            external_vocabularies: Arc::new(self.external_vocabularies),
            indexing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::vocabulary::VocabularyDefinition;

    fn vocabulary(uri: Option<&str>) -> Arc<InitialVocabulary> {
        InitialVocabulary::shared(VocabularyDefinition {
            external_uri: uri.map(str::to_string),
            local_names: vec!["order".into()],
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_initial_vocabulary_requires_uri() {
        let result = Codec::builder().initial_vocabulary(vocabulary(None)).build();
        assert!(matches!(
            result,
            Err(CodecError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_initial_vocabulary_resolvable() {
        let codec = Codec::builder()
            .initial_vocabulary(vocabulary(Some("urn:orders")))
            .build()
            .unwrap();
        assert!(codec.external_vocabulary("urn:orders").is_ok());
        assert!(matches!(
            codec.external_vocabulary("urn:other"),
            Err(FormatError::UnknownExternalVocabulary(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = CodecConfig::default();
        config.attribute_values.min = 100;
        assert!(Codec::builder().config(config).build().is_err());
    }

    #[test]
    fn test_registrations_validated_early() {
        let result = Codec::builder().register_alphabet(0, "ab");
        assert!(matches!(result, Err(CodecError::Alphabet(_))));
    }
}
