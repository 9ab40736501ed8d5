// SPDX-License-Identifier: MIT
//! Codec configuration and table indexing policy

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::vocabulary::{TableKind, VocabularyError};

pub use crate::header::CharacterEncoding;

/// Default bound on bytes of text added to the content chunk table per document
pub const DEFAULT_CHUNK_MEMORY_LIMIT: usize = 16 * 1024 * 1024;

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Half-open range `min..max` of character counts worth adding to a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeLimits {
    pub min: usize,
    pub max: usize,
}

impl SizeLimits {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, len: usize) -> bool {
        len >= self.min && len < self.max
    }
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self::new(0, 32)
    }
}

/// What the decoder does with an algorithm or alphabet it does not know
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownRepresentationPolicy {
    /// Abort decoding
    #[default]
    Fail,

    /// Deliver the raw octets as opaque content
    Opaque,
}

impl FromStr for UnknownRepresentationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" => Ok(UnknownRepresentationPolicy::Fail),
            "opaque" => Ok(UnknownRepresentationPolicy::Opaque),
            other => Err(format!("unknown representation policy: {}", other)),
        }
    }
}

/// Codec settings shared by every document coded with one [`crate::Codec`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Attribute values worth adding to the attribute-value table
    pub attribute_values: SizeLimits,

    /// Character chunks worth adding to the content chunk table
    pub character_chunks: SizeLimits,

    /// Total bytes of chunk text that may be added per document
    pub chunk_memory_limit: usize,

    /// Encoding scheme for literal character data
    pub character_encoding: CharacterEncoding,

    pub ignore_comments: bool,
    pub ignore_processing_instructions: bool,

    /// Drop character data made only of whitespace
    pub ignore_whitespace_text: bool,

    pub unknown_representation: UnknownRepresentationPolicy,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            attribute_values: SizeLimits::default(),
            character_chunks: SizeLimits::default(),
            chunk_memory_limit: DEFAULT_CHUNK_MEMORY_LIMIT,
            character_encoding: CharacterEncoding::Utf8,
            ignore_comments: false,
            ignore_processing_instructions: false,
            ignore_whitespace_text: false,
            unknown_representation: UnknownRepresentationPolicy::Fail,
        }
    }
}

impl CodecConfig {
    /// Defaults overridden by `INFOSET_*` environment variables
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `INFOSET_*` key
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            attribute_values: SizeLimits {
                min: parse_var(&lookup, "INFOSET_ATTRIBUTE_VALUE_MIN")
                    .unwrap_or(defaults.attribute_values.min),
                max: parse_var(&lookup, "INFOSET_ATTRIBUTE_VALUE_MAX")
                    .unwrap_or(defaults.attribute_values.max),
            },
            character_chunks: SizeLimits {
                min: parse_var(&lookup, "INFOSET_CHUNK_MIN").unwrap_or(defaults.character_chunks.min),
                max: parse_var(&lookup, "INFOSET_CHUNK_MAX").unwrap_or(defaults.character_chunks.max),
            },
            chunk_memory_limit: parse_var(&lookup, "INFOSET_CHUNK_MEMORY_LIMIT")
                .unwrap_or(defaults.chunk_memory_limit),
            character_encoding: parse_var(&lookup, "INFOSET_CHARACTER_ENCODING")
                .unwrap_or(defaults.character_encoding),
            ignore_comments: parse_var(&lookup, "INFOSET_IGNORE_COMMENTS")
                .unwrap_or(defaults.ignore_comments),
            ignore_processing_instructions: parse_var(
                &lookup,
                "INFOSET_IGNORE_PROCESSING_INSTRUCTIONS",
            )
            .unwrap_or(defaults.ignore_processing_instructions),
            ignore_whitespace_text: parse_var(&lookup, "INFOSET_IGNORE_WHITESPACE_TEXT")
                .unwrap_or(defaults.ignore_whitespace_text),
            unknown_representation: parse_var(&lookup, "INFOSET_UNKNOWN_REPRESENTATION")
                .unwrap_or(defaults.unknown_representation),
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attribute_values.min > self.attribute_values.max {
            return Err(ConfigError::Invalid(format!(
                "attribute value limits: min {} exceeds max {}",
                self.attribute_values.min, self.attribute_values.max
            )));
        }

        if self.character_chunks.min > self.character_chunks.max {
            return Err(ConfigError::Invalid(format!(
                "character chunk limits: min {} exceeds max {}",
                self.character_chunks.min, self.character_chunks.max
            )));
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}

/// Decides whether a literal string is added to its vocabulary table
///
/// Only values the decoder is told to add end up in the table, so the answer
/// shapes the document but never its decodability.
pub trait IndexingPolicy: std::fmt::Debug + Send + Sync {
    /// `indexed_bytes` is the total already added to `table` in this document
    fn should_index(&self, table: TableKind, value: &str, indexed_bytes: usize) -> bool;
}

/// Indexes attribute values and chunks whose length falls within limits
#[derive(Debug, Clone)]
pub struct LengthThresholdPolicy {
    attribute_values: SizeLimits,
    character_chunks: SizeLimits,
    chunk_memory_limit: usize,
}

impl LengthThresholdPolicy {
    pub fn from_config(config: &CodecConfig) -> Self {
        Self {
            attribute_values: config.attribute_values,
            character_chunks: config.character_chunks,
            chunk_memory_limit: config.chunk_memory_limit,
        }
    }
}

impl IndexingPolicy for LengthThresholdPolicy {
    fn should_index(&self, table: TableKind, value: &str, indexed_bytes: usize) -> bool {
        match table {
            TableKind::AttributeValue => self.attribute_values.contains(value.chars().count()),
            TableKind::CharacterContentChunk => {
                self.character_chunks.contains(value.chars().count())
                    && indexed_bytes.saturating_add(value.len()) <= self.chunk_memory_limit
            }
            _ => false,
        }
    }
}
