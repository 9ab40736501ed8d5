// SPDX-License-Identifier: MIT
//! Crate-level error type

use crate::algorithm::AlgorithmError;
use crate::alphabet::AlphabetError;
use crate::config::ConfigError;
use crate::format::FormatError;
use crate::namespace::NamespaceError;
use crate::vocabulary::VocabularyError;
use crate::writer::ProtocolError;

/// Errors that can occur while encoding or decoding a document
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),

    #[error("Algorithm error: {0}")]
    Algorithm(#[from] AlgorithmError),

    #[error("Alphabet error: {0}")]
    Alphabet(#[from] AlphabetError),

    #[error("Namespace error: {0}")]
    Namespace(#[from] NamespaceError),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// True when the caller may retry the same item another way
    ///
    /// Only errors raised before anything reached the output qualify: a text
    /// outside a restricted alphabet, an unregistered algorithm or alphabet,
    /// or a table entry that already exists.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CodecError::Alphabet(AlphabetError::CharacterNotInAlphabet { .. })
                | CodecError::Alphabet(AlphabetError::UnknownAlphabet(_))
                | CodecError::Algorithm(AlgorithmError::UnknownAlgorithm(_))
                | CodecError::Vocabulary(VocabularyError::DuplicateEntry { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
