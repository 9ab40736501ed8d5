// SPDX-License-Identifier: MIT
//! Encoding algorithm registry
//!
//! Typed content (numbers, binary blobs, UUIDs) is written as the octets of a
//! registered algorithm instead of its character form. Identifiers 0-9 are the
//! [`BuiltinAlgorithm`]s, 10-31 are reserved, and 32-255 are available for
//! caller-supplied [`EncodingAlgorithm`] implementations.

pub mod builtin;

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

pub use builtin::BuiltinAlgorithm;

/// First identifier available to caller-registered algorithms
pub const APPLICATION_ALGORITHM_START: u8 = 32;

/// Identifier of the last built-in algorithm
pub const BUILTIN_ALGORITHM_END: u8 = 9;

/// Errors raised by encoding algorithms and their registry
#[derive(Debug, thiserror::Error)]
pub enum AlgorithmError {
    #[error("Unknown encoding algorithm: {0}")]
    UnknownAlgorithm(u8),

    #[error("Encoding algorithm identifier {0} is reserved (0-31)")]
    ReservedIdentifier(u8),

    #[error("Encoding algorithm identifier {0} is already registered")]
    DuplicateRegistration(u8),

    #[error("Encoding algorithm URI already registered: {0}")]
    DuplicateUri(String),

    #[error("{algorithm} algorithm cannot encode a {found} value")]
    UnsupportedValue {
        algorithm: String,
        found: &'static str,
    },

    #[error("{algorithm} algorithm: {len} octets is not a multiple of {unit}")]
    InvalidLength {
        algorithm: String,
        len: usize,
        unit: usize,
    },

    #[error("{algorithm} algorithm: invalid octets: {reason}")]
    InvalidOctets { algorithm: String, reason: String },

    #[error("{algorithm} algorithm: invalid character form: {reason}")]
    InvalidText { algorithm: String, reason: String },
}

/// A typed value as produced and consumed by encoding algorithms
#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmValue {
    Octets(Vec<u8>),
    Shorts(Vec<i16>),
    Ints(Vec<i32>),
    Longs(Vec<i64>),
    Booleans(Vec<bool>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
    Uuids(Vec<Uuid>),
    Text(String),
}

impl AlgorithmValue {
    /// Short name of the value's variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            AlgorithmValue::Octets(_) => "octets",
            AlgorithmValue::Shorts(_) => "short array",
            AlgorithmValue::Ints(_) => "int array",
            AlgorithmValue::Longs(_) => "long array",
            AlgorithmValue::Booleans(_) => "boolean array",
            AlgorithmValue::Floats(_) => "float array",
            AlgorithmValue::Doubles(_) => "double array",
            AlgorithmValue::Uuids(_) => "uuid array",
            AlgorithmValue::Text(_) => "text",
        }
    }
}

/// A caller-supplied bidirectional value/octet codec
///
/// Implementations are registered under an identifier of 32 or above and are
/// shared read-only between documents.
pub trait EncodingAlgorithm: std::fmt::Debug + Send + Sync {
    /// URI naming the algorithm in vocabularies
    fn uri(&self) -> &str;

    fn encode_to_octets(&self, value: &AlgorithmValue) -> Result<Vec<u8>, AlgorithmError>;

    fn decode_from_octets(&self, octets: &[u8]) -> Result<AlgorithmValue, AlgorithmError>;

    /// Character form of a value, for consumers that need text
    fn to_text(&self, value: &AlgorithmValue) -> Result<String, AlgorithmError> {
        Err(AlgorithmError::UnsupportedValue {
            algorithm: self.uri().to_string(),
            found: value.kind(),
        })
    }
}

/// A resolved registry slot
#[derive(Debug, Clone)]
pub enum AlgorithmEntry {
    BuiltIn(BuiltinAlgorithm),
    Registered(Arc<dyn EncodingAlgorithm>),
}

impl AlgorithmEntry {
    pub fn encode_to_octets(&self, value: &AlgorithmValue) -> Result<Vec<u8>, AlgorithmError> {
        match self {
            AlgorithmEntry::BuiltIn(algorithm) => algorithm.encode_to_octets(value),
            AlgorithmEntry::Registered(algorithm) => algorithm.encode_to_octets(value),
        }
    }

    pub fn decode_from_octets(&self, octets: &[u8]) -> Result<AlgorithmValue, AlgorithmError> {
        match self {
            AlgorithmEntry::BuiltIn(algorithm) => algorithm.decode_from_octets(octets),
            AlgorithmEntry::Registered(algorithm) => algorithm.decode_from_octets(octets),
        }
    }

    pub fn to_text(&self, value: &AlgorithmValue) -> Result<String, AlgorithmError> {
        match self {
            AlgorithmEntry::BuiltIn(algorithm) => algorithm.to_text(value),
            AlgorithmEntry::Registered(algorithm) => algorithm.to_text(value),
        }
    }
}

/// Identifier-indexed table of encoding algorithms
///
/// Built before any document is touched and then shared through `Arc`;
/// registration validates identifiers up front so lookups during coding only
/// ever fail for identifiers nobody registered.
#[derive(Debug, Clone, Default)]
pub struct AlgorithmRegistry {
    registered: BTreeMap<u8, Arc<dyn EncodingAlgorithm>>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `algorithm` under `id` (32-255)
    pub fn register_algorithm(
        &mut self,
        id: u8,
        algorithm: Arc<dyn EncodingAlgorithm>,
    ) -> Result<(), AlgorithmError> {
        if id < APPLICATION_ALGORITHM_START {
            return Err(AlgorithmError::ReservedIdentifier(id));
        }
        if self.registered.contains_key(&id) {
            return Err(AlgorithmError::DuplicateRegistration(id));
        }
        if self.id_for_uri(algorithm.uri()).is_some() {
            return Err(AlgorithmError::DuplicateUri(algorithm.uri().to_string()));
        }

        tracing::debug!(id, uri = algorithm.uri(), "registered encoding algorithm");
        self.registered.insert(id, algorithm);
        Ok(())
    }

    pub fn is_registered(&self, id: u8) -> bool {
        id <= BUILTIN_ALGORITHM_END || self.registered.contains_key(&id)
    }

    /// Resolve an identifier to its algorithm
    pub fn lookup(&self, id: u8) -> Result<AlgorithmEntry, AlgorithmError> {
        if let Some(builtin) = BuiltinAlgorithm::from_id(id) {
            return Ok(AlgorithmEntry::BuiltIn(builtin));
        }
        self.registered
            .get(&id)
            .map(|algorithm| AlgorithmEntry::Registered(Arc::clone(algorithm)))
            .ok_or(AlgorithmError::UnknownAlgorithm(id))
    }

    /// Identifier of the registered algorithm named by `uri`
    pub fn id_for_uri(&self, uri: &str) -> Option<u8> {
        self.registered
            .iter()
            .find(|(_, algorithm)| algorithm.uri() == uri)
            .map(|(id, _)| *id)
    }

    pub fn encode(&self, id: u8, value: &AlgorithmValue) -> Result<Vec<u8>, AlgorithmError> {
        self.lookup(id)?.encode_to_octets(value)
    }

    pub fn decode(&self, id: u8, octets: &[u8]) -> Result<AlgorithmValue, AlgorithmError> {
        self.lookup(id)?.decode_from_octets(octets)
    }
}
