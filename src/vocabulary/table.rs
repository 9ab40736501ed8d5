// SPDX-License-Identifier: MIT
//! Index-assigning vocabulary table with a shared read-only base

use std::borrow::Borrow;
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::header::integer::MAX_INDEX;

/// The vocabulary table categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Prefix,
    NamespaceName,
    LocalName,
    OtherNcName,
    OtherUri,
    AttributeValue,
    CharacterContentChunk,
    OtherString,
    ElementName,
    AttributeName,
}

impl TableKind {
    /// Get the name of the table
    pub fn name(&self) -> &'static str {
        match self {
            TableKind::Prefix => "prefix",
            TableKind::NamespaceName => "namespace-name",
            TableKind::LocalName => "local-name",
            TableKind::OtherNcName => "other-ncname",
            TableKind::OtherUri => "other-uri",
            TableKind::AttributeValue => "attribute-value",
            TableKind::CharacterContentChunk => "content-character-chunk",
            TableKind::OtherString => "other-string",
            TableKind::ElementName => "element-name",
            TableKind::AttributeName => "attribute-name",
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised by vocabulary table lookups and insertions
#[derive(Debug, thiserror::Error)]
pub enum VocabularyError {
    #[error("{table} index {index} refers to an entry that is not yet established")]
    ForwardReference { table: TableKind, index: usize },

    #[error("{table} index {index} is out of range for a table of {len} entries")]
    OutOfRange {
        table: TableKind,
        index: usize,
        len: usize,
    },

    #[error("{table} table already contains {value}")]
    DuplicateEntry { table: TableKind, value: String },
}

/// Immutable, pre-indexed entries shared across documents
#[derive(Debug)]
pub struct BaseTable<T> {
    entries: Vec<T>,
    lookup: HashMap<T, usize>,
}

impl<T: Clone + Eq + Hash + Debug> BaseTable<T> {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Index `entries` in order, rejecting repeated values
    pub fn build(kind: TableKind, entries: Vec<T>) -> Result<Self, VocabularyError> {
        let mut lookup = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if lookup.insert(entry.clone(), index).is_some() {
                return Err(VocabularyError::DuplicateEntry {
                    table: kind,
                    value: format!("{:?}", entry),
                });
            }
        }
        Ok(Self { entries, lookup })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }
}

/// A per-document table layered over a shared [`BaseTable`]
///
/// Base entries occupy indices `0..k`; entries added while coding a document
/// continue from `k` in insertion order. The base is never mutated.
///
/// Slots handed out by [`VocabularyTable::reserve`] are filled, oldest first,
/// by subsequent [`VocabularyTable::add`] calls, so an encoder that reserves an
/// index before writing the literal still assigns indices in the same order a
/// decoder appends them.
#[derive(Debug, Clone)]
pub struct VocabularyTable<T> {
    kind: TableKind,
    base: Arc<BaseTable<T>>,
    dynamic: Vec<Option<T>>,
    lookup: HashMap<T, usize>,
    pending: VecDeque<usize>,
}

impl<T: Clone + Eq + Hash + Debug> VocabularyTable<T> {
    pub fn new(kind: TableKind) -> Self {
        Self::with_base(kind, Arc::new(BaseTable::empty()))
    }

    pub fn with_base(kind: TableKind, base: Arc<BaseTable<T>>) -> Self {
        Self {
            kind,
            base,
            dynamic: Vec::new(),
            lookup: HashMap::new(),
            pending: VecDeque::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Number of index slots, including reserved ones
    #[inline]
    pub fn len(&self) -> usize {
        self.base.len() + self.dynamic.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries supplied by the shared base
    #[inline]
    pub fn initial_len(&self) -> usize {
        self.base.len()
    }

    /// Look up the index of `value` without modifying the table
    pub fn get_index<Q>(&self, value: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.base
            .lookup
            .get(value)
            .or_else(|| self.lookup.get(value))
            .copied()
    }

    /// Look up the index of `value` if it can be referenced on the wire
    pub fn wire_index<Q>(&self, value: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_index(value).filter(|index| *index < MAX_INDEX)
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_index(value).is_some()
    }

    /// Resolve an index to its entry
    pub fn get(&self, index: usize) -> Result<&T, VocabularyError> {
        if let Some(entry) = self.base.entries.get(index) {
            return Ok(entry);
        }
        match self.dynamic.get(index - self.base.len()) {
            Some(Some(entry)) => Ok(entry),
            Some(None) => Err(VocabularyError::ForwardReference {
                table: self.kind,
                index,
            }),
            None => Err(VocabularyError::OutOfRange {
                table: self.kind,
                index,
                len: self.len(),
            }),
        }
    }

    /// Check that `index` names an established entry
    #[inline]
    pub fn ensure_established(&self, index: usize) -> Result<(), VocabularyError> {
        self.get(index).map(|_| ())
    }

    /// The index the next [`VocabularyTable::add`] will assign
    pub fn next_index(&self) -> usize {
        self.pending.front().copied().unwrap_or_else(|| self.len())
    }

    /// True once the next index falls outside the wire's index range
    ///
    /// Encoder and decoder both stop adding at this point.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.next_index() >= MAX_INDEX
    }

    /// Add a value, assigning the oldest reserved slot or the next index
    ///
    /// Fails if the value is already present; callers check with
    /// [`VocabularyTable::get_index`] first.
    pub fn add(&mut self, value: T) -> Result<usize, VocabularyError> {
        if self.contains(&value) {
            return Err(VocabularyError::DuplicateEntry {
                table: self.kind,
                value: format!("{:?}", value),
            });
        }

        let index = match self.pending.pop_front() {
            Some(index) => {
                self.dynamic[index - self.base.len()] = Some(value.clone());
                index
            }
            None => {
                self.dynamic.push(Some(value.clone()));
                self.len() - 1
            }
        };
        self.lookup.insert(value, index);
        Ok(index)
    }

    /// Reserve the next index for a value the caller will add later
    pub fn reserve(&mut self) -> usize {
        let index = self.len();
        self.dynamic.push(None);
        self.pending.push_back(index);
        index
    }

    /// Drop every dynamic entry, keeping the shared base
    pub fn clear(&mut self) {
        self.dynamic.clear();
        self.lookup.clear();
        self.pending.clear();
    }

    /// Iterate over established entries in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        let base = self.base.entries.iter().enumerate();
        let offset = self.base.len();
        let dynamic = self
            .dynamic
            .iter()
            .enumerate()
            .filter_map(move |(i, entry)| entry.as_ref().map(|entry| (offset + i, entry)));
        base.chain(dynamic)
    }
}
