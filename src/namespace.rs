// SPDX-License-Identifier: MIT
//! Scoped namespace prefix bindings
//!
//! Stack-based resolver: bindings live in one flat vector tagged with the
//! scope depth that declared them, so popping a scope truncates the tail. The
//! `xml` and `xmlns` bindings sit in a base scope at depth 0 that is never
//! popped, which keeps them visible at every depth.

use crate::format::{XMLNS_NAMESPACE, XML_NAMESPACE};

/// Errors raised by namespace declarations
#[derive(Debug, thiserror::Error)]
pub enum NamespaceError {
    #[error("Prefix {prefix:?} cannot be bound to {uri:?}")]
    ReservedPrefix { prefix: String, uri: String },

    #[error("Namespace {uri:?} cannot be bound to prefix {prefix:?}")]
    ReservedNamespace { prefix: String, uri: String },

    #[error("No namespace context to pop")]
    NoContext,

    #[error("Prefix {0:?} is not bound to a namespace")]
    UnboundPrefix(String),
}

#[derive(Debug, Clone)]
struct Binding {
    prefix: String,
    uri: String,
    depth: usize,
}

/// Stack of prefix to namespace URI scopes
#[derive(Debug, Clone)]
pub struct NamespaceContext {
    bindings: Vec<Binding>,
    depth: usize,
}

impl NamespaceContext {
    /// Create a context holding only the `xml` and `xmlns` bindings
    pub fn new() -> Self {
        let mut context = Self {
            bindings: Vec::with_capacity(16),
            depth: 0,
        };
        context.push_default_bindings();
        context
    }

    fn push_default_bindings(&mut self) {
        self.bindings.push(Binding {
            prefix: "xml".to_string(),
            uri: XML_NAMESPACE.to_string(),
            depth: 0,
        });
        self.bindings.push(Binding {
            prefix: "xmlns".to_string(),
            uri: XMLNS_NAMESPACE.to_string(),
            depth: 0,
        });
    }

    /// Current scope depth; 0 is the base scope
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enter a new scope
    pub fn push_context(&mut self) {
        self.depth += 1;
    }

    /// Leave the innermost scope, dropping every binding it declared
    pub fn pop_context(&mut self) -> Result<(), NamespaceError> {
        if self.depth == 0 {
            return Err(NamespaceError::NoContext);
        }
        let keep = self
            .bindings
            .iter()
            .rposition(|binding| binding.depth < self.depth)
            .map_or(0, |i| i + 1);
        self.bindings.truncate(keep);
        self.depth -= 1;
        Ok(())
    }

    /// Bind `prefix` to `uri` in the innermost scope
    ///
    /// The empty prefix declares the default namespace. Redeclaring a prefix
    /// in the same scope replaces the earlier binding.
    pub fn declare_prefix(&mut self, prefix: &str, uri: &str) -> Result<(), NamespaceError> {
        match prefix {
            "xml" if uri == XML_NAMESPACE => return Ok(()),
            "xml" | "xmlns" => {
                return Err(NamespaceError::ReservedPrefix {
                    prefix: prefix.to_string(),
                    uri: uri.to_string(),
                })
            }
            _ if uri == XML_NAMESPACE || uri == XMLNS_NAMESPACE => {
                return Err(NamespaceError::ReservedNamespace {
                    prefix: prefix.to_string(),
                    uri: uri.to_string(),
                })
            }
            _ => {}
        }

        let depth = self.depth;
        if let Some(existing) = self
            .bindings
            .iter()
            .rposition(|b| b.depth == depth && b.prefix == prefix)
        {
            self.bindings.remove(existing);
        }
        self.bindings.push(Binding {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
            depth,
        });
        Ok(())
    }

    fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|binding| binding.prefix == prefix)
            .map(|binding| binding.uri.as_str())
    }

    /// Namespace URI bound to `prefix`, or `""` when unbound
    pub fn get_namespace_uri(&self, prefix: &str) -> &str {
        self.resolve(prefix).unwrap_or("")
    }

    /// Most recently declared visible prefix bound to `uri`
    ///
    /// A prefix shadowed by an inner declaration to a different URI is not
    /// visible.
    pub fn get_prefix(&self, uri: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .filter(|binding| binding.uri == uri)
            .map(|binding| binding.prefix.as_str())
            .find(|prefix| self.resolve(prefix) == Some(uri))
    }

    /// Every visible prefix bound to `uri`, innermost first
    pub fn get_prefixes(&self, uri: &str) -> Vec<&str> {
        let mut prefixes: Vec<&str> = Vec::new();
        for binding in self.bindings.iter().rev() {
            let prefix = binding.prefix.as_str();
            if binding.uri == uri
                && !prefixes.contains(&prefix)
                && self.resolve(prefix) == Some(uri)
            {
                prefixes.push(prefix);
            }
        }
        prefixes
    }

    /// Prefixes declared in the innermost scope, in declaration order
    pub fn declared_prefixes(&self) -> Vec<&str> {
        if self.depth == 0 {
            return Vec::new();
        }
        self.bindings
            .iter()
            .filter(|binding| binding.depth == self.depth)
            .map(|binding| binding.prefix.as_str())
            .collect()
    }

    /// Return to the base scope
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.depth = 0;
        self.push_default_bindings();
    }
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::new()
    }
}
