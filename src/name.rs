// SPDX-License-Identifier: MIT
//! Qualified names of elements and attributes

use serde::{Deserialize, Serialize};

/// An element or attribute name: prefix, namespace name and local name
///
/// An empty prefix or namespace means the component is absent. Names are
/// stored whole in the element-name and attribute-name tables, so two names
/// with the same local part but different prefixes occupy distinct entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    #[serde(default)]
    pub prefix: String,

    #[serde(default)]
    pub namespace: String,

    pub local: String,
}

impl QualifiedName {
    pub fn new(
        prefix: impl Into<String>,
        namespace: impl Into<String>,
        local: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Name in no namespace
    pub fn local(local: impl Into<String>) -> Self {
        Self::new("", "", local)
    }

    /// Unprefixed name in a namespace (default namespace binding)
    pub fn namespaced(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self::new("", namespace, local)
    }

    #[inline]
    pub fn has_prefix(&self) -> bool {
        !self.prefix.is_empty()
    }

    #[inline]
    pub fn has_namespace(&self) -> bool {
        !self.namespace.is_empty()
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_prefix() {
            write!(f, "{}:{}", self.prefix, self.local)
        } else {
            write!(f, "{}", self.local)
        }
    }
}
