//! Matching and registry configuration
//!
//! This module provides the knobs that influence how descriptors compare to each other and how
//! much checking a [`crate::typeinfo::TypeRegistryBuilder`] performs before handing out an
//! immutable registry.

/// How two descriptors are decided to denote the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeIdentity {
    /// Descriptors are equal if their mangled names are equal.
    ///
    /// Matches platforms where the same type may have several `type_info` objects (one per
    /// shared object), so descriptors from different registries still compare equal.
    #[default]
    Name,
    /// Descriptors are equal only if they are the same object.
    Address,
}

/// Configuration for catch matching and descriptor validation
///
/// Matching has no failure channel, so these options never turn a match into an error. They
/// select identity semantics and C++11 behaviour during matching, and control which structural
/// checks run while a registry is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    /// How descriptor identity is determined
    pub identity: TypeIdentity,

    /// Allow a thrown `std::nullptr_t` to be caught by pointer and pointer-to-member handlers
    pub catch_nullptr: bool,

    /// Compare declared diamond/repeat flags of multi-base classes against the graph
    pub validate_hierarchy_flags: bool,

    /// Reject multi-base descriptors for classes whose only base is public, non-virtual and at
    /// offset zero; a compiler emits the single-public-base shape for those
    pub validate_single_base: bool,

    /// Maximum depth of an inheritance chain accepted by the builder (default: 256)
    pub max_hierarchy_depth: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            identity: TypeIdentity::Name,
            catch_nullptr: true,
            validate_hierarchy_flags: true,
            validate_single_base: true,
            max_hierarchy_depth: 256,
        }
    }
}

impl MatchConfig {
    /// Creates a configuration that skips all optional validation
    ///
    /// Descriptors are trusted as emitted. Hierarchy flags supplied by the caller are used
    /// verbatim even if they disagree with the graph.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            validate_hierarchy_flags: false,
            validate_single_base: false,
            ..Self::default()
        }
    }

    /// Creates a configuration with every validation enabled
    #[must_use]
    pub fn comprehensive() -> Self {
        Self::default()
    }

    /// Returns a copy using the given identity mode
    #[must_use]
    pub fn with_identity(mut self, identity: TypeIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Returns true if any builder validation is enabled
    #[must_use]
    pub fn validates(&self) -> bool {
        self.validate_hierarchy_flags || self.validate_single_base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let default = MatchConfig::default();
        assert_eq!(default.identity, TypeIdentity::Name);
        assert!(default.catch_nullptr);
        assert!(default.validates());

        let minimal = MatchConfig::minimal();
        assert!(!minimal.validates());
        assert!(minimal.catch_nullptr);

        assert_eq!(MatchConfig::comprehensive(), default);
    }

    #[test]
    fn test_with_identity() {
        let config = MatchConfig::default().with_identity(TypeIdentity::Address);
        assert_eq!(config.identity, TypeIdentity::Address);
        assert_eq!(config.max_hierarchy_depth, 256);
    }
}
