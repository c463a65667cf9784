//! Immutable registry of all descriptors of a program.
//!
//! A [`TypeRegistry`] is the process-wide descriptor graph: it is populated exclusively through a
//! [`crate::typeinfo::TypeRegistryBuilder`] and offers read-only lookups afterwards. Descriptors
//! handed out by the registry are shared `Arc` handles, so they can be cached by the exception
//! dispatch driver and used from any thread.
//!
//! # Storage
//!
//! - Primary storage keyed by [`TypeToken`] uses a lock-free `SkipMap`, which keeps iteration in
//!   registration order per kind
//! - The mangled name index uses a `DashMap`
//!
//! # Examples
//!
//! ```rust
//! use cxxcatch::typeinfo::{Fundamental, TypeRegistryBuilder};
//!
//! let builder = TypeRegistryBuilder::new();
//! builder.class("ns::Error")?;
//! let registry = builder.build()?;
//!
//! let error = registry.get_by_name("N2ns5ErrorE").unwrap();
//! assert_eq!(error.display_name, "ns::Error");
//! assert_eq!(registry.fundamental(Fundamental::Int).name, "i");
//! # Ok::<(), cxxcatch::Error>(())
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use strum::EnumCount;

use crate::{
    matching::CatchMatcher,
    typeinfo::{Fundamental, TypeInfo, TypeInfoRc, TypeToken},
    MatchConfig,
};

static NEXT_REGISTRY_ID: AtomicU32 = AtomicU32::new(1);

/// Read-only collection of descriptors.
pub struct TypeRegistry {
    /// Unique id, stamped into every descriptor this registry creates
    id: u32,
    /// Configuration used for validation and by [`TypeRegistry::matcher`]
    config: MatchConfig,
    /// Primary storage
    pub(crate) types: SkipMap<TypeToken, TypeInfoRc>,
    /// Mangled name index
    pub(crate) types_by_name: DashMap<String, TypeToken>,
    /// Pre-registered builtin types, indexed by `Fundamental as usize`
    pub(crate) fundamentals: Vec<TypeInfoRc>,
}

impl TypeRegistry {
    /// Creates an empty registry with a fresh id. Fundamentals are added by the builder.
    pub(crate) fn empty(config: MatchConfig) -> Self {
        TypeRegistry {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            config,
            types: SkipMap::new(),
            types_by_name: DashMap::new(),
            fundamentals: Vec::with_capacity(Fundamental::COUNT),
        }
    }

    /// Unique id of this registry
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Configuration this registry was built with
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Get a descriptor by its token
    #[must_use]
    pub fn get(&self, token: &TypeToken) -> Option<TypeInfoRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Get a descriptor by its mangled name
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<TypeInfoRc> {
        let token = *self.types_by_name.get(name)?;
        self.get(&token)
    }

    /// Get the descriptor of a builtin type
    #[must_use]
    pub fn fundamental(&self, fundamental: Fundamental) -> TypeInfoRc {
        self.fundamentals[fundamental as usize].clone()
    }

    /// True if `info` was created by this registry
    #[must_use]
    pub fn contains(&self, info: &TypeInfo) -> bool {
        info.registry == self.id
    }

    /// Number of registered descriptors, fundamentals included
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if no descriptor is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all descriptors in token order
    pub fn iter(&self) -> impl Iterator<Item = TypeInfoRc> + '_ {
        self.types.iter().map(|entry| entry.value().clone())
    }

    /// Iterate over all class descriptors
    pub fn classes(&self) -> impl Iterator<Item = TypeInfoRc> + '_ {
        self.iter().filter(|info| info.is_class())
    }

    /// A matcher using this registry's configuration, without virtual base resolution
    #[must_use]
    pub fn matcher(&self) -> CatchMatcher<'static> {
        CatchMatcher::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::typeinfo::{TypeKind, TypeRegistryBuilder};

    #[test]
    fn test_fundamentals_preregistered() {
        let registry = TypeRegistryBuilder::new().build().unwrap();
        assert_eq!(registry.len(), Fundamental::COUNT);

        for fundamental in Fundamental::iter() {
            let info = registry.fundamental(fundamental);
            assert_eq!(info.name, fundamental.mangled());
            assert_eq!(info.display_name, fundamental.to_string());
            assert!(registry.contains(&info));
            assert_eq!(registry.get(&info.token).unwrap().name, info.name);
        }
    }

    #[test]
    fn test_lookup() {
        let builder = TypeRegistryBuilder::new();
        let widget = builder.class("Widget").unwrap();
        let registry = builder.build().unwrap();

        let found = registry.get_by_name("6Widget").unwrap();
        assert!(std::sync::Arc::ptr_eq(&found, &widget));
        assert!(registry.get_by_name("Widget").is_none());
        assert_eq!(registry.classes().count(), 1);
        assert!(registry
            .iter()
            .any(|info| info.type_kind() == TypeKind::Class));
    }

    #[test]
    fn test_registries_are_distinct() {
        let first = TypeRegistryBuilder::new().build().unwrap();
        let second = TypeRegistryBuilder::new().build().unwrap();
        assert_ne!(first.id(), second.id());

        let int = first.fundamental(Fundamental::Int);
        assert!(first.contains(&int));
        assert!(!second.contains(&int));
    }
}
