//! The catch matching engine.
//!
//! This module answers the question an unwinder asks for every handler of a try-block: "can a
//! handler for type H catch an exception of type T, and if so, which pointer does it receive?"
//!
//! # Key Components
//!
//! - [`CatchMatcher`]: Entry point, carries the [`MatchConfig`] and a [`VirtualBaseResolver`]
//! - [`ObjectPtr`]: Address of the thrown object and of the adjusted sub-object
//! - [`UpcastSearchState`]: Accumulator of one class hierarchy walk
//! - [`CatchClause`] / [`HandlerMatch`]: Ordered handler selection
//!
//! # Dispatch
//!
//! Matching dispatches on the handler descriptor:
//!
//! - Class handlers match by identity or by an unambiguous public upcast
//! - Pointer and pointer-to-member handlers match by qualification conversion
//! - Every other handler matches by identity only
//!
//! Matching never fails and never allocates; an impossible or ambiguous conversion is a plain
//! `false`.
//!
//! # Thread Safety
//!
//! A `CatchMatcher` only borrows immutable data and is `Send + Sync`. Any number of threads may
//! match against the same registry concurrently.

mod handler;
mod ptr;
mod upcast;
mod vbase;

use std::fmt;

use log::trace;

pub use handler::{CatchClause, HandlerMatch};
pub use ptr::ObjectPtr;
pub use upcast::{ContainedStatus, UpcastSearchState};
pub use vbase::{NoVirtualBases, VirtualBaseResolver, VirtualBaseTable, VtableReader};

use crate::{
    config::{MatchConfig, TypeIdentity},
    typeinfo::{can_catch_class, can_catch_leaf, can_catch_pointer, BaseEntry, TypeInfo, TypeInfoKind},
};

static NO_VIRTUAL_BASES: NoVirtualBases = NoVirtualBases;

/// Decides whether handlers catch thrown types.
///
/// # Examples
///
/// ```rust
/// use cxxcatch::{
///     matching::{CatchMatcher, VirtualBaseTable},
///     typeinfo::{BaseEntry, TypeRegistryBuilder},
///     MatchConfig, ObjectPtr,
/// };
///
/// let builder = TypeRegistryBuilder::new();
/// let v = builder.class("V")?;
/// let d = builder.class_with_bases("D", vec![BaseEntry::public_virtual(&v, -24)?])?;
///
/// let mut offsets = VirtualBaseTable::new();
/// offsets.insert(ObjectPtr::new(0x1000), -24, 0x20);
/// let matcher = CatchMatcher::with_resolver(MatchConfig::default(), &offsets);
///
/// assert_eq!(matcher.try_catch(&v, &d, ObjectPtr::new(0x1000)), Some(ObjectPtr::new(0x1020)));
/// // The default matcher can not locate virtual bases
/// assert_eq!(CatchMatcher::default().try_catch(&v, &d, ObjectPtr::new(0x1000)), None);
/// # Ok::<(), cxxcatch::Error>(())
/// ```
#[derive(Clone, Copy)]
pub struct CatchMatcher<'r> {
    config: MatchConfig,
    resolver: &'r dyn VirtualBaseResolver,
}

impl Default for CatchMatcher<'static> {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

impl CatchMatcher<'static> {
    /// Creates a matcher that can not resolve virtual base offsets of live objects
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        CatchMatcher {
            config,
            resolver: &NO_VIRTUAL_BASES,
        }
    }
}

impl<'r> CatchMatcher<'r> {
    /// Creates a matcher resolving virtual bases through `resolver`
    #[must_use]
    pub fn with_resolver(config: MatchConfig, resolver: &'r dyn VirtualBaseResolver) -> Self {
        CatchMatcher { config, resolver }
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// True if both descriptors denote the same type under the configured identity
    #[must_use]
    pub fn same_type(&self, a: &TypeInfo, b: &TypeInfo) -> bool {
        match self.config.identity {
            TypeIdentity::Name => std::ptr::eq(a, b) || a.name == b.name,
            TypeIdentity::Address => std::ptr::eq(a, b),
        }
    }

    /// Address of the base sub-object described by `entry` inside the object at `at`.
    ///
    /// The null object stays null. `None` if a virtual base offset can not be resolved.
    #[must_use]
    pub fn base_subobject(&self, at: ObjectPtr, entry: &BaseEntry) -> Option<ObjectPtr> {
        if !entry.is_virtual() {
            return Some(at.offset(entry.offset()));
        }
        if at.is_null() {
            return Some(ObjectPtr::NULL);
        }

        self.resolver
            .virtual_base_offset(at, entry.offset())
            .map(|offset| at.offset(offset))
    }

    /// Checks whether a handler for `handler` catches an exception of type `thrown`.
    ///
    /// ## Arguments
    /// * 'handler'  - Descriptor of the handler's declared type
    /// * 'thrown'   - Descriptor of the thrown object's type
    /// * 'adjusted' - The thrown object (the pointer value itself for pointer types); replaced
    ///   by the pointer the handler receives on success, untouched otherwise
    pub fn can_catch(&self, handler: &TypeInfo, thrown: &TypeInfo, adjusted: &mut ObjectPtr) -> bool {
        let caught = match &handler.kind {
            TypeInfoKind::Class(_) => can_catch_class(self, handler, thrown, adjusted),
            TypeInfoKind::Pointer(_) | TypeInfoKind::PointerToMember(_) => {
                can_catch_pointer(self, handler, thrown, adjusted)
            }
            _ => can_catch_leaf(self, handler, thrown),
        };

        trace!(
            "{} {} {}",
            handler.name,
            if caught { "catches" } else { "rejects" },
            thrown.name
        );
        caught
    }

    /// Like [`CatchMatcher::can_catch`], returning the adjusted pointer on success
    #[must_use]
    pub fn try_catch(&self, handler: &TypeInfo, thrown: &TypeInfo, object: ObjectPtr) -> Option<ObjectPtr> {
        let mut adjusted = object;
        self.can_catch(handler, thrown, &mut adjusted)
            .then_some(adjusted)
    }
}

impl fmt::Debug for CatchMatcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatchMatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
