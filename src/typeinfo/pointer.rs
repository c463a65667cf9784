//! Pointer and pointer-to-member descriptors.
//!
//! A pointer descriptor decorates its pointee with the qualifiers found at that level of the
//! pointer chain. `const int**` is a pointer (no qualifiers) to a pointer (`CONST`) to `int`.
//!
//! # Matching
//!
//! A pointer handler catches a thrown pointer if the thrown type converts to the handler type
//! by a qualification conversion, a function pointer conversion (dropping `noexcept`), a
//! conversion to `void*`, or a derived-to-base conversion of the outermost pointee. The chain
//! is compared level by level while a [`QualificationTracker`] remembers whether qualifiers may
//! still be added: `int**` converts to `const int* const*` but not to `const int**`.

use bitflags::bitflags;
use log::trace;

use crate::{
    matching::{CatchMatcher, ObjectPtr},
    typeinfo::{class::can_catch_class, TypeInfo, TypeInfoKind, TypeInfoRc},
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Qualifiers of a pointer level (`__pbase_type_info::__flags`)
    pub struct Qualifiers: u32 {
        /// Pointee is `const`
        const CONST = 0x01;
        /// Pointee is `volatile`
        const VOLATILE = 0x02;
        /// Pointee is `restrict`
        const RESTRICT = 0x04;
        /// Pointee type is incomplete
        const INCOMPLETE = 0x08;
        /// Class of a pointer-to-member is incomplete
        const INCOMPLETE_CLASS = 0x10;
        /// Pointee is a `transaction_safe` function
        const TRANSACTION_SAFE = 0x20;
        /// Pointee is a `noexcept` function
        const NOEXCEPT = 0x40;
    }
}

impl Qualifiers {
    /// Qualifiers a conversion may add but never remove
    pub const NO_REMOVE: Qualifiers = Qualifiers::CONST
        .union(Qualifiers::VOLATILE)
        .union(Qualifiers::RESTRICT);
    /// Qualifiers a conversion may remove but never add
    pub const NO_ADD: Qualifiers = Qualifiers::TRANSACTION_SAFE.union(Qualifiers::NOEXCEPT);

    /// The cv-qualifiers (`const`, `volatile`, `restrict`) of this level
    #[must_use]
    pub fn cv(self) -> Qualifiers {
        self.intersection(Self::NO_REMOVE)
    }
}

/// Where a pointer chain comparison currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualificationTracker {
    /// Comparing the outermost level; conversions of the pointee itself are still possible
    FirstComparison,
    /// Every handler level so far was `const`; qualifiers may still be added
    ConstChain,
    /// A non-`const` handler level was passed; deeper levels must match exactly
    AfterGap,
}

impl QualificationTracker {
    /// True if the current level may carry different cv-qualifiers
    #[must_use]
    pub fn admits_difference(self) -> bool {
        !matches!(self, QualificationTracker::AfterGap)
    }

    /// True on the outermost level
    #[must_use]
    pub fn is_first(self) -> bool {
        matches!(self, QualificationTracker::FirstComparison)
    }

    /// State for the next inner level, given the handler's qualifiers at this level
    #[must_use]
    pub fn advance(self, handler: Qualifiers) -> Self {
        if self.admits_difference() && handler.contains(Qualifiers::CONST) {
            QualificationTracker::ConstChain
        } else {
            QualificationTracker::AfterGap
        }
    }
}

/// Data shared by pointers and pointers-to-member
#[derive(Debug, Clone)]
pub struct PointerBase {
    /// Qualifiers of the pointee
    pub qualifiers: Qualifiers,
    /// The pointee type
    pub pointee: TypeInfoRc,
}

impl PointerBase {
    /// True if a thrown pointer with `thrown`'s qualifiers converts to this level
    #[must_use]
    pub fn accepts_qualifiers_of(&self, thrown: &PointerBase) -> bool {
        let removed = thrown
            .qualifiers
            .difference(self.qualifiers)
            .intersection(Qualifiers::NO_REMOVE);
        let added = self
            .qualifiers
            .difference(thrown.qualifiers)
            .intersection(Qualifiers::NO_ADD);
        removed.is_empty() && added.is_empty()
    }

    /// True if the pointee is marked incomplete
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.qualifiers.contains(Qualifiers::INCOMPLETE)
    }
}

/// A pointer-to-member type `pointee context::*`
#[derive(Debug, Clone)]
pub struct PointerToMember {
    /// Qualifiers and member type
    pub pointer: PointerBase,
    /// The class the member belongs to
    pub context: TypeInfoRc,
}

impl PointerToMember {
    /// True if the context class is marked incomplete
    #[must_use]
    pub fn is_incomplete_class(&self) -> bool {
        self.pointer
            .qualifiers
            .contains(Qualifiers::INCOMPLETE_CLASS)
    }
}

/// Pointer matching entry: identity, `std::nullptr_t`, or a pointer chain conversion.
pub(crate) fn can_catch_pointer(
    matcher: &CatchMatcher<'_>,
    handler: &TypeInfo,
    thrown: &TypeInfo,
    adjusted: &mut ObjectPtr,
) -> bool {
    if matcher.same_type(handler, thrown) {
        return true;
    }

    if thrown.is_nullptr() {
        if matcher.config().catch_nullptr {
            *adjusted = ObjectPtr::NULL;
            return true;
        }
        return false;
    }

    let mut ptr = *adjusted;
    if can_catch_level(
        matcher,
        handler,
        thrown,
        &mut ptr,
        QualificationTracker::FirstComparison,
    ) {
        *adjusted = ptr;
        return true;
    }
    false
}

fn can_catch_level(
    matcher: &CatchMatcher<'_>,
    handler: &TypeInfo,
    thrown: &TypeInfo,
    adjusted: &mut ObjectPtr,
    tracker: QualificationTracker,
) -> bool {
    if matcher.same_type(handler, thrown) {
        return true;
    }

    let (h, t, plain) = match (&handler.kind, &thrown.kind) {
        (TypeInfoKind::Pointer(h), TypeInfoKind::Pointer(t)) => (h, t, true),
        (TypeInfoKind::PointerToMember(h), TypeInfoKind::PointerToMember(t)) => {
            if !context_matches(matcher, h, t) {
                trace!("member context {} rejects {}", h.context.name, t.context.name);
                return false;
            }
            (&h.pointer, &t.pointer, false)
        }
        _ => return false,
    };

    if !h.accepts_qualifiers_of(t) {
        trace!(
            "{} drops qualifiers of {} ({:?} vs {:?})",
            handler.name,
            thrown.name,
            h.qualifiers,
            t.qualifiers
        );
        return false;
    }

    if h.qualifiers.cv() != t.qualifiers.cv() && !tracker.admits_difference() {
        trace!("{} adds qualifiers after a gap in {}", handler.name, thrown.name);
        return false;
    }
    let next = tracker.advance(h.qualifiers);

    if matcher.same_type(&h.pointee, &t.pointee) {
        return true;
    }

    if h.is_incomplete() || t.is_incomplete() {
        return false;
    }

    if plain && tracker.is_first() {
        if h.pointee.is_void() {
            return !t.pointee.is_function();
        }
        if h.pointee.is_class() && t.pointee.is_class() {
            return can_catch_class(matcher, &h.pointee, &t.pointee, adjusted);
        }
    }

    can_catch_level(matcher, &h.pointee, &t.pointee, adjusted, next)
}

fn context_matches(
    matcher: &CatchMatcher<'_>,
    handler: &PointerToMember,
    thrown: &PointerToMember,
) -> bool {
    if matcher.same_type(&handler.context, &thrown.context) {
        return true;
    }

    if handler.is_incomplete_class() || thrown.is_incomplete_class() {
        return false;
    }

    // No object exists for a member pointer, walk with a null object
    let mut object = ObjectPtr::NULL;
    can_catch_class(matcher, &handler.context, &thrown.context, &mut object)
}
