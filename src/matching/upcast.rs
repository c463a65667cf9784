//! Accumulator of a single hierarchy walk.

use crate::{
    matching::ObjectPtr,
    typeinfo::{HierarchyFlags, TypeInfo},
};

/// How the target base was found so far. Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ContainedStatus {
    /// Not found yet
    #[default]
    Unknown,
    /// Found exactly once, through public bases only
    PublicContained,
    /// Found through a non-public base, or as more than one sub-object
    AmbiguousOrNotPublic,
}

impl ContainedStatus {
    /// The worse of both statuses. `AmbiguousOrNotPublic` absorbs everything.
    #[must_use]
    pub fn merge(self, other: ContainedStatus) -> ContainedStatus {
        self.max(other)
    }
}

/// State threaded through [`crate::typeinfo::walk_to`].
///
/// Every base explored gets a fresh state from [`UpcastSearchState::for_base`]; findings are
/// folded back into the parent with [`UpcastSearchState::adopt`] or
/// [`UpcastSearchState::degrade`]. Once a state is ambiguous it stays ambiguous.
#[derive(Debug, Clone)]
pub struct UpcastSearchState<'t> {
    target: &'t TypeInfo,
    status: ContainedStatus,
    adjusted: ObjectPtr,
    premier_flags: HierarchyFlags,
    nullobj_may_conflict: bool,
}

impl<'t> UpcastSearchState<'t> {
    /// Starts a search for `target` in a class with hierarchy flags `premier_flags`
    #[must_use]
    pub fn new(target: &'t TypeInfo, premier_flags: HierarchyFlags) -> Self {
        UpcastSearchState {
            target,
            status: ContainedStatus::Unknown,
            adjusted: ObjectPtr::NULL,
            premier_flags,
            nullobj_may_conflict: true,
        }
    }

    /// A fresh state for searching one base, sharing target and premier flags
    #[must_use]
    pub fn for_base(&self) -> Self {
        Self::new(self.target, self.premier_flags)
    }

    /// The type being searched for
    #[must_use]
    pub fn target(&self) -> &'t TypeInfo {
        self.target
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> ContainedStatus {
        self.status
    }

    /// Address of the target sub-object; meaningful only when publicly contained
    #[must_use]
    pub fn adjusted(&self) -> ObjectPtr {
        self.adjusted
    }

    /// Hierarchy flags of the most-derived class
    #[must_use]
    pub fn premier_flags(&self) -> HierarchyFlags {
        self.premier_flags
    }

    /// True while a null-object search can not tell whether two findings are the same
    /// sub-object. Cleared once the target was reached through a virtual base.
    #[must_use]
    pub fn nullobj_may_conflict(&self) -> bool {
        self.nullobj_may_conflict
    }

    /// Folds `status` into this state
    pub fn merge(&mut self, status: ContainedStatus) {
        self.status = self.status.merge(status);
    }

    /// Marks the state ambiguous or inaccessible
    pub fn degrade(&mut self) {
        self.merge(ContainedStatus::AmbiguousOrNotPublic);
    }

    /// Records that the searched class is the target, located at `at`
    pub fn found_self(&mut self, at: ObjectPtr) {
        self.merge(ContainedStatus::PublicContained);
        self.adjusted = at;
    }

    /// Takes over the finding of a base search
    pub fn adopt(&mut self, other: &UpcastSearchState<'_>) {
        self.merge(other.status);
        self.adjusted = other.adjusted;
        self.nullobj_may_conflict = other.nullobj_may_conflict;
    }

    /// The target was reached through a virtual base
    pub fn clear_nullobj_conflict(&mut self) {
        self.nullobj_may_conflict = false;
    }

    /// True if `other` found a different sub-object than this state
    #[must_use]
    pub fn conflicts_with(&self, other: &UpcastSearchState<'_>) -> bool {
        if self.adjusted.is_null() || other.adjusted.is_null() {
            self.nullobj_may_conflict || other.nullobj_may_conflict
        } else {
            self.adjusted != other.adjusted
        }
    }

    /// True once the target was found, publicly or not
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.status != ContainedStatus::Unknown
    }

    /// True if the target was found exactly once through public bases
    #[must_use]
    pub fn is_public_contained(&self) -> bool {
        self.status == ContainedStatus::PublicContained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::Hierarchies;

    #[test]
    fn test_status_merge_is_sticky() {
        use ContainedStatus::*;
        assert_eq!(Unknown.merge(PublicContained), PublicContained);
        assert_eq!(PublicContained.merge(Unknown), PublicContained);
        assert_eq!(AmbiguousOrNotPublic.merge(PublicContained), AmbiguousOrNotPublic);
        assert_eq!(PublicContained.merge(AmbiguousOrNotPublic), AmbiguousOrNotPublic);
    }

    #[test]
    fn test_fresh_state() {
        let h = Hierarchies::new();
        let state = UpcastSearchState::new(&h.base, HierarchyFlags::DIAMOND_SHAPED);
        assert_eq!(state.status(), ContainedStatus::Unknown);
        assert!(state.adjusted().is_null());
        assert!(state.nullobj_may_conflict());
        assert!(!state.is_found());

        let sub = state.for_base();
        assert_eq!(sub.premier_flags(), HierarchyFlags::DIAMOND_SHAPED);
        assert!(std::ptr::eq(sub.target(), state.target()));
    }

    #[test]
    fn test_degrade_survives_found() {
        let h = Hierarchies::new();
        let mut state = UpcastSearchState::new(&h.base, HierarchyFlags::empty());
        state.degrade();
        state.found_self(ObjectPtr::new(0x10));
        assert_eq!(state.status(), ContainedStatus::AmbiguousOrNotPublic);
        assert!(state.is_found());
        assert!(!state.is_public_contained());
    }

    #[test]
    fn test_conflicts() {
        let h = Hierarchies::new();
        let mut first = UpcastSearchState::new(&h.base, HierarchyFlags::empty());
        let mut second = first.for_base();

        first.found_self(ObjectPtr::new(0x100));
        second.found_self(ObjectPtr::new(0x100));
        assert!(!first.conflicts_with(&second));

        second.found_self(ObjectPtr::new(0x108));
        assert!(first.conflicts_with(&second));

        // Null object: only virtual paths are known to meet
        let mut left = UpcastSearchState::new(&h.base, HierarchyFlags::empty());
        let mut right = left.for_base();
        left.found_self(ObjectPtr::NULL);
        right.found_self(ObjectPtr::NULL);
        assert!(left.conflicts_with(&right));
        left.clear_nullobj_conflict();
        assert!(left.conflicts_with(&right));
        right.clear_nullobj_conflict();
        assert!(!left.conflicts_with(&right));
    }
}
