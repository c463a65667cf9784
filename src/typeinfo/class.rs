//! Class hierarchy descriptors and the upcast walk.
//!
//! A class descriptor comes in one of three shapes, chosen when the class is registered:
//!
//! - [`ClassInfo::NoBase`] - a class without bases
//! - [`ClassInfo::SinglePublicBase`] - exactly one public, non-virtual base at offset zero
//! - [`ClassInfo::MultiBase`] - everything else: several bases, private or virtual bases
//!
//! Catching a class type by one of its bases is an upcast. The walk starts at the thrown
//! (most-derived) class and searches its base graph for the handler's class, accumulating the
//! result in an [`UpcastSearchState`]. A handler matches only if the base was found through a
//! public path and no second, distinct sub-object of the same type exists.

use std::collections::{HashMap, HashSet};

use log::{trace, warn};

use crate::{
    matching::{CatchMatcher, ObjectPtr, UpcastSearchState},
    typeinfo::{BaseEntry, HierarchyFlags, TypeInfo, TypeInfoKind, TypeInfoRc, TypeKind},
    Error, Result,
};

/// Inheritance information of a class type.
#[derive(Debug, Clone)]
pub enum ClassInfo {
    /// A class without base classes
    NoBase,
    /// A class with a single public, non-virtual base at offset zero
    SinglePublicBase {
        /// The base class
        base: TypeInfoRc,
    },
    /// A class with multiple, private or virtual bases
    MultiBase {
        /// Shape of the complete hierarchy below this class
        flags: HierarchyFlags,
        /// Direct bases in declaration order
        bases: Vec<BaseEntry>,
    },
}

impl ClassInfo {
    /// The descriptor variant of this class
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        match self {
            ClassInfo::NoBase => TypeKind::Class,
            ClassInfo::SinglePublicBase { .. } => TypeKind::SiClass,
            ClassInfo::MultiBase { .. } => TypeKind::VmiClass,
        }
    }

    /// Hierarchy shape flags. A single public base passes on the flags of its base.
    #[must_use]
    pub fn flags(&self) -> HierarchyFlags {
        match self {
            ClassInfo::NoBase => HierarchyFlags::empty(),
            ClassInfo::SinglePublicBase { base } => base.hierarchy_flags(),
            ClassInfo::MultiBase { flags, .. } => *flags,
        }
    }

    /// Number of direct bases
    #[must_use]
    pub fn base_count(&self) -> usize {
        match self {
            ClassInfo::NoBase => 0,
            ClassInfo::SinglePublicBase { .. } => 1,
            ClassInfo::MultiBase { bases, .. } => bases.len(),
        }
    }

    /// Direct bases as `(base, is_virtual)` pairs, in declaration order
    #[must_use]
    pub fn direct_bases(&self) -> Vec<(&TypeInfoRc, bool)> {
        match self {
            ClassInfo::NoBase => Vec::new(),
            ClassInfo::SinglePublicBase { base } => vec![(base, false)],
            ClassInfo::MultiBase { bases, .. } => bases
                .iter()
                .map(|entry| (entry.base(), entry.is_virtual()))
                .collect(),
        }
    }
}

/// Class matching: identity, or an unambiguous public upcast from `thrown` to `handler`.
///
/// On success `adjusted` is moved from the thrown object to the handler's base sub-object.
pub(crate) fn can_catch_class(
    matcher: &CatchMatcher<'_>,
    handler: &TypeInfo,
    thrown: &TypeInfo,
    adjusted: &mut ObjectPtr,
) -> bool {
    if matcher.same_type(handler, thrown) {
        return true;
    }

    if !thrown.is_class() {
        return false;
    }

    let mut state = UpcastSearchState::new(handler, thrown.hierarchy_flags());
    let found = walk_to(matcher, thrown, handler, adjusted, &mut state);

    trace!(
        "upcast {} -> {}: {:?} at {}",
        thrown.name,
        handler.name,
        state.status(),
        state.adjusted()
    );
    found
}

/// Searches the base graph of `this` for `target`.
///
/// Returns true if `target` is an unambiguous public base (or `this` itself), in which case
/// `adjusted` is replaced by the address of the target sub-object. The detailed outcome is left
/// in `state`.
pub fn walk_to(
    matcher: &CatchMatcher<'_>,
    this: &TypeInfo,
    target: &TypeInfo,
    adjusted: &mut ObjectPtr,
    state: &mut UpcastSearchState<'_>,
) -> bool {
    let found = search(matcher, this, target, *adjusted, state);
    if found {
        *adjusted = state.adjusted();
    }
    found
}

fn search(
    matcher: &CatchMatcher<'_>,
    this: &TypeInfo,
    target: &TypeInfo,
    at: ObjectPtr,
    state: &mut UpcastSearchState<'_>,
) -> bool {
    let TypeInfoKind::Class(class) = &this.kind else {
        return false;
    };

    if matcher.same_type(this, target) {
        state.found_self(at);
        return true;
    }

    match class {
        ClassInfo::NoBase => false,
        ClassInfo::SinglePublicBase { base } => search(matcher, base, target, at, state),
        ClassInfo::MultiBase { flags, bases } => {
            search_bases(matcher, *flags, bases, target, at, state)
        }
    }
}

fn search_bases(
    matcher: &CatchMatcher<'_>,
    flags: HierarchyFlags,
    bases: &[BaseEntry],
    target: &TypeInfo,
    at: ObjectPtr,
    state: &mut UpcastSearchState<'_>,
) -> bool {
    // Without repeats or diamonds below this class the target occurs at most once
    let shaped =
        flags.intersects(HierarchyFlags::DIAMOND_SHAPED | HierarchyFlags::NON_DIAMOND_REPEAT);

    for entry in bases {
        // A private path only matters if it can make a public path ambiguous
        if !entry.is_public()
            && !state
                .premier_flags()
                .contains(HierarchyFlags::NON_DIAMOND_REPEAT)
        {
            continue;
        }

        let Some(base_at) = matcher.base_subobject(at, entry) else {
            // Unlocatable virtual base: only fatal if the target lives inside it
            let mut scratch = state.for_base();
            search(matcher, entry.base(), target, ObjectPtr::NULL, &mut scratch);
            if !scratch.is_found() {
                continue;
            }

            warn!(
                "No virtual base offset for {} (slot {}) in object at {}",
                entry.base().name,
                entry.offset(),
                at
            );
            state.degrade();
            return false;
        };

        let mut sub = state.for_base();
        search(matcher, entry.base(), target, base_at, &mut sub);
        if !sub.is_found() {
            continue;
        }

        if !entry.is_public() {
            sub.degrade();
        }
        if entry.is_virtual() {
            sub.clear_nullobj_conflict();
        }

        if !state.is_found() {
            state.adopt(&sub);
            if !state.is_public_contained() {
                return false;
            }
            if !shaped {
                return true;
            }
            continue;
        }

        if !sub.is_public_contained() || state.conflicts_with(&sub) {
            state.degrade();
            return false;
        }
    }

    state.is_public_contained()
}

/// Derives the hierarchy shape flags of a class with the given direct bases.
///
/// A type with more than one sub-object in the complete object is a repeat; a virtual base
/// referenced by more than one sub-object is a diamond. Sub-objects are never enumerated: each
/// class reachable from `bases` is summarized once and the summaries are added up, so the cost
/// follows the size of the base graph even for lattices whose sub-object count grows
/// exponentially.
///
/// # Errors
/// Returns [`Error::RecursionLimit`] if the hierarchy is deeper than `max_depth`
pub fn compute_hierarchy_flags(bases: &[BaseEntry], max_depth: usize) -> Result<HierarchyFlags> {
    let mut profiles = HashMap::new();
    let mut complete = SubobjectProfile::default();

    for entry in bases {
        let base = entry.base();
        profile(base, 1, max_depth, &mut profiles)?;
        if let Some(base_profile) = profiles.get(base.name.as_str()) {
            complete.absorb(base.name.as_str(), base_profile, entry.is_virtual());
        }
    }

    // Every virtual base contributes its non-virtual part exactly once
    let virtual_bases: Vec<&str> = complete.virtual_bases.iter().copied().collect();
    for name in virtual_bases {
        if let Some(shared) = profiles.get(name) {
            complete.absorb_nonvirtual(shared);
        }
    }

    let mut flags = HierarchyFlags::empty();
    if complete.counts.values().any(|count| *count > 1) {
        flags |= HierarchyFlags::NON_DIAMOND_REPEAT;
    }
    if complete.virtual_refs.values().any(|count| *count > 1) {
        flags |= HierarchyFlags::DIAMOND_SHAPED;
    }
    Ok(flags)
}

/// Summary of one class for hierarchy flag computation.
///
/// Counts only distinguish "once" from "more than once" and saturate at two.
#[derive(Debug, Default)]
struct SubobjectProfile<'a> {
    /// Sub-objects per type in the non-virtual part of the class, the class itself included
    counts: HashMap<&'a str, u8>,
    /// References to each virtual base from the non-virtual part
    virtual_refs: HashMap<&'a str, u8>,
    /// Every virtual base of the class, direct or inherited
    virtual_bases: HashSet<&'a str>,
    /// Longest base chain, the class itself counting as one
    height: usize,
}

impl<'a> SubobjectProfile<'a> {
    fn absorb(&mut self, name: &'a str, base: &SubobjectProfile<'a>, is_virtual: bool) {
        if is_virtual {
            bump(&mut self.virtual_refs, name, 1);
            self.virtual_bases.insert(name);
        } else {
            self.absorb_nonvirtual(base);
        }
        self.virtual_bases.extend(base.virtual_bases.iter().copied());
        self.height = self.height.max(base.height + 1);
    }

    fn absorb_nonvirtual(&mut self, base: &SubobjectProfile<'a>) {
        for (name, count) in &base.counts {
            bump(&mut self.counts, *name, *count);
        }
        for (name, count) in &base.virtual_refs {
            bump(&mut self.virtual_refs, *name, *count);
        }
    }
}

fn bump<'a>(map: &mut HashMap<&'a str, u8>, name: &'a str, by: u8) {
    let count = map.entry(name).or_insert(0);
    *count = count.saturating_add(by).min(2);
}

/// Fills `profiles` for `class` and everything below it. `depth` is the level `class` is
/// reached at, direct bases of the class being examined are level one.
fn profile<'a>(
    class: &'a TypeInfo,
    depth: usize,
    max_depth: usize,
    profiles: &mut HashMap<&'a str, SubobjectProfile<'a>>,
) -> Result<()> {
    if let Some(known) = profiles.get(class.name.as_str()) {
        if depth + known.height - 1 > max_depth {
            return Err(Error::RecursionLimit(max_depth));
        }
        return Ok(());
    }
    if depth > max_depth {
        return Err(Error::RecursionLimit(max_depth));
    }

    let mut summary = SubobjectProfile {
        height: 1,
        ..SubobjectProfile::default()
    };
    bump(&mut summary.counts, class.name.as_str(), 1);

    if let Some(info) = class.as_class() {
        for (base, is_virtual) in info.direct_bases() {
            profile(base, depth + 1, max_depth, profiles)?;
            if let Some(base_profile) = profiles.get(base.name.as_str()) {
                summary.absorb(base.name.as_str(), base_profile, is_virtual);
            }
        }
    }

    profiles.insert(class.name.as_str(), summary);
    Ok(())
}
