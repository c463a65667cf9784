//! Virtual base offset resolution.
//!
//! The position of a virtual base inside an object depends on the dynamic type of the object,
//! so the descriptor only records the vtable slot that holds the offset. Reading that slot is
//! delegated to a [`VirtualBaseResolver`]:
//!
//! - [`VtableReader`] follows the vtable pointer of live objects laid out by an Itanium ABI
//!   compiler
//! - [`VirtualBaseTable`] answers from an explicit map, for emulated or synthetic objects
//! - [`NoVirtualBases`] answers nothing; upcasts of a non-null object to a class inside a
//!   virtual base then fail, other bases are still found
//!
//! # Examples
//!
//! ```rust
//! use cxxcatch::{matching::VirtualBaseTable, ObjectPtr, VirtualBaseResolver};
//!
//! let mut table = VirtualBaseTable::new();
//! table.insert(ObjectPtr::new(0x1000), -24, 0x30);
//! assert_eq!(table.virtual_base_offset(ObjectPtr::new(0x1000), -24), Some(0x30));
//! assert_eq!(table.virtual_base_offset(ObjectPtr::new(0x2000), -24), None);
//! ```

use std::collections::HashMap;

use crate::matching::ObjectPtr;

/// Looks up the offset of a virtual base inside a live object.
pub trait VirtualBaseResolver: Send + Sync {
    /// Returns the byte offset from `subobject` to the virtual base whose offset is stored in
    /// vtable slot `slot` (a byte offset relative to the vtable address point).
    ///
    /// `None` means the offset is unknown; the matcher treats the base as unreachable.
    fn virtual_base_offset(&self, subobject: ObjectPtr, slot: isize) -> Option<isize>;
}

/// Resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVirtualBases;

impl VirtualBaseResolver for NoVirtualBases {
    fn virtual_base_offset(&self, _subobject: ObjectPtr, _slot: isize) -> Option<isize> {
        None
    }
}

/// Explicit `(sub-object, slot) -> offset` map.
#[derive(Debug, Clone, Default)]
pub struct VirtualBaseTable {
    offsets: HashMap<(ObjectPtr, isize), isize>,
}

impl VirtualBaseTable {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the virtual base behind `slot` of `subobject` is `offset` bytes away
    pub fn insert(&mut self, subobject: ObjectPtr, slot: isize, offset: isize) -> &mut Self {
        self.offsets.insert((subobject, slot), offset);
        self
    }

    /// Number of recorded offsets
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True if no offset is recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

impl VirtualBaseResolver for VirtualBaseTable {
    fn virtual_base_offset(&self, subobject: ObjectPtr, slot: isize) -> Option<isize> {
        self.offsets.get(&(subobject, slot)).copied()
    }
}

/// Reads virtual base offsets from the vtables of live objects.
///
/// The first word of every polymorphic sub-object is its vtable pointer; the offset of a virtual
/// base is the `isize` stored `slot` bytes from the address the vtable pointer refers to.
#[derive(Debug)]
pub struct VtableReader {
    _guard: (),
}

impl VtableReader {
    /// Creates a reader.
    ///
    /// # Safety
    /// Every non-null object pointer handed to a matcher using this reader must point to a live
    /// object whose sub-objects start with a valid vtable pointer, and every virtual base slot
    /// recorded in the descriptors must be readable in those vtables.
    #[must_use]
    pub unsafe fn new() -> Self {
        VtableReader { _guard: () }
    }
}

impl VirtualBaseResolver for VtableReader {
    fn virtual_base_offset(&self, subobject: ObjectPtr, slot: isize) -> Option<isize> {
        if subobject.is_null() {
            return None;
        }

        // SAFETY: the caller of `VtableReader::new` vouched for every object and slot
        unsafe {
            let vptr = subobject.as_ptr::<usize>().read_unaligned();
            if vptr == 0 {
                return None;
            }
            let entry = (vptr as *const u8).wrapping_offset(slot).cast::<isize>();
            Some(entry.read_unaligned())
        }
    }
}
