//! Base class records of multi-base class descriptors.
//!
//! Each direct base of a multi-base class is described by a [`BaseEntry`]: a handle to the base
//! class descriptor plus one packed machine word (`__offset_flags` in the ABI). The word keeps
//! the byte offset of the base sub-object in its upper bits and two flags in its lowest bits:
//!
//! ```text
//!  isize::BITS-1                       8 7        2   1        0
//! +-------------------------------------+----------+--------+---------+
//! | signed offset                       | reserved | PUBLIC | VIRTUAL |
//! +-------------------------------------+----------+--------+---------+
//! ```
//!
//! Decoding is an arithmetic right shift, so negative offsets (vtable slots of virtual bases)
//! survive the round trip. This layout is the binary contract with compiler-emitted metadata.

use std::fmt;

use bitflags::bitflags;

use crate::{typeinfo::TypeInfoRc, Error, Result};

/// Number of low bits reserved for flags in the packed offset word
pub const BASE_OFFSET_SHIFT: u32 = 8;
/// Bitmask for flag extraction from the packed offset word
pub const BASE_FLAGS_MASK: isize = (1 << BASE_OFFSET_SHIFT) - 1;
/// Smallest offset that can be packed
pub const BASE_OFFSET_MIN: isize = isize::MIN >> BASE_OFFSET_SHIFT;
/// Largest offset that can be packed
pub const BASE_OFFSET_MAX: isize = isize::MAX >> BASE_OFFSET_SHIFT;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Flags of a single base class relation
    pub struct BaseFlags: u8 {
        /// The base is a virtual base; the offset field is a vtable slot
        const VIRTUAL = 0x1;
        /// The base is publicly accessible
        const PUBLIC = 0x2;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Shape of a multi-base class hierarchy
    pub struct HierarchyFlags: u32 {
        /// Some base class type occurs as more than one distinct sub-object
        const NON_DIAMOND_REPEAT = 0x1;
        /// Some virtual base is reached through more than one path
        const DIAMOND_SHAPED = 0x2;
    }
}

/// Packs an offset and flags into one offset/flags word.
///
/// # Errors
/// Returns [`Error::OffsetOutOfRange`] if `offset` does not fit into the bits above
/// [`BASE_OFFSET_SHIFT`].
pub fn encode_offset_flags(offset: isize, flags: BaseFlags) -> Result<isize> {
    if !(BASE_OFFSET_MIN..=BASE_OFFSET_MAX).contains(&offset) {
        return Err(Error::OffsetOutOfRange(offset));
    }

    Ok((offset << BASE_OFFSET_SHIFT) | isize::from(flags.bits()))
}

/// Splits an offset/flags word into its offset and flags.
///
/// Reserved flag bits are dropped.
#[must_use]
pub fn decode_offset_flags(raw: isize) -> (isize, BaseFlags) {
    let offset = raw >> BASE_OFFSET_SHIFT;
    let flags = BaseFlags::from_bits_truncate((raw & BASE_FLAGS_MASK) as u8);
    (offset, flags)
}

/// One direct base of a multi-base class.
#[derive(Clone)]
pub struct BaseEntry {
    base: TypeInfoRc,
    offset_flags: isize,
}

impl BaseEntry {
    /// Creates a base entry from its decoded parts
    ///
    /// ## Arguments
    /// * 'base'    - Descriptor of the base class
    /// * 'offset'  - Byte offset of the sub-object, or the vtable slot for virtual bases
    /// * 'flags'   - Accessibility and virtuality
    ///
    /// # Errors
    /// Returns [`Error::OffsetOutOfRange`] if the offset can not be packed
    pub fn new(base: &TypeInfoRc, offset: isize, flags: BaseFlags) -> Result<Self> {
        Ok(BaseEntry {
            base: base.clone(),
            offset_flags: encode_offset_flags(offset, flags)?,
        })
    }

    /// Creates a base entry from a compiler-emitted offset/flags word, verbatim
    #[must_use]
    pub fn from_raw(base: &TypeInfoRc, offset_flags: isize) -> Self {
        BaseEntry {
            base: base.clone(),
            offset_flags,
        }
    }

    /// Public, non-virtual base at `offset`
    ///
    /// # Errors
    /// Returns [`Error::OffsetOutOfRange`] if the offset can not be packed
    pub fn public(base: &TypeInfoRc, offset: isize) -> Result<Self> {
        Self::new(base, offset, BaseFlags::PUBLIC)
    }

    /// Private (or protected), non-virtual base at `offset`
    ///
    /// # Errors
    /// Returns [`Error::OffsetOutOfRange`] if the offset can not be packed
    pub fn private(base: &TypeInfoRc, offset: isize) -> Result<Self> {
        Self::new(base, offset, BaseFlags::empty())
    }

    /// Public virtual base whose offset is stored in vtable slot `slot`
    ///
    /// # Errors
    /// Returns [`Error::OffsetOutOfRange`] if the slot can not be packed
    pub fn public_virtual(base: &TypeInfoRc, slot: isize) -> Result<Self> {
        Self::new(base, slot, BaseFlags::PUBLIC | BaseFlags::VIRTUAL)
    }

    /// Descriptor of the base class
    #[must_use]
    pub fn base(&self) -> &TypeInfoRc {
        &self.base
    }

    /// The packed offset/flags word
    #[must_use]
    pub fn raw(&self) -> isize {
        self.offset_flags
    }

    /// Byte offset of the base (vtable slot for virtual bases)
    #[must_use]
    pub fn offset(&self) -> isize {
        decode_offset_flags(self.offset_flags).0
    }

    /// Accessibility and virtuality flags
    #[must_use]
    pub fn flags(&self) -> BaseFlags {
        decode_offset_flags(self.offset_flags).1
    }

    /// True if the base is virtual
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.flags().contains(BaseFlags::VIRTUAL)
    }

    /// True if the base is publicly accessible
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.flags().contains(BaseFlags::PUBLIC)
    }
}

impl fmt::Debug for BaseEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseEntry")
            .field("base", &self.base.name)
            .field("offset", &self.offset())
            .field("flags", &self.flags())
            .finish()
    }
}
