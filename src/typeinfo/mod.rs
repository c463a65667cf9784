//! Runtime type descriptors for exception matching.
//!
//! This module provides the descriptor graph the matching engine operates on. Every catchable
//! type of a program is represented by exactly one [`TypeInfo`], shared through [`TypeInfoRc`]
//! handles and never mutated after its registry has been built.
//!
//! # Key Components
//!
//! - [`TypeInfo`]: A single descriptor (identity plus [`TypeInfoKind`])
//! - [`ClassInfo`]: Inheritance shape of a class (no base, single public base, multi base)
//! - [`BaseEntry`]: Packed offset/flags record of one direct base
//! - [`PointerBase`] / [`PointerToMember`]: Pointer levels with their [`Qualifiers`]
//! - [`TypeRegistry`]: Immutable lookup of all descriptors
//! - [`TypeRegistryBuilder`]: Registers and validates descriptors
//!
//! # Examples
//!
//! ```rust
//! use cxxcatch::typeinfo::{BaseEntry, Qualifiers, TypeRegistryBuilder};
//!
//! let builder = TypeRegistryBuilder::new();
//! let base = builder.class("Base")?;
//! let mixin = builder.class("Mixin")?;
//! let derived = builder.class_with_bases(
//!     "Derived",
//!     vec![BaseEntry::public(&mixin, 0)?, BaseEntry::public(&base, 16)?],
//! )?;
//! let registry = builder.build()?;
//!
//! let handler = registry.get_by_name("4Base").unwrap();
//! assert!(handler.can_catch(&derived, &mut cxxcatch::ObjectPtr::new(0x1000)));
//! # Ok::<(), cxxcatch::Error>(())
//! ```

mod base;
mod builder;
mod class;
mod leaf;
mod mangle;
mod pointer;
mod registry;
mod token;

use std::{fmt, sync::Arc};

use strum::{Display, EnumCount, EnumIter};

pub use base::{
    decode_offset_flags, encode_offset_flags, BaseEntry, BaseFlags, HierarchyFlags,
    BASE_FLAGS_MASK, BASE_OFFSET_MAX, BASE_OFFSET_MIN, BASE_OFFSET_SHIFT,
};
pub use builder::TypeRegistryBuilder;
pub use class::{compute_hierarchy_flags, walk_to, ClassInfo};
pub use leaf::Fundamental;
pub use pointer::{PointerBase, PointerToMember, QualificationTracker, Qualifiers};
pub use registry::TypeRegistry;
pub use token::TypeToken;

pub(crate) use class::can_catch_class;
pub(crate) use leaf::can_catch_leaf;
pub(crate) use pointer::can_catch_pointer;

use crate::matching::{CatchMatcher, ObjectPtr};

/// Reference to a `TypeInfo`
pub type TypeInfoRc = Arc<TypeInfo>;

/// The descriptor variants of the Itanium ABI (`__fundamental_type_info`, `__class_type_info`,
/// ...). The discriminant is stored in the high byte of every [`TypeToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, Display)]
#[repr(u8)]
pub enum TypeKind {
    /// Builtin type
    Fundamental = 0x01,
    /// Array type
    Array = 0x02,
    /// Function type
    Function = 0x03,
    /// Enumeration type
    Enum = 0x04,
    /// Class without bases
    Class = 0x05,
    /// Class with a single public, non-virtual base at offset zero
    SiClass = 0x06,
    /// Class with multiple, private or virtual bases
    VmiClass = 0x07,
    /// Pointer type
    Pointer = 0x08,
    /// Pointer-to-member type
    PointerToMember = 0x09,
}

/// Variant specific data of a descriptor
#[derive(Debug, Clone)]
pub enum TypeInfoKind {
    /// Builtin type
    Fundamental(Fundamental),
    /// Array type, matched by identity
    Array,
    /// Function type, matched by identity
    Function,
    /// Enumeration type, matched by identity
    Enum,
    /// Class type
    Class(ClassInfo),
    /// Pointer type
    Pointer(PointerBase),
    /// Pointer-to-member type
    PointerToMember(PointerToMember),
}

/// A runtime type descriptor.
///
/// Descriptors are created by a [`TypeRegistryBuilder`] and shared as [`TypeInfoRc`]. Identity
/// is the Itanium mangled name (or the object address, see [`crate::TypeIdentity`]).
pub struct TypeInfo {
    /// Registry token
    pub token: TypeToken,
    /// Itanium mangled name, e.g. `PK4Base`
    pub name: String,
    /// Human readable name, e.g. `const Base*`
    pub display_name: String,
    /// Variant specific data
    pub kind: TypeInfoKind,
    /// Id of the registry that created this descriptor
    pub(crate) registry: u32,
}

impl TypeInfoKind {
    /// The descriptor variant
    #[must_use]
    pub fn type_kind(&self) -> TypeKind {
        match self {
            TypeInfoKind::Fundamental(_) => TypeKind::Fundamental,
            TypeInfoKind::Array => TypeKind::Array,
            TypeInfoKind::Function => TypeKind::Function,
            TypeInfoKind::Enum => TypeKind::Enum,
            TypeInfoKind::Class(class) => class.kind(),
            TypeInfoKind::Pointer(_) => TypeKind::Pointer,
            TypeInfoKind::PointerToMember(_) => TypeKind::PointerToMember,
        }
    }
}

impl TypeInfo {
    /// The descriptor variant
    #[must_use]
    pub fn type_kind(&self) -> TypeKind {
        self.kind.type_kind()
    }

    /// Class information, if this is a class type
    #[must_use]
    pub fn as_class(&self) -> Option<&ClassInfo> {
        match &self.kind {
            TypeInfoKind::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Pointer level information, if this is a pointer or pointer-to-member type
    #[must_use]
    pub fn as_pointer(&self) -> Option<&PointerBase> {
        match &self.kind {
            TypeInfoKind::Pointer(pointer) => Some(pointer),
            TypeInfoKind::PointerToMember(member) => Some(&member.pointer),
            _ => None,
        }
    }

    /// True for class types
    #[must_use]
    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeInfoKind::Class(_))
    }

    /// True for function types
    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(self.kind, TypeInfoKind::Function)
    }

    /// True for `void`
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeInfoKind::Fundamental(Fundamental::Void))
    }

    /// True for `std::nullptr_t`
    #[must_use]
    pub fn is_nullptr(&self) -> bool {
        matches!(self.kind, TypeInfoKind::Fundamental(Fundamental::NullPtr))
    }

    /// True for pointer and pointer-to-member types
    #[must_use]
    pub fn is_pointer(&self) -> bool {
        matches!(
            self.kind,
            TypeInfoKind::Pointer(_) | TypeInfoKind::PointerToMember(_)
        )
    }

    /// Hierarchy shape flags of a multi-base class, empty for everything else
    #[must_use]
    pub fn hierarchy_flags(&self) -> HierarchyFlags {
        self.as_class().map(ClassInfo::flags).unwrap_or_default()
    }

    /// Checks whether a handler for this type catches an exception of type `thrown`.
    ///
    /// Uses [`CatchMatcher::default`], which can not resolve virtual base offsets of live
    /// objects. Use a matcher with a [`crate::VirtualBaseResolver`] for hierarchies with
    /// virtual bases.
    ///
    /// ## Arguments
    /// * 'thrown'   - Descriptor of the thrown object's type
    /// * 'adjusted' - The thrown object (the pointer value itself for pointer types); replaced
    ///   by the pointer the handler receives on success
    pub fn can_catch(&self, thrown: &TypeInfo, adjusted: &mut ObjectPtr) -> bool {
        CatchMatcher::default().can_catch(self, thrown, adjusted)
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("kind", &self.type_kind())
            .finish()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}
