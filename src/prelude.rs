//! # cxxcatch Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! of the cxxcatch library. Import it to get quick access to everything needed to build a
//! descriptor graph and match handlers against it.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cxxcatch operations
pub use crate::Error;

/// The result type used throughout cxxcatch
pub use crate::Result;

/// Configuration for matching and descriptor validation
pub use crate::{MatchConfig, TypeIdentity};

// ================================================================================================
// Type Descriptors
// ================================================================================================

/// Descriptor handles and variants
pub use crate::typeinfo::{ClassInfo, Fundamental, TypeInfo, TypeInfoKind, TypeInfoRc, TypeKind};

/// Base class records and hierarchy shape
pub use crate::typeinfo::{BaseEntry, BaseFlags, HierarchyFlags};

/// Pointer descriptors
pub use crate::typeinfo::{PointerBase, PointerToMember, Qualifiers};

/// Descriptor graph construction and lookup
pub use crate::typeinfo::{TypeRegistry, TypeRegistryBuilder, TypeToken};

// ================================================================================================
// Matching
// ================================================================================================

/// Matching entry point and object addresses
pub use crate::matching::{CatchMatcher, ObjectPtr};

/// Handler selection
pub use crate::matching::{CatchClause, HandlerMatch};

/// Virtual base offset resolution
pub use crate::matching::{NoVirtualBases, VirtualBaseResolver, VirtualBaseTable, VtableReader};
