// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'matching/vbase.rs' reads vtables of live objects in `VtableReader`

//! # cxxcatch
//!
//! Exception handler type matching for the Itanium C++ ABI.
//!
//! When a C++ exception is thrown, the unwinder visits the catch clauses of every frame and asks
//! one question per clause: can a handler declared for type `H` catch an object of type `T`, and
//! which pointer does the handler receive? `cxxcatch` answers that question from runtime type
//! descriptors modelled after the ABI's `type_info` hierarchy, without ever failing: ambiguous,
//! inaccessible or qualification-incompatible conversions are simply "no match".
//!
//! ## Features
//!
//! - **Class hierarchies** - Single, multiple and virtual inheritance with the ABI's ambiguity and
//!   accessibility rules, including diamonds over virtual bases
//! - **Pointer conversions** - Qualification conversions across multi-level pointers, `void*`,
//!   derived-to-base pointer conversions, `noexcept` function pointer conversions
//! - **Pointers to member** - Context class matching through unambiguous public bases
//! - **Binary compatible base records** - The packed `__offset_flags` word of compiler-emitted
//!   metadata is accepted verbatim
//! - **Concurrent** - Descriptors are immutable `Arc` handles; matching is lock-free
//!
//! ## Quick Start
//!
//! ```rust
//! use cxxcatch::prelude::*;
//!
//! let builder = TypeRegistryBuilder::new();
//! let exception = builder.class("std::exception")?;
//! let logic_error = builder.derived_class("std::logic_error", &exception)?;
//! let registry = builder.build()?;
//!
//! let matcher = registry.matcher();
//! let thrown = ObjectPtr::new(0x7f00_0000_1000);
//! assert_eq!(matcher.try_catch(&exception, &logic_error, thrown), Some(thrown));
//! assert_eq!(matcher.try_catch(&logic_error, &exception, thrown), None);
//! # Ok::<(), cxxcatch::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`typeinfo`] - The descriptor graph: [`typeinfo::TypeInfo`], class and pointer descriptors,
//!   the packed base records and the [`typeinfo::TypeRegistryBuilder`]
//! - [`matching`] - The engine: [`CatchMatcher`], the upcast walk accumulator, virtual base
//!   resolution and handler selection for a try-block
//! - [`MatchConfig`] - Identity semantics and validation switches
//!
//! ## Virtual Bases
//!
//! The location of a virtual base depends on the dynamic type of the object and is stored in its
//! vtable. A [`CatchMatcher`] reads it through a [`VirtualBaseResolver`]; the default matcher
//! resolves nothing, so upcasts through virtual bases of live objects need a
//! [`matching::VtableReader`] or a [`matching::VirtualBaseTable`].
//!
//! ## Error Handling
//!
//! Matching returns plain booleans. Only building a registry can fail, with [`Error`]:
//!
//! ```rust
//! use cxxcatch::{typeinfo::TypeRegistryBuilder, Error};
//!
//! let builder = TypeRegistryBuilder::new();
//! let int = builder.fundamental(cxxcatch::typeinfo::Fundamental::Int);
//! assert!(matches!(builder.derived_class("Bad", &int), Err(Error::NotAClass(_))));
//! # Ok::<(), cxxcatch::Error>(())
//! ```
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! cargo +nightly fuzz run hierarchy --release
//! ```

#[macro_use]
pub(crate) mod error;
mod config;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cxxcatch::prelude::*;
///
/// let builder = TypeRegistryBuilder::new();
/// let base = builder.class("Base")?;
/// let ptr = builder.pointer(Qualifiers::CONST, &base)?;
/// assert_eq!(ptr.name, "PK4Base");
/// # Ok::<(), cxxcatch::Error>(())
/// ```
pub mod prelude;

/// Runtime type descriptors modelled after the Itanium ABI `type_info` hierarchy
///
/// # Key Types
///
/// - [`typeinfo::TypeInfo`] - A single descriptor
/// - [`typeinfo::ClassInfo`] - Class shape (no base, single public base, multi base)
/// - [`typeinfo::BaseEntry`] - Packed base class record
/// - [`typeinfo::TypeRegistry`] / [`typeinfo::TypeRegistryBuilder`] - Descriptor graph
pub mod typeinfo;

/// The catch matching engine
///
/// # Key Types
///
/// - [`matching::CatchMatcher`] - Entry point of every match
/// - [`matching::UpcastSearchState`] - Accumulator of a hierarchy walk
/// - [`matching::CatchClause`] - Catch clauses of a try-block
pub mod matching;

/// `cxxcatch` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cxxcatch` Error type
///
/// Returned while building and validating a descriptor graph. Matching itself never fails.
pub use error::Error;

/// Matching and validation configuration
pub use config::{MatchConfig, TypeIdentity};

/// Entry point of the matching engine
pub use matching::{CatchMatcher, ObjectPtr, VirtualBaseResolver};
