//! Handler selection for a try-block.
//!
//! A try-block has an ordered list of catch clauses. When an exception reaches the block, the
//! clauses are examined in program order and the first one whose type can catch the thrown type
//! wins; a `catch (...)` clause catches everything. The same primitive decides whether a
//! dynamic exception specification (`throw(A, B)`) permits an exception to leave a function.
//!
//! # Handler Search
//!
//! 1. Clauses are examined in order, first clause first
//! 2. A [`CatchClause::Typed`] clause matches if [`CatchMatcher::can_catch`] succeeds; the
//!    adjusted pointer is what the handler receives
//! 3. A [`CatchClause::CatchAll`] clause matches unconditionally and receives the original object
//! 4. If no clause matches, unwinding continues in the caller
//!
//! # Examples
//!
//! ```rust
//! use cxxcatch::{
//!     matching::{CatchClause, CatchMatcher},
//!     typeinfo::{BaseEntry, TypeRegistryBuilder},
//!     ObjectPtr,
//! };
//!
//! let builder = TypeRegistryBuilder::new();
//! let base = builder.class("Base")?;
//! let other = builder.class("Other")?;
//! let derived = builder.class_with_bases(
//!     "Derived",
//!     vec![BaseEntry::public(&other, 0)?, BaseEntry::public(&base, 8)?],
//! )?;
//!
//! let clauses = [
//!     CatchClause::Typed(builder.fundamental(cxxcatch::typeinfo::Fundamental::Int)),
//!     CatchClause::Typed(base.clone()),
//!     CatchClause::CatchAll,
//! ];
//!
//! let matcher = CatchMatcher::default();
//! let found = matcher.find_handler(&clauses, &derived, ObjectPtr::new(0x1000)).unwrap();
//! assert_eq!(found.index, 1);
//! assert_eq!(found.adjusted, ObjectPtr::new(0x1008));
//! # Ok::<(), cxxcatch::Error>(())
//! ```

use log::debug;

use crate::{
    matching::{CatchMatcher, ObjectPtr},
    typeinfo::{TypeInfo, TypeInfoRc},
};

/// One catch clause of a try-block.
#[derive(Debug, Clone)]
pub enum CatchClause {
    /// `catch (T)`, `catch (T&)` or `catch (T*)` - the handler type
    Typed(TypeInfoRc),
    /// `catch (...)`
    CatchAll,
}

impl CatchClause {
    /// The handler type, `None` for a catch-all clause
    #[must_use]
    pub fn handler_type(&self) -> Option<&TypeInfoRc> {
        match self {
            CatchClause::Typed(handler) => Some(handler),
            CatchClause::CatchAll => None,
        }
    }
}

/// The clause selected for a thrown exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerMatch {
    /// Position of the clause in the try-block
    pub index: usize,
    /// Pointer the handler receives
    pub adjusted: ObjectPtr,
}

impl CatchMatcher<'_> {
    /// Finds the handler for an exception thrown into a try-block.
    ///
    /// # Arguments
    ///
    /// * `clauses` - Catch clauses of the try-block, in program order
    /// * `thrown` - Descriptor of the thrown object's type
    /// * `object` - The thrown object (the pointer value itself for pointer types)
    ///
    /// # Returns
    ///
    /// The first matching clause and the adjusted pointer, or `None` if unwinding has to continue
    /// in the caller.
    #[must_use]
    pub fn find_handler(
        &self,
        clauses: &[CatchClause],
        thrown: &TypeInfo,
        object: ObjectPtr,
    ) -> Option<HandlerMatch> {
        for (index, clause) in clauses.iter().enumerate() {
            let adjusted = match clause {
                CatchClause::Typed(handler) => match self.try_catch(handler, thrown, object) {
                    Some(adjusted) => adjusted,
                    None => continue,
                },
                CatchClause::CatchAll => object,
            };

            debug!(
                "Clause {} catches {} thrown at {}, handler receives {}",
                index, thrown.name, object, adjusted
            );
            return Some(HandlerMatch { index, adjusted });
        }

        debug!("No clause of {} catches {}", clauses.len(), thrown.name);
        None
    }

    /// Checks a dynamic exception specification.
    ///
    /// # Arguments
    ///
    /// * `spec` - Types listed in the `throw(...)` specification; empty means `throw()`
    /// * `thrown` - Descriptor of the thrown object's type
    /// * `object` - The thrown object
    ///
    /// # Returns
    ///
    /// True if some listed type can catch the exception, i.e. it may propagate.
    #[must_use]
    pub fn exception_spec_allows(
        &self,
        spec: &[TypeInfoRc],
        thrown: &TypeInfo,
        object: ObjectPtr,
    ) -> bool {
        let allowed = spec
            .iter()
            .any(|handler| self.try_catch(handler, thrown, object).is_some());
        if !allowed {
            debug!("Exception specification rejects {}", thrown.name);
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::Hierarchies;

    fn create_test_clauses(h: &Hierarchies) -> Vec<CatchClause> {
        vec![
            CatchClause::Typed(h.int.clone()),
            CatchClause::Typed(h.unrelated.clone()),
            CatchClause::Typed(h.base.clone()),
            CatchClause::Typed(h.derived.clone()),
            CatchClause::CatchAll,
        ]
    }

    #[test]
    fn test_first_match_wins() {
        let h = Hierarchies::new();
        let clauses = create_test_clauses(&h);
        let matcher = CatchMatcher::default();

        // Derived is caught by the earlier Base clause
        let found = matcher
            .find_handler(&clauses, &h.derived, ObjectPtr::new(0x1000))
            .unwrap();
        assert_eq!(found.index, 2);
        assert_eq!(found.adjusted, ObjectPtr::new(0x1000));

        let found = matcher
            .find_handler(&clauses, &h.int, ObjectPtr::new(0x2000))
            .unwrap();
        assert_eq!(found.index, 0);
    }

    #[test]
    fn test_adjusted_pointer_reported() {
        let h = Hierarchies::new();
        let clauses = [CatchClause::Typed(h.unrelated.clone())];
        let found = CatchMatcher::default()
            .find_handler(&clauses, &h.two_bases, ObjectPtr::new(0x1000))
            .unwrap();
        assert_eq!(found.adjusted, ObjectPtr::new(0x1008));
    }

    #[test]
    fn test_catch_all() {
        let h = Hierarchies::new();
        let clauses = create_test_clauses(&h);
        let found = CatchMatcher::default()
            .find_handler(&clauses, &h.color, ObjectPtr::new(0x3000))
            .unwrap();
        assert_eq!(found.index, 4);
        assert_eq!(found.adjusted, ObjectPtr::new(0x3000));
        assert!(clauses[4].handler_type().is_none());
    }

    #[test]
    fn test_no_handler() {
        let h = Hierarchies::new();
        let clauses = vec![
            CatchClause::Typed(h.base.clone()),
            CatchClause::Typed(h.int.clone()),
        ];
        let matcher = CatchMatcher::default();
        assert!(matcher
            .find_handler(&clauses, &h.private_derived, ObjectPtr::new(0x1000))
            .is_none());
        assert!(matcher
            .find_handler(&[], &h.int, ObjectPtr::new(0x1000))
            .is_none());
    }

    #[test]
    fn test_exception_spec() {
        let h = Hierarchies::new();
        let matcher = CatchMatcher::default();
        let spec = vec![h.int.clone(), h.base.clone()];
        let object = ObjectPtr::new(0x1000);

        assert!(matcher.exception_spec_allows(&spec, &h.grandchild, object));
        assert!(matcher.exception_spec_allows(&spec, &h.int, object));
        assert!(!matcher.exception_spec_allows(&spec, &h.unrelated, object));
        // throw()
        assert!(!matcher.exception_spec_allows(&[], &h.int, object));
    }
}
