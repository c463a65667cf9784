use thiserror::Error;

use crate::typeinfo::HierarchyFlags;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Matching itself never fails: ambiguity, inaccessibility and qualification mismatches all
/// collapse into "no match". Errors only surface while a descriptor graph is being built and
/// validated through [`crate::typeinfo::TypeRegistryBuilder`].
///
/// # Error Categories
///
/// ## Descriptor Input Errors
/// - [`Error::Malformed`] - Descriptor input violates a structural rule
/// - [`Error::OffsetOutOfRange`] - A base offset does not fit the packed encoding
///
/// ## Registry Errors
/// - [`Error::DuplicateType`] - A type with the same mangled name already exists
/// - [`Error::TypeNotFound`] - Requested type is not registered
/// - [`Error::NotAClass`] - A base or context type is not a class
/// - [`Error::ForeignType`] - A referenced type belongs to a different registry
///
/// ## Hierarchy Validation Errors
/// - [`Error::HierarchyFlagsMismatch`] - Declared diamond/repeat flags disagree with the graph
/// - [`Error::RecursionLimit`] - Hierarchy deeper than the configured limit
///
/// # Examples
///
/// ```rust
/// use cxxcatch::{Error, typeinfo::TypeRegistryBuilder};
///
/// let builder = TypeRegistryBuilder::new();
/// builder.class("Widget")?;
/// match builder.class("Widget") {
///     Err(Error::DuplicateType(name)) => assert_eq!(name, "6Widget"),
///     other => panic!("unexpected: {other:?}"),
/// }
/// # Ok::<(), cxxcatch::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The descriptor input is structurally invalid.
    ///
    /// Raised when a descriptor violates a rule of the ABI, for example a multi-base class without
    /// bases or `noexcept` on a pointer to data. The error includes the source location where the
    /// problem was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A base class offset can not be represented in the packed offset/flags word.
    ///
    /// The offset is stored above the flag bits, which leaves `isize::BITS - 8` bits of signed
    /// range. The associated value is the rejected offset.
    #[error("Base class offset {0} does not fit the packed offset encoding")]
    OffsetOutOfRange(isize),

    /// A type with the same mangled name is already registered.
    #[error("Type already registered - {0}")]
    DuplicateType(String),

    /// The requested type is not registered.
    #[error("Failed to find type - {0}")]
    TypeNotFound(String),

    /// A type used as base class or pointer-to-member context is not a class.
    #[error("Type is not a class - {0}")]
    NotAClass(String),

    /// A referenced descriptor was created by a different registry.
    #[error("Type belongs to a different registry - {0}")]
    ForeignType(String),

    /// The declared hierarchy shape flags do not match the inheritance graph.
    #[error("Hierarchy flags of {name} are {declared:?}, graph requires {computed:?}")]
    HierarchyFlagsMismatch {
        /// Mangled name of the offending class
        name: String,
        /// Flags supplied by the caller
        declared: HierarchyFlags,
        /// Flags derived from the base class graph
        computed: HierarchyFlags,
    },

    /// Recursion limit reached.
    ///
    /// Inheritance chains deeper than [`crate::MatchConfig::max_hierarchy_depth`] are rejected
    /// while building. The associated value shows the limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),
}
