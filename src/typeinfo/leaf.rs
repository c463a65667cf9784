//! Leaf descriptors: fundamental, array, function and enumeration types.
//!
//! Leaf types have no hierarchy and no pointee. A handler declared for a leaf type catches an
//! exception only if the thrown type is the very same type; the exception object is handed to
//! the handler without any pointer adjustment.

use strum::{Display, EnumCount, EnumIter};

use crate::{matching::CatchMatcher, typeinfo::TypeInfo};

/// The builtin (fundamental) types of the Itanium C++ ABI.
///
/// Every registry pre-registers one descriptor per variant, named by its mangled builtin code
/// (see [`Fundamental::mangled`]). The [`Display`] output is the C++ spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, Display)]
pub enum Fundamental {
    /// `void`
    #[strum(serialize = "void")]
    Void,
    /// `bool`
    #[strum(serialize = "bool")]
    Bool,
    /// `char`
    #[strum(serialize = "char")]
    Char,
    /// `signed char`
    #[strum(serialize = "signed char")]
    SignedChar,
    /// `unsigned char`
    #[strum(serialize = "unsigned char")]
    UnsignedChar,
    /// `short`
    #[strum(serialize = "short")]
    Short,
    /// `unsigned short`
    #[strum(serialize = "unsigned short")]
    UnsignedShort,
    /// `int`
    #[strum(serialize = "int")]
    Int,
    /// `unsigned int`
    #[strum(serialize = "unsigned int")]
    UnsignedInt,
    /// `long`
    #[strum(serialize = "long")]
    Long,
    /// `unsigned long`
    #[strum(serialize = "unsigned long")]
    UnsignedLong,
    /// `long long`
    #[strum(serialize = "long long")]
    LongLong,
    /// `unsigned long long`
    #[strum(serialize = "unsigned long long")]
    UnsignedLongLong,
    /// `__int128`
    #[strum(serialize = "__int128")]
    Int128,
    /// `unsigned __int128`
    #[strum(serialize = "unsigned __int128")]
    UnsignedInt128,
    /// `float`
    #[strum(serialize = "float")]
    Float,
    /// `double`
    #[strum(serialize = "double")]
    Double,
    /// `long double`
    #[strum(serialize = "long double")]
    LongDouble,
    /// `__float128`
    #[strum(serialize = "__float128")]
    Float128,
    /// `wchar_t`
    #[strum(serialize = "wchar_t")]
    WChar,
    /// `char8_t`
    #[strum(serialize = "char8_t")]
    Char8,
    /// `char16_t`
    #[strum(serialize = "char16_t")]
    Char16,
    /// `char32_t`
    #[strum(serialize = "char32_t")]
    Char32,
    /// `decltype(nullptr)`
    #[strum(serialize = "std::nullptr_t")]
    NullPtr,
}

impl Fundamental {
    /// Returns the Itanium builtin type code (`i` for `int`, `Dn` for `std::nullptr_t`, ...)
    #[must_use]
    pub fn mangled(self) -> &'static str {
        match self {
            Fundamental::Void => "v",
            Fundamental::Bool => "b",
            Fundamental::Char => "c",
            Fundamental::SignedChar => "a",
            Fundamental::UnsignedChar => "h",
            Fundamental::Short => "s",
            Fundamental::UnsignedShort => "t",
            Fundamental::Int => "i",
            Fundamental::UnsignedInt => "j",
            Fundamental::Long => "l",
            Fundamental::UnsignedLong => "m",
            Fundamental::LongLong => "x",
            Fundamental::UnsignedLongLong => "y",
            Fundamental::Int128 => "n",
            Fundamental::UnsignedInt128 => "o",
            Fundamental::Float => "f",
            Fundamental::Double => "d",
            Fundamental::LongDouble => "e",
            Fundamental::Float128 => "g",
            Fundamental::WChar => "w",
            Fundamental::Char8 => "Du",
            Fundamental::Char16 => "Ds",
            Fundamental::Char32 => "Di",
            Fundamental::NullPtr => "Dn",
        }
    }
}

/// Leaf matching: identity only, the adjusted pointer is left untouched.
pub(crate) fn can_catch_leaf(matcher: &CatchMatcher<'_>, handler: &TypeInfo, thrown: &TypeInfo) -> bool {
    matcher.same_type(handler, thrown)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_mangled_codes_unique() {
        let codes: HashSet<&str> = Fundamental::iter().map(Fundamental::mangled).collect();
        assert_eq!(codes.len(), Fundamental::COUNT);
    }

    #[test]
    fn test_display() {
        assert_eq!(Fundamental::UnsignedLong.to_string(), "unsigned long");
        assert_eq!(Fundamental::NullPtr.to_string(), "std::nullptr_t");
        assert_eq!(Fundamental::Int.mangled(), "i");
        assert_eq!(Fundamental::Char16.mangled(), "Ds");
    }
}
