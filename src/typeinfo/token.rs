use std::fmt;

use strum::IntoEnumIterator;

use crate::typeinfo::TypeKind;

/// Registry key of one descriptor: its [`TypeKind`] in the high byte, its registration order in
/// the low 24 bits.
///
/// Keying the primary storage by token groups descriptors by variant, so iterating a registry
/// yields fundamentals first, then arrays, functions, enums, the three class shapes and finally
/// pointers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeToken(u32);

impl TypeToken {
    /// Token of the `row`-th registration, a descriptor of variant `kind`
    #[must_use]
    pub fn from_parts(kind: TypeKind, row: u32) -> Self {
        TypeToken((u32::from(kind as u8) << 24) | (row & 0x00FF_FFFF))
    }

    /// The raw kind byte
    #[must_use]
    pub fn kind_tag(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The descriptor variant this token was issued for
    #[must_use]
    pub fn kind(&self) -> Option<TypeKind> {
        TypeKind::iter().find(|kind| *kind as u8 == self.kind_tag())
    }

    /// Registration order within the registry
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeToken(0x{:08x})", self.0)
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{kind}#{}", self.row()),
            None => write!(f, "0x{:08x}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        let token = TypeToken::from_parts(TypeKind::VmiClass, 0x12);
        assert_eq!(token.kind_tag(), 0x07);
        assert_eq!(token.kind(), Some(TypeKind::VmiClass));
        assert_eq!(token.row(), 0x12);
        assert_eq!(token.to_string(), "VmiClass#18");
        assert_eq!(format!("{token:?}"), "TypeToken(0x07000012)");
    }

    #[test]
    fn test_order_groups_by_kind() {
        let late_fundamental = TypeToken::from_parts(TypeKind::Fundamental, 900);
        let early_pointer = TypeToken::from_parts(TypeKind::Pointer, 1);
        assert!(late_fundamental < early_pointer);
    }

    #[test]
    fn test_unknown_kind_displays_raw() {
        let token = TypeToken(0xFF00_0001);
        assert_eq!(token.kind(), None);
        assert_eq!(token.to_string(), "0xff000001");
    }
}
