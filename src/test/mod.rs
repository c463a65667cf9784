//! Shared fixtures for unit tests.

use crate::typeinfo::{
    BaseEntry, Fundamental, Qualifiers, TypeInfoRc, TypeRegistry, TypeRegistryBuilder,
};

/// One registry holding the hierarchies most tests need.
///
/// ```text
///  Base <- Derived <- Grandchild       Root
///  Base, Unrelated@8 <- TwoBases       Left (virtual Root), Right (virtual Root) <- Diamond
///  private Base <- PrivateDerived      RepeatA (Root), RepeatB@8 (Root) <- Repeat
/// ```
pub(crate) struct Hierarchies {
    pub registry: TypeRegistry,
    pub root: TypeInfoRc,
    pub base: TypeInfoRc,
    pub derived: TypeInfoRc,
    pub grandchild: TypeInfoRc,
    pub unrelated: TypeInfoRc,
    pub private_derived: TypeInfoRc,
    pub two_bases: TypeInfoRc,
    pub left: TypeInfoRc,
    pub right: TypeInfoRc,
    pub diamond: TypeInfoRc,
    pub repeat_a: TypeInfoRc,
    pub repeat_b: TypeInfoRc,
    pub repeat: TypeInfoRc,
    pub int: TypeInfoRc,
    pub void: TypeInfoRc,
    pub nullptr: TypeInfoRc,
    pub color: TypeInfoRc,
    pub int_array: TypeInfoRc,
    pub callback: TypeInfoRc,
    pub base_ptr: TypeInfoRc,
    pub const_base_ptr: TypeInfoRc,
    pub int_member_ptr: TypeInfoRc,
}

impl Hierarchies {
    pub fn new() -> Self {
        let b = TypeRegistryBuilder::new();

        let root = b.class("Root").unwrap();
        let base = b.class("Base").unwrap();
        let derived = b.derived_class("Derived", &base).unwrap();
        let grandchild = b.derived_class("Grandchild", &derived).unwrap();
        let unrelated = b.class("Unrelated").unwrap();

        let private_derived = b
            .class_with_bases("PrivateDerived", vec![BaseEntry::private(&base, 0).unwrap()])
            .unwrap();
        let two_bases = b
            .class_with_bases(
                "TwoBases",
                vec![
                    BaseEntry::public(&base, 0).unwrap(),
                    BaseEntry::public(&unrelated, 8).unwrap(),
                ],
            )
            .unwrap();

        let left = b
            .class_with_bases("Left", vec![BaseEntry::public_virtual(&root, -24).unwrap()])
            .unwrap();
        let right = b
            .class_with_bases("Right", vec![BaseEntry::public_virtual(&root, -24).unwrap()])
            .unwrap();
        let diamond = b
            .class_with_bases(
                "Diamond",
                vec![
                    BaseEntry::public(&left, 0).unwrap(),
                    BaseEntry::public(&right, 16).unwrap(),
                ],
            )
            .unwrap();

        let repeat_a = b.derived_class("RepeatA", &root).unwrap();
        let repeat_b = b.derived_class("RepeatB", &root).unwrap();
        let repeat = b
            .class_with_bases(
                "Repeat",
                vec![
                    BaseEntry::public(&repeat_a, 0).unwrap(),
                    BaseEntry::public(&repeat_b, 8).unwrap(),
                ],
            )
            .unwrap();

        let int = b.fundamental(Fundamental::Int);
        let void = b.fundamental(Fundamental::Void);
        let nullptr = b.fundamental(Fundamental::NullPtr);
        let color = b.enumeration("Color").unwrap();
        let int_array = b.array(&int, 4).unwrap();
        let callback = b.function(&void, &[&int]).unwrap();

        let base_ptr = b.pointer(Qualifiers::empty(), &base).unwrap();
        let const_base_ptr = b.pointer(Qualifiers::CONST, &base).unwrap();
        let int_member_ptr = b
            .pointer_to_member(Qualifiers::empty(), &int, &base)
            .unwrap();

        Hierarchies {
            registry: b.build().unwrap(),
            root,
            base,
            derived,
            grandchild,
            unrelated,
            private_derived,
            two_bases,
            left,
            right,
            diamond,
            repeat_a,
            repeat_b,
            repeat,
            int,
            void,
            nullptr,
            color,
            int_array,
            callback,
            base_ptr,
            const_base_ptr,
            int_member_ptr,
        }
    }

    /// Every registered descriptor
    pub fn all(&self) -> Vec<TypeInfoRc> {
        self.registry.iter().collect()
    }
}
