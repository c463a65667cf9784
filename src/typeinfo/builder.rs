//! Construction of the descriptor graph.
//!
//! The [`TypeRegistryBuilder`] is the only way to create descriptors. Types are registered
//! bottom-up: a base class, pointee or element type must exist before the type referring to it,
//! which makes cyclic inheritance impossible to express. Registration methods take `&self`, so
//! several loaders may populate one builder concurrently.
//!
//! Every descriptor receives an Itanium style mangled name. Classes and enumerations must have
//! unique names; compound types (pointers, pointers-to-member, arrays, functions) are interned,
//! registering the same compound type twice returns the existing descriptor.
//!
//! # Examples
//!
//! ```rust
//! use cxxcatch::typeinfo::{BaseEntry, Fundamental, HierarchyFlags, Qualifiers, TypeRegistryBuilder};
//!
//! let builder = TypeRegistryBuilder::new();
//! let v = builder.class("V")?;
//! let left = builder.class_with_bases("Left", vec![BaseEntry::public_virtual(&v, -24)?])?;
//! let right = builder.class_with_bases("Right", vec![BaseEntry::public_virtual(&v, -24)?])?;
//! let bottom = builder.class_with_bases(
//!     "Bottom",
//!     vec![BaseEntry::public(&left, 0)?, BaseEntry::public(&right, 16)?],
//! )?;
//! assert_eq!(bottom.hierarchy_flags(), HierarchyFlags::DIAMOND_SHAPED);
//!
//! let ptr = builder.pointer(Qualifiers::CONST, &bottom)?;
//! assert_eq!(ptr.name, "PK6Bottom");
//! let int = builder.fundamental(Fundamental::Int);
//! assert_eq!(builder.pointer(Qualifiers::empty(), &int)?.name, "Pi");
//!
//! let registry = builder.build()?;
//! assert!(registry.get_by_name("PK6Bottom").is_some());
//! # Ok::<(), cxxcatch::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use dashmap::mapref::entry::Entry;
use log::debug;
use rayon::prelude::*;
use strum::IntoEnumIterator;

use crate::{
    typeinfo::{
        class::compute_hierarchy_flags, mangle, BaseEntry, ClassInfo, Fundamental,
        HierarchyFlags, PointerBase, PointerToMember, Qualifiers, TypeInfo, TypeInfoKind,
        TypeInfoRc, TypeRegistry, TypeToken,
    },
    Error, MatchConfig, Result,
};

/// Registers descriptors and produces an immutable [`TypeRegistry`].
pub struct TypeRegistryBuilder {
    registry: TypeRegistry,
    next_row: AtomicU32,
}

impl Default for TypeRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistryBuilder {
    /// Creates a builder with the default [`MatchConfig`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MatchConfig::default())
    }

    /// Creates a builder with the given configuration, all fundamental types pre-registered
    #[must_use]
    pub fn with_config(config: MatchConfig) -> Self {
        let mut builder = TypeRegistryBuilder {
            registry: TypeRegistry::empty(config),
            next_row: AtomicU32::new(1),
        };

        let fundamentals: Vec<TypeInfoRc> = Fundamental::iter()
            .map(|fundamental| {
                let info = builder.create(
                    fundamental.mangled().to_string(),
                    fundamental.to_string(),
                    TypeInfoKind::Fundamental(fundamental),
                );
                builder
                    .registry
                    .types_by_name
                    .insert(info.name.clone(), info.token);
                info
            })
            .collect();
        builder.registry.fundamentals = fundamentals;

        builder
    }

    /// Configuration of the registry under construction
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        self.registry.config()
    }

    /// The descriptor of a builtin type
    #[must_use]
    pub fn fundamental(&self, fundamental: Fundamental) -> TypeInfoRc {
        self.registry.fundamental(fundamental)
    }

    /// Look up an already registered descriptor by mangled name
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<TypeInfoRc> {
        self.registry.get_by_name(name)
    }

    /// Registers an enumeration type
    ///
    /// # Errors
    /// Returns [`Error::DuplicateType`] if the name is taken, [`Error::Malformed`] if it is not
    /// a valid (optionally `::` qualified) identifier
    pub fn enumeration(&self, name: &str) -> Result<TypeInfoRc> {
        let mangled = mangle::source_name(name)?;
        self.register(mangled, name.to_string(), TypeInfoKind::Enum)
    }

    /// Registers (or returns the existing) array type `element[len]`
    ///
    /// # Errors
    /// Returns [`Error::ForeignType`] if `element` belongs to another registry
    pub fn array(&self, element: &TypeInfoRc, len: usize) -> Result<TypeInfoRc> {
        self.ensure_owned(element)?;
        let (name, display) = mangle::array(len, element);
        self.intern(name, display, || TypeInfoKind::Array)
    }

    /// Registers (or returns the existing) function type `ret (params...)`
    ///
    /// # Errors
    /// Returns [`Error::ForeignType`] if a referenced type belongs to another registry
    pub fn function(&self, ret: &TypeInfoRc, params: &[&TypeInfoRc]) -> Result<TypeInfoRc> {
        self.ensure_owned(ret)?;
        for param in params {
            self.ensure_owned(param)?;
        }

        let params: Vec<&TypeInfo> = params.iter().map(|param| param.as_ref()).collect();
        let (name, display) = mangle::function(ret, &params);
        self.intern(name, display, || TypeInfoKind::Function)
    }

    /// Registers a class without bases
    ///
    /// # Errors
    /// Returns [`Error::DuplicateType`] if the name is taken, [`Error::Malformed`] if it is not
    /// a valid (optionally `::` qualified) identifier
    pub fn class(&self, name: &str) -> Result<TypeInfoRc> {
        let mangled = mangle::source_name(name)?;
        self.register(mangled, name.to_string(), TypeInfoKind::Class(ClassInfo::NoBase))
    }

    /// Registers a class with a single public, non-virtual base at offset zero
    ///
    /// # Errors
    /// Returns [`Error::NotAClass`] or [`Error::ForeignType`] for an unusable base, plus the
    /// errors of [`TypeRegistryBuilder::class`]
    pub fn derived_class(&self, name: &str, base: &TypeInfoRc) -> Result<TypeInfoRc> {
        self.ensure_class(base)?;
        let mangled = mangle::source_name(name)?;
        self.register(
            mangled,
            name.to_string(),
            TypeInfoKind::Class(ClassInfo::SinglePublicBase { base: base.clone() }),
        )
    }

    /// Registers a class, picking the descriptor variant a compiler would emit.
    ///
    /// No bases produce [`ClassInfo::NoBase`], one public non-virtual base at offset zero
    /// produces [`ClassInfo::SinglePublicBase`], everything else a [`ClassInfo::MultiBase`] with
    /// computed hierarchy flags.
    ///
    /// # Errors
    /// See [`TypeRegistryBuilder::multi_base_class`]
    pub fn class_with_bases(&self, name: &str, bases: Vec<BaseEntry>) -> Result<TypeInfoRc> {
        let single = match bases.as_slice() {
            [] => return self.class(name),
            [only] if only.is_public() && !only.is_virtual() && only.offset() == 0 => {
                Some(only.base().clone())
            }
            _ => None,
        };

        match single {
            Some(base) => self.derived_class(name, &base),
            None => self.multi_base_class(name, None, bases),
        }
    }

    /// Registers a class with a multi-base descriptor.
    ///
    /// ## Arguments
    /// * 'name'    - Source name of the class
    /// * 'flags'   - Declared hierarchy flags, `None` to derive them from the bases
    /// * 'bases'   - Direct bases in declaration order
    ///
    /// Declared flags are checked against the graph by [`TypeRegistryBuilder::build`] if
    /// [`MatchConfig::validate_hierarchy_flags`] is set.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for an empty base list or (with
    /// [`MatchConfig::validate_single_base`]) a base list a single-base descriptor covers,
    /// [`Error::NotAClass`] or
    /// [`Error::ForeignType`] for unusable bases, [`Error::RecursionLimit`] if the hierarchy is
    /// too deep, plus the errors of [`TypeRegistryBuilder::class`]
    pub fn multi_base_class(
        &self,
        name: &str,
        flags: Option<HierarchyFlags>,
        bases: Vec<BaseEntry>,
    ) -> Result<TypeInfoRc> {
        let mangled = mangle::source_name(name)?;
        match bases.as_slice() {
            [] => return Err(malformed_error!("Multi-base class {} has no bases", name)),
            [only]
                if self.config().validate_single_base
                    && only.is_public()
                    && !only.is_virtual()
                    && only.offset() == 0 =>
            {
                return Err(malformed_error!(
                    "Class {} has a single public base {} at offset 0 and needs the single-base shape",
                    name,
                    only.base().name
                ));
            }
            _ => {}
        }
        for entry in &bases {
            self.ensure_class(entry.base())?;
        }

        let flags = match flags {
            Some(flags) => flags,
            None => compute_hierarchy_flags(&bases, self.config().max_hierarchy_depth)?,
        };

        self.register(
            mangled,
            name.to_string(),
            TypeInfoKind::Class(ClassInfo::MultiBase { flags, bases }),
        )
    }

    /// Registers (or returns the existing) pointer type.
    ///
    /// `qualifiers` describe the pointee: `Qualifiers::CONST` with pointee `int` is `const int*`.
    ///
    /// # Errors
    /// Returns [`Error::ForeignType`] if `pointee` belongs to another registry and
    /// [`Error::Malformed`] for qualifiers that only apply to pointers-to-member or functions, or
    /// if the same pointer was registered before with different `INCOMPLETE` marking
    pub fn pointer(&self, qualifiers: Qualifiers, pointee: &TypeInfoRc) -> Result<TypeInfoRc> {
        self.ensure_owned(pointee)?;
        if qualifiers.contains(Qualifiers::INCOMPLETE_CLASS) {
            return Err(malformed_error!(
                "INCOMPLETE_CLASS on a plain pointer to {}",
                pointee.name
            ));
        }
        Self::check_function_qualifiers(qualifiers, pointee)?;

        let (name, display) = mangle::pointer(qualifiers, pointee);
        let info = self.intern(name, display, || {
            TypeInfoKind::Pointer(PointerBase {
                qualifiers,
                pointee: pointee.clone(),
            })
        })?;
        Self::check_interned_qualifiers(&info, qualifiers)?;
        Ok(info)
    }

    /// Registers (or returns the existing) pointer-to-member type `pointee context::*`
    ///
    /// # Errors
    /// Returns [`Error::NotAClass`] if `context` is not a class, [`Error::ForeignType`] for
    /// types of another registry and [`Error::Malformed`] for function-only qualifiers on a
    /// data member or a differently marked earlier registration
    pub fn pointer_to_member(
        &self,
        qualifiers: Qualifiers,
        pointee: &TypeInfoRc,
        context: &TypeInfoRc,
    ) -> Result<TypeInfoRc> {
        self.ensure_owned(pointee)?;
        self.ensure_class(context)?;
        Self::check_function_qualifiers(qualifiers, pointee)?;

        let (name, display) = mangle::pointer_to_member(qualifiers, pointee, context);
        let info = self.intern(name, display, || {
            TypeInfoKind::PointerToMember(PointerToMember {
                pointer: PointerBase {
                    qualifiers,
                    pointee: pointee.clone(),
                },
                context: context.clone(),
            })
        })?;
        Self::check_interned_qualifiers(&info, qualifiers)?;
        Ok(info)
    }

    /// Validates the graph and hands out the immutable registry.
    ///
    /// With [`MatchConfig::validate_hierarchy_flags`] set, the flags of every multi-base class
    /// are recomputed (in parallel) and compared with the stored ones, and every class is checked
    /// against [`MatchConfig::max_hierarchy_depth`].
    ///
    /// # Errors
    /// Returns [`Error::HierarchyFlagsMismatch`] or [`Error::RecursionLimit`]
    pub fn build(self) -> Result<TypeRegistry> {
        let config = *self.config();
        if config.validate_hierarchy_flags {
            let classes: Vec<TypeInfoRc> = self.registry.classes().collect();
            classes
                .par_iter()
                .try_for_each(|class| validate_class(class, config.max_hierarchy_depth))?;
        }

        debug!(
            "Registry {} built with {} types",
            self.registry.id(),
            self.registry.len()
        );
        Ok(self.registry)
    }

    /// Incompleteness is not part of the mangled name, so an interned pointer may carry other
    /// `INCOMPLETE` bits than requested
    fn check_interned_qualifiers(info: &TypeInfo, qualifiers: Qualifiers) -> Result<()> {
        match info.as_pointer() {
            Some(existing) if existing.qualifiers != qualifiers => Err(malformed_error!(
                "{} is registered with qualifiers {:?}, requested {:?}",
                info.name,
                existing.qualifiers,
                qualifiers
            )),
            _ => Ok(()),
        }
    }

    fn check_function_qualifiers(qualifiers: Qualifiers, pointee: &TypeInfo) -> Result<()> {
        if qualifiers.intersects(Qualifiers::NO_ADD) && !pointee.is_function() {
            return Err(malformed_error!(
                "Function qualifiers {:?} on non-function pointee {}",
                qualifiers,
                pointee.name
            ));
        }
        Ok(())
    }

    fn ensure_owned(&self, info: &TypeInfo) -> Result<()> {
        if self.registry.contains(info) {
            Ok(())
        } else {
            Err(Error::ForeignType(info.name.clone()))
        }
    }

    fn ensure_class(&self, info: &TypeInfo) -> Result<()> {
        self.ensure_owned(info)?;
        if info.is_class() {
            Ok(())
        } else {
            Err(Error::NotAClass(info.name.clone()))
        }
    }

    fn create(&self, name: String, display_name: String, kind: TypeInfoKind) -> TypeInfoRc {
        let row = self.next_row.fetch_add(1, Ordering::Relaxed);
        let info = Arc::new(TypeInfo {
            token: TypeToken::from_parts(kind.type_kind(), row),
            name,
            display_name,
            kind,
            registry: self.registry.id(),
        });
        self.registry.types.insert(info.token, info.clone());
        info
    }

    fn register(&self, name: String, display_name: String, kind: TypeInfoKind) -> Result<TypeInfoRc> {
        match self.registry.types_by_name.entry(name) {
            Entry::Occupied(entry) => Err(Error::DuplicateType(entry.key().clone())),
            Entry::Vacant(entry) => {
                let info = self.create(entry.key().clone(), display_name, kind);
                entry.insert(info.token);
                debug!("Registered {} {} as {}", info.type_kind(), info.name, info.token);
                Ok(info)
            }
        }
    }

    fn intern<F>(&self, name: String, display_name: String, kind: F) -> Result<TypeInfoRc>
    where
        F: FnOnce() -> TypeInfoKind,
    {
        match self.registry.types_by_name.entry(name) {
            Entry::Occupied(entry) => self
                .registry
                .get(entry.get())
                .ok_or_else(|| Error::TypeNotFound(entry.key().clone())),
            Entry::Vacant(entry) => {
                let info = self.create(entry.key().clone(), display_name, kind());
                entry.insert(info.token);
                debug!("Registered {} {} as {}", info.type_kind(), info.name, info.token);
                Ok(info)
            }
        }
    }
}

fn validate_class(info: &TypeInfo, max_depth: usize) -> Result<()> {
    match info.as_class() {
        Some(ClassInfo::MultiBase { flags, bases }) => {
            let computed = compute_hierarchy_flags(bases, max_depth)?;
            if computed != *flags {
                return Err(Error::HierarchyFlagsMismatch {
                    name: info.name.clone(),
                    declared: *flags,
                    computed,
                });
            }
        }
        Some(ClassInfo::SinglePublicBase { base }) => {
            compute_hierarchy_flags(&[BaseEntry::public(base, 0)?], max_depth)?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeinfo::TypeKind;

    #[test]
    fn test_duplicate_class() {
        let builder = TypeRegistryBuilder::new();
        builder.class("Widget").unwrap();
        assert!(matches!(
            builder.enumeration("Widget"),
            Err(Error::DuplicateType(name)) if name == "6Widget"
        ));
    }

    #[test]
    fn test_invalid_name() {
        let builder = TypeRegistryBuilder::new();
        assert!(matches!(
            builder.class("not a name"),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_compound_types_interned() {
        let builder = TypeRegistryBuilder::new();
        let base = builder.class("Base").unwrap();
        let first = builder.pointer(Qualifiers::CONST, &base).unwrap();
        let second = builder.pointer(Qualifiers::CONST, &base).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let int = builder.fundamental(Fundamental::Int);
        let arr = builder.array(&int, 4).unwrap();
        assert_eq!(arr.name, "A4_i");
        assert_eq!(arr.display_name, "int[4]");
        assert!(Arc::ptr_eq(&arr, &builder.array(&int, 4).unwrap()));

        let func = builder.function(&int, &[&int, &base]).unwrap();
        assert_eq!(func.name, "Fii4BaseE");
        assert_eq!(func.display_name, "int (int, Base)");
        let void = builder.fundamental(Fundamental::Void);
        assert_eq!(builder.function(&void, &[]).unwrap().name, "FvvE");
    }

    #[test]
    fn test_pointer_names() {
        let builder = TypeRegistryBuilder::new();
        let int = builder.fundamental(Fundamental::Int);
        let cint_ptr = builder.pointer(Qualifiers::CONST, &int).unwrap();
        assert_eq!(cint_ptr.name, "PKi");
        let chain = builder.pointer(Qualifiers::CONST, &cint_ptr).unwrap();
        assert_eq!(chain.name, "PKPKi");
        assert_eq!(chain.display_name, "const int* const*");

        let cv = builder
            .pointer(Qualifiers::CONST | Qualifiers::VOLATILE, &int)
            .unwrap();
        assert_eq!(cv.name, "PVKi");

        let void = builder.fundamental(Fundamental::Void);
        let func = builder.function(&void, &[]).unwrap();
        let noexcept = builder.pointer(Qualifiers::NOEXCEPT, &func).unwrap();
        assert_eq!(noexcept.name, "PDoFvvE");

        let class = builder.class("C").unwrap();
        let member = builder
            .pointer_to_member(Qualifiers::CONST, &int, &class)
            .unwrap();
        assert_eq!(member.name, "M1CKi");
        assert_eq!(member.display_name, "const int C::*");
    }

    #[test]
    fn test_invalid_pointer_qualifiers() {
        let builder = TypeRegistryBuilder::new();
        let int = builder.fundamental(Fundamental::Int);
        assert!(matches!(
            builder.pointer(Qualifiers::NOEXCEPT, &int),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            builder.pointer(Qualifiers::INCOMPLETE_CLASS, &int),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_incomplete_marking_conflicts_with_interned() {
        let builder = TypeRegistryBuilder::new();
        let fwd = builder.class("Fwd").unwrap();
        let int = builder.fundamental(Fundamental::Int);

        let complete = builder.pointer(Qualifiers::empty(), &fwd).unwrap();
        assert!(matches!(
            builder.pointer(Qualifiers::INCOMPLETE, &fwd),
            Err(Error::Malformed { .. })
        ));
        assert!(Arc::ptr_eq(
            &builder.pointer(Qualifiers::empty(), &fwd).unwrap(),
            &complete
        ));

        let incomplete = builder
            .pointer(Qualifiers::CONST | Qualifiers::INCOMPLETE, &fwd)
            .unwrap();
        assert!(incomplete.as_pointer().unwrap().is_incomplete());
        assert!(matches!(
            builder.pointer(Qualifiers::CONST, &fwd),
            Err(Error::Malformed { .. })
        ));

        builder
            .pointer_to_member(Qualifiers::INCOMPLETE_CLASS, &int, &fwd)
            .unwrap();
        assert!(matches!(
            builder.pointer_to_member(Qualifiers::empty(), &int, &fwd),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_base_must_be_class() {
        let builder = TypeRegistryBuilder::new();
        let int = builder.fundamental(Fundamental::Int);
        assert!(matches!(
            builder.derived_class("D", &int),
            Err(Error::NotAClass(name)) if name == "i"
        ));
        assert!(matches!(
            builder.pointer_to_member(Qualifiers::empty(), &int, &int),
            Err(Error::NotAClass(_))
        ));
    }

    #[test]
    fn test_foreign_types_rejected() {
        let other = TypeRegistryBuilder::new();
        let foreign = other.class("Foreign").unwrap();

        let builder = TypeRegistryBuilder::new();
        assert!(matches!(
            builder.derived_class("D", &foreign),
            Err(Error::ForeignType(_))
        ));
        assert!(matches!(
            builder.pointer(Qualifiers::empty(), &foreign),
            Err(Error::ForeignType(_))
        ));
    }

    #[test]
    fn test_class_with_bases_picks_variant() {
        let builder = TypeRegistryBuilder::new();
        let base = builder.class("Base").unwrap();

        let none = builder.class_with_bases("None", vec![]).unwrap();
        assert_eq!(none.type_kind(), TypeKind::Class);

        let single = builder
            .class_with_bases("Single", vec![BaseEntry::public(&base, 0).unwrap()])
            .unwrap();
        assert_eq!(single.type_kind(), TypeKind::SiClass);

        let offset = builder
            .class_with_bases("Offset", vec![BaseEntry::public(&base, 8).unwrap()])
            .unwrap();
        assert_eq!(offset.type_kind(), TypeKind::VmiClass);

        let private = builder
            .class_with_bases("Private", vec![BaseEntry::private(&base, 0).unwrap()])
            .unwrap();
        assert_eq!(private.type_kind(), TypeKind::VmiClass);
    }

    #[test]
    fn test_empty_multi_base_rejected() {
        let builder = TypeRegistryBuilder::new();
        assert!(matches!(
            builder.multi_base_class("Empty", None, vec![]),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_single_base_shape_enforced() {
        let builder = TypeRegistryBuilder::new();
        let base = builder.class("Base").unwrap();
        assert!(matches!(
            builder.multi_base_class("Plain", None, vec![BaseEntry::public(&base, 0).unwrap()]),
            Err(Error::Malformed { .. })
        ));

        let lenient = TypeRegistryBuilder::with_config(MatchConfig::minimal());
        let base = lenient.class("Base").unwrap();
        let plain = lenient
            .multi_base_class("Plain", None, vec![BaseEntry::public(&base, 0).unwrap()])
            .unwrap();
        assert_eq!(plain.type_kind(), TypeKind::VmiClass);
    }

    #[test]
    fn test_declared_flags_validated() {
        let builder = TypeRegistryBuilder::new();
        let base = builder.class("Base").unwrap();
        builder
            .multi_base_class(
                "Liar",
                Some(HierarchyFlags::DIAMOND_SHAPED),
                vec![BaseEntry::private(&base, 0).unwrap()],
            )
            .unwrap();

        match builder.build() {
            Err(Error::HierarchyFlagsMismatch {
                name,
                declared,
                computed,
            }) => {
                assert_eq!(name, "4Liar");
                assert_eq!(declared, HierarchyFlags::DIAMOND_SHAPED);
                assert_eq!(computed, HierarchyFlags::empty());
            }
            other => panic!("unexpected build result: {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_declared_flags_trusted_when_minimal() {
        let builder = TypeRegistryBuilder::with_config(MatchConfig::minimal());
        let base = builder.class("Base").unwrap();
        let liar = builder
            .multi_base_class(
                "Liar",
                Some(HierarchyFlags::DIAMOND_SHAPED),
                vec![BaseEntry::private(&base, 0).unwrap()],
            )
            .unwrap();

        let registry = builder.build().unwrap();
        assert_eq!(
            registry.get(&liar.token).unwrap().hierarchy_flags(),
            HierarchyFlags::DIAMOND_SHAPED
        );
    }

    #[test]
    fn test_depth_limit() {
        let config = MatchConfig {
            max_hierarchy_depth: 3,
            ..MatchConfig::default()
        };
        let builder = TypeRegistryBuilder::with_config(config);
        let mut current = builder.class("C0").unwrap();
        for level in 1..6 {
            current = builder
                .derived_class(&format!("C{level}"), &current)
                .unwrap();
        }

        assert!(matches!(builder.build(), Err(Error::RecursionLimit(3))));
    }

    #[test]
    fn test_concurrent_registration() {
        let builder = TypeRegistryBuilder::new();
        let base = builder.class("Base").unwrap();

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let builder = &builder;
                let base = &base;
                scope.spawn(move || {
                    for index in 0..16 {
                        builder
                            .derived_class(&format!("D{worker}_{index}"), base)
                            .unwrap();
                        builder.pointer(Qualifiers::CONST, base).unwrap();
                    }
                });
            }
        });

        let registry = builder.build().unwrap();
        assert_eq!(registry.classes().count(), 1 + 4 * 16);
        assert!(registry.get_by_name("PK4Base").is_some());
    }
}
