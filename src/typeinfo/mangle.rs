//! Itanium style name mangling for registered descriptors.
//!
//! Only the subset needed to give every descriptor a unique, ABI-shaped name is produced:
//! source names, nested names, pointers, pointers-to-member, arrays and function types.

use crate::{
    typeinfo::{Qualifiers, TypeInfo},
    Result,
};

/// Mangles a (possibly `::` qualified) class or enum name: `Foo` -> `3Foo`,
/// `ns::Foo` -> `N2ns3FooE`.
pub(crate) fn source_name(name: &str) -> Result<String> {
    let components: Vec<&str> = name.split("::").collect();
    for component in &components {
        if !is_identifier(component) {
            return Err(malformed_error!("Invalid type name '{}'", name));
        }
    }

    let mut mangled: String = components
        .iter()
        .map(|component| format!("{}{}", component.len(), component))
        .collect();
    if components.len() > 1 {
        mangled = format!("N{mangled}E");
    }
    Ok(mangled)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// `P[r][V][K][Do]<pointee>`
pub(crate) fn pointer(qualifiers: Qualifiers, pointee: &TypeInfo) -> (String, String) {
    let name = format!(
        "P{}{}",
        qualifier_prefix(qualifiers, pointee),
        pointee.name
    );
    let display = if pointee.is_function() {
        format!("{}(*){}", noexcept_display(qualifiers), pointee.display_name)
    } else {
        format!("{}*", qualified_display(qualifiers, pointee))
    };
    (name, display)
}

/// `M<class><qualifiers><pointee>`
pub(crate) fn pointer_to_member(
    qualifiers: Qualifiers,
    pointee: &TypeInfo,
    context: &TypeInfo,
) -> (String, String) {
    let name = format!(
        "M{}{}{}",
        context.name,
        qualifier_prefix(qualifiers, pointee),
        pointee.name
    );
    let display = format!(
        "{} {}::*",
        qualified_display(qualifiers, pointee),
        context.display_name
    );
    (name, display)
}

/// `A<n>_<element>`
pub(crate) fn array(len: usize, element: &TypeInfo) -> (String, String) {
    (
        format!("A{len}_{}", element.name),
        format!("{}[{len}]", element.display_name),
    )
}

/// `F<return><params>E`, an empty parameter list is mangled as `v`
pub(crate) fn function(ret: &TypeInfo, params: &[&TypeInfo]) -> (String, String) {
    let mangled_params: String = if params.is_empty() {
        "v".to_string()
    } else {
        params.iter().map(|param| param.name.as_str()).collect()
    };
    let display_params = params
        .iter()
        .map(|param| param.display_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    (
        format!("F{}{}E", ret.name, mangled_params),
        format!("{} ({})", ret.display_name, display_params),
    )
}

fn qualifier_prefix(qualifiers: Qualifiers, pointee: &TypeInfo) -> String {
    let mut prefix = String::new();
    if qualifiers.contains(Qualifiers::RESTRICT) {
        prefix.push('r');
    }
    if qualifiers.contains(Qualifiers::VOLATILE) {
        prefix.push('V');
    }
    if qualifiers.contains(Qualifiers::CONST) {
        prefix.push('K');
    }
    if pointee.is_function() && qualifiers.contains(Qualifiers::NOEXCEPT) {
        prefix.push_str("Do");
    }
    prefix
}

fn noexcept_display(qualifiers: Qualifiers) -> &'static str {
    if qualifiers.contains(Qualifiers::NOEXCEPT) {
        "noexcept "
    } else {
        ""
    }
}

fn qualified_display(qualifiers: Qualifiers, pointee: &TypeInfo) -> String {
    let mut cv = Vec::new();
    if qualifiers.contains(Qualifiers::CONST) {
        cv.push("const");
    }
    if qualifiers.contains(Qualifiers::VOLATILE) {
        cv.push("volatile");
    }
    if qualifiers.contains(Qualifiers::RESTRICT) {
        cv.push("__restrict");
    }

    if cv.is_empty() {
        pointee.display_name.clone()
    } else if pointee.is_pointer() {
        format!("{} {}", pointee.display_name, cv.join(" "))
    } else {
        format!("{} {}", cv.join(" "), pointee.display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_name() {
        assert_eq!(source_name("Foo").unwrap(), "3Foo");
        // no `St` substitution for std
        assert_eq!(source_name("std::exception").unwrap(), "N3std9exceptionE");
        assert_eq!(source_name("a::b::Widget").unwrap(), "N1a1b6WidgetE");
    }

    #[test]
    fn test_source_name_rejects_garbage() {
        assert!(source_name("").is_err());
        assert!(source_name("9Lives").is_err());
        assert!(source_name("a::").is_err());
        assert!(source_name("has space").is_err());
    }
}
