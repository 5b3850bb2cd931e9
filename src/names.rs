//! Naming helpers
//!
//! Identifier checks, casing, and fully qualified name (fqn) handling shared by
//! the definition checks, the schema emitter and the type map.
//!
//! An fqn is `system/name`. References written in definitions or schema
//! fragments may be bare (`name`, same system), qualified (`system/name`),
//! a parent-system escape (`../system/name`) or an absolute schema URI
//! (`{domain}/{system}/name`).

use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-zA-Z0-9]*$").expect("identifier pattern is valid")
});

/// Separator between system and type name
pub const PATH_SEPARATOR: char = '/';

/// True if `s` is a valid system, type, property or variant name
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// `system/name`
pub fn fqn(system: &str, name: &str) -> String {
    format!("{}{}{}", system, PATH_SEPARATOR, name)
}

/// Split an fqn into `(system, name)`; `None` for bare names
pub fn split_fqn(fqn: &str) -> Option<(&str, &str)> {
    fqn.rsplit_once(PATH_SEPARATOR)
}

/// Resolve a reference written inside `system` to an fqn.
///
/// `domain` is stripped from absolute references when given.
pub fn resolve_reference(system: &str, reference: &str, domain: Option<&str>) -> String {
    let reference = domain
        .and_then(|d| reference.strip_prefix(d.trim_end_matches(PATH_SEPARATOR)))
        .map(|r| r.trim_start_matches(PATH_SEPARATOR))
        .unwrap_or(reference);

    let mut reference = reference;
    while let Some(rest) = reference.strip_prefix("../") {
        reference = rest;
    }
    let reference = reference.trim_start_matches("./");

    if reference.contains(PATH_SEPARATOR) {
        // Keep only the trailing `system/name` of longer paths
        let mut parts = reference.rsplitn(3, PATH_SEPARATOR);
        let name = parts.next().unwrap_or_default();
        let sys = parts.next().unwrap_or(system);
        fqn(sys, name)
    } else {
        fqn(system, reference)
    }
}

/// PascalCase form of a camelCase name: `countOnly` -> `CountOnly`
pub fn to_pascal_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Human readable title derived from a camelCase name: `shortString` -> `Short String`
pub fn title_from_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;

    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            result.push(c.to_ascii_uppercase());
        } else if c.is_ascii_uppercase() && prev_lower_or_digit {
            result.push(' ');
            result.push(c);
        } else {
            result.push(c);
        }
        prev_lower_or_digit = c.is_ascii_lowercase() || c.is_ascii_digit();
    }

    result
}
