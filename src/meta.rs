//! Definition Shape Checks
//!
//! Checks a raw definition against the structural rules for its kind before
//! anything is derived from it. Every check is tagged with a [`Rule`] so the
//! documentation pass can be compared with the functional pass by rule and
//! path rather than by message text.
//!
//! ## Passes
//! 1. **Functional**: structure, uniqueness and local references. Always fatal.
//! 2. **Documented**: the functional rules plus documentation completeness.
//!    Anything not already reported by pass 1 becomes a warning.

use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};

use crate::diagnostics::{Diagnostic, Rule};
use crate::names;
use crate::typedef::{TypeDef, TypeKind};

const HEADER_FIELDS: &[&str] = &[
    "kind", "system", "name", "title", "summary", "deprecated", "tags", "labels", "examples",
];
const TEST_CASE_FIELDS: &[&str] = &["validTestCases", "invalidTestCases"];
const ENUM_ITEM_FIELDS: &[&str] = &["value", "text", "symbol", "deprecated", "summary", "data"];
const PROPERTY_FIELDS: &[&str] = &["name", "summary", "propertyType", "isArray", "isRequired"];
const VARIANT_FIELDS: &[&str] = &["name", "summary", "required", "includeProperties", "excludeProperties"];
const CASE_FIELDS: &[&str] = &["value", "summary"];

/// A single failed check
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub rule: Rule,
    /// Location inside the definition, e.g. `properties[2].name`
    pub path: String,
    pub message: String,
    pub details: Value,
}

impl Violation {
    pub(crate) fn new(rule: Rule, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule,
            path: path.into(),
            message: message.into(),
            details: Value::Null,
        }
    }

    pub(crate) fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Convert into a diagnostic against `type_name`
    pub fn into_diagnostic(self, type_name: impl Into<String>) -> Diagnostic {
        let mut details = match self.details {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        details.insert("path".to_string(), Value::String(self.path));
        Diagnostic::from_rule(type_name, self.rule, self.message).with_details(Value::Object(details))
    }
}

/// Structural validator for raw definitions
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaSchemaValidator;

impl MetaSchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Functional pass: every violation is an error
    pub fn validate(&self, def: &Value) -> Vec<Violation> {
        self.check(def, false)
    }

    /// Functional rules plus documentation completeness
    pub fn validate_with_documentation(&self, def: &Value) -> Vec<Violation> {
        self.check(def, true)
    }

    fn check(&self, def: &Value, documentation: bool) -> Vec<Violation> {
        let mut checker = Checker {
            documentation,
            violations: Vec::new(),
        };
        checker.check_definition(def);
        checker.violations
    }
}

/// Violations of the documented pass that the functional pass did not report
pub fn documentation_warnings(functional: &[Violation], documented: Vec<Violation>) -> Vec<Violation> {
    let reported: HashSet<(Rule, &str)> = functional
        .iter()
        .map(|v| (v.rule, v.path.as_str()))
        .collect();

    documented
        .into_iter()
        .filter(|v| !reported.contains(&(v.rule, v.path.as_str())))
        .collect()
}

/// Deserialize a structurally valid definition into the typed model
pub fn to_typed(def: &Value) -> Result<TypeDef, Violation> {
    serde_path_to_error::deserialize(def).map_err(|e| {
        let path = e.path().to_string();
        Violation::new(Rule::Shape, path, e.inner().to_string())
    })
}

/// True for `name`, `system/name` and `../system/name`
pub fn is_reference(reference: &str) -> bool {
    let mut reference = reference;
    while let Some(rest) = reference.strip_prefix("../") {
        reference = rest;
    }
    let segments: Vec<&str> = reference.split(names::PATH_SEPARATOR).collect();
    segments.len() <= 2 && segments.iter().all(|s| names::is_identifier(s))
}

struct Checker {
    documentation: bool,
    violations: Vec<Violation>,
}

impl Checker {
    fn push(&mut self, violation: Violation) {
        if self.documentation || !violation.rule.is_documentation() {
            self.violations.push(violation);
        }
    }

    fn check_definition(&mut self, def: &Value) {
        let Some(obj) = def.as_object() else {
            self.push(Violation::new(Rule::NotAnObject, "", "Type definition must be an object"));
            return;
        };

        let kind = match obj.get("kind").and_then(Value::as_str) {
            Some(k) => match TypeKind::from_kind_str(k) {
                Some(kind) => Some(kind),
                None => {
                    self.push(Violation::new(
                        Rule::UnknownKind,
                        "kind",
                        format!("Unknown kind '{}'. Must be one of: bool, enum, int, float, string, object, record", k),
                    ));
                    None
                }
            },
            None => {
                self.push(Violation::new(Rule::UnknownKind, "kind", "Type definition must declare a string 'kind'"));
                None
            }
        };

        self.check_header(obj);

        let Some(kind) = kind else { return };

        let kind_fields: &[&str] = match kind {
            TypeKind::Bool => TEST_CASE_FIELDS,
            TypeKind::Enum => &["items", "dataType"],
            TypeKind::Int => &["minimum", "maximum", "validTestCases", "invalidTestCases"],
            TypeKind::Float => &[
                "minimum", "maximum", "isMinimumExclusive", "isMaximumExclusive",
                "validTestCases", "invalidTestCases",
            ],
            TypeKind::String => &[
                "regex", "minimumLength", "maximumLength", "validTestCases", "invalidTestCases",
            ],
            TypeKind::Object => &["jsonSchema", "validTestCases", "invalidTestCases"],
            TypeKind::Record => &["properties", "required", "variants", "validTestCases", "invalidTestCases"],
        };
        for key in obj.keys() {
            if !HEADER_FIELDS.contains(&key.as_str()) && !kind_fields.contains(&key.as_str()) {
                self.push(Violation::new(
                    Rule::UnknownField,
                    key.clone(),
                    format!("Field '{}' is not allowed on a {} type", key, kind),
                ));
            }
        }

        match kind {
            TypeKind::Bool => self.check_test_cases(obj, false),
            TypeKind::Enum => self.check_enum(obj),
            TypeKind::Int => {
                self.check_int(obj);
                self.check_test_cases(obj, false);
            }
            TypeKind::Float => {
                self.check_float(obj);
                self.check_test_cases(obj, false);
            }
            TypeKind::String => {
                self.check_string(obj);
                self.check_test_cases(obj, false);
            }
            TypeKind::Object => {
                if !obj.get("jsonSchema").is_some_and(Value::is_object) {
                    self.push(Violation::new(Rule::MissingField, "jsonSchema", "Object type must declare a 'jsonSchema' object"));
                }
                self.check_test_cases(obj, false);
            }
            TypeKind::Record => {
                self.check_record(obj);
                self.check_test_cases(obj, true);
            }
        }
    }

    // =========================================================================
    // Header
    // =========================================================================

    fn check_header(&mut self, obj: &Map<String, Value>) {
        match obj.get("system").and_then(Value::as_str) {
            Some(s) if names::is_identifier(s) => {}
            Some(s) => self.push(Violation::new(
                Rule::InvalidSystem,
                "system",
                format!("System '{}' must match ^[a-z][a-zA-Z0-9]*$", s),
            )),
            None => self.push(Violation::new(Rule::InvalidSystem, "system", "Type definition must declare a string 'system'")),
        }

        match obj.get("name").and_then(Value::as_str) {
            Some(s) if names::is_identifier(s) => {}
            Some(s) => self.push(Violation::new(
                Rule::InvalidName,
                "name",
                format!("Name '{}' must match ^[a-z][a-zA-Z0-9]*$", s),
            )),
            None => self.push(Violation::new(Rule::InvalidName, "name", "Type definition must declare a string 'name'")),
        }

        for key in ["title", "summary"] {
            if obj.get(key).is_some_and(|v| !v.is_string()) {
                self.push(Violation::new(Rule::InvalidSummary, key, format!("'{}' must be a string", key)));
            }
        }
        if is_blank(obj.get("summary")) {
            self.push(Violation::new(Rule::MissingTypeSummary, "summary", "Type should have a summary"));
        }

        if obj.get("deprecated").is_some_and(|v| !v.is_string()) {
            self.push(Violation::new(Rule::InvalidDeprecated, "deprecated", "'deprecated' must be a string explaining the deprecation"));
        }

        for key in ["tags", "labels"] {
            if let Some(value) = obj.get(key) {
                if !is_string_list(value) {
                    self.push(Violation::new(Rule::InvalidStringList, key, format!("'{}' must be an array of strings", key)));
                }
            }
        }

        self.check_cases(obj, "examples", false, Some(Rule::MissingExampleSummary));
    }

    fn check_test_cases(&mut self, obj: &Map<String, Value>, valid_required: bool) {
        self.check_cases(obj, "validTestCases", valid_required, None);
        self.check_cases(obj, "invalidTestCases", false, None);
    }

    fn check_cases(&mut self, obj: &Map<String, Value>, key: &str, required: bool, summary_rule: Option<Rule>) {
        let Some(value) = obj.get(key) else {
            if required {
                self.push(Violation::new(Rule::MissingField, key, format!("'{}' must be declared", key)));
            }
            return;
        };

        let Some(cases) = value.as_array() else {
            self.push(Violation::new(Rule::InvalidExample, key, format!("'{}' must be an array", key)));
            return;
        };

        for (i, case) in cases.iter().enumerate() {
            let path = format!("{}[{}]", key, i);
            let Some(case) = case.as_object() else {
                self.push(Violation::new(Rule::InvalidExample, path, "Entry must be an object with a 'value'"));
                continue;
            };
            if !case.contains_key("value") {
                self.push(Violation::new(Rule::InvalidExample, format!("{}.value", path), "Entry must declare a 'value'"));
            }
            if case.get("summary").is_some_and(|v| !v.is_string()) {
                self.push(Violation::new(Rule::InvalidExample, format!("{}.summary", path), "'summary' must be a string"));
            }
            for field in case.keys().filter(|k| !CASE_FIELDS.contains(&k.as_str())) {
                self.push(Violation::new(
                    Rule::InvalidExample,
                    format!("{}.{}", path, field),
                    format!("Field '{}' is not allowed on an example or test case", field),
                ));
            }
            if let Some(rule) = summary_rule {
                if is_blank(case.get("summary")) {
                    self.push(Violation::new(rule, format!("{}.summary", path), "Example should have a summary"));
                }
            }
        }
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    fn check_int(&mut self, obj: &Map<String, Value>) {
        let minimum = self.require(obj, "minimum", "an integer", Value::as_i64);
        let maximum = self.require(obj, "maximum", "an integer", Value::as_i64);
        if let (Some(min), Some(max)) = (minimum, maximum) {
            if min > max {
                self.push(
                    Violation::new(Rule::InvalidBounds, "minimum", format!("Minimum {} is greater than maximum {}", min, max))
                        .with_details(json!({ "minimum": min, "maximum": max })),
                );
            }
        }
    }

    fn check_float(&mut self, obj: &Map<String, Value>) {
        let minimum = self.require(obj, "minimum", "a number", Value::as_f64);
        let maximum = self.require(obj, "maximum", "a number", Value::as_f64);
        for key in ["isMinimumExclusive", "isMaximumExclusive"] {
            if obj.get(key).is_some_and(|v| !v.is_boolean()) {
                self.push(Violation::new(Rule::MissingField, key, format!("'{}' must be a boolean", key)));
            }
        }

        let exclusive = ["isMinimumExclusive", "isMaximumExclusive"]
            .iter()
            .any(|k| obj.get(*k).and_then(Value::as_bool).unwrap_or(false));
        if let (Some(min), Some(max)) = (minimum, maximum) {
            if min > max || (min == max && exclusive) {
                self.push(
                    Violation::new(Rule::InvalidBounds, "minimum", format!("Range {}..{} admits no values", min, max))
                        .with_details(json!({ "minimum": min, "maximum": max })),
                );
            }
        }
    }

    fn check_string(&mut self, obj: &Map<String, Value>) {
        let maximum = self.require(obj, "maximumLength", "a non-negative integer", Value::as_u64);
        let minimum = match obj.get("minimumLength") {
            None => None,
            Some(v) => match v.as_u64() {
                Some(n) => Some(n),
                None => {
                    self.push(Violation::new(Rule::MissingField, "minimumLength", "'minimumLength' must be a non-negative integer"));
                    None
                }
            },
        };
        if let (Some(min), Some(max)) = (minimum, maximum) {
            if min > max {
                self.push(Violation::new(
                    Rule::InvalidBounds,
                    "minimumLength",
                    format!("Minimum length {} is greater than maximum length {}", min, max),
                ));
            }
        }

        match obj.get("regex") {
            None => {}
            Some(Value::String(pattern)) => {
                if let Err(e) = Regex::new(pattern) {
                    self.push(
                        Violation::new(Rule::InvalidRegex, "regex", format!("Regex '{}' does not compile", pattern))
                            .with_details(json!({ "reason": e.to_string() })),
                    );
                }
            }
            Some(_) => self.push(Violation::new(Rule::InvalidRegex, "regex", "'regex' must be a string")),
        }
    }

    fn require<T>(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        expected: &str,
        extract: impl Fn(&Value) -> Option<T>,
    ) -> Option<T> {
        let value = obj.get(key).and_then(extract);
        if value.is_none() {
            self.push(Violation::new(Rule::MissingField, key, format!("'{}' must be {}", key, expected)));
        }
        value
    }

    // =========================================================================
    // Enums
    // =========================================================================

    fn check_enum(&mut self, obj: &Map<String, Value>) {
        match obj.get("dataType") {
            None => {}
            Some(Value::String(r)) if is_reference(r) => {}
            Some(_) => self.push(Violation::new(Rule::InvalidReference, "dataType", "'dataType' must be a type reference")),
        }

        let Some(items) = obj.get("items").and_then(Value::as_array) else {
            self.push(Violation::new(Rule::MissingField, "items", "Enum type must declare an 'items' array"));
            return;
        };
        if items.is_empty() {
            self.push(Violation::new(Rule::EmptyItems, "items", "Enum type must declare at least one item"));
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (i, item) in items.iter().enumerate() {
            let path = format!("items[{}]", i);
            let Some(item) = item.as_object() else {
                self.push(Violation::new(Rule::InvalidEnumItem, path, "Enum item must be an object"));
                continue;
            };

            match item.get("value").and_then(Value::as_str) {
                Some(v) if !v.is_empty() => {
                    if let Some(first) = seen.insert(v, i) {
                        self.push(
                            Violation::new(
                                Rule::DuplicateEnumValue,
                                format!("{}.value", path),
                                format!("Enum item value '{}' at index {} duplicates index {}", v, i, first),
                            )
                            .with_details(json!({ "index": i, "value": v, "firstIndex": first })),
                        );
                    }
                }
                _ => self.push(Violation::new(Rule::InvalidEnumItem, format!("{}.value", path), "Enum item must declare a non-empty string 'value'")),
            }

            if !item.get("text").is_some_and(Value::is_string) {
                self.push(Violation::new(Rule::InvalidEnumItem, format!("{}.text", path), "Enum item must declare a string 'text'"));
            }
            for key in ["symbol", "deprecated", "summary"] {
                if item.get(key).is_some_and(|v| !v.is_string()) {
                    self.push(Violation::new(Rule::InvalidEnumItem, format!("{}.{}", path, key), format!("'{}' must be a string", key)));
                }
            }
            for key in item.keys().filter(|k| !ENUM_ITEM_FIELDS.contains(&k.as_str())) {
                self.push(Violation::new(
                    Rule::InvalidEnumItem,
                    format!("{}.{}", path, key),
                    format!("Field '{}' is not allowed on an enum item", key),
                ));
            }
            if is_blank(item.get("summary")) {
                self.push(Violation::new(Rule::MissingItemSummary, format!("{}.summary", path), "Enum item should have a summary"));
            }
        }
    }

    // =========================================================================
    // Records
    // =========================================================================

    fn check_record(&mut self, obj: &Map<String, Value>) {
        let property_names = self.check_properties(obj);

        match obj.get("required") {
            None => {}
            Some(value) if is_string_list(value) => {
                for (i, name) in string_list(value).into_iter().enumerate() {
                    if !property_names.contains(name) {
                        self.push(
                            Violation::new(
                                Rule::UnknownRequiredProperty,
                                format!("required[{}]", i),
                                format!("Required property '{}' is not declared in 'properties'", name),
                            )
                            .with_details(json!({ "property": name })),
                        );
                    }
                }
            }
            Some(_) => self.push(Violation::new(Rule::MissingField, "required", "'required' must be an array of property names")),
        }

        self.check_variants(obj, &property_names);
    }

    fn check_properties<'a>(&mut self, obj: &'a Map<String, Value>) -> HashSet<&'a str> {
        let mut declared: HashSet<&str> = HashSet::new();

        let Some(properties) = obj.get("properties").and_then(Value::as_array) else {
            self.push(Violation::new(Rule::MissingField, "properties", "Record type must declare a 'properties' array"));
            return declared;
        };
        if properties.is_empty() {
            self.push(Violation::new(Rule::InvalidProperty, "properties", "Record type must declare at least one property"));
        }

        for (i, property) in properties.iter().enumerate() {
            let path = format!("properties[{}]", i);
            let Some(property) = property.as_object() else {
                self.push(Violation::new(Rule::InvalidProperty, path, "Property must be an object"));
                continue;
            };

            match property.get("name").and_then(Value::as_str) {
                Some(name) if names::is_identifier(name) => {
                    if !declared.insert(name) {
                        self.push(
                            Violation::new(
                                Rule::DuplicatePropertyName,
                                format!("{}.name", path),
                                format!("Property name '{}' at index {} is declared more than once", name, i),
                            )
                            .with_details(json!({ "index": i, "property": name })),
                        );
                    }
                }
                Some(name) => self.push(Violation::new(
                    Rule::InvalidProperty,
                    format!("{}.name", path),
                    format!("Property name '{}' must match ^[a-z][a-zA-Z0-9]*$", name),
                )),
                None => self.push(Violation::new(Rule::InvalidProperty, format!("{}.name", path), "Property must declare a string 'name'")),
            }

            match property.get("propertyType").and_then(Value::as_str) {
                Some(r) if is_reference(r) => {}
                _ => self.push(Violation::new(
                    Rule::InvalidReference,
                    format!("{}.propertyType", path),
                    "Property must declare a 'propertyType' of the form name or system/name",
                )),
            }

            for key in ["isArray", "isRequired"] {
                if property.get(key).is_some_and(|v| !v.is_boolean()) {
                    self.push(Violation::new(Rule::InvalidProperty, format!("{}.{}", path, key), format!("'{}' must be a boolean", key)));
                }
            }
            if property.get("summary").is_some_and(|v| !v.is_string()) {
                self.push(Violation::new(Rule::InvalidProperty, format!("{}.summary", path), "'summary' must be a string"));
            }
            for key in property.keys().filter(|k| !PROPERTY_FIELDS.contains(&k.as_str())) {
                self.push(Violation::new(
                    Rule::InvalidProperty,
                    format!("{}.{}", path, key),
                    format!("Field '{}' is not allowed on a property", key),
                ));
            }
            if is_blank(property.get("summary")) {
                self.push(Violation::new(Rule::MissingPropertySummary, format!("{}.summary", path), "Property should have a summary"));
            }
        }

        declared
    }

    fn check_variants(&mut self, obj: &Map<String, Value>, property_names: &HashSet<&str>) {
        let Some(value) = obj.get("variants") else { return };
        let Some(variants) = value.as_array() else {
            self.push(Violation::new(Rule::InvalidVariant, "variants", "'variants' must be an array"));
            return;
        };

        let mut seen: HashSet<&str> = HashSet::new();
        for (i, variant) in variants.iter().enumerate() {
            let path = format!("variants[{}]", i);
            let Some(variant) = variant.as_object() else {
                self.push(Violation::new(Rule::InvalidVariant, path, "Variant must be an object"));
                continue;
            };

            match variant.get("name").and_then(Value::as_str) {
                Some(name) if names::is_identifier(name) => {
                    if !seen.insert(name) {
                        self.push(
                            Violation::new(
                                Rule::DuplicateVariantName,
                                format!("{}.name", path),
                                format!("Variant name '{}' is declared more than once", name),
                            )
                            .with_details(json!({ "index": i, "variant": name })),
                        );
                    }
                }
                _ => self.push(Violation::new(
                    Rule::InvalidVariant,
                    format!("{}.name", path),
                    "Variant must declare a 'name' matching ^[a-z][a-zA-Z0-9]*$",
                )),
            }

            let include = variant.get("includeProperties");
            let exclude = variant.get("excludeProperties");
            if include.is_some() == exclude.is_some() {
                self.push(Violation::new(
                    Rule::InvalidVariant,
                    path.clone(),
                    "Variant must declare exactly one of 'includeProperties' or 'excludeProperties'",
                ));
            }

            for key in ["includeProperties", "excludeProperties", "required"] {
                let Some(list) = variant.get(key) else { continue };
                if !is_string_list(list) {
                    self.push(Violation::new(Rule::InvalidVariant, format!("{}.{}", path, key), format!("'{}' must be an array of property names", key)));
                    continue;
                }
                for (j, name) in string_list(list).into_iter().enumerate() {
                    if !property_names.contains(name) {
                        self.push(
                            Violation::new(
                                Rule::UnknownVariantProperty,
                                format!("{}.{}[{}]", path, key, j),
                                format!("Variant property '{}' is not declared in 'properties'", name),
                            )
                            .with_details(json!({ "property": name })),
                        );
                    }
                }
            }

            if variant.get("summary").is_some_and(|v| !v.is_string()) {
                self.push(Violation::new(Rule::InvalidVariant, format!("{}.summary", path), "'summary' must be a string"));
            }
            for key in variant.keys().filter(|k| !VARIANT_FIELDS.contains(&k.as_str())) {
                self.push(Violation::new(
                    Rule::InvalidVariant,
                    format!("{}.{}", path, key),
                    format!("Field '{}' is not allowed on a variant", key),
                ));
            }
            if is_blank(variant.get("summary")) {
                self.push(Violation::new(Rule::MissingVariantSummary, format!("{}.summary", path), "Variant should have a summary"));
            }
        }
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s.trim().is_empty(),
        // A non-string summary is a structural error, reported separately
        Some(_) => false,
        None => true,
    }
}

fn is_string_list(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|arr| arr.iter().all(Value::is_string))
}

fn string_list(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(violations: &[Violation]) -> Vec<Rule> {
        violations.iter().map(|v| v.rule).collect()
    }

    fn country_code() -> Value {
        json!({
            "kind": "enum",
            "system": "test",
            "name": "countryCode",
            "summary": "A country.",
            "items": [
                { "value": "en", "text": "England", "summary": "England." },
                { "value": "us", "text": "United States", "summary": "USA." },
                { "value": "fr", "text": "France", "summary": "France." }
            ]
        })
    }

    #[test]
    fn test_valid_enum() {
        let validator = MetaSchemaValidator::new();
        assert!(validator.validate(&country_code()).is_empty());
        assert!(validator.validate_with_documentation(&country_code()).is_empty());
    }

    #[test]
    fn test_duplicate_enum_value_cites_index() {
        let mut def = country_code();
        def["items"][2]["value"] = json!("en");

        let violations = MetaSchemaValidator::new().validate(&def);
        assert_eq!(rules(&violations), vec![Rule::DuplicateEnumValue]);
        assert_eq!(violations[0].path, "items[2].value");
        assert_eq!(violations[0].details["index"], 2);
        assert_eq!(violations[0].details["firstIndex"], 0);
    }

    #[test]
    fn test_header_rules() {
        let def = json!({ "kind": "widget", "system": "Test", "name": "bad-name" });
        let violations = MetaSchemaValidator::new().validate(&def);
        assert_eq!(rules(&violations), vec![Rule::UnknownKind, Rule::InvalidSystem, Rule::InvalidName]);
    }

    #[test]
    fn test_not_an_object() {
        let violations = MetaSchemaValidator::new().validate(&json!("enum"));
        assert_eq!(rules(&violations), vec![Rule::NotAnObject]);
    }

    #[test]
    fn test_unknown_field() {
        let def = json!({ "kind": "bool", "system": "test", "name": "flag", "maximum": 3 });
        let violations = MetaSchemaValidator::new().validate(&def);
        assert_eq!(rules(&violations), vec![Rule::UnknownField]);
    }

    #[test]
    fn test_scalar_bounds() {
        let validator = MetaSchemaValidator::new();

        let int = json!({ "kind": "int", "system": "test", "name": "n", "minimum": 5, "maximum": 1 });
        assert_eq!(rules(&validator.validate(&int)), vec![Rule::InvalidBounds]);

        let float = json!({
            "kind": "float", "system": "test", "name": "f",
            "minimum": 1.5, "maximum": 1.5, "isMinimumExclusive": true
        });
        assert_eq!(rules(&validator.validate(&float)), vec![Rule::InvalidBounds]);

        let string = json!({ "kind": "string", "system": "test", "name": "s", "regex": "(", "maximumLength": 3 });
        assert_eq!(rules(&validator.validate(&string)), vec![Rule::InvalidRegex]);

        let missing = json!({ "kind": "int", "system": "test", "name": "n", "minimum": 1.5 });
        assert_eq!(rules(&validator.validate(&missing)), vec![Rule::MissingField, Rule::MissingField]);
    }

    #[test]
    fn test_record_missing_required_property() {
        let def = json!({
            "kind": "record",
            "system": "test",
            "name": "populace",
            "properties": [{ "name": "pop", "propertyType": "positiveInteger" }],
            "required": ["missingProp"],
            "validTestCases": []
        });
        let violations = MetaSchemaValidator::new().validate(&def);
        assert_eq!(rules(&violations), vec![Rule::UnknownRequiredProperty]);
        assert_eq!(violations[0].path, "required[0]");
    }

    #[test]
    fn test_record_properties_and_variants() {
        let def = json!({
            "kind": "record",
            "system": "test",
            "name": "person",
            "properties": [
                { "name": "id", "propertyType": "positiveInteger" },
                { "name": "id", "propertyType": "bad/type/ref" }
            ],
            "variants": [
                { "name": "short", "includeProperties": ["id", "age"] },
                { "name": "short", "includeProperties": ["id"], "excludeProperties": ["id"] }
            ],
            "validTestCases": []
        });
        let violations = MetaSchemaValidator::new().validate(&def);
        assert_eq!(
            rules(&violations),
            vec![
                Rule::DuplicatePropertyName,
                Rule::InvalidReference,
                Rule::UnknownVariantProperty,
                Rule::DuplicateVariantName,
                Rule::InvalidVariant,
            ]
        );
    }

    #[test]
    fn test_record_requires_valid_test_cases() {
        let def = json!({
            "kind": "record",
            "system": "test",
            "name": "bed",
            "properties": [{ "name": "pillow", "propertyType": "pillow" }]
        });
        let violations = MetaSchemaValidator::new().validate(&def);
        assert_eq!(rules(&violations), vec![Rule::MissingField]);
        assert_eq!(violations[0].path, "validTestCases");
    }

    #[test]
    fn test_documentation_pass_only_adds_new_rules() {
        let def = json!({
            "kind": "record",
            "system": "test",
            "name": "bed",
            "summary": 7,
            "properties": [{ "name": "pillow", "propertyType": "pillow" }],
            "validTestCases": [{ "value": {} }],
            "examples": [{ "value": {} }]
        });
        let validator = MetaSchemaValidator::new();
        let functional = validator.validate(&def);
        assert_eq!(rules(&functional), vec![Rule::InvalidSummary]);

        let documented = validator.validate_with_documentation(&def);
        let warnings = documentation_warnings(&functional, documented);
        assert_eq!(rules(&warnings), vec![Rule::MissingExampleSummary, Rule::MissingPropertySummary]);
    }

    #[test]
    fn test_to_typed() {
        let typed = to_typed(&country_code()).unwrap();
        assert_eq!(typed.kind(), TypeKind::Enum);
        assert_eq!(typed.fqn(), "test/countryCode");
    }

    #[test]
    fn test_is_reference() {
        assert!(is_reference("pillow"));
        assert!(is_reference("alt/direction"));
        assert!(is_reference("../alt/direction"));
        assert!(!is_reference("a/b/c"));
        assert!(!is_reference("Pillow"));
    }
}
