//! Example and test case verification
//!
//! Runs every declared example and test case of a compiled type through its
//! validator. Examples and valid test cases must pass, invalid test cases
//! must fail, and enum item data must match the enum's data type.

use serde_json::{json, Value};

use crate::diagnostics::{Diagnostic, ErrorKind};
use crate::engine::{TypeValidator, ValidationOutcome};
use crate::typedef::{TestCase, TypeDef};

/// Verifies the declared values of one type against its compiled validator
#[derive(Debug, Clone, Copy, Default)]
pub struct ExampleVerifier;

impl ExampleVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Check examples, valid test cases and invalid test cases
    pub fn verify(&self, def: &TypeDef, validator: &TypeValidator) -> Vec<Diagnostic> {
        let fqn = def.fqn();
        let mut diagnostics = Vec::new();

        diagnostics.extend(expect_valid(
            &fqn,
            def.examples(),
            validator,
            ErrorKind::ExampleValidation,
            "example",
        ));
        diagnostics.extend(expect_valid(
            &fqn,
            def.valid_test_cases(),
            validator,
            ErrorKind::TestCaseValidation,
            "valid test case",
        ));

        for (index, case) in def.invalid_test_cases().iter().enumerate() {
            if validator.is_valid(&case.value) {
                diagnostics.push(
                    Diagnostic::new(
                        &fqn,
                        ErrorKind::TestCaseInvalidation,
                        format!("Invalid test case {} was accepted", index),
                    )
                    .with_details(json!({ "index": index, "value": case.value })),
                );
            }
        }

        diagnostics
    }

    /// Check each enum item's `data` against the validator of the enum's data type
    pub fn verify_enum_data(&self, def: &TypeDef, data_validator: &TypeValidator) -> Vec<Diagnostic> {
        let Some(enum_def) = def.as_enum() else {
            return Vec::new();
        };
        let fqn = def.fqn();

        enum_def
            .items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let data = item.data.clone().unwrap_or(Value::Null);
                let outcome = data_validator.validate(&data);
                (!outcome.valid).then(|| {
                    Diagnostic::new(
                        &fqn,
                        ErrorKind::EnumItemDataValidation,
                        format!(
                            "Data of item '{}' does not match '{}': {}",
                            item.value,
                            data_validator.fqn(),
                            outcome.summary()
                        ),
                    )
                    .with_details(failure_details(index, &outcome))
                })
            })
            .collect()
    }
}

fn expect_valid(
    fqn: &str,
    cases: &[TestCase],
    validator: &TypeValidator,
    kind: ErrorKind,
    label: &str,
) -> Vec<Diagnostic> {
    cases
        .iter()
        .enumerate()
        .filter_map(|(index, case)| {
            let outcome = validator.validate(&case.value);
            (!outcome.valid).then(|| {
                Diagnostic::new(
                    fqn,
                    kind,
                    format!("{} {} was rejected: {}", capitalize(label), index, outcome.summary()),
                )
                .with_details(failure_details(index, &outcome))
            })
        })
        .collect()
}

fn failure_details(index: usize, outcome: &ValidationOutcome) -> Value {
    json!({ "index": index, "errors": outcome.errors })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{JsonSchemaEmitter, KnownTypes};
    use crate::engine::ValidatorEngine;
    use crate::patch::DefaultsPatcher;

    fn compile(defs: &[TypeDef]) -> crate::engine::FrozenEngine {
        let emitter = JsonSchemaEmitter::new("https://example.com");
        let known = KnownTypes::from_defs(defs);
        let mut engine = ValidatorEngine::new(vec![], true);
        for def in defs {
            for doc in emitter.emit(def, &known).unwrap().iter() {
                engine.add_schema(doc);
            }
        }
        engine.freeze()
    }

    fn def(value: Value) -> TypeDef {
        DefaultsPatcher::new().patch(&serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_failing_cases_are_reported_with_index() {
        let int = def(json!({
            "kind": "int", "system": "test", "name": "positiveInteger",
            "minimum": 1, "maximum": 100,
            "examples": [{ "value": 5 }],
            "validTestCases": [{ "value": 1 }, { "value": 0 }],
            "invalidTestCases": [{ "value": 101 }, { "value": 50 }]
        }));
        let engine = compile(std::slice::from_ref(&int));
        let validator = engine.compile("test/positiveInteger").unwrap();

        let diagnostics = ExampleVerifier::new().verify(&int, &validator);
        assert_eq!(diagnostics.len(), 2);

        assert_eq!(diagnostics[0].kind, ErrorKind::TestCaseValidation);
        assert_eq!(diagnostics[0].details["index"], 1);
        assert_eq!(diagnostics[1].kind, ErrorKind::TestCaseInvalidation);
        assert_eq!(diagnostics[1].details["index"], 1);
    }

    #[test]
    fn test_rejected_example() {
        let flag = def(json!({
            "kind": "bool", "system": "test", "name": "flag",
            "examples": [{ "value": true }, { "value": "yes" }]
        }));
        let engine = compile(std::slice::from_ref(&flag));
        let validator = engine.compile("test/flag").unwrap();

        let diagnostics = ExampleVerifier::new().verify(&flag, &validator);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, ErrorKind::ExampleValidation);
        assert_eq!(diagnostics[0].details["index"], 1);
    }

    #[test]
    fn test_enum_item_data() {
        let count = def(json!({
            "kind": "int", "system": "test", "name": "count", "minimum": 0, "maximum": 10
        }));
        let meta = def(json!({
            "kind": "record", "system": "test", "name": "sizeMeta",
            "properties": [{ "name": "rank", "propertyType": "count", "isRequired": true }],
            "validTestCases": [{ "value": { "rank": 1 } }]
        }));
        let size = def(json!({
            "kind": "enum", "system": "test", "name": "size", "dataType": "sizeMeta",
            "items": [
                { "value": "s", "text": "Small", "data": { "rank": 1 } },
                { "value": "xl", "text": "Huge", "data": { "rank": 99 } }
            ]
        }));
        let engine = compile(&[count, meta, size.clone()]);
        let data_validator = engine.compile("test/sizeMeta").unwrap();

        let diagnostics = ExampleVerifier::new().verify_enum_data(&size, &data_validator);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, ErrorKind::EnumItemDataValidation);
        assert_eq!(diagnostics[0].details["index"], 1);
    }
}
