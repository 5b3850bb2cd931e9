//! End-to-end compilation tests
//!
//! Drives the public API from raw definitions to validators and diagnostics.

use jsonotron::{
    CompiledTypes, CompilerConfig, DefaultsPatcher, ErrorKind, JsonotronError, Rule, TypeCompiler,
    TypeDef, TypeDefinitionStore,
};
use serde_json::{json, Value};

fn compile(values: Vec<Value>) -> CompiledTypes {
    let config = CompilerConfig::default().with_domain("https://example.com");
    let store: TypeDefinitionStore = values.into_iter().collect();
    TypeCompiler::new(config).compile(&store)
}

fn country_code() -> Value {
    json!({
        "kind": "enum",
        "system": "test",
        "name": "countryCode",
        "summary": "A country.",
        "items": [
            { "value": "en", "text": "England", "summary": "England." },
            { "value": "us", "text": "United States", "summary": "United States." },
            { "value": "fr", "text": "France", "summary": "France." }
        ]
    })
}

fn positive_integer() -> Value {
    json!({
        "kind": "int",
        "system": "test",
        "name": "positiveInteger",
        "summary": "A whole number greater than zero.",
        "minimum": 1,
        "maximum": 1000000,
        "validTestCases": [{ "value": 1 }, { "value": 1000000 }],
        "invalidTestCases": [{ "value": 0 }, { "value": 1.5 }]
    })
}

fn populace() -> Value {
    json!({
        "kind": "record",
        "system": "test",
        "name": "populace",
        "summary": "People living in a country.",
        "properties": [
            { "name": "pop", "summary": "Head count.", "propertyType": "positiveInteger", "isRequired": true },
            { "name": "country", "summary": "Where they live.", "propertyType": "countryCode", "isRequired": true }
        ],
        "validTestCases": [{ "value": { "pop": 5, "country": "fr" } }],
        "invalidTestCases": [{ "value": { "pop": 5 } }]
    })
}

#[test]
fn test_scenario_enum_and_record_compile() {
    let compiled = compile(vec![country_code(), positive_integer(), populace()]);

    assert!(compiled.is_successful(), "{}", compiled.result());
    assert!(compiled.is_successful_with_no_warnings(), "{}", compiled.result());

    let ok = compiled
        .validate("test", "populace", &json!({ "pop": 1, "country": "en" }))
        .unwrap();
    assert!(ok.valid);

    let bad = compiled
        .validate("test", "populace", &json!({ "pop": -1, "country": "en" }))
        .unwrap();
    assert!(!bad.valid);
    assert!(bad.errors.iter().any(|e| e.path.contains("pop")));
}

#[test]
fn test_array_validation() {
    let compiled = compile(vec![country_code(), positive_integer(), populace()]);

    let outcome = compiled
        .validate_array("test", "countryCode", &json!(["en", "fr"]))
        .unwrap();
    assert!(outcome.valid);

    let outcome = compiled
        .validate_array("test", "countryCode", &json!(["en", "de"]))
        .unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.errors[0].path, "/1");
}

#[test]
fn test_forward_references_resolve() {
    // record declared before the types it uses
    let compiled = compile(vec![populace(), positive_integer(), country_code()]);
    assert!(compiled.is_successful(), "{}", compiled.result());
}

#[test]
fn test_duplicate_enum_value_cites_index() {
    let compiled = compile(vec![json!({
        "kind": "enum",
        "system": "test",
        "name": "colour",
        "summary": "A colour.",
        "items": [
            { "value": "red", "text": "Red" },
            { "value": "blue", "text": "Blue" },
            { "value": "red", "text": "Also red" }
        ]
    })]);

    let errors = compiled.result().errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Uniqueness);
    assert_eq!(errors[0].rule, Some(Rule::DuplicateEnumValue));
    assert_eq!(errors[0].details["index"], 2);
    assert!(!compiled.has_validator("test", "colour"));
}

#[test]
fn test_missing_required_property_fails_before_emission() {
    let compiled = compile(vec![
        positive_integer(),
        json!({
            "kind": "record",
            "system": "test",
            "name": "broken",
            "summary": "Broken record.",
            "properties": [{ "name": "pop", "summary": "Head count.", "propertyType": "positiveInteger" }],
            "required": ["missingProp"],
            "validTestCases": []
        }),
    ]);

    let errors: Vec<_> = compiled.result().errors_for("test/broken").collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::UnresolvedReference);
    assert_eq!(errors[0].rule, Some(Rule::UnknownRequiredProperty));
    assert!(compiled.json_schema("test", "broken").is_none());
    assert!(compiled.json_schema("test", "positiveInteger").is_some());
}

#[test]
fn test_test_case_failures_are_reported() {
    let compiled = compile(vec![json!({
        "kind": "string",
        "system": "test",
        "name": "shortString",
        "summary": "Up to five characters.",
        "maximumLength": 5,
        "examples": [{ "value": "hello", "summary": "Five characters." }],
        "validTestCases": [{ "value": "toolong" }],
        "invalidTestCases": [{ "value": "fine" }]
    })]);

    let kinds: Vec<ErrorKind> = compiled.result().errors().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![ErrorKind::TestCaseValidation, ErrorKind::TestCaseInvalidation]);
    assert!(compiled.result().errors().iter().all(|e| e.details["index"] == 0));
}

#[test]
fn test_unknown_property_type_suggests_a_name() {
    let compiled = compile(vec![
        positive_integer(),
        json!({
            "kind": "record",
            "system": "test",
            "name": "counter",
            "summary": "Counts things.",
            "properties": [{ "name": "total", "summary": "Total.", "propertyType": "positiveInt" }],
            "validTestCases": []
        }),
    ]);

    let errors = compiled.result().errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, Some(Rule::UnknownPropertyType));
    assert_eq!(errors[0].details["suggestion"], "test/positiveInteger");
}

#[test]
fn test_pattern_constraints_apply_through_references() {
    let compiled = compile(vec![
        json!({
            "kind": "string",
            "system": "test",
            "name": "code",
            "summary": "A code.",
            "maximumLength": 3,
            "regex": "^[A-Z]+$"
        }),
        json!({
            "kind": "record",
            "system": "test",
            "name": "holder",
            "summary": "Holds a code.",
            "properties": [{ "name": "code", "summary": "The code.", "propertyType": "code" }],
            "validTestCases": [{ "value": { "code": "ABC" } }]
        }),
    ]);
    assert!(compiled.is_successful(), "{}", compiled.result());
    assert!(compiled.validate("test", "holder", &json!({ "code": "ABC" })).unwrap().valid);
    assert!(!compiled.validate("test", "holder", &json!({ "code": "abc" })).unwrap().valid);
}

#[test]
fn test_referencing_a_failed_type_fails_compilation() {
    let compiled = compile(vec![
        json!({
            "kind": "record",
            "system": "test",
            "name": "inner",
            "summary": "Refers to nothing.",
            "properties": [{ "name": "x", "summary": "X.", "propertyType": "nowhere" }],
            "validTestCases": []
        }),
        json!({
            "kind": "record",
            "system": "test",
            "name": "outer",
            "summary": "Refers to inner.",
            "properties": [{ "name": "inner", "summary": "Inner.", "propertyType": "inner" }],
            "validTestCases": []
        }),
    ]);

    let inner: Vec<_> = compiled.result().errors_for("test/inner").collect();
    assert_eq!(inner[0].kind, ErrorKind::UnresolvedReference);

    let outer: Vec<_> = compiled.result().errors_for("test/outer").collect();
    assert_eq!(outer.len(), 1);
    assert_eq!(outer[0].kind, ErrorKind::SchemaCompilation);
    assert!(!compiled.has_validator("test", "outer"));
}

#[test]
fn test_variants_are_addressable() {
    let compiled = compile(vec![
        country_code(),
        positive_integer(),
        json!({
            "kind": "record",
            "system": "test",
            "name": "census",
            "summary": "A census entry.",
            "properties": [
                { "name": "pop", "summary": "Head count.", "propertyType": "positiveInteger", "isRequired": true },
                { "name": "country", "summary": "Country.", "propertyType": "countryCode", "isRequired": true }
            ],
            "variants": [
                { "name": "patch", "summary": "Partial update.", "excludeProperties": [], "required": [] },
                { "name": "countOnly", "summary": "Just the count.", "includeProperties": ["pop"] }
            ],
            "validTestCases": [{ "value": { "pop": 2, "country": "us" } }]
        }),
    ]);
    assert!(compiled.is_successful(), "{}", compiled.result());

    assert!(compiled.validate("test", "censusPatch", &json!({})).unwrap().valid);
    assert!(!compiled.validate("test", "census", &json!({})).unwrap().valid);

    let count_only = compiled.validate("test", "censusCountOnly", &json!({ "pop": 2, "country": "us" })).unwrap();
    assert!(!count_only.valid);
    assert!(compiled.validate("test", "censusCountOnly", &json!({ "pop": 2 })).unwrap().valid);
}

fn direction() -> Value {
    json!({
        "kind": "enum",
        "system": "alt",
        "name": "direction",
        "summary": "A compass direction.",
        "items": [
            { "value": "north", "text": "North", "summary": "North." },
            { "value": "south", "text": "South", "summary": "South." }
        ]
    })
}

#[test]
fn test_object_alias_validates_as_its_target() {
    let compiled = compile(vec![
        json!({
            "kind": "int",
            "system": "test",
            "name": "count",
            "summary": "A count.",
            "minimum": 0,
            "maximum": 10
        }),
        json!({
            "kind": "object",
            "system": "test",
            "name": "tally",
            "summary": "Another name for a count.",
            "jsonSchema": { "$ref": "count" },
            "validTestCases": [{ "value": 3 }],
            "invalidTestCases": [{ "value": 11 }]
        }),
    ]);
    assert!(compiled.is_successful(), "{}", compiled.result());
    assert!(compiled.validate("test", "tally", &json!(10)).unwrap().valid);
    assert!(!compiled.validate("test", "tally", &json!(-1)).unwrap().valid);

    let assignment = compiled.type_map().resolve_type_assignment("test/tally", 0, false).unwrap();
    assert_eq!(assignment.type_name, "test/count");
}

#[test]
fn test_object_references_another_system() {
    let compiled = compile(vec![
        direction(),
        json!({
            "kind": "object",
            "system": "test",
            "name": "heading",
            "summary": "Where something points.",
            "jsonSchema": {
                "type": "object",
                "properties": { "towards": { "$ref": "alt/direction" } },
                "required": ["towards"]
            },
            "validTestCases": [{ "value": { "towards": "north" } }],
            "invalidTestCases": [{ "value": { "towards": "east" } }]
        }),
    ]);
    assert!(compiled.is_successful(), "{}", compiled.result());
    assert_eq!(
        compiled.json_schema("test", "heading").unwrap()["properties"]["towards"]["$ref"],
        "https://example.com/alt/direction"
    );
}

#[test]
fn test_unknown_object_reference_is_unresolved() {
    let compiled = compile(vec![
        direction(),
        json!({
            "kind": "object",
            "system": "test",
            "name": "heading",
            "summary": "Where something points.",
            "jsonSchema": { "type": "object", "properties": { "towards": { "$ref": "nowhere" } } }
        }),
    ]);

    let errors = compiled.result().errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::UnresolvedReference);
    assert_eq!(errors[0].rule, Some(Rule::UnknownPropertyType));
    assert_eq!(errors[0].details["reference"], "test/nowhere");
    assert!(!compiled.has_validator("test", "heading"));
}

#[test]
fn test_record_examples_do_not_apply_to_variants() {
    let compiled = compile(vec![
        direction(),
        json!({
            "kind": "record",
            "system": "test",
            "name": "signpost",
            "summary": "A signpost.",
            "properties": [
                { "name": "label", "summary": "Main pointer.", "propertyType": "alt/direction", "isRequired": true },
                { "name": "towards", "summary": "Pointing.", "propertyType": "alt/direction" }
            ],
            "variants": [{ "name": "blank", "summary": "No pointer.", "excludeProperties": ["towards"] }],
            "examples": [{ "value": { "label": "north", "towards": "south" }, "summary": "Both set." }],
            "validTestCases": []
        }),
    ]);
    assert!(compiled.is_successful(), "{}", compiled.result());
    assert!(compiled.json_schema("test", "signpostBlank").unwrap().get("examples").is_none());
}

#[test]
fn test_fail_fast_bundles_every_error() {
    let compiled = compile(vec![
        json!({ "kind": "int", "system": "test", "name": "a", "summary": "A.", "minimum": 5, "maximum": 1 }),
        json!({ "kind": "widget", "system": "test", "name": "b" }),
    ]);

    let err = compiled.into_checked().unwrap_err();
    assert!(matches!(err, JsonotronError::CompilationFailed { .. }));
    assert_eq!(err.diagnostics().len(), 2);
    assert!(err.to_string().contains("test/a"));
}

#[test]
fn test_patch_is_idempotent_for_compiled_definitions() {
    let compiled = compile(vec![country_code(), positive_integer(), populace()]);
    let patcher = DefaultsPatcher::new();
    for def in compiled.type_defs() {
        let again: TypeDef = patcher.patch(&def);
        assert_eq!(again, def);
    }
}

#[test]
fn test_sequential_and_parallel_agree() {
    let values = vec![country_code(), positive_integer(), populace()];
    let store: TypeDefinitionStore = values.into_iter().collect();

    let mut config = CompilerConfig::default();
    let parallel = TypeCompiler::new(config.clone()).compile(&store);
    config.engine.parallel = false;
    let sequential = TypeCompiler::new(config).compile(&store);

    assert_eq!(parallel.result().errors(), sequential.result().errors());
    assert_eq!(
        parallel.json_schema("test", "populace"),
        sequential.json_schema("test", "populace")
    );
}
