//! JSON Schema Emission
//!
//! Converts a normalised definition into a draft-07 JSON Schema document.
//! Every document is identified by `{domain}/{system}/{name}` and references
//! other types through the same URIs, so a validation engine that knows all
//! documents of the batch can follow them.
//!
//! Record variants are emitted as documents of their own.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::diagnostics::Rule;
use crate::meta::Violation;
use crate::names;
use crate::typedef::{
    EnumTypeDef, FloatTypeDef, IntTypeDef, ObjectTypeDef, PropertyDef, RecordTypeDef,
    StringTypeDef, TypeDef, TypeHeader, TypeKind,
};

pub const JSON_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

/// An emitted schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// `system/name` of the type (or variant) the document describes
    pub fqn: String,
    /// The document's `$id`
    pub uri: String,
    pub schema: Value,
}

/// Documents emitted for one definition
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedSchemas {
    pub document: SchemaDocument,
    pub variants: Vec<SchemaDocument>,
}

impl EmittedSchemas {
    pub fn iter(&self) -> impl Iterator<Item = &SchemaDocument> {
        std::iter::once(&self.document).chain(self.variants.iter())
    }
}

// =============================================================================
// Known Types
// =============================================================================

/// Every type declared in the batch, by fqn
#[derive(Debug, Clone, Default)]
pub struct KnownTypes {
    kinds: BTreeMap<String, TypeKind>,
}

impl KnownTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_defs<'a>(defs: impl IntoIterator<Item = &'a TypeDef>) -> Self {
        let mut known = Self::new();
        for def in defs {
            known.insert(def.fqn(), def.kind());
        }
        known
    }

    pub fn insert(&mut self, fqn: impl Into<String>, kind: TypeKind) {
        self.kinds.insert(fqn.into(), kind);
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.kinds.contains_key(fqn)
    }

    pub fn kind(&self, fqn: &str) -> Option<TypeKind> {
        self.kinds.get(fqn).copied()
    }

    /// Closest known fqn to an unresolved one
    pub fn suggest(&self, fqn: &str) -> Option<&str> {
        let matcher = SkimMatcherV2::default();
        self.kinds
            .keys()
            .filter_map(|candidate| {
                matcher
                    .fuzzy_match(candidate, fqn)
                    .map(|score| (score, candidate.as_str()))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, candidate)| candidate)
    }
}

// =============================================================================
// Emitter
// =============================================================================

/// Emits JSON Schema documents under a domain
#[derive(Debug, Clone)]
pub struct JsonSchemaEmitter {
    domain: String,
}

impl JsonSchemaEmitter {
    pub fn new(domain: impl Into<String>) -> Self {
        let domain: String = domain.into();
        Self {
            domain: domain.trim_end_matches('/').to_string(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// `$id` of the document for `system/name`
    pub fn schema_uri(&self, fqn: &str) -> String {
        format!("{}/{}", self.domain, fqn)
    }

    /// Emit the document(s) for a normalised definition.
    ///
    /// Fails with the unresolved references when a referenced type is not known.
    pub fn emit(&self, def: &TypeDef, known: &KnownTypes) -> Result<EmittedSchemas, Vec<Violation>> {
        self.check_references(def, known)?;

        let fqn = def.fqn();
        let mut schema = self.document_header(&fqn, def.header());
        match def {
            TypeDef::Bool(_) => {
                schema.insert("type".into(), json!("boolean"));
            }
            TypeDef::Enum(d) => emit_enum(d, &mut schema),
            TypeDef::Int(d) => emit_int(d, &mut schema),
            TypeDef::Float(d) => emit_float(d, &mut schema),
            TypeDef::String(d) => emit_string(d, &mut schema),
            TypeDef::Object(d) => self.emit_object(d, &mut schema),
            TypeDef::Record(d) => {
                let props: Vec<&PropertyDef> = d.properties.iter().collect();
                self.emit_record_body(d, &props, &d.required_properties(), &mut schema);
            }
        }

        let variants = match def {
            TypeDef::Record(d) => d
                .variants()
                .iter()
                .map(|variant| {
                    let variant_fqn = names::fqn(d.header.system.as_str(), &d.variant_type_name(variant));
                    let header = TypeHeader {
                        title: Some(format!(
                            "{} ({})",
                            d.header.title.clone().unwrap_or_else(|| names::title_from_name(&d.header.name)),
                            names::title_from_name(&variant.name)
                        )),
                        summary: variant.summary.clone(),
                        examples: None,
                        ..d.header.clone()
                    };
                    let mut schema = self.document_header(&variant_fqn, &header);
                    self.emit_record_body(d, &d.variant_properties(variant), &d.variant_required(variant), &mut schema);
                    SchemaDocument {
                        uri: self.schema_uri(&variant_fqn),
                        fqn: variant_fqn,
                        schema: Value::Object(schema),
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        Ok(EmittedSchemas {
            document: SchemaDocument {
                uri: self.schema_uri(&fqn),
                fqn,
                schema: Value::Object(schema),
            },
            variants,
        })
    }

    fn check_references(&self, def: &TypeDef, known: &KnownTypes) -> Result<(), Vec<Violation>> {
        let system = def.system();
        let mut violations = Vec::new();

        match def {
            TypeDef::Record(d) => {
                for (i, property) in d.properties.iter().enumerate() {
                    let target = names::resolve_reference(system, &property.property_type, None);
                    if !known.contains(&target) {
                        violations.push(unresolved(
                            Rule::UnknownPropertyType,
                            format!("properties[{}].propertyType", i),
                            format!("Property '{}' refers to unknown type '{}'", property.name, target),
                            &target,
                            known,
                        ));
                    }
                }
            }
            TypeDef::Enum(EnumTypeDef { data_type: Some(data_type), .. }) => {
                let target = names::resolve_reference(system, data_type, None);
                if known.kind(&target) != Some(TypeKind::Record) {
                    violations.push(unresolved(
                        Rule::UnknownDataType,
                        "dataType".to_string(),
                        format!("Enum data type '{}' is not a known record type", target),
                        &target,
                        known,
                    ));
                }
            }
            TypeDef::Object(d) => {
                let mut references = Vec::new();
                fragment_references(&d.json_schema, "jsonSchema".to_string(), &mut references);
                for (path, reference) in references {
                    let target = self.resolve_fragment_reference(system, &reference);
                    if !known.contains(&target) {
                        violations.push(unresolved(
                            Rule::UnknownPropertyType,
                            path,
                            format!("Schema reference '{}' names unknown type '{}'", reference, target),
                            &target,
                            known,
                        ));
                    }
                }
            }
            _ => {}
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn document_header(&self, fqn: &str, header: &TypeHeader) -> Map<String, Value> {
        let mut schema = Map::new();
        schema.insert("$schema".into(), json!(JSON_SCHEMA_DRAFT));
        schema.insert("$id".into(), json!(self.schema_uri(fqn)));
        let title = header
            .title
            .clone()
            .unwrap_or_else(|| names::title_from_name(&header.name));
        schema.insert("title".into(), json!(title));
        if let Some(summary) = header.summary.as_deref().filter(|s| !s.is_empty()) {
            schema.insert("description".into(), json!(summary));
        }
        if header.deprecated.is_some() {
            schema.insert("deprecated".into(), json!(true));
        }
        let examples: Vec<&Value> = header
            .examples
            .iter()
            .flatten()
            .map(|e| &e.value)
            .collect();
        if !examples.is_empty() {
            schema.insert("examples".into(), json!(examples));
        }
        schema
    }

    fn emit_record_body(
        &self,
        record: &RecordTypeDef,
        properties: &[&PropertyDef],
        required: &[String],
        schema: &mut Map<String, Value>,
    ) {
        let mut props = Map::new();
        for property in properties {
            let target = names::resolve_reference(&record.header.system, &property.property_type, None);
            let reference = json!({ "$ref": self.schema_uri(&target) });

            let mut prop = Map::new();
            if let Some(summary) = property.summary.as_deref().filter(|s| !s.is_empty()) {
                prop.insert("description".into(), json!(summary));
            }
            if property.is_array() {
                prop.insert("type".into(), json!("array"));
                prop.insert("items".into(), reference);
            } else if let Value::Object(reference) = reference {
                prop.extend(reference);
            }
            props.insert(property.name.clone(), Value::Object(prop));
        }

        schema.insert("type".into(), json!("object"));
        schema.insert("additionalProperties".into(), json!(false));
        schema.insert("properties".into(), Value::Object(props));
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
    }

    fn emit_object(&self, def: &ObjectTypeDef, schema: &mut Map<String, Value>) {
        let mut fragment = def.json_schema.clone();
        self.rewrite_references(&def.header.system, &mut fragment);
        if let Value::Object(fragment) = fragment {
            for (key, value) in fragment {
                // Identity keys of the document win over the fragment's
                if !schema.contains_key(&key) {
                    schema.insert(key, value);
                }
            }
        }
    }

    /// Point every type reference in `value` at the absolute document URI
    fn rewrite_references(&self, system: &str, value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    if DATA_KEYWORDS.contains(&key.as_str()) {
                        continue;
                    }
                    if key == "$ref" {
                        if let Value::String(reference) = child {
                            if !reference.starts_with('#') {
                                let target = self.resolve_fragment_reference(system, reference);
                                let uri = self.schema_uri(&target);
                                *reference = match reference.split_once('#') {
                                    Some((_, pointer)) => format!("{}#{}", uri, pointer),
                                    None => uri,
                                };
                            }
                            continue;
                        }
                    }
                    self.rewrite_references(system, child);
                }
            }
            Value::Array(items) => {
                for child in items {
                    self.rewrite_references(system, child);
                }
            }
            _ => {}
        }
    }

    /// fqn named by a `$ref` in a fragment, ignoring any `#pointer` suffix
    fn resolve_fragment_reference(&self, system: &str, reference: &str) -> String {
        let document = reference.split_once('#').map_or(reference, |(d, _)| d);
        names::resolve_reference(system, document, Some(&self.domain))
    }
}

fn unresolved(rule: Rule, path: String, message: String, target: &str, known: &KnownTypes) -> Violation {
    let mut details = json!({ "reference": target });
    if let Some(suggestion) = known.suggest(target) {
        details["suggestion"] = json!(suggestion);
    }
    Violation::new(rule, path, message).with_details(details)
}

fn emit_enum(def: &EnumTypeDef, schema: &mut Map<String, Value>) {
    let values: Vec<&str> = def.items.iter().map(|i| i.value.as_str()).collect();
    schema.insert("type".into(), json!("string"));
    schema.insert("enum".into(), json!(values));
}

fn emit_int(def: &IntTypeDef, schema: &mut Map<String, Value>) {
    schema.insert("type".into(), json!("integer"));
    schema.insert("minimum".into(), json!(def.minimum));
    schema.insert("maximum".into(), json!(def.maximum));
}

fn emit_float(def: &FloatTypeDef, schema: &mut Map<String, Value>) {
    schema.insert("type".into(), json!("number"));
    if def.is_minimum_exclusive.unwrap_or(false) {
        schema.insert("exclusiveMinimum".into(), json!(def.minimum));
    } else {
        schema.insert("minimum".into(), json!(def.minimum));
    }
    if def.is_maximum_exclusive.unwrap_or(false) {
        schema.insert("exclusiveMaximum".into(), json!(def.maximum));
    } else {
        schema.insert("maximum".into(), json!(def.maximum));
    }
}

fn emit_string(def: &StringTypeDef, schema: &mut Map<String, Value>) {
    schema.insert("type".into(), json!("string"));
    if let Some(min) = def.minimum_length.filter(|m| *m > 0) {
        schema.insert("minLength".into(), json!(min));
    }
    schema.insert("maxLength".into(), json!(def.maximum_length));
    if let Some(regex) = &def.regex {
        schema.insert("pattern".into(), json!(regex));
    }
}

/// Keywords whose values are instance data rather than schemas
const DATA_KEYWORDS: &[&str] = &["enum", "const", "default", "examples"];

/// Collect `(path, reference)` for every type reference in a schema fragment.
///
/// Local pointers (`#/definitions/x`) are not type references.
fn fragment_references(value: &Value, path: String, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if DATA_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                match (key.as_str(), child) {
                    ("$ref", Value::String(reference)) => {
                        if !reference.starts_with('#') {
                            out.push((format!("{}.$ref", path), reference.clone()));
                        }
                    }
                    _ => fragment_references(child, format!("{}.{}", path, key), out),
                }
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                fragment_references(child, format!("{}[{}]", path, i), out);
            }
        }
        _ => {}
    }
}
