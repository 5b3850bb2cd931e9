//! Type map construction
//!
//! Walks schema fragments recursively and pushes one node per named fragment.
//! Each fragment is matched against an ordered list of shapes, first match wins:
//! 0. the document of a declared enum
//! 1. an inline `enum` list
//! 2. a `$ref`
//! 3. a primitive `type`
//! 4. an array with a single item schema
//! 5. a closed object with properties
//! 6. anything else, recorded as an opaque `object` scalar

use serde_json::{Map, Value};
use std::collections::HashMap;

use super::{EnumItemRef, ObjectNode, ObjectProperty, RefNode, TypeMap};
use crate::emit::{EmittedSchemas, JsonSchemaEmitter, KnownTypes};
use crate::names;
use crate::typedef::{EnumTypeDef, TypeDef};

const PRIMITIVES: &[&str] = &["string", "number", "integer", "boolean"];

/// Enum root data attached to a declared enum's node
#[derive(Debug, Clone)]
struct EnumRoot {
    items: Vec<EnumItemRef>,
    data_type: Option<String>,
}

impl EnumRoot {
    fn from_def(def: &EnumTypeDef) -> Self {
        Self {
            items: def
                .items
                .iter()
                .map(|item| EnumItemRef {
                    value: item.value.clone(),
                    text: item.text.clone(),
                    symbol: item.symbol.clone(),
                    deprecated: item.deprecated.clone(),
                    documentation: item.summary.clone().filter(|s| !s.is_empty()),
                    data: item.data.clone(),
                })
                .collect(),
            data_type: def
                .data_type
                .as_deref()
                .map(|reference| names::resolve_reference(&def.header.system, reference, None)),
        }
    }
}

/// Builds a [`TypeMap`] from schema fragments
#[derive(Debug, Clone)]
pub struct TypeMapBuilder {
    domain: String,
    enums: HashMap<String, EnumRoot>,
    map: TypeMap,
}

impl TypeMapBuilder {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            enums: HashMap::new(),
            map: TypeMap::new(),
        }
    }

    /// Register declared enums so their documents become enum roots
    pub fn with_enums<'a>(mut self, enums: impl IntoIterator<Item = &'a EnumTypeDef>) -> Self {
        for def in enums {
            let fqn = names::fqn(&def.header.system, &def.header.name);
            self.enums.insert(fqn, EnumRoot::from_def(def));
        }
        self
    }

    /// Build the map for a batch of normalised definitions.
    ///
    /// Definitions whose documents cannot be emitted are left out.
    pub fn from_definitions(domain: &str, defs: &[TypeDef]) -> TypeMap {
        let emitter = JsonSchemaEmitter::new(domain);
        let known = KnownTypes::from_defs(defs);
        let mut builder = Self::new(emitter.domain()).with_enums(defs.iter().filter_map(TypeDef::as_enum));

        for def in defs {
            if let Ok(emitted) = emitter.emit(def, &known) {
                builder.add_definition(def, &emitted);
            }
        }
        builder.build()
    }

    /// Enter a declared type and its variants as root types
    pub fn add_definition(&mut self, def: &TypeDef, emitted: &EmittedSchemas) {
        let examples: Vec<Value> = def.examples().iter().map(|e| e.value.clone()).collect();
        self.add_root(&emitted.document.fqn, &examples, &emitted.document.schema);
        for variant in &emitted.variants {
            self.add_root(&variant.fqn, &[], &variant.schema);
        }
    }

    fn add_root(&mut self, fqn: &str, examples: &[Value], schema: &Value) {
        if let Some((system, name)) = names::split_fqn(fqn) {
            self.add_json_schema(system, name, true, examples, 0, schema);
        }
    }

    /// Add the node(s) for `fragment` named `proposed_name`; returns the fqn of the pushed node
    pub fn add_json_schema(
        &mut self,
        system: &str,
        proposed_name: &str,
        is_root_type: bool,
        examples: &[Value],
        array_depth: usize,
        fragment: &Value,
    ) -> String {
        let fqn = names::fqn(system, proposed_name);
        let ref_node = |ref_type_name: String, is_scalar_ref: bool, examples: Vec<Value>| RefNode {
            system: system.to_string(),
            name: proposed_name.to_string(),
            ref_type_name,
            ref_type_array_count: array_depth,
            is_scalar_ref,
            is_enum_ref: false,
            is_root_type,
            enum_items: None,
            enum_item_data_type_name: None,
            examples,
        };

        // 0. declared enum
        if is_root_type {
            if let Some(root) = self.enums.get(&fqn) {
                let node = RefNode {
                    is_enum_ref: true,
                    enum_items: Some(root.items.clone()),
                    enum_item_data_type_name: root.data_type.clone(),
                    ..ref_node("string".to_string(), false, examples.to_vec())
                };
                self.map.ref_types.push(node);
                return fqn;
            }
        }

        // 1. inline enum
        if let Some(first) = fragment
            .get("enum")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
        {
            let node = ref_node(primitive_of(first).to_string(), true, examples.to_vec());
            self.map.ref_types.push(node);
            return fqn;
        }

        // 2. reference
        if let Some(reference) = fragment.get("$ref").and_then(Value::as_str) {
            let target = names::resolve_reference(system, reference, Some(&self.domain));
            self.map.ref_types.push(ref_node(target, false, examples.to_vec()));
            return fqn;
        }

        let schema_type = fragment.get("type").and_then(Value::as_str);

        // 3. primitive
        if let Some(primitive) = schema_type.filter(|t| PRIMITIVES.contains(t)) {
            self.map
                .ref_types
                .push(ref_node(primitive.to_string(), true, examples.to_vec()));
            return fqn;
        }

        // 4. array of a single item schema
        if schema_type == Some("array") {
            if let Some(items) = fragment.get("items").filter(|i| i.is_object()) {
                return self.add_json_schema(system, proposed_name, false, &[], array_depth + 1, items);
            }
        }

        // 5. closed object
        if let Some(properties) = closed_object_properties(fragment) {
            let required: Vec<&str> = fragment
                .get("required")
                .and_then(Value::as_array)
                .map(|r| r.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            let properties = properties
                .iter()
                .map(|(property_name, property)| {
                    let child = format!("{}_{}", proposed_name, property_name);
                    let ref_type_name = self.add_json_schema(system, &child, false, &[], 0, property);
                    ObjectProperty {
                        property_name: property_name.clone(),
                        documentation: description(property),
                        ref_type_name,
                        is_required: required.contains(&property_name.as_str()),
                    }
                })
                .collect();

            self.map.object_types.push(ObjectNode {
                system: system.to_string(),
                name: proposed_name.to_string(),
                documentation: description(fragment),
                object_type_array_count: array_depth,
                is_root_type,
                properties,
            });
            return fqn;
        }

        // 6. anything else
        self.map
            .ref_types
            .push(ref_node("object".to_string(), true, examples.to_vec()));
        fqn
    }

    pub fn build(self) -> TypeMap {
        self.map
    }
}

fn primitive_of(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        _ => "object",
    }
}

fn closed_object_properties(fragment: &Value) -> Option<&Map<String, Value>> {
    let closed = fragment.get("additionalProperties") == Some(&Value::Bool(false));
    let is_object = match fragment.get("type") {
        None => true,
        Some(t) => t == "object",
    };
    if closed && is_object {
        fragment.get("properties").and_then(Value::as_object)
    } else {
        None
    }
}

fn description(fragment: &Value) -> Option<String> {
    fragment
        .get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::DefaultsPatcher;
    use crate::typemap::Resolution;
    use serde_json::json;

    const DOMAIN: &str = "https://example.com";

    fn builder() -> TypeMapBuilder {
        TypeMapBuilder::new(DOMAIN)
    }

    #[test]
    fn test_inline_enum_infers_primitive() {
        let mut b = builder();
        b.add_json_schema("test", "level", true, &[], 0, &json!({ "enum": [1, 2, 3] }));
        let map = b.build();
        let node = map.ref_node("test/level").unwrap();
        assert!(node.is_scalar_ref);
        assert_eq!(node.ref_type_name, "integer");
    }

    #[test]
    fn test_primitive_keeps_examples() {
        let mut b = builder();
        b.add_json_schema("test", "code", true, &[json!("ab")], 0, &json!({ "type": "string" }));
        let map = b.build();
        let node = map.ref_node("test/code").unwrap();
        assert_eq!(node.ref_type_name, "string");
        assert_eq!(node.examples, vec![json!("ab")]);
        assert!(node.is_root_type);
    }

    #[test]
    fn test_nested_arrays_clear_examples() {
        let mut b = builder();
        b.add_json_schema(
            "test",
            "grid",
            true,
            &[json!([[1]])],
            0,
            &json!({ "type": "array", "items": { "type": "array", "items": { "type": "integer" } } }),
        );
        let map = b.build();
        let node = map.ref_node("test/grid").unwrap();
        assert_eq!(node.ref_type_array_count, 2);
        assert!(!node.is_root_type);
        assert!(node.examples.is_empty());
    }

    #[test]
    fn test_references_resolve_to_fqns() {
        let mut b = builder();
        b.add_json_schema("test", "a", true, &[], 0, &json!({ "$ref": "pillow" }));
        b.add_json_schema("test", "b", true, &[], 0, &json!({ "$ref": "../alt/direction" }));
        b.add_json_schema("test", "c", true, &[], 0, &json!({ "$ref": "https://example.com/alt/size" }));
        let map = b.build();

        assert_eq!(map.ref_node("test/a").unwrap().ref_type_name, "test/pillow");
        assert_eq!(map.ref_node("test/b").unwrap().ref_type_name, "alt/direction");
        assert_eq!(map.ref_node("test/c").unwrap().ref_type_name, "alt/size");
        assert!(map.ref_node("test/c").unwrap().is_alias());
    }

    #[test]
    fn test_anonymous_nested_object() {
        let mut b = builder();
        b.add_json_schema(
            "test",
            "person",
            true,
            &[],
            0,
            &json!({
                "type": "object",
                "additionalProperties": false,
                "required": ["address"],
                "properties": {
                    "address": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": { "line": { "type": "string", "description": "First line" } }
                    },
                    "tags": { "type": "array", "items": [{ "type": "string" }] }
                }
            }),
        );
        let map = b.build();

        let person = map.object_node("test/person").unwrap();
        assert_eq!(person.properties[0].ref_type_name, "test/person_address");
        assert!(person.properties[0].is_required);
        assert!(!person.properties[1].is_required);

        let address = map.object_node("test/person_address").unwrap();
        assert!(!address.is_root_type);
        assert_eq!(address.properties[0].documentation.as_deref(), Some("First line"));
        assert_eq!(address.properties[0].ref_type_name, "test/person_address_line");

        // tuple arrays are opaque
        let tags = map.ref_node("test/person_tags").unwrap();
        assert_eq!(tags.ref_type_name, "object");
        assert!(tags.is_scalar_ref);
    }

    #[test]
    fn test_open_object_falls_back() {
        let mut b = builder();
        b.add_json_schema("test", "bag", true, &[], 0, &json!({ "type": "object" }));
        let map = b.build();
        assert_eq!(map.ref_node("test/bag").unwrap().ref_type_name, "object");
    }

    #[test]
    fn test_from_definitions_with_variants_and_enums() {
        let defs: Vec<TypeDef> = [
            json!({ "kind": "int", "system": "test", "name": "count", "minimum": 0, "maximum": 9 }),
            json!({
                "kind": "enum", "system": "test", "name": "size",
                "items": [{ "value": "s", "text": "Small", "summary": "Smallest." }]
            }),
            json!({
                "kind": "record", "system": "test", "name": "box",
                "properties": [
                    { "name": "count", "propertyType": "count", "isArray": true, "isRequired": true },
                    { "name": "size", "propertyType": "size" }
                ],
                "variants": [{ "name": "small", "excludeProperties": ["size"] }],
                "validTestCases": []
            }),
        ]
        .into_iter()
        .map(|v| DefaultsPatcher::new().patch(&serde_json::from_value(v).unwrap()))
        .collect();

        let map = TypeMapBuilder::from_definitions(DOMAIN, &defs);

        let size = map.ref_node("test/size").unwrap();
        assert!(size.is_enum_ref);
        assert_eq!(size.ref_type_name, "string");
        assert_eq!(size.enum_items.as_ref().unwrap()[0].documentation.as_deref(), Some("Smallest."));

        let variant = map.object_node("test/boxSmall").unwrap();
        assert!(variant.is_root_type);
        assert_eq!(variant.properties.len(), 1);

        let count = map.object_node("test/box").unwrap().property("count").unwrap();
        let assignment = map.resolve_type_assignment(&count.ref_type_name, 0, false).unwrap();
        assert_eq!(assignment.type_name, "test/count");
        assert_eq!(assignment.array_depth, 1);
        assert_eq!(assignment.resolution, Resolution::Scalar);
    }
}
