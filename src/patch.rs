//! Defaults Patching
//!
//! Produces the normalised form of a definition: optional lists become empty
//! lists, flags become explicit, and a title is derived from the name when
//! none is given. The input is never modified and patching is idempotent.

use crate::names;
use crate::typedef::{PropertyDef, TypeDef, TypeHeader};

/// Fills optional fields of a definition with their defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultsPatcher;

impl DefaultsPatcher {
    pub fn new() -> Self {
        Self
    }

    /// Return a normalised copy of `def`
    pub fn patch(&self, def: &TypeDef) -> TypeDef {
        let mut patched = def.clone();
        patch_header(patched.header_mut());

        match &mut patched {
            TypeDef::Bool(d) => {
                d.valid_test_cases.get_or_insert_with(Vec::new);
                d.invalid_test_cases.get_or_insert_with(Vec::new);
            }
            TypeDef::Int(d) => {
                d.valid_test_cases.get_or_insert_with(Vec::new);
                d.invalid_test_cases.get_or_insert_with(Vec::new);
            }
            TypeDef::Float(d) => {
                d.is_minimum_exclusive.get_or_insert(false);
                d.is_maximum_exclusive.get_or_insert(false);
                d.valid_test_cases.get_or_insert_with(Vec::new);
                d.invalid_test_cases.get_or_insert_with(Vec::new);
            }
            TypeDef::String(d) => {
                d.minimum_length.get_or_insert(0);
                d.valid_test_cases.get_or_insert_with(Vec::new);
                d.invalid_test_cases.get_or_insert_with(Vec::new);
            }
            TypeDef::Object(d) => {
                d.valid_test_cases.get_or_insert_with(Vec::new);
                d.invalid_test_cases.get_or_insert_with(Vec::new);
            }
            TypeDef::Enum(_) => {}
            TypeDef::Record(d) => {
                d.properties.iter_mut().for_each(patch_property);
                d.required.get_or_insert_with(Vec::new);
                d.variants.get_or_insert_with(Vec::new);
                d.invalid_test_cases.get_or_insert_with(Vec::new);
            }
        }

        patched
    }
}

fn patch_header(header: &mut TypeHeader) {
    if header.title.is_none() {
        header.title = Some(names::title_from_name(&header.name));
    }
    header.summary.get_or_insert_with(String::new);
    header.tags.get_or_insert_with(Vec::new);
    header.labels.get_or_insert_with(Vec::new);
    header.examples.get_or_insert_with(Vec::new);
}

fn patch_property(property: &mut PropertyDef) {
    property.is_array.get_or_insert(false);
    property.is_required.get_or_insert(false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> TypeDef {
        serde_json::from_value(json!({
            "kind": "record",
            "system": "test",
            "name": "populace",
            "properties": [
                { "name": "pop", "propertyType": "positiveInteger", "isRequired": true },
                { "name": "country", "propertyType": "countryCode" }
            ],
            "validTestCases": [{ "value": { "pop": 1 } }]
        }))
        .unwrap()
    }

    #[test]
    fn test_patch_fills_defaults() {
        let patched = DefaultsPatcher::new().patch(&record());
        let header = patched.header();
        assert_eq!(header.title.as_deref(), Some("Populace"));
        assert_eq!(header.tags, Some(vec![]));
        assert_eq!(header.examples, Some(vec![]));

        let record = patched.as_record().unwrap();
        assert_eq!(record.properties[0].is_required, Some(true));
        assert_eq!(record.properties[1].is_required, Some(false));
        assert_eq!(record.properties[1].is_array, Some(false));
        assert_eq!(record.required, Some(vec![]));
        assert_eq!(record.invalid_test_cases, Some(vec![]));
    }

    #[test]
    fn test_patch_keeps_declared_title() {
        let mut def = record();
        def.header_mut().title = Some("People".to_string());
        let patched = DefaultsPatcher::new().patch(&def);
        assert_eq!(patched.header().title.as_deref(), Some("People"));
    }

    #[test]
    fn test_patch_does_not_touch_input() {
        let def = record();
        let before = def.clone();
        let _ = DefaultsPatcher::new().patch(&def);
        assert_eq!(def, before);
    }

    #[test]
    fn test_patch_is_idempotent() {
        let patcher = DefaultsPatcher::new();
        let float: TypeDef = serde_json::from_value(json!({
            "kind": "float", "system": "test", "name": "ratio", "minimum": 0.0, "maximum": 1.0
        }))
        .unwrap();

        for def in [record(), float] {
            let once = patcher.patch(&def);
            assert_eq!(patcher.patch(&once), once);
        }
    }
}
