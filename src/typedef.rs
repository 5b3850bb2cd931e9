//! Type definition data model
//!
//! Definitions are plain data: they are declared once (usually in YAML or
//! JSON loaded elsewhere), checked by [`crate::meta`], normalised by
//! [`crate::patch`] and never mutated afterwards.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::names;

/// Discriminant of a [`TypeDef`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Bool,
    Enum,
    Int,
    Float,
    String,
    Object,
    Record,
}

impl TypeKind {
    pub fn from_kind_str(kind: &str) -> Option<Self> {
        match kind {
            "bool" => Some(Self::Bool),
            "enum" => Some(Self::Enum),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "string" => Some(Self::String),
            "object" => Some(Self::Object),
            "record" => Some(Self::Record),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Enum => "enum",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Object => "object",
            Self::Record => "record",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A declared value with optional documentation, used for examples and test cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

pub type Example = TestCase;

/// Fields shared by every kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeHeader {
    pub system: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Deprecation notice; absent when the type is current
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Example>>,
}

// =============================================================================
// Kinds
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumItemDef {
    pub value: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Per-item metadata, checked against the enum's `dataType`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumTypeDef {
    #[serde(flatten)]
    pub header: TypeHeader,
    pub items: Vec<EnumItemDef>,
    /// Record type describing each item's `data`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoolTypeDef {
    #[serde(flatten)]
    pub header: TypeHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_test_cases: Option<Vec<TestCase>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_test_cases: Option<Vec<TestCase>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntTypeDef {
    #[serde(flatten)]
    pub header: TypeHeader,
    pub minimum: i64,
    pub maximum: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_test_cases: Option<Vec<TestCase>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_test_cases: Option<Vec<TestCase>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatTypeDef {
    #[serde(flatten)]
    pub header: TypeHeader,
    pub minimum: f64,
    pub maximum: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_minimum_exclusive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_maximum_exclusive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_test_cases: Option<Vec<TestCase>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_test_cases: Option<Vec<TestCase>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringTypeDef {
    #[serde(flatten)]
    pub header: TypeHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_length: Option<u64>,
    pub maximum_length: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_test_cases: Option<Vec<TestCase>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_test_cases: Option<Vec<TestCase>>,
}

/// A type described directly by a JSON Schema fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTypeDef {
    #[serde(flatten)]
    pub header: TypeHeader,
    pub json_schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_test_cases: Option<Vec<TestCase>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_test_cases: Option<Vec<TestCase>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// `name` within the owning system, or `system/name`
    pub property_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_array: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
}

impl PropertyDef {
    pub fn is_array(&self) -> bool {
        self.is_array.unwrap_or(false)
    }

    pub fn is_required(&self) -> bool {
        self.is_required.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordVariantDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_properties: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_properties: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTypeDef {
    #[serde(flatten)]
    pub header: TypeHeader,
    pub properties: Vec<PropertyDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<RecordVariantDef>>,
    pub valid_test_cases: Vec<TestCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_test_cases: Option<Vec<TestCase>>,
}

impl RecordTypeDef {
    /// Union of `required` and the properties flagged `isRequired`, in property order
    pub fn required_properties(&self) -> Vec<String> {
        let listed = self.required.as_deref().unwrap_or_default();
        self.properties
            .iter()
            .filter(|p| p.is_required() || listed.contains(&p.name))
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn variants(&self) -> &[RecordVariantDef] {
        self.variants.as_deref().unwrap_or_default()
    }

    /// Properties selected by a variant, in declaration order
    pub fn variant_properties(&self, variant: &RecordVariantDef) -> Vec<&PropertyDef> {
        self.properties
            .iter()
            .filter(|p| match (&variant.include_properties, &variant.exclude_properties) {
                (Some(include), _) => include.contains(&p.name),
                (None, Some(exclude)) => !exclude.contains(&p.name),
                (None, None) => true,
            })
            .collect()
    }

    /// Required set of a variant: its own list, or the record's narrowed to its properties
    pub fn variant_required(&self, variant: &RecordVariantDef) -> Vec<String> {
        let props = self.variant_properties(variant);
        match &variant.required {
            Some(required) => props
                .iter()
                .filter(|p| required.contains(&p.name))
                .map(|p| p.name.clone())
                .collect(),
            None => {
                let record_required = self.required_properties();
                props
                    .iter()
                    .filter(|p| record_required.contains(&p.name))
                    .map(|p| p.name.clone())
                    .collect()
            }
        }
    }

    /// Name of the derived type for a variant, e.g. `person` + `short` = `personShort`
    pub fn variant_type_name(&self, variant: &RecordVariantDef) -> String {
        format!("{}{}", self.header.name, names::to_pascal_case(&variant.name))
    }
}

// =============================================================================
// TypeDef
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDef {
    Bool(BoolTypeDef),
    Enum(EnumTypeDef),
    Int(IntTypeDef),
    Float(FloatTypeDef),
    String(StringTypeDef),
    Object(ObjectTypeDef),
    Record(RecordTypeDef),
}

impl TypeDef {
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Bool(_) => TypeKind::Bool,
            Self::Enum(_) => TypeKind::Enum,
            Self::Int(_) => TypeKind::Int,
            Self::Float(_) => TypeKind::Float,
            Self::String(_) => TypeKind::String,
            Self::Object(_) => TypeKind::Object,
            Self::Record(_) => TypeKind::Record,
        }
    }

    pub fn header(&self) -> &TypeHeader {
        match self {
            Self::Bool(d) => &d.header,
            Self::Enum(d) => &d.header,
            Self::Int(d) => &d.header,
            Self::Float(d) => &d.header,
            Self::String(d) => &d.header,
            Self::Object(d) => &d.header,
            Self::Record(d) => &d.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut TypeHeader {
        match self {
            Self::Bool(d) => &mut d.header,
            Self::Enum(d) => &mut d.header,
            Self::Int(d) => &mut d.header,
            Self::Float(d) => &mut d.header,
            Self::String(d) => &mut d.header,
            Self::Object(d) => &mut d.header,
            Self::Record(d) => &mut d.header,
        }
    }

    pub fn system(&self) -> &str {
        &self.header().system
    }

    pub fn name(&self) -> &str {
        &self.header().name
    }

    /// `system/name`
    pub fn fqn(&self) -> String {
        names::fqn(self.system(), self.name())
    }

    pub fn examples(&self) -> &[Example] {
        self.header().examples.as_deref().unwrap_or_default()
    }

    pub fn valid_test_cases(&self) -> &[TestCase] {
        match self {
            Self::Bool(d) => d.valid_test_cases.as_deref().unwrap_or_default(),
            Self::Int(d) => d.valid_test_cases.as_deref().unwrap_or_default(),
            Self::Float(d) => d.valid_test_cases.as_deref().unwrap_or_default(),
            Self::String(d) => d.valid_test_cases.as_deref().unwrap_or_default(),
            Self::Object(d) => d.valid_test_cases.as_deref().unwrap_or_default(),
            Self::Record(d) => &d.valid_test_cases,
            Self::Enum(_) => &[],
        }
    }

    pub fn invalid_test_cases(&self) -> &[TestCase] {
        match self {
            Self::Bool(d) => d.invalid_test_cases.as_deref().unwrap_or_default(),
            Self::Int(d) => d.invalid_test_cases.as_deref().unwrap_or_default(),
            Self::Float(d) => d.invalid_test_cases.as_deref().unwrap_or_default(),
            Self::String(d) => d.invalid_test_cases.as_deref().unwrap_or_default(),
            Self::Object(d) => d.invalid_test_cases.as_deref().unwrap_or_default(),
            Self::Record(d) => d.invalid_test_cases.as_deref().unwrap_or_default(),
            Self::Enum(_) => &[],
        }
    }

    pub fn as_enum(&self) -> Option<&EnumTypeDef> {
        match self {
            Self::Enum(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordTypeDef> {
        match self {
            Self::Record(d) => Some(d),
            _ => None,
        }
    }
}
