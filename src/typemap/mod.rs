//! Type Map
//!
//! Normalised graph of named references and object shapes built from emitted
//! schema documents. Code generators read it instead of walking schemas:
//! - `RefNode`: a name pointing at another name (scalar, enum or alias)
//! - `ObjectNode`: a named shape with properties; always terminal
//!
//! The map is built once per call ([`TypeMapBuilder`]) and queried lazily
//! ([`TypeMap::resolve_type_assignment`]) with a consumer-chosen policy.

pub mod build;
pub mod resolve;

pub use build::TypeMapBuilder;
pub use resolve::{Resolution, TypeAssignment};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::diagnostics::{Diagnostic, ErrorKind};
use crate::names;

// =============================================================================
// Nodes
// =============================================================================

/// One item of an enum root, as seen by generators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumItemRef {
    pub value: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A name that points at another name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefNode {
    pub system: String,
    pub name: String,
    /// Primitive name for scalar and enum refs, fqn otherwise
    pub ref_type_name: String,
    pub ref_type_array_count: usize,
    pub is_scalar_ref: bool,
    pub is_enum_ref: bool,
    pub is_root_type: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_items: Option<Vec<EnumItemRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_item_data_type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
}

impl RefNode {
    pub fn fqn(&self) -> String {
        names::fqn(&self.system, &self.name)
    }

    /// Neither scalar nor enum: the node only renames another type
    pub fn is_alias(&self) -> bool {
        !self.is_scalar_ref && !self.is_enum_ref
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectProperty {
    pub property_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// fqn of the node describing the property's value
    pub ref_type_name: String,
    pub is_required: bool,
}

/// A named shape with its own properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectNode {
    pub system: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    pub object_type_array_count: usize,
    pub is_root_type: bool,
    pub properties: Vec<ObjectProperty>,
}

impl ObjectNode {
    pub fn fqn(&self) -> String {
        names::fqn(&self.system, &self.name)
    }

    pub fn property(&self, name: &str) -> Option<&ObjectProperty> {
        self.properties.iter().find(|p| p.property_name == name)
    }
}

/// Either kind of node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeMapNode<'a> {
    Ref(&'a RefNode),
    Object(&'a ObjectNode),
}

// =============================================================================
// Type Map
// =============================================================================

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeMapError {
    #[error("Cyclic type reference: {}", .chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },
}

/// Object and reference nodes of one build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMap {
    pub object_types: Vec<ObjectNode>,
    pub ref_types: Vec<RefNode>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.object_types.len() + self.ref_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ref_node(&self, fqn: &str) -> Option<&RefNode> {
        self.ref_types.iter().find(|n| n.fqn() == fqn)
    }

    pub fn object_node(&self, fqn: &str) -> Option<&ObjectNode> {
        self.object_types.iter().find(|n| n.fqn() == fqn)
    }

    /// Node named `fqn`; ref nodes take precedence
    pub fn node(&self, fqn: &str) -> Option<TypeMapNode<'_>> {
        self.ref_node(fqn)
            .map(TypeMapNode::Ref)
            .or_else(|| self.object_node(fqn).map(TypeMapNode::Object))
    }

    /// Every fqn in the map, ref nodes first
    pub fn fqns(&self) -> Vec<String> {
        self.ref_types
            .iter()
            .map(RefNode::fqn)
            .chain(self.object_types.iter().map(ObjectNode::fqn))
            .collect()
    }

    /// Resolve every node and report each reference cycle once
    pub fn cycle_diagnostics(&self) -> Vec<Diagnostic> {
        let mut reported: Vec<Vec<String>> = Vec::new();
        let mut diagnostics = Vec::new();

        for fqn in self.fqns() {
            if let Err(err) = self.resolve_type_assignment(&fqn, 0, true) {
                let TypeMapError::CyclicReference { chain } = &err;
                // Lead-in nodes are not part of the cycle
                let start = chain
                    .last()
                    .and_then(|repeated| chain.iter().position(|f| f == repeated))
                    .unwrap_or(0);
                let mut members = chain[start..].to_vec();
                members.sort();
                members.dedup();
                if reported.contains(&members) {
                    continue;
                }
                reported.push(members);
                diagnostics.push(
                    Diagnostic::new(&fqn, ErrorKind::CyclicReference, err.to_string())
                        .with_details(json!({ "chain": chain })),
                );
            }
        }

        diagnostics
    }
}
