//! Type resolution query
//!
//! Follows reference nodes until a terminal is reached, summing array
//! wrapping along the way. What counts as terminal:
//! - a bare name without a path separator (a primitive)
//! - a root scalar ref, or a root enum ref when the caller accepts enum roots
//! - any object node
//!
//! Aliases and non-root refs are always unwrapped.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{TypeMap, TypeMapError, TypeMapNode};
use crate::names::PATH_SEPARATOR;

/// What a resolved name denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resolution {
    /// JSON primitive such as `string` or `integer`
    Primitive,
    /// Declared scalar type
    Scalar,
    /// Declared enum type
    Enum,
    Object,
    /// No node matched; generators substitute an opaque type
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAssignment {
    pub type_name: String,
    pub array_depth: usize,
    pub resolution: Resolution,
}

impl TypeAssignment {
    fn new(type_name: impl Into<String>, array_depth: usize, resolution: Resolution) -> Self {
        Self {
            type_name: type_name.into(),
            array_depth,
            resolution,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.resolution == Resolution::Unknown
    }

    pub fn is_array(&self) -> bool {
        self.array_depth > 0
    }
}

impl TypeMap {
    /// Resolve `fqn` to the type a generator should use.
    ///
    /// `array_depth` is the wrapping already accumulated by the caller.
    pub fn resolve_type_assignment(
        &self,
        fqn: &str,
        array_depth: usize,
        accept_enum_root: bool,
    ) -> Result<TypeAssignment, TypeMapError> {
        let mut visited = HashSet::new();
        let mut chain = Vec::new();
        self.resolve_inner(fqn, array_depth, accept_enum_root, &mut visited, &mut chain)
    }

    fn resolve_inner(
        &self,
        fqn: &str,
        array_depth: usize,
        accept_enum_root: bool,
        visited: &mut HashSet<String>,
        chain: &mut Vec<String>,
    ) -> Result<TypeAssignment, TypeMapError> {
        if !fqn.contains(PATH_SEPARATOR) {
            return Ok(TypeAssignment::new(fqn, array_depth, Resolution::Primitive));
        }

        chain.push(fqn.to_string());
        if !visited.insert(fqn.to_string()) {
            return Err(TypeMapError::CyclicReference {
                chain: chain.clone(),
            });
        }

        match self.node(fqn) {
            Some(TypeMapNode::Ref(node)) => {
                let depth = array_depth + node.ref_type_array_count;
                if node.is_root_type && node.is_scalar_ref {
                    Ok(TypeAssignment::new(fqn, depth, Resolution::Scalar))
                } else if node.is_root_type && node.is_enum_ref && accept_enum_root {
                    Ok(TypeAssignment::new(fqn, depth, Resolution::Enum))
                } else {
                    self.resolve_inner(&node.ref_type_name, depth, accept_enum_root, visited, chain)
                }
            }
            Some(TypeMapNode::Object(node)) => Ok(TypeAssignment::new(
                fqn,
                array_depth + node.object_type_array_count,
                Resolution::Object,
            )),
            None => Ok(TypeAssignment::new(fqn, array_depth, Resolution::Unknown)),
        }
    }
}
