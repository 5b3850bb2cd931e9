//! Type Definition Store
//!
//! Holds raw (already parsed, not yet checked) definitions for a batch,
//! grouped by the system that owns them.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::typedef::TypeDef;

/// A definition as handed over by a loader
#[derive(Debug, Clone, PartialEq)]
pub struct RawDefinition {
    /// Where the definition came from (file path, URL), for diagnostics
    pub source: Option<String>,
    pub value: Value,
}

impl RawDefinition {
    pub fn system(&self) -> Option<&str> {
        self.value.get("system").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.value.get("name").and_then(Value::as_str)
    }

    /// Best available identification: fqn, then source, then `fallback`
    pub fn label(&self, fallback: usize) -> String {
        match (self.system(), self.name()) {
            (Some(system), Some(name)) => crate::names::fqn(system, name),
            _ => self
                .source
                .clone()
                .unwrap_or_else(|| format!("#{}", fallback)),
        }
    }
}

/// Raw definitions of one compilation batch
#[derive(Debug, Clone, Default)]
pub struct TypeDefinitionStore {
    entries: Vec<RawDefinition>,
}

impl TypeDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parsed definition
    pub fn add(&mut self, value: Value) -> &mut Self {
        self.entries.push(RawDefinition { source: None, value });
        self
    }

    /// Add a parsed definition, remembering where it was loaded from
    pub fn add_with_source(&mut self, value: Value, source: impl Into<String>) -> &mut Self {
        self.entries.push(RawDefinition {
            source: Some(source.into()),
            value,
        });
        self
    }

    /// Add a typed definition
    pub fn add_typed(&mut self, def: &TypeDef) -> Result<&mut Self> {
        let value = serde_json::to_value(def).map_err(std::io::Error::from)?;
        Ok(self.add(value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Definitions in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &RawDefinition> {
        self.entries.iter()
    }

    /// Definitions grouped by owning system; definitions without a system are left out
    pub fn by_system(&self) -> BTreeMap<&str, Vec<&RawDefinition>> {
        let mut systems: BTreeMap<&str, Vec<&RawDefinition>> = BTreeMap::new();
        for entry in &self.entries {
            if let Some(system) = entry.system() {
                systems.entry(system).or_default().push(entry);
            }
        }
        systems
    }

    /// Names of all systems present in the batch
    pub fn systems(&self) -> Vec<&str> {
        self.by_system().into_keys().collect()
    }
}

impl FromIterator<Value> for TypeDefinitionStore {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut store = Self::new();
        for value in iter {
            store.add(value);
        }
        store
    }
}
