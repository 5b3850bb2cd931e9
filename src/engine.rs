//! Value Validator Engine
//!
//! Compiles emitted schema documents into validators. Documents are added
//! first (the only mutating phase); compiling afterwards borrows the engine
//! immutably, so compiled validators can be built and used from many threads.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::emit::SchemaDocument;
use crate::error::{JsonotronError, Result};

type FormatPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A named `format` predicate available to every compiled schema
#[derive(Clone)]
pub struct CustomFormat {
    pub name: String,
    predicate: FormatPredicate,
}

impl CustomFormat {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for CustomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFormat").field("name", &self.name).finish()
    }
}

/// One constraint violation reported by a validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueError {
    /// JSON pointer into the validated value
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Result of validating one value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<ValueError>,
}

impl ValidationOutcome {
    /// Errors joined into one line
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Resolves `$ref` URIs against the documents added to the engine
struct InMemoryRetriever {
    documents: Arc<HashMap<String, Value>>,
}

impl jsonschema::Retrieve for InMemoryRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<&str>,
    ) -> std::result::Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri = uri.as_str();
        self.documents
            .get(uri)
            .or_else(|| self.documents.get(uri.trim_end_matches('#')))
            .cloned()
            .ok_or_else(|| format!("schema not found for URI: {uri}").into())
    }
}

/// Validators for one type: the value itself and an array of values
pub struct TypeValidator {
    fqn: String,
    single: jsonschema::Validator,
    array: jsonschema::Validator,
}

impl TypeValidator {
    pub fn fqn(&self) -> &str {
        &self.fqn
    }

    pub fn validate(&self, value: &Value) -> ValidationOutcome {
        outcome(&self.single, value)
    }

    pub fn validate_array(&self, value: &Value) -> ValidationOutcome {
        outcome(&self.array, value)
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.single.is_valid(value)
    }
}

impl fmt::Debug for TypeValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeValidator").field("fqn", &self.fqn).finish()
    }
}

fn outcome(validator: &jsonschema::Validator, value: &Value) -> ValidationOutcome {
    let errors: Vec<ValueError> = validator
        .iter_errors(value)
        .map(|err| ValueError {
            path: err.instance_path.to_string(),
            message: err.to_string(),
        })
        .collect();

    ValidationOutcome {
        valid: errors.is_empty(),
        errors,
    }
}

/// Holds every emitted document of a batch and compiles validators over them
#[derive(Default)]
pub struct ValidatorEngine {
    documents: HashMap<String, Value>,
    uris: HashMap<String, String>,
    formats: Vec<CustomFormat>,
    validate_formats: bool,
}

impl ValidatorEngine {
    pub fn new(formats: Vec<CustomFormat>, validate_formats: bool) -> Self {
        Self {
            formats,
            validate_formats,
            ..Self::default()
        }
    }

    /// Register a document; later references to its `$id` resolve to it
    pub fn add_schema(&mut self, document: &SchemaDocument) {
        self.uris.insert(document.fqn.clone(), document.uri.clone());
        self.documents
            .insert(document.uri.clone(), document.schema.clone());
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.uris.contains_key(fqn)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Snapshot of the registered documents for compilation
    pub fn freeze(self) -> FrozenEngine {
        FrozenEngine {
            documents: Arc::new(self.documents),
            uris: self.uris,
            formats: self.formats,
            validate_formats: self.validate_formats,
        }
    }
}

/// Read-only engine: documents can no longer be added
pub struct FrozenEngine {
    documents: Arc<HashMap<String, Value>>,
    uris: HashMap<String, String>,
    formats: Vec<CustomFormat>,
    validate_formats: bool,
}

impl FrozenEngine {
    pub fn document(&self, fqn: &str) -> Option<&Value> {
        self.uris.get(fqn).and_then(|uri| self.documents.get(uri))
    }

    /// Compile the validators for a registered type
    pub fn compile(&self, fqn: &str) -> Result<TypeValidator> {
        let uri = self
            .uris
            .get(fqn)
            .ok_or_else(|| JsonotronError::ValidatorBuild {
                fqn: fqn.to_string(),
                reason: "no schema document registered".to_string(),
            })?;
        let schema = self
            .documents
            .get(uri)
            .ok_or_else(|| JsonotronError::ValidatorBuild {
                fqn: fqn.to_string(),
                reason: format!("no schema document registered at '{}'", uri),
            })?;

        let single = self.build(fqn, schema)?;
        let array = self.build(
            fqn,
            &json!({
                "$schema": crate::emit::JSON_SCHEMA_DRAFT,
                "type": "array",
                "items": { "$ref": uri }
            }),
        )?;

        Ok(TypeValidator {
            fqn: fqn.to_string(),
            single,
            array,
        })
    }

    fn build(&self, fqn: &str, schema: &Value) -> Result<jsonschema::Validator> {
        let mut options = jsonschema::options();
        options
            .with_draft(jsonschema::Draft::Draft7)
            .with_retriever(InMemoryRetriever {
                documents: Arc::clone(&self.documents),
            })
            .should_validate_formats(self.validate_formats);

        for format in &self.formats {
            let predicate = Arc::clone(&format.predicate);
            options.with_format(format.name.clone(), move |value: &str| predicate(value));
        }

        options
            .build(schema)
            .map_err(|e| JsonotronError::ValidatorBuild {
                fqn: fqn.to_string(),
                reason: e.to_string(),
            })
    }
}
