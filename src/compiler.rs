//! Type Compiler
//!
//! Runs a batch of raw definitions through the pipeline:
//!
//! ```text
//! store -> shape checks -> typed model -> defaults -> schema documents
//!       -> validators -> example / test case verification
//! ```
//!
//! Every definition is attempted. A failing step records diagnostics and
//! skips the later steps for that definition only. Schema documents of the
//! whole batch are registered before any validator is compiled, so
//! references may point forwards.

use rayon::prelude::*;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::checksum::Checksum;
use crate::config::CompilerConfig;
use crate::diagnostics::{CompilationResult, Diagnostic, ErrorKind, Rule};
use crate::emit::{EmittedSchemas, JsonSchemaEmitter, KnownTypes, SchemaDocument};
use crate::engine::{CustomFormat, TypeValidator, ValidationOutcome, ValidatorEngine};
use crate::error::{JsonotronError, Result};
use crate::meta::{self, MetaSchemaValidator};
use crate::names;
use crate::patch::DefaultsPatcher;
use crate::store::TypeDefinitionStore;
use crate::typedef::TypeDef;
use crate::typemap::{TypeMap, TypeMapBuilder};
use crate::verify::ExampleVerifier;

/// Compiles batches of type definitions
#[derive(Debug, Clone, Default)]
pub struct TypeCompiler {
    config: CompilerConfig,
    formats: Vec<CustomFormat>,
}

impl TypeCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            formats: Vec::new(),
        }
    }

    /// Register a custom `format` predicate
    pub fn with_format<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats.push(CustomFormat::new(name, predicate));
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile every definition of the store
    pub fn compile(&self, store: &TypeDefinitionStore) -> CompiledTypes {
        let mut result = CompilationResult::new();

        let defs = self.check_definitions(store, &mut result);
        let emitted = self.emit_schemas(&defs, &mut result);

        let mut engine = ValidatorEngine::new(self.formats.clone(), self.config.engine.validate_formats);
        for doc in emitted.values().flat_map(EmittedSchemas::iter) {
            engine.add_schema(doc);
        }
        let engine = engine.freeze();

        let documents: Vec<&SchemaDocument> = emitted.values().flat_map(EmittedSchemas::iter).collect();
        let compiled = self.map_items(&documents, |doc| {
            debug!(type_name = %doc.fqn, "Compiling validator");
            (doc.fqn.clone(), engine.compile(&doc.fqn))
        });

        let mut validators = HashMap::new();
        for (fqn, outcome) in compiled {
            match outcome {
                Ok(validator) => {
                    validators.insert(fqn, validator);
                }
                Err(err) => {
                    warn!(type_name = %fqn, error = %err, "Schema compilation failed, skipping verification");
                    let reason = match err {
                        JsonotronError::ValidatorBuild { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    result.push(
                        Diagnostic::new(
                            &fqn,
                            ErrorKind::SchemaCompilation,
                            format!("Schema could not be compiled: {}", reason),
                        )
                        .with_details(json!({ "reason": reason })),
                    );
                }
            }
        }

        let verifiable: Vec<&TypeDef> = defs
            .iter()
            .filter(|d| validators.contains_key(&d.fqn()))
            .collect();
        let verifier = ExampleVerifier::new();
        let verified = self.map_items(&verifiable, |def| {
            debug!(type_name = %def.fqn(), "Verifying examples and test cases");
            let mut diagnostics = match validators.get(&def.fqn()) {
                Some(validator) => verifier.verify(def, validator),
                None => Vec::new(),
            };
            if let Some(data_type) = def.as_enum().and_then(|e| e.data_type.as_deref()) {
                let target = names::resolve_reference(def.system(), data_type, None);
                if let Some(data_validator) = validators.get(&target) {
                    diagnostics.extend(verifier.verify_enum_data(def, data_validator));
                }
            }
            diagnostics
        });
        result.extend(verified.into_iter().flatten());

        let mut compiled = CompiledTypes {
            domain: self.config.domain.clone(),
            defs,
            emitted,
            validators,
            result,
        };

        let cycles = compiled.type_map().cycle_diagnostics();
        compiled.result.extend(cycles);

        info!(
            types = compiled.defs.len(),
            errors = compiled.result.errors().len(),
            warnings = compiled.result.warnings().len(),
            "Compilation finished"
        );
        compiled
    }

    /// Shape checks, documentation pass, typed conversion, uniqueness and defaults
    fn check_definitions(&self, store: &TypeDefinitionStore, result: &mut CompilationResult) -> Vec<TypeDef> {
        let validator = MetaSchemaValidator::new();
        let patcher = DefaultsPatcher::new();
        let mut seen = HashSet::new();
        let mut defs = Vec::new();

        for (index, raw) in store.iter().enumerate() {
            let label = raw.label(index);
            debug!(type_name = %label, "Checking definition");

            let functional = validator.validate(&raw.value);
            if self.config.documentation.enabled {
                let documented = validator.validate_with_documentation(&raw.value);
                result.extend(
                    meta::documentation_warnings(&functional, documented)
                        .into_iter()
                        .map(|v| v.into_diagnostic(&label)),
                );
            }
            if !functional.is_empty() {
                warn!(type_name = %label, errors = functional.len(), "Definition is malformed, skipping");
                result.extend(functional.into_iter().map(|v| v.into_diagnostic(&label)));
                continue;
            }

            let def = match meta::to_typed(&raw.value) {
                Ok(def) => def,
                Err(violation) => {
                    warn!(type_name = %label, "Definition does not match its kind, skipping");
                    result.push(violation.into_diagnostic(&label));
                    continue;
                }
            };

            let fqn = def.fqn();
            if !seen.insert(fqn.clone()) {
                warn!(type_name = %fqn, "Duplicate type name, skipping");
                result.push(
                    Diagnostic::from_rule(
                        &fqn,
                        Rule::DuplicateTypeName,
                        format!("Type '{}' is declared more than once", fqn),
                    )
                    .with_details(json!({ "index": index, "source": raw.source })),
                );
                continue;
            }

            defs.push(patcher.patch(&def));
        }

        defs
    }

    fn emit_schemas(&self, defs: &[TypeDef], result: &mut CompilationResult) -> BTreeMap<String, EmittedSchemas> {
        let emitter = JsonSchemaEmitter::new(&self.config.domain);
        let known = KnownTypes::from_defs(defs);
        let mut emitted = BTreeMap::new();

        for def in defs {
            let fqn = def.fqn();
            match emitter.emit(def, &known) {
                Ok(schemas) => {
                    debug!(type_name = %fqn, documents = 1 + schemas.variants.len(), "Emitted schema");
                    emitted.insert(fqn, schemas);
                }
                Err(violations) => {
                    warn!(type_name = %fqn, "Unresolved references, skipping");
                    result.extend(violations.into_iter().map(|v| v.into_diagnostic(&fqn)));
                }
            }
        }

        emitted
    }

    fn map_items<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.config.engine.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}

// =============================================================================
// Compiled Types
// =============================================================================

/// Outcome of compiling a batch: diagnostics plus everything that compiled
pub struct CompiledTypes {
    domain: String,
    defs: Vec<TypeDef>,
    emitted: BTreeMap<String, EmittedSchemas>,
    validators: HashMap<String, TypeValidator>,
    result: CompilationResult,
}

impl CompiledTypes {
    pub fn result(&self) -> &CompilationResult {
        &self.result
    }

    pub fn is_successful(&self) -> bool {
        self.result.is_successful()
    }

    pub fn is_successful_with_no_warnings(&self) -> bool {
        self.result.is_successful_with_no_warnings()
    }

    /// Fail with every collected error when anything failed
    pub fn into_checked(self) -> Result<Self> {
        self.result.check()?;
        Ok(self)
    }

    fn validator(&self, system: &str, name: &str) -> Result<&TypeValidator> {
        self.validators
            .get(&names::fqn(system, name))
            .ok_or_else(|| JsonotronError::UnknownType {
                system: system.to_string(),
                name: name.to_string(),
            })
    }

    /// Validate a value against a compiled type or variant
    pub fn validate(&self, system: &str, name: &str, value: &Value) -> Result<ValidationOutcome> {
        Ok(self.validator(system, name)?.validate(value))
    }

    /// Validate an array of values against a compiled type or variant
    pub fn validate_array(&self, system: &str, name: &str, value: &Value) -> Result<ValidationOutcome> {
        Ok(self.validator(system, name)?.validate_array(value))
    }

    pub fn has_validator(&self, system: &str, name: &str) -> bool {
        self.validators.contains_key(&names::fqn(system, name))
    }

    /// Copies of the normalised definitions that passed the shape checks
    pub fn type_defs(&self) -> Vec<TypeDef> {
        self.defs.clone()
    }

    pub fn type_def(&self, system: &str, name: &str) -> Option<TypeDef> {
        let fqn = names::fqn(system, name);
        self.defs.iter().find(|d| d.fqn() == fqn).cloned()
    }

    fn document(&self, system: &str, name: &str) -> Option<&SchemaDocument> {
        let fqn = names::fqn(system, name);
        self.emitted
            .values()
            .flat_map(EmittedSchemas::iter)
            .find(|doc| doc.fqn == fqn)
    }

    /// Copy of the emitted schema document of a type or variant
    pub fn json_schema(&self, system: &str, name: &str) -> Option<Value> {
        self.document(system, name).map(|doc| doc.schema.clone())
    }

    pub fn schema_checksum(&self, system: &str, name: &str) -> Option<Checksum> {
        self.document(system, name)
            .map(|doc| Checksum::from_json(&doc.schema))
    }

    /// Build a fresh type map over every emitted definition
    pub fn type_map(&self) -> TypeMap {
        let mut builder = TypeMapBuilder::new(&self.domain)
            .with_enums(self.defs.iter().filter_map(TypeDef::as_enum));
        for def in &self.defs {
            if let Some(emitted) = self.emitted.get(&def.fqn()) {
                builder.add_definition(def, emitted);
            }
        }
        builder.build()
    }
}

impl std::fmt::Debug for CompiledTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledTypes")
            .field("domain", &self.domain)
            .field("types", &self.defs.len())
            .field("validators", &self.validators.len())
            .field("errors", &self.result.errors().len())
            .field("warnings", &self.result.warnings().len())
            .finish()
    }
}
