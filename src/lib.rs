//! Jsonotron
//!
//! Declare scalar, enum, object and record types once, as data, then validate
//! runtime values against them and hand a normalised type graph to code
//! generators.
//!
//! ## Features
//!
//! - **Definition Checks**: Every structural rule carries a stable rule code
//! - **JSON Schema Emission**: Draft-07 documents namespaced by domain and system
//! - **Compiled Validators**: One validator (and an array variant) per type
//! - **Verified Documentation**: Examples and test cases are checked at compile time
//! - **Type Map**: Object and reference nodes with a lazy resolution query
//!
//! ## Pipeline
//!
//! ```text
//! TypeDefinitionStore
//!   └── MetaSchemaValidator ── DefaultsPatcher ── JsonSchemaEmitter
//!         └── ValidatorEngine ── ExampleVerifier ──> CompilationResult
//!
//! CompiledTypes ──> TypeMapBuilder ──> TypeMap::resolve_type_assignment
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use jsonotron::{CompilerConfig, TypeCompiler, TypeDefinitionStore};
//! use serde_json::json;
//!
//! let mut store = TypeDefinitionStore::new();
//! store.add(json!({
//!     "kind": "int", "system": "test", "name": "positiveInteger",
//!     "summary": "A whole number greater than zero.",
//!     "minimum": 1, "maximum": 1000
//! }));
//!
//! let compiled = TypeCompiler::new(CompilerConfig::default()).compile(&store);
//! assert!(compiled.is_successful());
//! assert!(compiled.validate("test", "positiveInteger", &json!(5)).unwrap().valid);
//! ```

pub mod checksum;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod engine;
pub mod error;
pub mod meta;
pub mod names;
pub mod patch;
pub mod store;
pub mod typedef;
pub mod typemap;
pub mod verify;

pub use checksum::Checksum;
pub use compiler::{CompiledTypes, TypeCompiler};
pub use config::CompilerConfig;
pub use diagnostics::{CompilationResult, Diagnostic, ErrorKind, Rule, Severity};
pub use emit::{JsonSchemaEmitter, KnownTypes, SchemaDocument};
pub use engine::{CustomFormat, ValidationOutcome, ValueError};
pub use error::{JsonotronError, Result};
pub use meta::{MetaSchemaValidator, Violation};
pub use patch::DefaultsPatcher;
pub use store::{RawDefinition, TypeDefinitionStore};
pub use typedef::{
    EnumItemDef, EnumTypeDef, PropertyDef, RecordTypeDef, RecordVariantDef, TestCase, TypeDef,
    TypeHeader, TypeKind,
};
pub use typemap::{
    ObjectNode, ObjectProperty, RefNode, Resolution, TypeAssignment, TypeMap, TypeMapBuilder,
    TypeMapError,
};
pub use verify::ExampleVerifier;
