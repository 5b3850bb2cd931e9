//! Diagnostics
//!
//! Collects errors and warnings across a whole compilation batch. Every
//! definition check carries a stable [`Rule`] code assigned where the check is
//! written, so later passes can de-duplicate without inspecting messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::JsonotronError;

// =============================================================================
// Error Kinds
// =============================================================================

/// What went wrong, independent of which check found it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Definition does not have the shape required for its kind
    StructuralDefinition,
    /// Duplicate enum value, property name, variant name or (system, name)
    Uniqueness,
    /// Property type, required entry, variant entry or data type not found
    UnresolvedReference,
    /// Emitted schema could not be compiled by the validation engine
    SchemaCompilation,
    /// A declared example failed validation
    ExampleValidation,
    /// A valid test case failed validation
    TestCaseValidation,
    /// An invalid test case passed validation
    TestCaseInvalidation,
    /// Enum item data does not match the enum's data type
    EnumItemDataValidation,
    /// Type references loop without reaching a terminal type
    CyclicReference,
    /// Documentation is incomplete
    Documentation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuralDefinition => "StructuralDefinitionError",
            Self::Uniqueness => "UniquenessError",
            Self::UnresolvedReference => "UnresolvedReferenceError",
            Self::SchemaCompilation => "SchemaCompilationError",
            Self::ExampleValidation => "ExampleValidationError",
            Self::TestCaseValidation => "TestCaseValidationError",
            Self::TestCaseInvalidation => "TestCaseInvalidationError",
            Self::EnumItemDataValidation => "EnumItemDataValidationError",
            Self::CyclicReference => "CyclicReferenceError",
            Self::Documentation => "DocumentationWarning",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Documentation => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Stable identifier of a single definition check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    // === Structure ===
    NotAnObject,
    UnknownKind,
    InvalidSystem,
    InvalidName,
    InvalidSummary,
    InvalidDeprecated,
    InvalidStringList,
    UnknownField,
    InvalidExample,
    MissingField,
    InvalidBounds,
    InvalidRegex,
    EmptyItems,
    InvalidEnumItem,
    InvalidProperty,
    InvalidVariant,
    InvalidReference,
    Shape,

    // === Uniqueness ===
    DuplicateEnumValue,
    DuplicatePropertyName,
    DuplicateVariantName,
    DuplicateTypeName,

    // === References ===
    UnknownRequiredProperty,
    UnknownVariantProperty,
    UnknownPropertyType,
    UnknownDataType,

    // === Documentation ===
    MissingTypeSummary,
    MissingPropertySummary,
    MissingItemSummary,
    MissingVariantSummary,
    MissingExampleSummary,
}

impl Rule {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAnObject => "S001",
            Self::UnknownKind => "S002",
            Self::InvalidSystem => "S003",
            Self::InvalidName => "S004",
            Self::InvalidSummary => "S005",
            Self::InvalidDeprecated => "S006",
            Self::InvalidStringList => "S007",
            Self::UnknownField => "S008",
            Self::InvalidExample => "S009",
            Self::MissingField => "S010",
            Self::InvalidBounds => "S011",
            Self::InvalidRegex => "S012",
            Self::EmptyItems => "S013",
            Self::InvalidEnumItem => "S014",
            Self::InvalidProperty => "S015",
            Self::InvalidVariant => "S016",
            Self::InvalidReference => "S017",
            Self::Shape => "S099",
            Self::DuplicateEnumValue => "U001",
            Self::DuplicatePropertyName => "U002",
            Self::DuplicateVariantName => "U003",
            Self::DuplicateTypeName => "U004",
            Self::UnknownRequiredProperty => "R001",
            Self::UnknownVariantProperty => "R002",
            Self::UnknownPropertyType => "R003",
            Self::UnknownDataType => "R004",
            Self::MissingTypeSummary => "D001",
            Self::MissingPropertySummary => "D002",
            Self::MissingItemSummary => "D003",
            Self::MissingVariantSummary => "D004",
            Self::MissingExampleSummary => "D005",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateEnumValue
            | Self::DuplicatePropertyName
            | Self::DuplicateVariantName
            | Self::DuplicateTypeName => ErrorKind::Uniqueness,

            Self::UnknownRequiredProperty
            | Self::UnknownVariantProperty
            | Self::UnknownPropertyType
            | Self::UnknownDataType => ErrorKind::UnresolvedReference,

            Self::MissingTypeSummary
            | Self::MissingPropertySummary
            | Self::MissingItemSummary
            | Self::MissingVariantSummary
            | Self::MissingExampleSummary => ErrorKind::Documentation,

            _ => ErrorKind::StructuralDefinition,
        }
    }

    /// Only reported when documentation completeness is being checked
    pub fn is_documentation(&self) -> bool {
        self.kind() == ErrorKind::Documentation
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// =============================================================================
// Severity
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Diagnostic
// =============================================================================

/// A single structured error or warning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Fully qualified name of the type (or the best identification available)
    pub type_name: String,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
    pub message: String,
    /// Structured context: paths, indices, engine violations, suggestions
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

impl Diagnostic {
    pub fn new(type_name: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            kind,
            rule: None,
            message: message.into(),
            details: Value::Null,
        }
    }

    /// A diagnostic raised by a definition check
    pub fn from_rule(type_name: impl Into<String>, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            rule: Some(rule),
            ..Self::new(type_name, rule.kind(), message)
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            Some(rule) => write!(
                f,
                "[{}] {} {}: {} ({})",
                rule,
                self.kind.severity(),
                self.kind,
                self.message,
                self.type_name
            ),
            None => write!(
                f,
                "{} {}: {} ({})",
                self.kind.severity(),
                self.kind,
                self.message,
                self.type_name
            ),
        }
    }
}

// =============================================================================
// Compilation Result
// =============================================================================

/// Errors and warnings collected across a compilation batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilationResult {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl CompilationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic, routed by its severity
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn merge(&mut self, other: CompilationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// All errors recorded against one type
    pub fn errors_for<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.errors.iter().filter(move |e| e.type_name == type_name)
    }

    /// True when no errors were recorded; warnings are advisory
    pub fn is_successful(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_successful_with_no_warnings(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Convert into the aggregate error if any error was recorded
    pub fn check(&self) -> Result<(), JsonotronError> {
        if self.is_successful() {
            Ok(())
        } else {
            Err(JsonotronError::CompilationFailed {
                errors: self.errors.clone(),
            })
        }
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in self.errors.iter().chain(self.warnings.iter()) {
            output.push_str(&format!("{}\n", item));
        }

        if !self.errors.is_empty() || !self.warnings.is_empty() {
            output.push_str(&format!(
                "\n{} error(s), {} warning(s)\n",
                self.errors.len(),
                self.warnings.len()
            ));
        }

        output
    }
}

impl fmt::Display for CompilationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}
