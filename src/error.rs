//! Error taxonomy for declaring, decoding and encoding unions.
use serde_json::Value;
use thiserror::Error;

// ————————————————————————————————————————————————————————————————————————————
// DECODE
// ————————————————————————————————————————————————————————————————————————————

/// A document (or scalar) that could not be turned into a union value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The wire value's JSON type fits no type the union accepts here.
    #[error("type mismatch for `{union}`: expected {expected}, found {found}")]
    TypeMismatch {
        union: String,
        expected: String,
        found: &'static str,
    },

    /// Correctly typed scalar that is not one of the declared literals.
    #[error("unknown literal {value} for `{union}`")]
    UnknownLiteral { union: String, value: Value },

    /// The discriminator picked `variant` but the body did not decode as it.
    /// Terminal: no other variant is tried.
    #[error(
        "`{union}`: discriminator `{field}` selected variant `{variant}` but the body is invalid: {source}"
    )]
    DiscriminatorMatchedButBodyInvalid {
        union: String,
        variant: String,
        field: String,
        source: BodyError,
    },

    /// Every variant was tried in declared order and none accepted the document.
    #[error("no variant of `{union}` matched the document{}", format_attempts(.attempts))]
    NoMatchingVariant {
        union: String,
        attempts: Vec<VariantFailure>,
    },
}

impl DecodeError {
    /// Stable snake_case name of the error class (used in reports and fixtures).
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::TypeMismatch { .. } => "type_mismatch",
            DecodeError::UnknownLiteral { .. } => "unknown_literal",
            DecodeError::DiscriminatorMatchedButBodyInvalid { .. } => {
                "discriminator_matched_but_body_invalid"
            }
            DecodeError::NoMatchingVariant { .. } => "no_matching_variant",
        }
    }
}

/// Why one variant rejected a document during the ordered fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantFailure {
    pub variant: String,
    pub error: BodyError,
}

fn format_attempts(attempts: &[VariantFailure]) -> String {
    let mut s = String::new();
    for a in attempts {
        s.push_str(&format!("\n  - {}: {}", a.variant, a.error));
    }
    s
}

/// A shape decoder's failure, located by JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at JSON path {path} → {message}")]
pub struct BodyError {
    pub path: String,
    pub message: String,
}

impl BodyError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARE
// ————————————————————————————————————————————————————————————————————————————

/// A union or shape that was declared incorrectly. Raised while building a
/// spec, never while decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclarationError {
    #[error("union `{union}` declares no cases")]
    EmptyUnion { union: String },

    #[error("literal union `{union}` declares {literal} more than once")]
    DuplicateLiteral { union: String, literal: String },

    #[error("type union `{union}` declares variant `{variant}` more than once")]
    DuplicateVariant { union: String, variant: String },

    #[error("shape `{shape}` declares field `{field}` more than once")]
    DuplicateField { shape: String, field: String },

    #[error("shape `{shape}` cannot use `{field}` as its discriminator: {problem}")]
    InvalidDiscriminatorBinding {
        shape: String,
        field: String,
        problem: BindingProblem,
    },

    #[error("`{from}` refers to undeclared {kind} `{name}`")]
    UnknownReference {
        from: String,
        kind: &'static str,
        name: String,
    },

    #[error("malformed declarations: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BindingProblem {
    #[error("the shape has no such field")]
    MissingField,
    #[error("the field is not declared as a literal union")]
    NotLiteralUnion,
    #[error("the shape is already registered with a different discriminator")]
    Conflicting,
    #[error("the shape's own decoder rejects one of the field's literals")]
    TagRejected,
}

// ————————————————————————————————————————————————————————————————————————————
// ENCODE
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("{literal} is not a case of `{union}`")]
    UnknownLiteral { union: String, literal: String },

    /// A variant encoder was handed a value tagged with another variant.
    #[error("`{union}`: value is not a `{variant}`")]
    VariantMismatch { union: String, variant: String },

    #[error("failed to serialize `{shape}`: {message}")]
    Serialize { shape: String, message: String },
}
