//! Error types for wireform
//!
//! Error codes:
//! - WIREFORM_CONFIGURATION (type definition rejected)
//! - WIREFORM_CONSTRUCTION (serializer could not bind its inputs)
//! - WIREFORM_NOT_ENUMERABLE (enumerable member bound to a non-sequence)
//! - WIREFORM_TYPE_MISMATCH (coerced value failed its descriptor)
//! - WIREFORM_ENCODING (codec failure)
//! - WIREFORM_CONFIG (configuration file rejected)

use thiserror::Error;

/// Result type for serialization operations
pub type SerializeResult<T> = Result<T, SerializeError>;

/// Serialization errors
#[derive(Debug, Clone, Error)]
pub enum SerializeError {
    /// An attribute was declared without a usable descriptor
    #[error("Invalid declaration {owner}#{attribute}: {reason}")]
    Configuration {
        owner: String,
        attribute: String,
        reason: String,
    },

    /// A serializer could not be bound to its inputs
    #[error("Cannot construct {owner}: {reason}")]
    Construction { owner: String, reason: String },

    /// An enumerable member received a value without ordered iteration
    #[error("{owner}#{attribute} must receive an enumerable value, got {actual}")]
    NotEnumerable {
        owner: String,
        attribute: String,
        actual: String,
    },

    /// A coerced value failed its descriptor's match test
    #[error("{owner}#{attribute} is specified as {expected}, but is {actual}")]
    TypeMismatch {
        owner: String,
        attribute: String,
        expected: String,
        actual: String,
    },

    /// A codec failed to encode a record
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// A configuration file was unreadable or invalid
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SerializeError {
    /// Declaration bound to an absent descriptor
    pub fn undefined_descriptor(owner: &str, attribute: &str) -> Self {
        SerializeError::Configuration {
            owner: owner.to_string(),
            attribute: attribute.to_string(),
            reason: "descriptor cannot be nil".into(),
        }
    }

    /// Single serializer bound to a nil object
    pub fn nil_object(owner: &str) -> Self {
        SerializeError::Construction {
            owner: owner.to_string(),
            reason: "cannot serialize a nil object".into(),
        }
    }

    /// Collection serializer missing required inputs
    ///
    /// Every missing name is listed, in declaration order.
    pub fn missing_attributes(owner: &str, missing: &[&str]) -> Self {
        SerializeError::Construction {
            owner: owner.to_string(),
            reason: format!("missing required attributes: {}", missing.join(", ")),
        }
    }

    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            SerializeError::Configuration { .. } => "WIREFORM_CONFIGURATION",
            SerializeError::Construction { .. } => "WIREFORM_CONSTRUCTION",
            SerializeError::NotEnumerable { .. } => "WIREFORM_NOT_ENUMERABLE",
            SerializeError::TypeMismatch { .. } => "WIREFORM_TYPE_MISMATCH",
            SerializeError::Encoding(_) => "WIREFORM_ENCODING",
            SerializeError::Config(_) => "WIREFORM_CONFIG",
        }
    }

    /// Returns the attribute name if the error is tied to one
    pub fn attribute(&self) -> Option<&str> {
        match self {
            SerializeError::Configuration { attribute, .. }
            | SerializeError::NotEnumerable { attribute, .. }
            | SerializeError::TypeMismatch { attribute, .. } => Some(attribute),
            _ => None,
        }
    }

    /// Whether this is a type mismatch
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, SerializeError::TypeMismatch { .. })
    }

    /// Whether this is a construction failure
    pub fn is_construction(&self) -> bool {
        matches!(self, SerializeError::Construction { .. })
    }
}

impl From<serde_json::Error> for SerializeError {
    fn from(err: serde_json::Error) -> Self {
        SerializeError::Encoding(err.to_string())
    }
}
