//! Type mismatch handling
//!
//! A handler receives the owning record type name, the attribute, the
//! expected descriptor and the offending (coerced) value. Its return value
//! is bound as the attribute's output. Returning an error aborts the whole
//! resolution.

use serde_json::Value;
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::errors::{SerializeError, SerializeResult};

/// Details of a failed post-coercion validation
#[derive(Debug, Clone, Copy)]
pub struct Mismatch<'a> {
    /// Record type being serialized
    pub owner: &'a str,
    /// Attribute that failed
    pub attribute: &'a str,
    /// Expected descriptor
    pub descriptor: &'a TypeDescriptor,
    /// Value that failed the match test
    pub value: &'a Value,
}

impl Mismatch<'_> {
    /// Builds the error reported by the abort policy
    pub fn to_error(&self) -> SerializeError {
        SerializeError::TypeMismatch {
            owner: self.owner.to_string(),
            attribute: self.attribute.to_string(),
            expected: self.descriptor.to_string(),
            actual: self.value.to_string(),
        }
    }
}

/// Pluggable mismatch policy
pub type MismatchHandler = Arc<dyn Fn(&Mismatch<'_>) -> SerializeResult<Value> + Send + Sync>;

/// Default policy: abort with a type mismatch.
pub fn abort(mismatch: &Mismatch<'_>) -> SerializeResult<Value> {
    Err(mismatch.to_error())
}

/// Policy substituting a fixed fallback value.
pub fn substitute(fallback: Value) -> MismatchHandler {
    Arc::new(move |_| Ok(fallback.clone()))
}
