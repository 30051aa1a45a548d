//! Type descriptor definitions
//!
//! Supported kinds:
//! - integer, float, number, string, timestamp
//! - enum(values...), with boolean as enum(true, false)
//! - array(types...), object(field: type, ...)
//! - optional(types...), any(types...), all(types...)
//! - match(matcher)
//! - nested(RecordType)
//!
//! Coercion always runs before the match test. A custom coercion replaces
//! the default one entirely, except for `nested` where it pre-transforms the
//! raw value before the nested record is resolved.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::matcher::Matcher;
use crate::errors::SerializeResult;
use crate::schema::RecordType;
use crate::serializer::Single;

/// Single-argument coercion
pub type CoerceFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Coercion that also receives the allowed values of an enum
pub type AllowedCoerceFn = Arc<dyn Fn(Value, &[Value]) -> Value + Send + Sync>;

/// Coercion attached to a descriptor
#[derive(Clone, Default)]
pub enum Coercion {
    /// Default coercion for the kind
    #[default]
    Default,
    /// Caller-supplied transform
    Custom(CoerceFn),
    /// Caller-supplied transform receiving the allowed set
    WithAllowed(AllowedCoerceFn),
}

/// Descriptor kinds
#[derive(Clone)]
pub enum TypeKind {
    Integer,
    Float,
    Number,
    String,
    Timestamp,
    /// Membership in a fixed set
    Enum(Vec<Value>),
    /// Sequence whose elements each match one of the types
    Array(Vec<TypeDescriptor>),
    /// Mapping whose declared fields match their types
    Object(Vec<(String, TypeDescriptor)>),
    /// Nil or any of the types
    Optional(Vec<TypeDescriptor>),
    /// Any of the types, or anything when empty
    Any(Vec<TypeDescriptor>),
    /// Every one of the types
    All(Vec<TypeDescriptor>),
    /// Structural matcher
    Match(Matcher),
    /// Nested record type (always matches)
    Nested(Arc<RecordType>),
}

/// An immutable type rule: membership test, coercion and display form.
#[derive(Clone)]
pub struct TypeDescriptor {
    kind: TypeKind,
    coercion: Coercion,
}

impl TypeDescriptor {
    /// Creates a descriptor with the default coercion for its kind.
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            coercion: Coercion::Default,
        }
    }

    /// Attaches a custom coercion.
    pub fn coerce_with<F>(mut self, coerce: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.coercion = Coercion::Custom(Arc::new(coerce));
        self
    }

    /// Attaches a custom coercion that receives the allowed values.
    ///
    /// Non-enum kinds receive an empty slice.
    pub fn coerce_with_allowed<F>(mut self, coerce: F) -> Self
    where
        F: Fn(Value, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.coercion = Coercion::WithAllowed(Arc::new(coerce));
        self
    }

    /// Returns the descriptor kind
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Returns whether a custom coercion is attached
    pub fn has_custom_coercion(&self) -> bool {
        !matches!(self.coercion, Coercion::Default)
    }

    /// Returns the nested record type, if this is a nested descriptor
    pub fn record_type(&self) -> Option<&Arc<RecordType>> {
        match &self.kind {
            TypeKind::Nested(record_type) => Some(record_type),
            _ => None,
        }
    }

    /// Tests membership. Pure.
    pub fn matches(&self, value: &Value) -> bool {
        match &self.kind {
            TypeKind::Integer => value.is_i64() || value.is_u64(),
            TypeKind::Float => value.is_f64(),
            TypeKind::Number => value.is_number(),
            TypeKind::String => value.is_string(),
            TypeKind::Timestamp => value.as_str().is_some_and(is_timestamp),
            TypeKind::Enum(values) => values.contains(value),
            TypeKind::Array(types) => match value.as_array() {
                Some(items) => items
                    .iter()
                    .all(|item| types.iter().any(|t| t.matches(item))),
                None => false,
            },
            TypeKind::Object(fields) => match value.as_object() {
                Some(map) => fields.iter().all(|(key, field_type)| {
                    field_type.matches(map.get(key).unwrap_or(&Value::Null))
                }),
                None => false,
            },
            TypeKind::Optional(types) => value.is_null() || types.iter().any(|t| t.matches(value)),
            TypeKind::Any(types) => types.is_empty() || types.iter().any(|t| t.matches(value)),
            TypeKind::All(types) => types.iter().all(|t| t.matches(value)),
            TypeKind::Match(matcher) => matcher.is_match(value),
            TypeKind::Nested(_) => true,
        }
    }

    /// Coerces a raw value ahead of validation.
    ///
    /// Fails only when a nested record cannot be constructed from the
    /// (pre-transformed) value; callers route that failure into mismatch
    /// handling.
    pub fn coerce(&self, value: Value) -> SerializeResult<Value> {
        if matches!(self.kind, TypeKind::Optional(_)) && value.is_null() {
            return Ok(Value::Null);
        }

        let value = match &self.coercion {
            Coercion::Default => return self.default_coerce(value),
            Coercion::Custom(coerce) => coerce(value),
            Coercion::WithAllowed(coerce) => coerce(value, self.allowed_values()),
        };

        match &self.kind {
            TypeKind::Nested(record_type) => resolve_nested(record_type, value),
            _ => Ok(value),
        }
    }

    fn allowed_values(&self) -> &[Value] {
        match &self.kind {
            TypeKind::Enum(values) => values,
            _ => &[],
        }
    }

    fn default_coerce(&self, value: Value) -> SerializeResult<Value> {
        match &self.kind {
            TypeKind::Array(types) => match value {
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| coerce_first_matching(types, item))
                    .collect::<SerializeResult<Vec<_>>>()
                    .map(Value::Array),
                other => Ok(other),
            },
            TypeKind::Object(fields) => match value {
                Value::Object(mut map) => {
                    for (key, field_type) in fields {
                        match map.get_mut(key) {
                            Some(slot) => *slot = field_type.coerce(slot.take())?,
                            // absent reads as null; nested records still fail here
                            None => {
                                let coerced = field_type.coerce(Value::Null)?;
                                if !coerced.is_null() {
                                    map.insert(key.clone(), coerced);
                                }
                            }
                        }
                    }
                    Ok(Value::Object(map))
                }
                other => Ok(other),
            },
            TypeKind::Optional(types) | TypeKind::Any(types) => coerce_first_matching(types, value),
            TypeKind::All(types) => types
                .iter()
                .try_fold(value, |current, t| t.coerce(current)),
            TypeKind::Nested(record_type) => resolve_nested(record_type, value),
            _ => Ok(value),
        }
    }
}

/// Applies the coercion of the first type matching the raw value.
///
/// Values matching none of the types pass through unchanged.
fn coerce_first_matching(types: &[TypeDescriptor], value: Value) -> SerializeResult<Value> {
    match types.iter().find(|t| t.matches(&value)) {
        Some(t) => t.coerce(value),
        None => Ok(value),
    }
}

fn resolve_nested(record_type: &RecordType, value: Value) -> SerializeResult<Value> {
    let record = Single::new(record_type, &value)?.call()?;
    Ok(Value::Object(record))
}

/// Returns whether a string is a recognized date/time representation.
pub fn is_timestamp(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Coercion turning integer epoch seconds into an RFC 3339 string.
///
/// Anything else passes through unchanged.
pub fn epoch_to_rfc3339(value: Value) -> Value {
    match value.as_i64().and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)) {
        Some(timestamp) => Value::String(timestamp.to_rfc3339()),
        None => value,
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, name: &str, types: &[TypeDescriptor]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, t) in types.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", t)?;
    }
    write!(f, ")")
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Integer => write!(f, "integer"),
            TypeKind::Float => write!(f, "float"),
            TypeKind::Number => write!(f, "number"),
            TypeKind::String => write!(f, "string"),
            TypeKind::Timestamp => write!(f, "timestamp"),
            TypeKind::Enum(values) => {
                let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "enum({})", rendered.join(", "))
            }
            TypeKind::Array(types) => write_list(f, "array", types),
            TypeKind::Object(fields) => {
                let rendered: Vec<String> = fields
                    .iter()
                    .map(|(key, t)| format!("{}: {}", key, t))
                    .collect();
                write!(f, "object({})", rendered.join(", "))
            }
            TypeKind::Optional(types) => write_list(f, "optional", types),
            TypeKind::Any(types) => write_list(f, "any", types),
            TypeKind::All(types) => write_list(f, "all", types),
            TypeKind::Match(matcher) => write!(f, "match({})", matcher),
            TypeKind::Nested(record_type) => write!(f, "nested({})", record_type.name()),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self)
    }
}
