//! Type descriptors for wireform
//!
//! A descriptor bundles three things:
//! - a membership test (`matches`)
//! - a coercion applied before the test (`coerce`)
//! - a display form used in record signatures
//!
//! Descriptors are built once when a record type is defined and shared
//! read-only afterwards.

mod matcher;
mod types;

pub use matcher::{Matcher, PredicateFn};
pub use types::{
    epoch_to_rfc3339, is_timestamp, AllowedCoerceFn, CoerceFn, Coercion, TypeDescriptor, TypeKind,
};

use serde_json::Value;
use std::sync::Arc;

use crate::schema::RecordType;

/// Native integer
pub fn integer() -> TypeDescriptor {
    TypeDescriptor::new(TypeKind::Integer)
}

/// Native float
pub fn float() -> TypeDescriptor {
    TypeDescriptor::new(TypeKind::Float)
}

/// Any numeric value
pub fn number() -> TypeDescriptor {
    TypeDescriptor::new(TypeKind::Number)
}

/// Text
pub fn string() -> TypeDescriptor {
    TypeDescriptor::new(TypeKind::String)
}

/// `enum(true, false)`
pub fn boolean() -> TypeDescriptor {
    enumeration([true, false])
}

/// Recognized date/time string
pub fn timestamp() -> TypeDescriptor {
    TypeDescriptor::new(TypeKind::Timestamp)
}

/// Membership in a fixed set of values
pub fn enumeration<I, V>(values: I) -> TypeDescriptor
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    TypeDescriptor::new(TypeKind::Enum(values.into_iter().map(Into::into).collect()))
}

/// Sequence of elements each matching one of `types`
pub fn array<I>(types: I) -> TypeDescriptor
where
    I: IntoIterator<Item = TypeDescriptor>,
{
    TypeDescriptor::new(TypeKind::Array(types.into_iter().collect()))
}

/// Mapping whose declared fields match their types
///
/// Undeclared keys are ignored; no fields at all means an open map.
pub fn object<I, K>(fields: I) -> TypeDescriptor
where
    I: IntoIterator<Item = (K, TypeDescriptor)>,
    K: Into<String>,
{
    TypeDescriptor::new(TypeKind::Object(
        fields.into_iter().map(|(k, t)| (k.into(), t)).collect(),
    ))
}

/// Nil, or a value matching any of `types`
pub fn optional<I>(types: I) -> TypeDescriptor
where
    I: IntoIterator<Item = TypeDescriptor>,
{
    TypeDescriptor::new(TypeKind::Optional(types.into_iter().collect()))
}

/// A value matching any of `types`
pub fn any<I>(types: I) -> TypeDescriptor
where
    I: IntoIterator<Item = TypeDescriptor>,
{
    TypeDescriptor::new(TypeKind::Any(types.into_iter().collect()))
}

/// Wildcard: `any()` with no members
pub fn anything() -> TypeDescriptor {
    TypeDescriptor::new(TypeKind::Any(Vec::new()))
}

/// A value matching every one of `types`
pub fn all<I>(types: I) -> TypeDescriptor
where
    I: IntoIterator<Item = TypeDescriptor>,
{
    TypeDescriptor::new(TypeKind::All(types.into_iter().collect()))
}

/// A value the matcher accepts
pub fn matching(matcher: Matcher) -> TypeDescriptor {
    TypeDescriptor::new(TypeKind::Match(matcher))
}

/// A nested record resolved from the raw value
pub fn nested(record_type: &Arc<RecordType>) -> TypeDescriptor {
    TypeDescriptor::new(TypeKind::Nested(Arc::clone(record_type)))
}
