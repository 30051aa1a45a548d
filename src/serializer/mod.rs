//! Serializers
//!
//! - [`Single`] resolves one record type against one source object
//! - [`Many`] composes several record types under top-level keys
//!
//! Both produce a [`Record`]: an insertion-ordered JSON object whose keys
//! are exactly the declared names, in declaration order.

mod accessor;
mod many;
mod single;

pub use accessor::{to_source, FieldAccessor};
pub use many::{CollectionType, CollectionTypeBuilder, Inputs, Many, Member};
pub use single::Single;

/// Ordered result of one resolution call
pub type Record = serde_json::Map<String, serde_json::Value>;
