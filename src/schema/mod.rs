//! Attribute schemas and record types
//!
//! # Design Principles
//!
//! - Schemas are defined ahead of time and immutable once built
//! - Declaration order is stable and drives output order
//! - Derived types copy their parent's schema, then extend it
//! - Mismatch handling is inherited through an explicit parent link

mod attributes;
mod handler;
mod record;

pub use attributes::AttributeSchema;
pub use handler::{abort, substitute, Mismatch, MismatchHandler};
pub use record::{AccessorFn, RecordType, RecordTypeBuilder};
