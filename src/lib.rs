//! wireform - schema-driven serialization of records
//!
//! A record type declares an ordered set of attributes, each bound to a
//! type descriptor. Serializing a source object against a record type
//! reads every attribute, coerces it, checks it against its descriptor
//! and emits an ordered JSON object. Values that do not match are routed
//! to the record type's mismatch handler.
//!
//! ```ignore
//! use wireform::descriptor::{integer, string};
//! use wireform::{RecordType, Single};
//! use serde_json::json;
//!
//! let user = RecordType::builder("UserType")
//!     .attribute("id", integer())
//!     .attribute("name", string())
//!     .build()?;
//!
//! let source = json!({"id": 123, "name": "Jamie"});
//! let out = Single::new(&user, &source)?.to_json()?;
//! ```

pub mod codec;
pub mod config;
pub mod descriptor;
pub mod errors;
pub mod observability;
pub mod schema;
pub mod serializer;

pub use config::SerializerConfig;
pub use descriptor::{TypeDescriptor, TypeKind};
pub use errors::{SerializeError, SerializeResult};
pub use schema::{Mismatch, MismatchHandler, RecordType, RecordTypeBuilder};
pub use serializer::{
    to_source, CollectionType, FieldAccessor, Inputs, Many, Member, Record, Single,
};
