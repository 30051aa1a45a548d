//! Wire encodings for resolved records
//!
//! - [`json`] writes a record as a JSON object, keys in declaration order
//! - [`csv`] writes records as a header row followed by data rows

pub mod csv;
pub mod json;
