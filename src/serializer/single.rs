//! Single record serializer
//!
//! Resolution semantics:
//! - Attributes resolve in declaration order
//! - Raw value comes from an accessor override, else a plain field read
//! - Coercion runs first; the coerced value is what gets validated
//! - Failed validation goes to the active mismatch handler
//! - A nested record that cannot be constructed is handled as a mismatch
//!   of the attribute holding it

use serde_json::Value;

use super::accessor::FieldAccessor;
use super::Record;
use crate::codec;
use crate::config::SerializerConfig;
use crate::descriptor::TypeDescriptor;
use crate::errors::{SerializeError, SerializeResult};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{abort, Mismatch, RecordType};

/// Binds one record type to one non-nil source object.
///
/// Short-lived: build it, call it, drop it.
pub struct Single<'a> {
    record_type: &'a RecordType,
    object: &'a dyn FieldAccessor,
}

impl<'a> Single<'a> {
    /// Binds a source object.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the object is nil.
    pub fn new(record_type: &'a RecordType, object: &'a dyn FieldAccessor) -> SerializeResult<Self> {
        if object.is_nil() {
            return Err(SerializeError::nil_object(record_type.name()));
        }
        Ok(Self {
            record_type,
            object,
        })
    }

    /// Returns the bound record type
    pub fn record_type(&self) -> &RecordType {
        self.record_type
    }

    /// Resolves every attribute into an ordered record.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a mismatch handler (by default a
    /// type mismatch naming the attribute).
    pub fn call(&self) -> SerializeResult<Record> {
        let mut record = Record::new();
        for (attribute, descriptor) in self.record_type.attributes().iter() {
            let value = self.resolve(attribute, descriptor)?;
            record.insert(attribute.to_string(), value);
        }

        let count = record.len().to_string();
        log_event_with_fields(
            Event::RecordSerialized,
            &[("type", self.record_type.name()), ("attributes", count.as_str())],
        );
        Ok(record)
    }

    /// Resolves and encodes as compact JSON.
    pub fn to_json(&self) -> SerializeResult<String> {
        self.to_json_with(&SerializerConfig::default())
    }

    /// Resolves and encodes as indented JSON.
    pub fn to_json_pretty(&self) -> SerializeResult<String> {
        codec::json::encode(&self.call()?, true)
    }

    /// Resolves and encodes as JSON using the given configuration.
    pub fn to_json_with(&self, config: &SerializerConfig) -> SerializeResult<String> {
        codec::json::encode(&self.call()?, config.json_pretty)
    }

    /// Resolves and encodes as CSV: one header row, one data row.
    pub fn to_csv(&self) -> SerializeResult<String> {
        self.to_csv_with(&SerializerConfig::default())
    }

    /// Resolves and encodes as CSV using the given configuration.
    pub fn to_csv_with(&self, config: &SerializerConfig) -> SerializeResult<String> {
        let record = self.call()?;
        let header = self.record_type.attribute_names();
        Ok(codec::csv::encode_rows(
            &header,
            std::slice::from_ref(&record),
            config.delimiter()?,
        ))
    }

    fn raw_value(&self, attribute: &str) -> Value {
        match self.record_type.accessor(attribute) {
            Some(accessor) => accessor(self.object),
            None => self.object.read(attribute).unwrap_or(Value::Null),
        }
    }

    fn resolve(&self, attribute: &str, descriptor: &TypeDescriptor) -> SerializeResult<Value> {
        let raw = self.raw_value(attribute);

        match descriptor.coerce(raw.clone()) {
            Ok(coerced) if descriptor.matches(&coerced) => Ok(coerced),
            Ok(coerced) => self.mismatch(attribute, descriptor, &coerced),
            Err(err) if err.is_construction() => {
                let reason = err.to_string();
                log_event_with_fields(
                    Event::NestedConstructionRemapped,
                    &[
                        ("attribute", attribute),
                        ("reason", reason.as_str()),
                        ("type", self.record_type.name()),
                    ],
                );
                self.mismatch(attribute, descriptor, &raw)
            }
            Err(err) => Err(err),
        }
    }

    fn mismatch(
        &self,
        attribute: &str,
        descriptor: &TypeDescriptor,
        value: &Value,
    ) -> SerializeResult<Value> {
        let mismatch = Mismatch {
            owner: self.record_type.name(),
            attribute,
            descriptor,
            value,
        };

        match self.record_type.mismatch_handler() {
            Some(handler) => {
                let replacement = handler(&mismatch)?;
                log_event_with_fields(
                    Event::MismatchHandled,
                    &[("attribute", attribute), ("type", self.record_type.name())],
                );
                Ok(replacement)
            }
            None => {
                log_event_with_fields(
                    Event::MismatchAborted,
                    &[("attribute", attribute), ("type", self.record_type.name())],
                );
                abort(&mismatch)
            }
        }
    }
}
