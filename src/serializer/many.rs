//! Collection serializer
//!
//! Composes several record types under top-level keys. Members may be
//! wrapped as enumerable (one record per element, source order kept) or
//! optional (nil passes through as null).
//!
//! Construction checks:
//! - every required member has a bound, non-nil input (all missing names
//!   are reported together)
//! - every enumerable member's input supports ordered iteration

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::accessor::FieldAccessor;
use super::Record;
use crate::codec;
use crate::config::SerializerConfig;
use crate::errors::{SerializeError, SerializeResult};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{AttributeSchema, RecordType};

/// A collection member: a record type or a wrapper around one.
#[derive(Debug, Clone)]
pub enum Member {
    /// One record
    Record(Arc<RecordType>),
    /// One record per element of an ordered sequence
    Enumerable(Box<Member>),
    /// Nil, or the wrapped member
    Optional(Box<Member>),
}

impl Member {
    /// Wraps a record type
    pub fn record(record_type: &Arc<RecordType>) -> Self {
        Member::Record(Arc::clone(record_type))
    }

    /// Wraps a member as enumerable
    pub fn enumerable(member: impl Into<Member>) -> Self {
        Member::Enumerable(Box::new(member.into()))
    }

    /// Wraps a member as optional
    pub fn optional(member: impl Into<Member>) -> Self {
        Member::Optional(Box::new(member.into()))
    }

    /// Whether the member may be absent or nil
    pub fn is_optional(&self) -> bool {
        matches!(self, Member::Optional(_))
    }

    /// Returns the innermost record type
    pub fn record_type(&self) -> &Arc<RecordType> {
        match self {
            Member::Record(record_type) => record_type,
            Member::Enumerable(inner) | Member::Optional(inner) => inner.record_type(),
        }
    }

    fn check(&self, owner: &str, attribute: &str, source: &dyn FieldAccessor) -> SerializeResult<()> {
        match self {
            Member::Record(record_type) => {
                if source.is_nil() {
                    Err(SerializeError::Construction {
                        owner: owner.to_string(),
                        reason: format!("{} received a nil {}", attribute, record_type.name()),
                    })
                } else {
                    Ok(())
                }
            }
            Member::Optional(inner) => {
                if source.is_nil() {
                    Ok(())
                } else {
                    inner.check(owner, attribute, source)
                }
            }
            Member::Enumerable(inner) => match source.elements() {
                Some(items) => items
                    .into_iter()
                    .try_for_each(|item| inner.check(owner, attribute, item)),
                None => Err(not_enumerable(owner, attribute, source)),
            },
        }
    }

    fn resolve(&self, owner: &str, attribute: &str, source: &dyn FieldAccessor) -> SerializeResult<Value> {
        match self {
            Member::Record(record_type) => Ok(Value::Object(record_type.serialize(source)?)),
            Member::Optional(inner) => {
                if source.is_nil() {
                    Ok(Value::Null)
                } else {
                    inner.resolve(owner, attribute, source)
                }
            }
            Member::Enumerable(inner) => {
                let items = source
                    .elements()
                    .ok_or_else(|| not_enumerable(owner, attribute, source))?;
                items
                    .into_iter()
                    .map(|item| inner.resolve(owner, attribute, item))
                    .collect::<SerializeResult<Vec<_>>>()
                    .map(Value::Array)
            }
        }
    }
}

impl From<Arc<RecordType>> for Member {
    fn from(record_type: Arc<RecordType>) -> Self {
        Member::Record(record_type)
    }
}

impl From<&Arc<RecordType>> for Member {
    fn from(record_type: &Arc<RecordType>) -> Self {
        Member::record(record_type)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Record(record_type) => write!(f, "{}", record_type.name()),
            Member::Enumerable(inner) => write!(f, "enumerable({})", inner),
            Member::Optional(inner) => write!(f, "optional({})", inner),
        }
    }
}

fn not_enumerable(owner: &str, attribute: &str, source: &dyn FieldAccessor) -> SerializeError {
    SerializeError::NotEnumerable {
        owner: owner.to_string(),
        attribute: attribute.to_string(),
        actual: source.describe(),
    }
}

/// A named, ordered set of collection members.
#[derive(Debug)]
pub struct CollectionType {
    name: String,
    parent: Option<Arc<CollectionType>>,
    members: AttributeSchema<Member>,
}

impl CollectionType {
    /// Starts a new collection type definition.
    pub fn builder(name: impl Into<String>) -> CollectionTypeBuilder {
        CollectionTypeBuilder {
            name: name.into(),
            parent: None,
            members: AttributeSchema::new(),
            error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<CollectionType>> {
        self.parent.as_ref()
    }

    /// Returns the members in declaration order
    pub fn members(&self) -> &AttributeSchema<Member> {
        &self.members
    }

    /// Returns one member by name
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (name, member)) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, member)?;
        }
        write!(f, ")")
    }
}

/// Builder for [`CollectionType`].
pub struct CollectionTypeBuilder {
    name: String,
    parent: Option<Arc<CollectionType>>,
    members: AttributeSchema<Member>,
    error: Option<SerializeError>,
}

impl CollectionTypeBuilder {
    /// Derives from a parent collection type.
    pub fn extends(mut self, parent: &Arc<CollectionType>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Declares a member. `None` is a configuration error.
    pub fn member(mut self, name: impl Into<String>, member: impl Into<Option<Member>>) -> Self {
        if self.error.is_some() {
            return self;
        }

        let name = name.into();
        match member.into() {
            Some(member) if !name.is_empty() => self.members.insert(name, member),
            Some(_) => {
                self.error = Some(SerializeError::Configuration {
                    owner: self.name.clone(),
                    attribute: name,
                    reason: "member name cannot be empty".into(),
                })
            }
            None => self.error = Some(SerializeError::undefined_descriptor(&self.name, &name)),
        }
        self
    }

    /// Finishes the definition.
    pub fn build(self) -> SerializeResult<Arc<CollectionType>> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut members = self
            .parent
            .as_ref()
            .map(|p| p.members.clone())
            .unwrap_or_default();
        members.merge(self.members);

        Ok(Arc::new(CollectionType {
            name: self.name,
            parent: self.parent,
            members,
        }))
    }
}

/// Raw inputs for a collection serializer, keyed by member name.
#[derive(Default)]
pub struct Inputs<'a> {
    bound: Vec<(String, &'a dyn FieldAccessor)>,
}

impl<'a> Inputs<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a source under a member name; rebinding replaces.
    pub fn bind(mut self, name: impl Into<String>, source: &'a dyn FieldAccessor) -> Self {
        let name = name.into();
        self.bound.retain(|(existing, _)| *existing != name);
        self.bound.push((name, source));
        self
    }

    /// Binds every top-level key of a JSON object.
    pub fn from_object(object: &'a Value) -> Self {
        match object.as_object() {
            Some(map) => map
                .iter()
                .fold(Self::new(), |inputs, (name, value)| inputs.bind(name.as_str(), value)),
            None => Self::new(),
        }
    }

    /// Returns the source bound under a name
    pub fn get(&self, name: &str) -> Option<&'a dyn FieldAccessor> {
        self.bound
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, source)| *source)
    }
}

/// Binds a collection type to its raw inputs.
pub struct Many<'a> {
    collection: &'a CollectionType,
    inputs: Inputs<'a>,
}

impl<'a> Many<'a> {
    /// Validates and binds the inputs.
    ///
    /// # Errors
    ///
    /// - Construction error listing every required member whose input is
    ///   absent or nil
    /// - Not-enumerable error for an enumerable member bound to a value
    ///   without ordered iteration
    pub fn new(collection: &'a CollectionType, inputs: Inputs<'a>) -> SerializeResult<Self> {
        let missing: Vec<&str> = collection
            .members
            .iter()
            .filter(|(name, member)| {
                !member.is_optional() && inputs.get(name).map_or(true, |s| s.is_nil())
            })
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            return Err(SerializeError::missing_attributes(collection.name(), &missing));
        }

        for (name, member) in collection.members.iter() {
            if let Some(source) = inputs.get(name) {
                member.check(collection.name(), name, source)?;
            }
        }

        Ok(Self { collection, inputs })
    }

    /// Resolves every member into an ordered record.
    pub fn call(&self) -> SerializeResult<Record> {
        let mut record = Record::new();
        for (name, member) in self.collection.members.iter() {
            let value = match self.inputs.get(name) {
                Some(source) => member.resolve(self.collection.name(), name, source)?,
                None => Value::Null,
            };
            record.insert(name.to_string(), value);
        }

        let count = record.len().to_string();
        log_event_with_fields(
            Event::CollectionSerialized,
            &[("members", count.as_str()), ("type", self.collection.name())],
        );
        Ok(record)
    }

    /// Resolves and encodes as compact JSON.
    pub fn to_json(&self) -> SerializeResult<String> {
        self.to_json_with(&SerializerConfig::default())
    }

    /// Resolves and encodes as JSON using the given configuration.
    pub fn to_json_with(&self, config: &SerializerConfig) -> SerializeResult<String> {
        codec::json::encode(&self.call()?, config.json_pretty)
    }

    /// Encodes one member as CSV.
    ///
    /// A record yields a header and one row, an enumerable a header and one
    /// row per element, a nil optional the header alone.
    pub fn to_csv_member(&self, name: &str) -> SerializeResult<String> {
        self.to_csv_member_with(name, &SerializerConfig::default())
    }

    /// Encodes one member as CSV using the given configuration.
    pub fn to_csv_member_with(&self, name: &str, config: &SerializerConfig) -> SerializeResult<String> {
        let member = self.collection.member(name).ok_or_else(|| {
            SerializeError::Encoding(format!("{} has no member '{}'", self.collection.name(), name))
        })?;
        let value = match self.inputs.get(name) {
            Some(source) => member.resolve(self.collection.name(), name, source)?,
            None => Value::Null,
        };

        let rows = flatten_rows(value)?;
        let header = member.record_type().attribute_names();
        Ok(codec::csv::encode_rows(&header, &rows, config.delimiter()?))
    }
}

fn flatten_rows(value: Value) -> SerializeResult<Vec<Record>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(record) => Ok(vec![record]),
        Value::Array(items) => items.into_iter().try_fold(Vec::new(), |mut rows, item| {
            rows.extend(flatten_rows(item)?);
            Ok(rows)
        }),
        other => Err(SerializeError::Encoding(format!(
            "cannot lay out {} as CSV rows",
            other
        ))),
    }
}
