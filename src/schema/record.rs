//! Record type definitions
//!
//! A record type is built once with [`RecordTypeBuilder`] and shared
//! read-only afterwards. A derived type starts from a copy of its parent's
//! attributes and accessor overrides, then merges its own declarations.
//!
//! The mismatch handler is the one piece of mutable state. It is looked up
//! through the explicit parent link on every call, so reassigning a parent's
//! handler affects every subtype that has not set its own.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use super::attributes::AttributeSchema;
use super::handler::{Mismatch, MismatchHandler};
use crate::descriptor::TypeDescriptor;
use crate::errors::{SerializeError, SerializeResult};
use crate::observability::{log_event_with_fields, Event};
use crate::serializer::{FieldAccessor, Record, Single};

/// Override deriving an attribute's raw value from the bound object
pub type AccessorFn = Arc<dyn Fn(&dyn FieldAccessor) -> Value + Send + Sync>;

/// A named, ordered set of typed attributes.
pub struct RecordType {
    name: String,
    parent: Option<Arc<RecordType>>,
    attributes: AttributeSchema<TypeDescriptor>,
    accessors: HashMap<String, AccessorFn>,
    handler: RwLock<Option<MismatchHandler>>,
}

impl RecordType {
    /// Starts a new record type definition.
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder::new(name)
    }

    /// Returns the type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent type, if any
    pub fn parent(&self) -> Option<&Arc<RecordType>> {
        self.parent.as_ref()
    }

    /// Returns the full attribute schema, inherited entries included
    pub fn attributes(&self) -> &AttributeSchema<TypeDescriptor> {
        &self.attributes
    }

    /// Returns attribute names in declaration order
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.names().collect()
    }

    /// Returns the descriptor bound to an attribute
    pub fn descriptor(&self, attribute: &str) -> Option<&TypeDescriptor> {
        self.attributes.get(attribute)
    }

    /// Returns the accessor override for an attribute
    pub fn accessor(&self, attribute: &str) -> Option<&AccessorFn> {
        self.accessors.get(attribute)
    }

    /// Reassigns this type's mismatch handler.
    pub fn set_mismatch_handler<F>(&self, handler: F)
    where
        F: Fn(&Mismatch<'_>) -> SerializeResult<Value> + Send + Sync + 'static,
    {
        self.replace_mismatch_handler(Some(Arc::new(handler)));
    }

    /// Removes this type's own handler, falling back to the ancestors'.
    pub fn clear_mismatch_handler(&self) {
        self.replace_mismatch_handler(None);
    }

    /// Swaps this type's own handler, returning the previous one.
    pub fn replace_mismatch_handler(
        &self,
        handler: Option<MismatchHandler>,
    ) -> Option<MismatchHandler> {
        let mut slot = self.handler.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, handler)
    }

    /// Whether this type set a handler of its own
    pub fn has_own_mismatch_handler(&self) -> bool {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Resolves the active handler: own, else nearest ancestor's.
    ///
    /// `None` means the default abort policy applies.
    pub fn mismatch_handler(&self) -> Option<MismatchHandler> {
        let own = self
            .handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        own.or_else(|| self.parent.as_ref().and_then(|p| p.mismatch_handler()))
    }

    /// Serializes one source object with this type.
    pub fn serialize(&self, source: &dyn FieldAccessor) -> SerializeResult<Record> {
        Single::new(self, source)?.call()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (attribute, descriptor)) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", attribute, descriptor)?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Builder for [`RecordType`].
///
/// The first invalid declaration is remembered and reported by `build()`.
pub struct RecordTypeBuilder {
    name: String,
    parent: Option<Arc<RecordType>>,
    attributes: AttributeSchema<TypeDescriptor>,
    accessors: Vec<(String, AccessorFn)>,
    handler: Option<MismatchHandler>,
    error: Option<SerializeError>,
}

impl RecordTypeBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            attributes: AttributeSchema::new(),
            accessors: Vec::new(),
            handler: None,
            error: None,
        }
    }

    /// Derives from a parent type.
    pub fn extends(mut self, parent: &Arc<RecordType>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Declares an attribute. `None` is a configuration error.
    pub fn attribute(
        mut self,
        name: impl Into<String>,
        descriptor: impl Into<Option<TypeDescriptor>>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }

        let name = name.into();
        if name.is_empty() {
            self.error = Some(SerializeError::Configuration {
                owner: self.name.clone(),
                attribute: name,
                reason: "attribute name cannot be empty".into(),
            });
            return self;
        }

        match descriptor.into() {
            Some(descriptor) => self.attributes.insert(name, descriptor),
            None => self.error = Some(SerializeError::undefined_descriptor(&self.name, &name)),
        }
        self
    }

    /// Declares several attributes in order.
    pub fn attributes<I, K, D>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<Option<TypeDescriptor>>,
    {
        entries
            .into_iter()
            .fold(self, |builder, (name, descriptor)| builder.attribute(name, descriptor))
    }

    /// Overrides how an attribute's raw value is read.
    ///
    /// The override takes precedence over the plain field read and is
    /// inherited by derived types.
    pub fn accessor<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&dyn FieldAccessor) -> Value + Send + Sync + 'static,
    {
        self.accessors.push((name.into(), Arc::new(accessor)));
        self
    }

    /// Sets this type's own mismatch handler.
    pub fn mismatch_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Mismatch<'_>) -> SerializeResult<Value> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Finishes the definition.
    pub fn build(self) -> SerializeResult<Arc<RecordType>> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut attributes = self
            .parent
            .as_ref()
            .map(|p| p.attributes.clone())
            .unwrap_or_default();
        attributes.merge(self.attributes);

        let mut accessors = self
            .parent
            .as_ref()
            .map(|p| p.accessors.clone())
            .unwrap_or_default();
        for (name, accessor) in self.accessors {
            if !attributes.contains(&name) {
                return Err(SerializeError::Configuration {
                    owner: self.name,
                    attribute: name,
                    reason: "accessor overrides an undeclared attribute".into(),
                });
            }
            accessors.insert(name, accessor);
        }

        let count = attributes.len().to_string();
        log_event_with_fields(
            Event::RecordTypeDefined,
            &[("type", self.name.as_str()), ("attributes", count.as_str())],
        );

        Ok(Arc::new(RecordType {
            name: self.name,
            parent: self.parent,
            attributes,
            accessors,
            handler: RwLock::new(self.handler),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{array, integer, nested, object, optional, string};
    use serde_json::json;

    fn user_type() -> Arc<RecordType> {
        RecordType::builder("UserType")
            .attribute("id", integer())
            .attribute("name", string())
            .build()
            .unwrap()
    }

    #[test]
    fn test_nil_descriptor_is_configuration_error() {
        let missing: Option<TypeDescriptor> = None;
        let err = RecordType::builder("UserType")
            .attribute("id", integer())
            .attribute("name", missing)
            .build()
            .unwrap_err();
        assert_eq!(err.code(), "WIREFORM_CONFIGURATION");
        assert_eq!(err.attribute(), Some("name"));
    }

    #[test]
    fn test_empty_name_is_configuration_error() {
        let err = RecordType::builder("UserType")
            .attribute("", integer())
            .build()
            .unwrap_err();
        assert_eq!(err.code(), "WIREFORM_CONFIGURATION");
    }

    #[test]
    fn test_accessor_for_undeclared_attribute_rejected() {
        let err = RecordType::builder("UserType")
            .attribute("id", integer())
            .accessor("nickname", |_| Value::Null)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("nickname"));
    }

    #[test]
    fn test_derived_type_appends_after_parent() {
        let parent = user_type();
        let child = RecordType::builder("AdminType")
            .extends(&parent)
            .attribute("metadata", object(Vec::<(String, TypeDescriptor)>::new()))
            .attribute("name", optional([string()]))
            .build()
            .unwrap();

        assert_eq!(child.attribute_names(), vec!["id", "name", "metadata"]);
        assert_eq!(child.descriptor("name").unwrap().to_string(), "optional(string)");
        // parent untouched
        assert_eq!(parent.descriptor("name").unwrap().to_string(), "string");
        assert_eq!(parent.attribute_names(), vec!["id", "name"]);
    }

    #[test]
    fn test_signature_display() {
        let order = RecordType::builder("OrderType")
            .attribute("price_cents", integer())
            .build()
            .unwrap();
        let t = RecordType::builder("StuffType")
            .attribute("id", integer())
            .attribute("nicknames", array([string()]))
            .attribute("order", nested(&order))
            .build()
            .unwrap();
        assert_eq!(
            t.to_string(),
            "StuffType(id: integer, nicknames: array(string), order: nested(OrderType))"
        );
    }

    #[test]
    fn test_handler_inherited_until_overridden() {
        let parent = user_type();
        let child = RecordType::builder("AdminType")
            .extends(&parent)
            .build()
            .unwrap();
        assert!(child.mismatch_handler().is_none());

        parent.set_mismatch_handler(|_| Ok(json!("parent")));
        let handler = child.mismatch_handler().unwrap();
        let descriptor = integer();
        let value = json!("x");
        let mismatch = Mismatch {
            owner: "AdminType",
            attribute: "id",
            descriptor: &descriptor,
            value: &value,
        };
        assert_eq!(handler(&mismatch).unwrap(), json!("parent"));
        assert!(!child.has_own_mismatch_handler());

        child.set_mismatch_handler(|_| Ok(json!("child")));
        assert_eq!(child.mismatch_handler().unwrap()(&mismatch).unwrap(), json!("child"));

        child.clear_mismatch_handler();
        parent.clear_mismatch_handler();
        assert!(child.mismatch_handler().is_none());
    }
}
