//! Field accessor capability
//!
//! Serializers never inspect domain objects directly. They read named
//! fields, ask for ordered elements, and test for nil through this trait.

use serde::Serialize;
use serde_json::Value;

use crate::errors::SerializeResult;

/// Read access to a source object.
pub trait FieldAccessor {
    /// Reads a named field. `None` means the field is absent.
    fn read(&self, name: &str) -> Option<Value>;

    /// Returns the elements in order when the source is a sequence.
    fn elements(&self) -> Option<Vec<&dyn FieldAccessor>> {
        None
    }

    /// Whether the source is nil.
    fn is_nil(&self) -> bool {
        false
    }

    /// Short description used in error messages.
    ///
    /// Defaults to the implementing type's name.
    fn describe(&self) -> String {
        format!("<{}>", std::any::type_name::<Self>())
    }
}

impl FieldAccessor for Value {
    fn read(&self, name: &str) -> Option<Value> {
        self.as_object().and_then(|map| map.get(name)).cloned()
    }

    fn elements(&self) -> Option<Vec<&dyn FieldAccessor>> {
        self.as_array()
            .map(|items| items.iter().map(|item| item as &dyn FieldAccessor).collect())
    }

    fn is_nil(&self) -> bool {
        self.is_null()
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl<T: FieldAccessor> FieldAccessor for Option<T> {
    fn read(&self, name: &str) -> Option<Value> {
        self.as_ref().and_then(|inner| inner.read(name))
    }

    fn elements(&self) -> Option<Vec<&dyn FieldAccessor>> {
        self.as_ref().and_then(|inner| inner.elements())
    }

    fn is_nil(&self) -> bool {
        self.as_ref().map_or(true, |inner| inner.is_nil())
    }

    fn describe(&self) -> String {
        match self {
            Some(inner) => inner.describe(),
            None => "null".to_string(),
        }
    }
}

impl<T: FieldAccessor> FieldAccessor for [T] {
    fn read(&self, _name: &str) -> Option<Value> {
        None
    }

    fn elements(&self) -> Option<Vec<&dyn FieldAccessor>> {
        Some(self.iter().map(|item| item as &dyn FieldAccessor).collect())
    }

    fn describe(&self) -> String {
        format!("<sequence of {}>", self.len())
    }
}

impl<T: FieldAccessor> FieldAccessor for Vec<T> {
    fn read(&self, _name: &str) -> Option<Value> {
        None
    }

    fn elements(&self) -> Option<Vec<&dyn FieldAccessor>> {
        self.as_slice().elements()
    }

    fn describe(&self) -> String {
        self.as_slice().describe()
    }
}

impl<T: FieldAccessor + ?Sized> FieldAccessor for &T {
    fn read(&self, name: &str) -> Option<Value> {
        (**self).read(name)
    }

    fn elements(&self) -> Option<Vec<&dyn FieldAccessor>> {
        (**self).elements()
    }

    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<T: FieldAccessor + ?Sized> FieldAccessor for Box<T> {
    fn read(&self, name: &str) -> Option<Value> {
        (**self).read(name)
    }

    fn elements(&self) -> Option<Vec<&dyn FieldAccessor>> {
        (**self).elements()
    }

    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Converts any serde-serializable domain object into a source value.
pub fn to_source<T: Serialize + ?Sized>(object: &T) -> SerializeResult<Value> {
    Ok(serde_json::to_value(object)?)
}
