//! Ordered attribute tables
//!
//! Re-declaring a name replaces its entry but keeps the position where the
//! name was first seen. Declaration order drives result keys, signatures and
//! CSV column order.

/// Ordered mapping of attribute name to entry.
#[derive(Debug, Clone)]
pub struct AttributeSchema<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for AttributeSchema<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> AttributeSchema<T> {
    /// Creates an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overrides an entry.
    pub fn insert(&mut self, name: impl Into<String>, entry: T) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = entry,
            None => self.entries.push((name, entry)),
        }
    }

    /// Merges another schema; its entries win.
    pub fn merge(&mut self, other: AttributeSchema<T>) {
        for (name, entry) in other.entries {
            self.insert(name, entry);
        }
    }

    /// Looks up an entry by name
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, entry)| entry)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Iterates names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
