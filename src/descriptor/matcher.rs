//! Structural matchers for `match(...)` descriptors
//!
//! A matcher decides membership only. It never transforms the value.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Predicate signature for custom matchers
pub type PredicateFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Membership rule used by `match(...)` descriptors
#[derive(Clone)]
pub enum Matcher {
    /// Unanchored regular expression search over strings
    Pattern(Regex),
    /// Inclusive numeric range
    Range { min: f64, max: f64 },
    /// Exact equality with a literal value
    Literal(Value),
    /// Named custom predicate
    Predicate { name: String, test: PredicateFn },
}

impl Matcher {
    /// Compiles a pattern matcher.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Matcher::Pattern(Regex::new(pattern)?))
    }

    /// Creates an inclusive numeric range matcher.
    pub fn range(min: f64, max: f64) -> Self {
        Matcher::Range { min, max }
    }

    /// Creates a literal equality matcher.
    pub fn literal(value: impl Into<Value>) -> Self {
        Matcher::Literal(value.into())
    }

    /// Creates a named predicate matcher.
    pub fn predicate<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Matcher::Predicate {
            name: name.into(),
            test: Arc::new(test),
        }
    }

    /// Returns whether the value is a member.
    pub fn is_match(&self, value: &Value) -> bool {
        match self {
            Matcher::Pattern(regex) => value.as_str().is_some_and(|s| regex.is_match(s)),
            Matcher::Range { min, max } => value
                .as_f64()
                .is_some_and(|n| n >= *min && n <= *max),
            Matcher::Literal(expected) => value == expected,
            Matcher::Predicate { test, .. } => test(value),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
            Matcher::Range { min, max } => write!(f, "{}..{}", min, max),
            Matcher::Literal(value) => write!(f, "{}", value),
            Matcher::Predicate { name, .. } => write!(f, "{}", name),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Matcher({})", self)
    }
}
