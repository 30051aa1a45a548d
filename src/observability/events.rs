//! Observable events for wireform
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Definitions
    /// Record type built
    RecordTypeDefined,

    // Resolution
    /// Single record resolved
    RecordSerialized,
    /// Collection resolved
    CollectionSerialized,

    // Mismatches
    /// Custom handler substituted a value
    MismatchHandled,
    /// Default policy aborted resolution
    MismatchAborted,
    /// Nested record could not be constructed; handled as a mismatch
    NestedConstructionRemapped,

    // Configuration
    /// Configuration file loaded
    ConfigLoaded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RecordTypeDefined => "RECORD_TYPE_DEFINED",
            Event::RecordSerialized => "RECORD_SERIALIZED",
            Event::CollectionSerialized => "COLLECTION_SERIALIZED",
            Event::MismatchHandled => "MISMATCH_HANDLED",
            Event::MismatchAborted => "MISMATCH_ABORTED",
            Event::NestedConstructionRemapped => "NESTED_CONSTRUCTION_REMAPPED",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Returns the severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::RecordTypeDefined | Event::RecordSerialized | Event::CollectionSerialized => {
                Severity::Trace
            }
            Event::NestedConstructionRemapped | Event::MismatchAborted | Event::ConfigLoaded => {
                Severity::Info
            }
            Event::MismatchHandled => Severity::Warn,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
