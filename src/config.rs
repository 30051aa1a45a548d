//! Serializer configuration
//!
//! Loaded from a JSON file. Every field is optional.
//!
//! ```json
//! {
//!   "log_level": "warn",
//!   "csv_delimiter": ",",
//!   "json_pretty": false
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{SerializeError, SerializeResult};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};

/// Encoding and logging options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializerConfig {
    /// Minimum log severity once applied: trace, info, warn, error or off (default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// CSV cell separator, a single ASCII character (default ",")
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: String,

    /// Indent JSON output (default false)
    #[serde(default)]
    pub json_pretty: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}
fn default_csv_delimiter() -> String {
    ",".to_string()
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            csv_delimiter: default_csv_delimiter(),
            json_pretty: false,
        }
    }
}

impl SerializerConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> SerializeResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SerializeError::Config(format!("Failed to read config: {}", e)))?;

        let config: SerializerConfig = serde_json::from_str(&content)
            .map_err(|e| SerializeError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        let shown = path.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("path", shown.as_str()), ("log_level", config.log_level.as_str())],
        );

        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> SerializeResult<()> {
        self.severity()?;
        self.delimiter()?;
        Ok(())
    }

    /// Parsed log threshold
    pub fn severity(&self) -> SerializeResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            SerializeError::Config(format!(
                "Invalid log_level: '{}'. Must be trace, info, warn, error or off.",
                self.log_level
            ))
        })
    }

    /// The CSV delimiter as a character
    pub fn delimiter(&self) -> SerializeResult<char> {
        let mut chars = self.csv_delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() && !matches!(c, '"' | '\n' | '\r') => Ok(c),
            _ => Err(SerializeError::Config(format!(
                "Invalid csv_delimiter: '{}'. Must be one ASCII character other than a quote or line break.",
                self.csv_delimiter.escape_debug()
            ))),
        }
    }

    /// Installs the log threshold process-wide
    ///
    /// Until this is called the logger writes nothing.
    pub fn apply(&self) -> SerializeResult<()> {
        Logger::set_min_severity(self.severity()?);
        Ok(())
    }
}
