//! Document metadata from the package core properties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document metadata (`docProps/core.xml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub creator: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Description / comments
    pub description: Option<String>,

    /// Last author
    pub last_modified_by: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// Detected package format (e.g. "Word document")
    pub format: String,
}

impl Metadata {
    /// Create metadata with a format description.
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            ..Default::default()
        }
    }

    /// Set a core property by its local element name.
    ///
    /// Unknown names are ignored; unparsable dates are dropped with a warning.
    pub fn set_property(&mut self, name: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        match name {
            "title" => self.title = Some(value.to_string()),
            "creator" => self.creator = Some(value.to_string()),
            "subject" => self.subject = Some(value.to_string()),
            "description" => self.description = Some(value.to_string()),
            "lastModifiedBy" => self.last_modified_by = Some(value.to_string()),
            "created" => self.created = parse_w3cdtf(name, value),
            "modified" => self.modified = parse_w3cdtf(name, value),
            _ => {}
        }
    }
}

fn parse_w3cdtf(name: &str, value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            log::warn!("Ignoring core property {} = {:?}: {}", name, value, e);
            None
        }
    }
}
