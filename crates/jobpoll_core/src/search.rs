use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Contact-list tab. `All` sends no status constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Unsubscribed,
    Complained,
    Bounced,
    #[serde(rename = "soft")]
    SoftBounced,
}

impl StatusFilter {
    /// Value of the `status` field in a search request, `None` for `All`.
    pub fn as_query_value(self) -> Option<&'static str> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Active => Some("active"),
            StatusFilter::Unsubscribed => Some("unsubscribed"),
            StatusFilter::Complained => Some("complained"),
            StatusFilter::Bounced => Some("bounced"),
            StatusFilter::SoftBounced => Some("soft"),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value().unwrap_or("all"))
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "unsubscribed" => Ok(StatusFilter::Unsubscribed),
            "complained" => Ok(StatusFilter::Complained),
            "bounced" => Ok(StatusFilter::Bounced),
            "soft" | "soft-bounced" | "softbounced" => Ok(StatusFilter::SoftBounced),
            other => Err(format!("unknown status filter {other:?}")),
        }
    }
}

/// Opaque page token taken from a row key, never a numeric offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageCursor {
    Before(String),
    After(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    pub term: String,
    pub filter: StatusFilter,
    pub cursor: Option<PageCursor>,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, filter: StatusFilter) -> Self {
        Self {
            term: term.into(),
            filter,
            cursor: None,
        }
    }

    pub fn with_cursor(mut self, cursor: Option<PageCursor>) -> Self {
        self.cursor = cursor;
        self
    }
}

/// One contact row. `email` is the row key; every other column is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRow {
    pub email: String,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl ContactRow {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// Result of a completed contact search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchPayload {
    #[serde(default, alias = "contacts")]
    pub rows: Vec<ContactRow>,
    #[serde(default, alias = "count")]
    pub total: u64,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl SearchPayload {
    /// Field names reported by the server, or the union of row properties
    /// in first-seen order when the server sent none.
    pub fn discovered_fields(&self) -> Vec<String> {
        if !self.fields.is_empty() {
            return self.fields.clone();
        }
        let mut fields: Vec<String> = Vec::new();
        for row in &self.rows {
            for name in row.properties.keys() {
                if !fields.iter().any(|known| known == name) {
                    fields.push(name.clone());
                }
            }
        }
        fields
    }

    pub fn first_key(&self) -> Option<&str> {
        self.rows.first().map(|row| row.email.as_str())
    }

    pub fn last_key(&self) -> Option<&str> {
        self.rows.last().map(|row| row.email.as_str())
    }
}
