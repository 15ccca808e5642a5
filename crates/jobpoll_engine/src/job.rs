use jobpoll_core::{
    CalculationSummary, JobHandle, PageCursor, SearchPayload, SearchQuery,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

/// A server-side computation reachable through a submit endpoint and a
/// status endpoint keyed by the returned handle.
pub trait AsyncJob: Send + Sync {
    type Output: DeserializeOwned + Send + 'static;

    /// Short label used in log lines.
    fn name(&self) -> &'static str;

    fn submit_path(&self) -> Vec<String>;

    fn submit_query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn submit_body(&self) -> Value;

    fn status_path(&self, handle: &JobHandle) -> Vec<String>;
}

/// Contact search inside one list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSearch {
    pub list_id: String,
    pub query: SearchQuery,
}

impl ContactSearch {
    pub fn new(list_id: impl Into<String>, query: SearchQuery) -> Self {
        Self {
            list_id: list_id.into(),
            query,
        }
    }
}

impl AsyncJob for ContactSearch {
    type Output = SearchPayload;

    fn name(&self) -> &'static str {
        "contact search"
    }

    fn submit_path(&self) -> Vec<String> {
        vec![
            "api".into(),
            "lists".into(),
            self.list_id.clone(),
            "find".into(),
        ]
    }

    fn submit_query(&self) -> Vec<(String, String)> {
        match &self.query.cursor {
            Some(PageCursor::Before(key)) => vec![("before".into(), key.clone())],
            Some(PageCursor::After(key)) => vec![("after".into(), key.clone())],
            None => Vec::new(),
        }
    }

    fn submit_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("search".into(), Value::String(self.query.term.trim().to_owned()));
        if let Some(status) = self.query.filter.as_query_value() {
            body.insert("status".into(), Value::String(status.to_owned()));
        }
        Value::Object(body)
    }

    fn status_path(&self, handle: &JobHandle) -> Vec<String> {
        vec!["api".into(), "listfind".into(), handle.as_str().to_owned()]
    }
}

/// Recipient count and suppression calculation for one broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientCount {
    pub broadcast_id: String,
}

impl RecipientCount {
    pub fn new(broadcast_id: impl Into<String>) -> Self {
        Self {
            broadcast_id: broadcast_id.into(),
        }
    }
}

impl AsyncJob for RecipientCount {
    type Output = CalculationSummary;

    fn name(&self) -> &'static str {
        "recipient count"
    }

    fn submit_path(&self) -> Vec<String> {
        vec![
            "api".into(),
            "broadcasts".into(),
            self.broadcast_id.clone(),
            "calculate".into(),
        ]
    }

    fn submit_body(&self) -> Value {
        json!({})
    }

    fn status_path(&self, handle: &JobHandle) -> Vec<String> {
        vec![
            "api".into(),
            "broadcastcalculate".into(),
            handle.as_str().to_owned(),
        ]
    }
}
