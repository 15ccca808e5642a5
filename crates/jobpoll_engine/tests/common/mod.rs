#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jobpoll_engine::{ApiError, EngineEvent, EventSink, Transport};
use serde_json::Value;

#[derive(Clone)]
struct Reply {
    delay: Duration,
    body: Result<Value, ApiError>,
}

/// In-memory transport answering from per-route scripts.
///
/// Each route replays its replies in order and repeats the last one once the
/// script is exhausted. Replies are delayed with `tokio::time::sleep`, so a
/// paused test clock controls them.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, route: &str, delay_ms: u64, body: Value) -> &Self {
        self.push(route, delay_ms, Ok(body))
    }

    pub fn fail(&self, route: &str, delay_ms: u64, err: ApiError) -> &Self {
        self.push(route, delay_ms, Err(err))
    }

    fn push(&self, route: &str, delay_ms: u64, body: Result<Value, ApiError>) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default()
            .push_back(Reply {
                delay: Duration::from_millis(delay_ms),
                body,
            });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, route: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.as_str() == route)
            .count()
    }

    async fn answer(&self, route: String) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(route.clone());
        let reply = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&route) {
                Some(script) if script.len() > 1 => script.pop_front(),
                Some(script) => script.front().cloned(),
                None => None,
            }
        };
        match reply {
            Some(reply) => {
                tokio::time::sleep(reply.delay).await;
                reply.body
            }
            None => Err(ApiError::HttpStatus(404)),
        }
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(
        &self,
        segments: &[&str],
        query: &[(String, String)],
        _body: &Value,
    ) -> Result<Value, ApiError> {
        let mut route = format!("POST /{}", segments.join("/"));
        for (key, value) in query {
            route.push_str(&format!("?{key}={value}"));
        }
        self.answer(route).await
    }

    async fn get_json(&self, segments: &[&str]) -> Result<Value, ApiError> {
        self.answer(format!("GET /{}", segments.join("/"))).await
    }
}

#[derive(Default)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
