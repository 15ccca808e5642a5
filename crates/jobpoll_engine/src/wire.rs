//! Decoding of submit and status response bodies.
//!
//! Both endpoints share one shape: `{ "error": ... }` is a job failure,
//! `{ "complete": true, ... }` carries the payload (wrapped in `result` or
//! flattened next to `complete`), `{ "id": ... }` from a submit is a job
//! handle, and anything else from a status request means the job is still
//! running.

use jobpoll_core::{JobHandle, JobStatus};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ApiError, Submission};

pub fn parse_status<P: DeserializeOwned>(body: Value) -> Result<JobStatus<P>, ApiError> {
    let mut map = into_object(body)?;

    if let Some(message) = job_error(&map) {
        return Ok(JobStatus::Failed(message));
    }
    if !is_complete(&map) {
        return Ok(JobStatus::Pending);
    }

    let payload = match map.remove("result") {
        Some(result) => result,
        None => {
            map.remove("complete");
            Value::Object(map)
        }
    };
    serde_json::from_value(payload)
        .map(JobStatus::Complete)
        .map_err(|err| ApiError::Decode(err.to_string()))
}

pub fn parse_submission<P: DeserializeOwned>(body: Value) -> Result<Submission<P>, ApiError> {
    let map = into_object(body)?;

    if job_error(&map).is_none() && !is_complete(&map) {
        return match map.get("id") {
            Some(Value::String(id)) if !id.is_empty() => {
                Ok(Submission::Deferred(JobHandle::new(id.clone())))
            }
            Some(Value::Number(id)) => Ok(Submission::Deferred(JobHandle::new(id.to_string()))),
            _ => Err(ApiError::Unexpected(
                "submit response carried neither a job id nor a result".into(),
            )),
        };
    }

    match parse_status(Value::Object(map))? {
        JobStatus::Complete(payload) => Ok(Submission::Immediate(payload)),
        JobStatus::Failed(message) => Ok(Submission::Failed(message)),
        JobStatus::Pending => Err(ApiError::Unexpected("submit response is pending".into())),
    }
}

fn into_object(body: Value) -> Result<Map<String, Value>, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(ApiError::Unexpected(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

fn job_error(map: &Map<String, Value>) -> Option<String> {
    match map.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

fn is_complete(map: &Map<String, Value>) -> bool {
    map.get("complete").and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use jobpoll_core::{CalculationSummary, SearchPayload};
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_and_incomplete_bodies_are_pending() {
        assert_eq!(
            parse_status::<CalculationSummary>(json!({})).unwrap(),
            JobStatus::Pending
        );
        assert_eq!(
            parse_status::<CalculationSummary>(json!({"complete": false})).unwrap(),
            JobStatus::Pending
        );
    }

    #[test]
    fn flattened_calculation_status_decodes() {
        let status = parse_status::<CalculationSummary>(json!({
            "complete": true,
            "suppressed": 4,
            "remaining": 90,
            "unavailable": 6,
            "count": 100
        }))
        .unwrap();
        assert_eq!(
            status,
            JobStatus::Complete(CalculationSummary {
                count: 100,
                suppressed: 4,
                remaining: 90,
                unavailable: 6,
            })
        );
    }

    #[test]
    fn wrapped_search_result_decodes() {
        let status = parse_status::<SearchPayload>(json!({
            "complete": true,
            "result": {"rows": [{"email": "a@x.com"}], "total": 1}
        }))
        .unwrap();
        match status {
            JobStatus::Complete(payload) => assert_eq!(payload.first_key(), Some("a@x.com")),
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn error_wins_over_completion() {
        let status =
            parse_status::<SearchPayload>(json!({"complete": true, "error": "bad query"}))
                .unwrap();
        assert_eq!(status, JobStatus::Failed("bad query".into()));
    }

    #[test]
    fn submission_distinguishes_handle_and_immediate_result() {
        match parse_submission::<SearchPayload>(json!({"id": "abc"})).unwrap() {
            Submission::Deferred(handle) => assert_eq!(handle.as_str(), "abc"),
            other => panic!("unexpected submission {other:?}"),
        }
        match parse_submission::<SearchPayload>(json!({"complete": true, "result": {}})).unwrap()
        {
            Submission::Immediate(payload) => assert_eq!(payload.total, 0),
            other => panic!("unexpected submission {other:?}"),
        }
        assert!(matches!(
            parse_submission::<SearchPayload>(json!({})),
            Err(ApiError::Unexpected(_))
        ));
        assert!(matches!(
            parse_submission::<SearchPayload>(json!([1, 2])),
            Err(ApiError::Unexpected(_))
        ));
    }
}
