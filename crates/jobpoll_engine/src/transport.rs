use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use crate::{ApiError, EngineSettings};

/// JSON request/response channel to the platform API.
///
/// `segments` are raw path segments appended to the base url; they are
/// percent-encoded by the implementation.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        segments: &[&str],
        query: &[(String, String)],
        body: &Value,
    ) -> Result<Value, ApiError>;

    async fn get_json(&self, segments: &[&str]) -> Result<Value, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: url::Url,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: &EngineSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self {
            base_url: settings.base_url.clone(),
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<url::Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            // Some status endpoints answer an empty body while the job runs.
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(
        &self,
        segments: &[&str],
        query: &[(String, String)],
        body: &Value,
    ) -> Result<Value, ApiError> {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let payload = encode_body(body)?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read_json(response).await
    }

    async fn get_json(&self, segments: &[&str]) -> Result<Value, ApiError> {
        let url = self.endpoint(segments)?;
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read_json(response).await
    }
}

fn encode_body<T: serde::Serialize + ?Sized>(body: &T) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(body).map_err(|err| ApiError::Encode(err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    if let Some(status) = err.status() {
        return ApiError::HttpStatus(status.as_u16());
    }
    ApiError::Network(err.to_string())
}
