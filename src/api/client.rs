//! Authenticated HTTP client
//!
//! Single point of outbound communication with the betting API. Every
//! request carries the persisted bearer token (when one exists) and a
//! fresh request id for log correlation. Requests are never retried.

use super::errors::extract_error_message;
use crate::common::traits::{TokenStore, Transport};
use crate::config::ApiConfig;
use crate::errors::{ClientError, ClientResult, ConfigurationError};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        }
    }
}

/// One API call, relative to the configured base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post<B: Serialize>(path: impl Into<String>, body: &B) -> ClientResult<Self> {
        Ok(Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(serde_json::to_value(body)?),
        })
    }

    pub fn put<B: Serialize>(path: impl Into<String>, body: &B) -> ClientResult<Self> {
        Ok(Self {
            method: Method::Put,
            path: path.into(),
            query: Vec::new(),
            body: Some(serde_json::to_value(body)?),
        })
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

/// reqwest-backed transport for the betting API
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http_client: HttpClient,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Create a new client
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let base_url = parse_base_url(&config.base_url)?;

        let http_client = HttpClient::builder()
            .timeout(config.request_timeout())
            .pool_idle_timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            base_url,
            http_client,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn send(&self, request: ApiRequest) -> ClientResult<serde_json::Value> {
        let url = self.endpoint(&request.path)?;
        let request_id = Uuid::new_v4().to_string();

        let mut builder = self
            .http_client
            .request(request.method.into(), url)
            .query(&request.query)
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = self.tokens.get()? {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(%request_id, method = ?request.method, path = %request.path, "Sending API request");
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = extract_error_message(&bytes);
            warn!(
                %request_id,
                status = status.as_u16(),
                path = %request.path,
                reason = message.as_deref().unwrap_or("-"),
                "API request failed"
            );
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Parse the base URL so relative joins keep its path prefix
fn parse_base_url(raw: &str) -> ClientResult<Url> {
    let mut base_url = Url::parse(raw.trim())?;
    match base_url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ConfigurationError::InvalidValue {
                field: "api.base_url".to_string(),
                value: raw.to_string(),
                reason: format!("invalid URL scheme: {} (expected http or https)", scheme),
            }
            .into())
        }
    }
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    Ok(base_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;

    fn client(base_url: &str) -> ClientResult<ApiClient> {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        ApiClient::new(&config, Arc::new(MemoryTokenStore::new()))
    }

    #[test]
    fn test_endpoint_keeps_api_prefix() {
        let client = client("http://localhost:5000/api").unwrap();
        assert_eq!(
            client.endpoint("/users/login").unwrap().as_str(),
            "http://localhost:5000/api/users/login"
        );
        assert_eq!(
            client.endpoint("bets").unwrap().as_str(),
            "http://localhost:5000/api/bets"
        );
    }

    #[test]
    fn test_invalid_scheme() {
        let result = client("ftp://example.com");
        assert!(matches!(
            result,
            Err(ClientError::Configuration(ConfigurationError::InvalidValue { .. }))
        ));

        assert!(client("https://bets.example.com/api/").is_ok());
        assert!(client("not a url").is_err());
    }

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::get("/bets")
            .with_query(vec![("limit".to_string(), "10".to_string())]);
        assert_eq!(request.method, Method::Get);
        assert!(request.body.is_none());

        let body = serde_json::json!({"amount": 100});
        let request = ApiRequest::post("/transactions/deposit/create", &body).unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body.unwrap()["amount"], 100);
    }
}
