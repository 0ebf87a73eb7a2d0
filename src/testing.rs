//! Scripted in-memory transport for unit tests

use crate::api::{ApiRequest, Method};
use crate::common::traits::Transport;
use crate::errors::{ClientError, ClientResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Reply {
    Json(serde_json::Value),
    Status(u16, Option<String>),
}

/// Replies per path (sticky until replaced) and records every request
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, Reply>>,
    delays: Mutex<HashMap<String, Duration>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, body: serde_json::Value) {
        self.replies.lock().unwrap().insert(path.to_string(), Reply::Json(body));
    }

    pub fn fail(&self, path: &str, status: u16, message: Option<&str>) {
        self.replies
            .lock()
            .unwrap()
            .insert(path.to_string(), Reply::Status(status, message.map(str::to_string)));
    }

    /// Hold the reply for `path` back by `delay`
    pub fn delay(&self, path: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(path.to_string(), delay);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> ClientResult<serde_json::Value> {
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);

        let delay = self.delays.lock().unwrap().get(&path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().unwrap().get(&path).cloned();
        match reply {
            Some(Reply::Json(body)) => Ok(body),
            Some(Reply::Status(status, message)) => Err(ClientError::Server { status, message }),
            None => Err(ClientError::Network(format!("connection refused: {}", path))),
        }
    }
}
