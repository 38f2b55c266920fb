use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Which HTTP statuses count as data rather than failure. A 401 on a login
/// attempt or a 429 in a burst is an answer, not an error, depending on the
/// probe asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptPolicy {
    SuccessOnly,
    BelowServerError,
    AnyStatus,
}

impl AcceptPolicy {
    pub fn accepts(self, status: u16) -> bool {
        match self {
            AcceptPolicy::SuccessOnly => (200..300).contains(&status),
            AcceptPolicy::BelowServerError => status < 500,
            AcceptPolicy::AnyStatus => status < 600,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub timeout: Option<Duration>,
    pub accept: AcceptPolicy,
}

impl RequestSpec {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
            accept: AcceptPolicy::SuccessOnly,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
            timeout: None,
            accept: AcceptPolicy::SuccessOnly,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn accept(mut self, policy: AcceptPolicy) -> Self {
        self.accept = policy;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResponse {
    pub status: u16,
    /// Header names lowercased at capture time.
    pub headers: HashMap<String, String>,
    pub body: String,
    pub json: Option<serde_json::Value>,
    pub elapsed_ms: u64,
}

impl ProbeResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// The text fingerprint scans run over: the JSON re-serialization when the
    /// body parsed, the raw body otherwise.
    pub fn matchable_text(&self) -> String {
        match &self.json {
            Some(value) => value.to_string(),
            None => self.body.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("dns resolution failed: {0}")]
    Dns(String),
    #[error("response status {0} outside accepted range")]
    RejectedStatus(u16),
    #[error("transport error: {0}")]
    Other(String),
}
