use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::{HttpMethod, ProbeResponse, RequestSpec, TransportFailure};

/// The seam probes talk through. Production code uses [`ProbeClient`]; tests
/// substitute a scripted mock.
#[async_trait]
pub trait HttpSend: Send + Sync {
    async fn send(&self, spec: &RequestSpec) -> Result<ProbeResponse, TransportFailure>;
}

pub struct ProbeClient {
    client: Client,
}

impl ProbeClient {
    pub fn new(default_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(default_timeout)
            .danger_accept_invalid_certs(false)
            .build()?;

        Ok(Self { client })
    }

    fn classify(error: reqwest::Error) -> TransportFailure {
        if error.is_timeout() {
            return TransportFailure::Timeout;
        }
        if error.is_connect() {
            let mut message = error.to_string();
            let mut source = std::error::Error::source(&error);
            while let Some(cause) = source {
                message = format!("{}: {}", message, cause);
                source = cause.source();
            }
            if message.contains("dns") || message.contains("resolve") {
                return TransportFailure::Dns(message);
            }
            return TransportFailure::Connection(message);
        }
        TransportFailure::Other(error.to_string())
    }

    fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }
}

#[async_trait]
impl HttpSend for ProbeClient {
    async fn send(&self, spec: &RequestSpec) -> Result<ProbeResponse, TransportFailure> {
        let start = Instant::now();

        let method = Self::to_reqwest_method(spec.method);
        let mut request = self.client.request(method, &spec.url);

        request = request.header("Accept", "application/json");
        for (name, value) in &spec.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }
        if let Some(timeout) = spec.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(Self::classify)?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = response.text().await.map_err(Self::classify)?;
        let json = serde_json::from_str(&body).ok();
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if !spec.accept.accepts(status) {
            return Err(TransportFailure::RejectedStatus(status));
        }

        Ok(ProbeResponse {
            status,
            headers,
            body,
            json,
            elapsed_ms,
        })
    }
}
