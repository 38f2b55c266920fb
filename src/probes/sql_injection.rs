use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::config::ScanConfig;
use crate::http::HttpSend;
use crate::matcher::{SQL_ERROR_FINGERPRINTS, SUSPICIOUS_SQL_TOKENS, SignatureSet, contains_any};
use crate::models::{AcceptPolicy, ProbeKind, ProbeResult, RequestSpec, Target};

use super::Probe;

pub const SQL_PAYLOADS: &[&str] = &[
    "' OR '1'='1",
    "' OR '1'='1' --",
    "' OR 1=1 --",
    "admin' --",
    "1' OR '1' = '1",
    "1 OR 1=1",
    "' UNION SELECT 1,2,3 --",
    "' UNION SELECT username,password,1 FROM users --",
    "'; DROP TABLE users; --",
];

/// Body field names an API is likely to feed into a query.
pub const BODY_FIELDS: &[&str] = &["id", "userId", "username", "email", "search", "query"];

const REMEDIATION: &str =
    "Use parameterized queries or prepared statements instead of string concatenation";

/// Injects the payload list into existing query parameters (GET), then into
/// common JSON body fields (POST). Trial order is fixed and the first hit
/// stops everything, so the reported payload/parameter pair is deterministic.
pub struct SqlInjectionProbe {
    payloads: Vec<String>,
    body_fields: Vec<String>,
    sql_errors: SignatureSet,
}

impl SqlInjectionProbe {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            payloads: config.sql_payloads.clone(),
            body_fields: config.sql_body_fields.clone(),
            sql_errors: SignatureSet::new(SQL_ERROR_FINGERPRINTS.iter().copied()),
        }
    }

    async fn probe_query_params(
        &self,
        client: &dyn HttpSend,
        url: &Url,
        params: &[(String, String)],
    ) -> Option<ProbeResult> {
        let base = {
            let mut stripped = url.clone();
            stripped.set_query(None);
            stripped.to_string()
        };

        for (index, (key, _)) in params.iter().enumerate() {
            for payload in &self.payloads {
                let query = params
                    .iter()
                    .enumerate()
                    .map(|(i, (k, v))| {
                        let value = if i == index { payload.as_str() } else { v.as_str() };
                        format!("{}={}", urlencoding::encode(k), urlencoding::encode(value))
                    })
                    .collect::<Vec<_>>()
                    .join("&");
                let test_url = format!("{}?{}", base, query);

                debug!(parameter = %key, %payload, "testing query parameter");
                let spec = RequestSpec::get(&test_url).accept(AcceptPolicy::BelowServerError);

                let Ok(response) = client.send(&spec).await else {
                    // No response, no evidence.
                    continue;
                };

                let text = response.matchable_text();
                if let Some(fingerprint) = self.sql_errors.first_match(&text) {
                    return Some(ProbeResult::found(
                        self.kind(),
                        format!(
                            "Vulnerable to SQL injection on parameter \"{}\" with payload: {} \
                             (response contains \"{}\")",
                            key, payload, fingerprint
                        ),
                        REMEDIATION,
                    ));
                }
                if response.status == 200 && contains_any(&text, SUSPICIOUS_SQL_TOKENS).is_some() {
                    return Some(ProbeResult::found(
                        self.kind(),
                        format!(
                            "Suspicious data in response for parameter \"{}\" with payload: {}",
                            key, payload
                        ),
                        REMEDIATION,
                    ));
                }
            }
        }

        None
    }

    async fn probe_body_fields(&self, client: &dyn HttpSend, url: &str) -> Option<ProbeResult> {
        for payload in &self.payloads {
            for field in &self.body_fields {
                let mut body = serde_json::Map::new();
                body.insert(field.clone(), Value::String(payload.clone()));

                debug!(field = %field, %payload, "testing body field");
                let spec = RequestSpec::post_json(url, Value::Object(body))
                    .accept(AcceptPolicy::BelowServerError);

                let Ok(response) = client.send(&spec).await else {
                    continue;
                };

                if let Some(fingerprint) = self.sql_errors.first_match(&response.matchable_text())
                {
                    return Some(ProbeResult::found(
                        self.kind(),
                        format!(
                            "Vulnerable to SQL injection in body field \"{}\" with payload: {} \
                             (response contains \"{}\")",
                            field, payload, fingerprint
                        ),
                        REMEDIATION,
                    ));
                }
            }
        }

        None
    }
}

#[async_trait]
impl Probe for SqlInjectionProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::SqlInjection
    }

    async fn run(&self, client: &dyn HttpSend, target: &Target) -> ProbeResult {
        let full_url = target.full_url();
        let url = match Url::parse(&full_url) {
            Ok(url) => url,
            Err(e) => return ProbeResult::error(self.kind(), format!("invalid target URL: {}", e)),
        };

        let params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if !params.is_empty() {
            if let Some(result) = self.probe_query_params(client, &url, &params).await {
                return result;
            }
        }

        if let Some(result) = self.probe_body_fields(client, &full_url).await {
            return result;
        }

        ProbeResult::clear(self.kind())
    }
}
