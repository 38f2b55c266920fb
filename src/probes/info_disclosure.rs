use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

use crate::config::ScanConfig;
use crate::http::HttpSend;
use crate::matcher::{ERROR_FINGERPRINTS, SENSITIVE_HEADERS, SENSITIVE_TERMS, SignatureSet};
use crate::models::{AcceptPolicy, ProbeKind, ProbeResult, RequestSpec, Target};

use super::Probe;

const RECOMMENDATION: &str = "Remove version information from headers, disable detailed error \
     messages in production, and secure or disable debug endpoints";

/// Looks for everything an API leaks without being attacked: stack headers,
/// verbose error bodies, secret-shaped response text, and reachable debug
/// surfaces. Every applicable finding is recorded, not just the first.
pub struct InfoDisclosureProbe {
    debug_paths: Vec<String>,
    debug_timeout: Duration,
    error_fingerprints: SignatureSet,
    sensitive_terms: SignatureSet,
}

impl InfoDisclosureProbe {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            debug_paths: config.debug_paths.clone(),
            debug_timeout: config.debug_probe_timeout,
            error_fingerprints: SignatureSet::new(ERROR_FINGERPRINTS.iter().copied()),
            sensitive_terms: SignatureSet::new(SENSITIVE_TERMS.iter().copied()),
        }
    }

    /// Debug surfaces live on the origin, not under the endpoint path. The
    /// first one answering 200 is reported.
    async fn find_debug_endpoint(&self, client: &dyn HttpSend, url: &str) -> Option<String> {
        let origin = Url::parse(url).ok()?;

        for path in &self.debug_paths {
            let debug_url = match origin.join(path) {
                Ok(url) => url,
                Err(_) => continue,
            };

            let spec = RequestSpec::get(debug_url.as_str())
                .accept(AcceptPolicy::AnyStatus)
                .timeout(self.debug_timeout);

            match client.send(&spec).await {
                Ok(response) if response.status == 200 => {
                    debug!(path = %path, "debug endpoint answered");
                    return Some(path.clone());
                }
                Ok(_) | Err(_) => {}
            }
        }

        None
    }
}

#[async_trait]
impl Probe for InfoDisclosureProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::InfoDisclosure
    }

    async fn run(&self, client: &dyn HttpSend, target: &Target) -> ProbeResult {
        let url = target.full_url();

        let response = match client.send(&RequestSpec::get(&url).accept(AcceptPolicy::AnyStatus)).await
        {
            Ok(response) => response,
            Err(failure) => return ProbeResult::error(self.kind(), failure),
        };

        let mut findings: Vec<String> = Vec::new();

        let leaked: Vec<String> = SENSITIVE_HEADERS
            .iter()
            .filter_map(|name| {
                response
                    .header(name)
                    .map(|value| format!("{}: {}", name, value))
            })
            .collect();
        if !leaked.is_empty() {
            findings.push(format!("Sensitive headers: {}", leaked.join(", ")));
        }

        let text = response.matchable_text();
        if (400..600).contains(&response.status) {
            if let Some(fingerprint) = self.error_fingerprints.first_match(&text) {
                findings.push(format!("Error response contains \"{}\"", fingerprint));
            }
        }
        if let Some(term) = self.sensitive_terms.first_match(&text) {
            findings.push(format!("Response contains \"{}\"", term));
        }

        if let Some(path) = self.find_debug_endpoint(client, &url).await {
            findings.push(format!("Debug endpoint accessible: {}", path));
        }

        if findings.is_empty() {
            ProbeResult::clear(self.kind())
        } else {
            ProbeResult::found(self.kind(), findings.join("; "), RECOMMENDATION)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{MockClient, response, response_with_headers};

    fn probe() -> InfoDisclosureProbe {
        InfoDisclosureProbe::new(&ScanConfig::default())
    }

    fn target() -> Target {
        Target::new("http://localhost:3000", "/api/items", None)
    }

    #[tokio::test]
    async fn test_clean_target_is_clear() {
        let client = MockClient::new(|spec, _| {
            if spec.url.ends_with("/api/items") {
                Ok(response(200, "{\"ok\": true}"))
            } else {
                Ok(response(404, "{}"))
            }
        });

        let result = probe().run(&client, &target()).await;

        assert!(!result.vulnerable);
        // Main request plus every debug path.
        assert_eq!(client.call_count(), 12);
    }

    #[tokio::test]
    async fn test_sensitive_headers_are_reported_with_values() {
        let client = MockClient::new(|spec, _| {
            if spec.url.ends_with("/api/items") {
                Ok(response_with_headers(
                    200,
                    "{\"ok\": true}",
                    &[("Server", "nginx/1.18.0"), ("X-Powered-By", "Express")],
                ))
            } else {
                Ok(response(404, "{}"))
            }
        });

        let result = probe().run(&client, &target()).await;

        assert!(result.vulnerable);
        assert!(result.details.contains("server: nginx/1.18.0"));
        assert!(result.details.contains("x-powered-by: Express"));
    }

    #[tokio::test]
    async fn test_error_fingerprint_only_checked_on_error_statuses() {
        let client = MockClient::new(|spec, _| {
            if spec.url.ends_with("/api/items") {
                Ok(response(200, "{\"message\": \"Exception while rendering\"}"))
            } else {
                Ok(response(404, "{}"))
            }
        });

        let result = probe().run(&client, &target()).await;

        // A 200 body mentioning "exception" trips nothing in the error set.
        assert!(!result.details.contains("Error response contains"));
    }

    #[tokio::test]
    async fn test_all_findings_are_concatenated() {
        let client = MockClient::new(|spec, _| {
            if spec.url.ends_with("/api/items") {
                Ok(response_with_headers(
                    500,
                    "{\"error\": \"stack trace: secret leaked\"}",
                    &[("Server", "nginx")],
                ))
            } else if spec.url.ends_with("/debug") {
                Ok(response(200, "{\"debug\": true}"))
            } else {
                Ok(response(404, "{}"))
            }
        });

        let result = probe().run(&client, &target()).await;

        assert!(result.vulnerable);
        let parts: Vec<&str> = result.details.split("; ").collect();
        assert_eq!(parts.len(), 4);
        assert!(parts[0].starts_with("Sensitive headers: server: nginx"));
        assert_eq!(parts[1], "Error response contains \"stack trace\"");
        assert_eq!(parts[2], "Response contains \"secret\"");
        assert_eq!(parts[3], "Debug endpoint accessible: /debug");
    }

    #[tokio::test]
    async fn test_first_open_debug_endpoint_wins() {
        let client = MockClient::new(|spec, _| {
            if spec.url.ends_with("/api/items") {
                Ok(response(200, "{\"ok\": true}"))
            } else if spec.url.ends_with("/health") || spec.url.ends_with("/metrics") {
                Ok(response(200, "{\"up\": true}"))
            } else {
                Ok(response(404, "{}"))
            }
        });

        let result = probe().run(&client, &target()).await;

        assert!(result.vulnerable);
        // /status precedes /health in the path list; /health answers first.
        assert_eq!(result.details, "Debug endpoint accessible: /health");
    }

    #[tokio::test]
    async fn test_debug_probes_carry_short_timeout() {
        let client = MockClient::new(|spec, _| {
            if spec.url.ends_with("/api/items") {
                Ok(response(200, "{\"ok\": true}"))
            } else {
                Ok(response(404, "{}"))
            }
        });

        probe().run(&client, &target()).await;

        for spec in client.calls().iter().skip(1) {
            assert_eq!(spec.timeout, Some(Duration::from_millis(2000)));
        }
    }

    #[tokio::test]
    async fn test_unreachable_target_is_an_error_result() {
        let client = MockClient::new(|_, _| {
            Err(crate::models::TransportFailure::Dns("no such host".to_string()))
        });

        let result = probe().run(&client, &target()).await;

        assert!(!result.vulnerable);
        assert!(result.details.starts_with("Error during test:"));
        assert_eq!(client.call_count(), 1);
    }
}
