use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::{Credential, ScanConfig};
use crate::http::HttpSend;
use crate::models::{ProbeKind, ProbeResponse, ProbeResult, RequestSpec, Target, TransportFailure};

use super::Probe;

pub const DEFAULT_CREDENTIALS: &[(&str, &str)] = &[
    ("admin", "admin"),
    ("admin", "password"),
    ("user", "password"),
    ("test", "test"),
    ("guest", "guest"),
];

const LOGIN_MARKERS: &[&str] = &["login", "auth", "signin"];

/// Tries a short list of default credentials against login-shaped endpoints,
/// then checks whether repeated failures ever get throttled.
pub struct BruteForceProbe {
    credentials: Vec<Credential>,
    lockout_attempts: usize,
}

impl BruteForceProbe {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            credentials: config.credentials.clone(),
            lockout_attempts: config.brute_force_attempts,
        }
    }

    fn login_succeeded(response: &ProbeResponse) -> bool {
        if response.status != 200 {
            return false;
        }
        let Some(body) = &response.json else {
            return false;
        };
        field_present(body, "token")
            || field_present(body, "access_token")
            || body.get("success").and_then(Value::as_bool) == Some(true)
    }
}

fn field_present(body: &Value, key: &str) -> bool {
    body.get(key).is_some_and(|v| !v.is_null())
}

#[async_trait]
impl Probe for BruteForceProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::BruteForce
    }

    async fn run(&self, client: &dyn HttpSend, target: &Target) -> ProbeResult {
        let url = target.full_url();
        let folded = url.to_lowercase();
        if !LOGIN_MARKERS.iter().any(|marker| folded.contains(marker)) {
            return ProbeResult::skipped(self.kind(), "not a login endpoint");
        }

        for cred in &self.credentials {
            debug!(username = %cred.username, "trying credential pair");

            let mut spec = RequestSpec::post_json(
                &url,
                json!({ "username": cred.username, "password": cred.password }),
            );
            if let Some(token) = &target.auth_token {
                spec = spec.bearer(token);
            }

            match client.send(&spec).await {
                Ok(response) if Self::login_succeeded(&response) => {
                    return ProbeResult::found(
                        self.kind(),
                        format!(
                            "Successfully logged in with {}/{}",
                            cred.username, cred.password
                        ),
                        "Implement account lockout after multiple failed attempts, use CAPTCHA, \
                         and enforce strong password policies",
                    );
                }
                // A rejection or transport failure is just a failed attempt.
                Ok(_) | Err(_) => {}
            }
        }

        // No pair got in; an unthrottled login surface is still brute-forceable.
        let mut rate_limited = false;
        for attempt in 0..self.lockout_attempts {
            let spec = RequestSpec::post_json(
                &url,
                json!({ "username": "admin", "password": format!("wrong{}", attempt) }),
            );
            match client.send(&spec).await {
                Err(TransportFailure::RejectedStatus(429)) => {
                    debug!(attempt, "throttled during failed-login burst");
                    rate_limited = true;
                    break;
                }
                Ok(_) | Err(_) => {}
            }
        }

        if rate_limited {
            ProbeResult::clear(self.kind())
        } else {
            ProbeResult::found(
                self.kind(),
                "No rate limiting detected for multiple failed login attempts",
                "Implement rate limiting to prevent brute force attacks",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{MockClient, response};

    fn probe() -> BruteForceProbe {
        BruteForceProbe::new(&ScanConfig::default())
    }

    fn login_target() -> Target {
        Target::new("http://localhost:3000", "/api/login", None)
    }

    fn body_field<'a>(spec: &'a RequestSpec, key: &str) -> &'a str {
        spec.body
            .as_ref()
            .and_then(|b| b.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_skips_non_login_endpoints() {
        let client = MockClient::new(|_, _| Ok(response(200, "{}")));
        let target = Target::new("http://localhost:3000", "/api/products", None);

        let result = probe().run(&client, &target).await;

        assert!(result.skipped);
        assert!(!result.vulnerable);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_reports_successful_credential_pair() {
        // Third pair (user/password) logs in; everything else is a 401.
        let client = MockClient::new(|spec, _| {
            if body_field(spec, "username") == "user" && body_field(spec, "password") == "password"
            {
                Ok(response(200, "{\"token\": \"x\"}"))
            } else {
                Ok(response(401, "{\"error\": \"unauthorized\"}"))
            }
        });

        let result = probe().run(&client, &login_target()).await;

        assert!(result.vulnerable);
        assert_eq!(result.details, "Successfully logged in with user/password");
        assert!(!result.recommendation.is_empty());
        // Stopped at the third pair, no lockout burst.
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unthrottled_failures_are_vulnerable() {
        let client = MockClient::new(|_, _| Ok(response(401, "{\"error\": \"unauthorized\"}")));

        let result = probe().run(&client, &login_target()).await;

        assert!(result.vulnerable);
        assert!(result.details.contains("No rate limiting detected"));
        // 5 credential pairs + full 20-attempt burst.
        assert_eq!(client.call_count(), 25);
    }

    #[tokio::test]
    async fn test_throttled_burst_is_clear() {
        // Failed-login burst gets a 429 on its first attempt.
        let client = MockClient::new(|spec, _| {
            if body_field(spec, "password").starts_with("wrong") {
                Ok(response(429, "{\"error\": \"too many requests\"}"))
            } else {
                Ok(response(401, "{}"))
            }
        });

        let result = probe().run(&client, &login_target()).await;

        assert!(!result.vulnerable);
        assert!(!result.skipped);
        assert_eq!(client.call_count(), 6);
    }

    #[tokio::test]
    async fn test_success_flag_counts_as_login() {
        let client = MockClient::new(|spec, _| {
            if body_field(spec, "username") == "admin" && body_field(spec, "password") == "admin" {
                Ok(response(200, "{\"success\": true}"))
            } else {
                Ok(response(401, "{}"))
            }
        });

        let result = probe().run(&client, &login_target()).await;

        assert!(result.vulnerable);
        assert_eq!(result.details, "Successfully logged in with admin/admin");
    }

    #[tokio::test]
    async fn test_transport_failures_are_failed_attempts() {
        let client = MockClient::new(|_, _| {
            Err(TransportFailure::Connection("connection refused".to_string()))
        });

        let result = probe().run(&client, &login_target()).await;

        // Nothing answered, nothing throttled: flagged, not errored.
        assert!(result.vulnerable);
        assert!(result.details.contains("No rate limiting detected"));
    }

    #[tokio::test]
    async fn test_runs_are_idempotent() {
        let client = MockClient::new(|spec, _| {
            if body_field(spec, "username") == "user" && body_field(spec, "password") == "password"
            {
                Ok(response(200, "{\"token\": \"x\"}"))
            } else {
                Ok(response(401, "{}"))
            }
        });

        let probe = probe();
        let first = probe.run(&client, &login_target()).await;
        let second = probe.run(&client, &login_target()).await;

        assert_eq!(first, second);
    }
}
