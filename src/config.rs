use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::matcher::DEBUG_PATHS;
use crate::probes::{BODY_FIELDS, DEFAULT_CREDENTIALS, SQL_PAYLOADS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Everything the engine and probes consume. The payload and credential lists
/// default to the curated constants but stay injectable so tests can run with
/// smaller deterministic lists.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub request_timeout: Duration,
    /// Endpoint fan-out bound.
    pub concurrency: usize,
    pub verbose: bool,

    pub rate_limit_burst: usize,
    pub rate_limit_window: Duration,
    pub no_limit_threshold: f64,
    pub bypass_threshold: f64,

    pub brute_force_attempts: usize,
    pub credentials: Vec<Credential>,

    pub sql_payloads: Vec<String>,
    pub sql_body_fields: Vec<String>,

    pub debug_paths: Vec<String>,
    pub debug_probe_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(2000),
            concurrency: 8,
            verbose: false,
            rate_limit_burst: 50,
            rate_limit_window: Duration::from_millis(5000),
            no_limit_threshold: 0.8,
            bypass_threshold: 0.5,
            brute_force_attempts: 20,
            credentials: DEFAULT_CREDENTIALS
                .iter()
                .map(|(username, password)| Credential::new(username, password))
                .collect(),
            sql_payloads: SQL_PAYLOADS.iter().map(|p| p.to_string()).collect(),
            sql_body_fields: BODY_FIELDS.iter().map(|f| f.to_string()).collect(),
            debug_paths: DEBUG_PATHS.iter().map(|p| p.to_string()).collect(),
            debug_probe_timeout: Duration::from_millis(2000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lists_are_populated() {
        let config = ScanConfig::default();
        assert_eq!(config.credentials.len(), 5);
        assert_eq!(config.sql_payloads.len(), 9);
        assert_eq!(config.sql_body_fields.len(), 6);
        assert_eq!(config.debug_paths.len(), 11);
    }
}
