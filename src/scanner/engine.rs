use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::warn;

use crate::config::ScanConfig;
use crate::http::{HttpSend, ProbeClient};
use crate::models::{EndpointReport, ProbeKind, ScanReport, Target};
use crate::probes::{Probe, build_probes};

/// Cooperative cancellation handle. Cancelling stops the scan at the next
/// probe boundary; results already collected stay valid in the report.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Drives the selected probes across every endpoint. Endpoints fan out under
/// a bounded semaphore; within an endpoint the probes run sequentially in
/// canonical order, so report ordering never depends on completion order.
pub struct ScanEngine {
    client: Arc<dyn HttpSend>,
    base_url: String,
    auth_token: Option<String>,
    probes: Vec<Box<dyn Probe>>,
    semaphore: Arc<Semaphore>,
    cancel: CancelToken,
    verbose: bool,
}

impl ScanEngine {
    pub fn new(
        base_url: &str,
        auth_token: Option<String>,
        selection: &[ProbeKind],
        config: &ScanConfig,
    ) -> Result<Self> {
        let client = Arc::new(ProbeClient::new(config.request_timeout)?);
        Self::with_client(base_url, auth_token, selection, config, client)
    }

    /// Same as [`ScanEngine::new`] but with a caller-supplied transport.
    pub fn with_client(
        base_url: &str,
        auth_token: Option<String>,
        selection: &[ProbeKind],
        config: &ScanConfig,
        client: Arc<dyn HttpSend>,
    ) -> Result<Self> {
        let parsed = reqwest::Url::parse(base_url)
            .with_context(|| format!("Invalid base URL: '{}'", base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("Base URL must use http or https: '{}'", base_url);
        }

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
            probes: build_probes(selection, config),
            semaphore: Arc::new(Semaphore::new(config.concurrency.max(1))),
            cancel: CancelToken::new(),
            verbose: config.verbose,
        })
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub async fn scan(&self, endpoints: &[String]) -> ScanReport {
        let total = endpoints.len() * self.probes.len();
        let pb = self.create_progress_bar(total);

        let futures: Vec<_> = endpoints
            .iter()
            .map(|path| self.scan_endpoint(path, &pb))
            .collect();

        // join_all preserves input order, so the report follows the
        // caller-supplied endpoint order even with concurrent scanning.
        let endpoints = join_all(futures).await;

        pb.finish_with_message("Scan complete");
        ScanReport {
            base_url: self.base_url.clone(),
            endpoints,
        }
    }

    async fn scan_endpoint(&self, path: &str, pb: &ProgressBar) -> EndpointReport {
        let _permit = self.semaphore.acquire().await.expect("Semaphore closed");
        let target = Target::new(&self.base_url, path, self.auth_token.clone());

        let mut results = Vec::with_capacity(self.probes.len());
        for probe in &self.probes {
            if self.cancel.is_cancelled() {
                break;
            }

            pb.set_message(format!("{} {}", probe.kind(), path));
            let result = probe.run(self.client.as_ref(), &target).await;
            if result.vulnerable {
                warn!(
                    probe = %result.probe,
                    endpoint = %path,
                    details = %result.details,
                    "vulnerability detected"
                );
            }
            results.push(result);
            pb.inc(1);
        }

        EndpointReport {
            endpoint: path.to_string(),
            results,
        }
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        let pb = ProgressBar::new(total as u64);

        if self.verbose {
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .expect("Invalid progress bar template")
                    .progress_chars("#>-"),
            );
        } else {
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len}")
                    .expect("Invalid progress bar template")
                    .progress_chars("#>-"),
            );
        }

        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{MockClient, response};
    use crate::models::TransportFailure;

    fn endpoints(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn engine_with(client: MockClient, config: &ScanConfig) -> ScanEngine {
        ScanEngine::with_client(
            "http://localhost:3000",
            None,
            &ProbeKind::ALL,
            config,
            Arc::new(client),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_base_url_fails_fast() {
        let config = ScanConfig::default();
        assert!(ScanEngine::new("not a url", None, &ProbeKind::ALL, &config).is_err());
        assert!(ScanEngine::new("ftp://host", None, &ProbeKind::ALL, &config).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_target_still_yields_complete_report() {
        let client =
            MockClient::new(|_, _| Err(TransportFailure::Connection("refused".to_string())));
        let engine = engine_with(client, &ScanConfig::default());

        let report = engine.scan(&endpoints(&["/api/users", "/api/orders"])).await;

        assert_eq!(report.endpoints.len(), 2);
        for endpoint in &report.endpoints {
            // One result per probe, in canonical order, despite every request
            // failing at the transport.
            let kinds: Vec<ProbeKind> = endpoint.results.iter().map(|r| r.probe).collect();
            assert_eq!(kinds, ProbeKind::ALL.to_vec());
        }
        assert_eq!(report.vulnerability_count(), 0);
    }

    #[tokio::test]
    async fn test_report_follows_endpoint_order() {
        let client = MockClient::new(|_, _| Ok(response(401, "{}")));
        let engine = engine_with(client, &ScanConfig::default());

        let report = engine.scan(&endpoints(&["/b", "/a", "/c"])).await;

        let order: Vec<&str> = report.endpoints.iter().map(|e| e.endpoint.as_str()).collect();
        assert_eq!(order, vec!["/b", "/a", "/c"]);
    }

    #[tokio::test]
    async fn test_cancelled_scan_returns_partial_report() {
        let client = MockClient::new(|_, _| Ok(response(401, "{}")));
        let engine = engine_with(client, &ScanConfig::default());

        engine.cancel_token().cancel();
        let report = engine.scan(&endpoints(&["/api/users"])).await;

        assert_eq!(report.endpoints.len(), 1);
        assert!(report.endpoints[0].results.is_empty());
        assert_eq!(report.vulnerability_count(), 0);
    }

    #[tokio::test]
    async fn test_selection_limits_probes_run() {
        let client = MockClient::new(|_, _| Ok(response(401, "{}")));
        let engine = ScanEngine::with_client(
            "http://localhost:3000",
            None,
            &[ProbeKind::MissingAuth],
            &ScanConfig::default(),
            Arc::new(client),
        )
        .unwrap();

        let report = engine.scan(&endpoints(&["/api/users"])).await;

        assert_eq!(report.endpoints[0].results.len(), 1);
        assert_eq!(report.endpoints[0].results[0].probe, ProbeKind::MissingAuth);
    }
}
