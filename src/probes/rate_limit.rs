use async_trait::async_trait;
use futures::future::join_all;
use std::time::Duration;
use tracing::debug;

use crate::config::ScanConfig;
use crate::http::HttpSend;
use crate::models::{AcceptPolicy, ProbeKind, ProbeResult, RequestSpec, Target};

use super::Probe;

/// Fires a concurrent burst of GETs, each with a distinct spoofed source
/// address, then judges the whole sample: either the API never throttles, or
/// it throttles but the spoofed headers punch through. Both verdicts need the
/// full batch, so nothing is decided until every request has resolved.
pub struct RateLimitProbe {
    burst: usize,
    window: Duration,
    no_limit_threshold: f64,
    bypass_threshold: f64,
}

impl RateLimitProbe {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            burst: config.rate_limit_burst,
            window: config.rate_limit_window,
            no_limit_threshold: config.no_limit_threshold,
            bypass_threshold: config.bypass_threshold,
        }
    }
}

#[async_trait]
impl Probe for RateLimitProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::RateLimiting
    }

    async fn run(&self, client: &dyn HttpSend, target: &Target) -> ProbeResult {
        let url = target.full_url();
        debug!(
            burst = self.burst,
            window_ms = self.window.as_millis() as u64,
            "starting burst"
        );

        let requests = (0..self.burst).map(|i| {
            let spec = RequestSpec::get(&url)
                .accept(AcceptPolicy::AnyStatus)
                .header("X-Forwarded-For", format!("192.168.1.{}", i % 255))
                .header("X-Real-IP", format!("10.0.0.{}", i % 255));
            async move { client.send(&spec).await }
        });

        // Full batch before any verdict; a partial sample proves nothing.
        let outcomes = join_all(requests).await;

        let mut rate_limited = false;
        let mut successes = 0usize;
        for outcome in &outcomes {
            match outcome {
                Ok(response) if response.status == 429 => rate_limited = true,
                Ok(response) if response.is_success() => successes += 1,
                Ok(_) => {}
                Err(failure) => debug!(%failure, "burst request failed"),
            }
        }
        debug!(successes, rate_limited, "burst complete");

        let burst = self.burst as f64;
        if !rate_limited && successes as f64 > burst * self.no_limit_threshold {
            return ProbeResult::found(
                self.kind(),
                format!(
                    "No rate limiting detected ({}/{} requests succeeded)",
                    successes, self.burst
                ),
                "Implement rate limiting to prevent abuse and DoS attacks",
            );
        }
        if rate_limited && successes as f64 > burst * self.bypass_threshold {
            return ProbeResult::found(
                self.kind(),
                "Rate limiting can be bypassed by spoofing IP addresses",
                "Implement rate limiting based on authenticated user or use a more robust \
                 IP detection mechanism",
            );
        }

        ProbeResult::clear(self.kind())
    }
}
