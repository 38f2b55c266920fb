mod brute_force;
mod info_disclosure;
mod missing_auth;
mod rate_limit;
mod sql_injection;

pub use brute_force::{BruteForceProbe, DEFAULT_CREDENTIALS};
pub use info_disclosure::InfoDisclosureProbe;
pub use missing_auth::MissingAuthProbe;
pub use rate_limit::RateLimitProbe;
pub use sql_injection::{BODY_FIELDS, SQL_PAYLOADS, SqlInjectionProbe};

use anyhow::{Result, bail};
use async_trait::async_trait;

use crate::config::ScanConfig;
use crate::http::HttpSend;
use crate::models::{ProbeKind, ProbeResult, Target};

/// One vulnerability detection heuristic against one endpoint. `run` must
/// never propagate an error: transport and parsing failures are converted
/// into a non-vulnerable result at the probe boundary.
#[async_trait]
pub trait Probe: Send + Sync {
    fn kind(&self) -> ProbeKind;

    async fn run(&self, client: &dyn HttpSend, target: &Target) -> ProbeResult;
}

/// Instantiate the selected probes in canonical order.
pub fn build_probes(selection: &[ProbeKind], config: &ScanConfig) -> Vec<Box<dyn Probe>> {
    selection
        .iter()
        .map(|kind| -> Box<dyn Probe> {
            match kind {
                ProbeKind::BruteForce => Box::new(BruteForceProbe::new(config)),
                ProbeKind::MissingAuth => Box::new(MissingAuthProbe::new()),
                ProbeKind::SqlInjection => Box::new(SqlInjectionProbe::new(config)),
                ProbeKind::RateLimiting => Box::new(RateLimitProbe::new(config)),
                ProbeKind::InfoDisclosure => Box::new(InfoDisclosureProbe::new(config)),
            }
        })
        .collect()
}

/// Resolve a user-supplied test selection. `all` expands to the full set,
/// duplicates collapse, and the output always follows canonical probe order
/// regardless of input order.
pub fn parse_selection(input: &[String]) -> Result<Vec<ProbeKind>> {
    let mut selected: Vec<ProbeKind> = Vec::new();

    for raw in input {
        let name = raw.trim();
        if name.is_empty() {
            continue;
        }
        if name == "all" {
            for kind in ProbeKind::ALL {
                if !selected.contains(&kind) {
                    selected.push(kind);
                }
            }
            continue;
        }
        match ProbeKind::parse(name) {
            Some(kind) => {
                if !selected.contains(&kind) {
                    selected.push(kind);
                }
            }
            None => bail!(
                "Unknown test: '{}'. Supported: all, brute-force, missing-auth, sql-injection, rate-limiting, info-disclosure",
                name
            ),
        }
    }

    if selected.is_empty() {
        bail!("No tests selected");
    }

    selected.sort_by_key(|kind| ProbeKind::ALL.iter().position(|k| k == kind));
    Ok(selected)
}
