use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeKind {
    BruteForce,
    MissingAuth,
    SqlInjection,
    RateLimiting,
    InfoDisclosure,
}

impl ProbeKind {
    /// Canonical execution and report order.
    pub const ALL: [ProbeKind; 5] = [
        ProbeKind::BruteForce,
        ProbeKind::MissingAuth,
        ProbeKind::SqlInjection,
        ProbeKind::RateLimiting,
        ProbeKind::InfoDisclosure,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProbeKind::BruteForce => "brute-force",
            ProbeKind::MissingAuth => "missing-auth",
            ProbeKind::SqlInjection => "sql-injection",
            ProbeKind::RateLimiting => "rate-limiting",
            ProbeKind::InfoDisclosure => "info-disclosure",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == s)
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub probe: ProbeKind,
    pub vulnerable: bool,
    pub details: String,
    pub recommendation: String,
    pub skipped: bool,
    pub skip_reason: Option<String>,
}

impl ProbeResult {
    pub fn clear(probe: ProbeKind) -> Self {
        Self {
            probe,
            vulnerable: false,
            details: String::new(),
            recommendation: String::new(),
            skipped: false,
            skip_reason: None,
        }
    }

    /// Not vulnerable, but the response didn't fit the safe classification
    /// either; the ambiguity is recorded rather than dropped.
    pub fn clear_with(probe: ProbeKind, details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
            ..Self::clear(probe)
        }
    }

    pub fn found(
        probe: ProbeKind,
        details: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        let details = details.into();
        let recommendation = recommendation.into();
        debug_assert!(!details.is_empty() && !recommendation.is_empty());
        Self {
            probe,
            vulnerable: true,
            details,
            recommendation,
            skipped: false,
            skip_reason: None,
        }
    }

    pub fn skipped(probe: ProbeKind, reason: impl Into<String>) -> Self {
        Self {
            skipped: true,
            skip_reason: Some(reason.into()),
            ..Self::clear(probe)
        }
    }

    pub fn error(probe: ProbeKind, message: impl fmt::Display) -> Self {
        Self::clear_with(probe, format!("Error during test: {}", message))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointReport {
    pub endpoint: String,
    pub results: Vec<ProbeResult>,
}

impl EndpointReport {
    pub fn vulnerable_results(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| r.vulnerable)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub base_url: String,
    pub endpoints: Vec<EndpointReport>,
}

impl ScanReport {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            endpoints: Vec::new(),
        }
    }

    pub fn results(&self) -> impl Iterator<Item = &ProbeResult> {
        self.endpoints.iter().flat_map(|e| e.results.iter())
    }

    /// Always recomputed from the results, never stored.
    pub fn vulnerability_count(&self) -> usize {
        self.results().filter(|r| r.vulnerable).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub endpoints_scanned: usize,
    pub probes_run: usize,
    pub vulnerable: usize,
    pub skipped: usize,
    pub clear: usize,
}

impl ScanSummary {
    pub fn from_report(report: &ScanReport) -> Self {
        let mut summary = Self {
            endpoints_scanned: report.endpoints.len(),
            probes_run: 0,
            vulnerable: 0,
            skipped: 0,
            clear: 0,
        };

        for result in report.results() {
            summary.probes_run += 1;
            if result.vulnerable {
                summary.vulnerable += 1;
            } else if result.skipped {
                summary.skipped += 1;
            } else {
                summary.clear += 1;
            }
        }

        summary
    }
}
