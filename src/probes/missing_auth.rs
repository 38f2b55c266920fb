use async_trait::async_trait;
use tracing::debug;

use crate::http::HttpSend;
use crate::matcher::{SENSITIVE_BODY_TERMS, contains_any};
use crate::models::{AcceptPolicy, ProbeKind, ProbeResult, RequestSpec, Target};

use super::Probe;

const PUBLIC_MARKERS: &[&str] = &["login", "register", "public"];

/// Issues one unauthenticated GET and classifies the endpoint by status.
/// Any 200/201 on a path outside the public skip-list is flagged, with or
/// without sensitive data in the body; the wording softens when the body
/// looks harmless.
pub struct MissingAuthProbe;

impl MissingAuthProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MissingAuthProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for MissingAuthProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::MissingAuth
    }

    async fn run(&self, client: &dyn HttpSend, target: &Target) -> ProbeResult {
        let url = target.full_url();
        let folded = url.to_lowercase();
        if PUBLIC_MARKERS.iter().any(|marker| folded.contains(marker)) {
            return ProbeResult::skipped(self.kind(), "public endpoint");
        }

        // Deliberately no Authorization header, even when a token is configured.
        let spec = RequestSpec::get(&url).accept(AcceptPolicy::BelowServerError);

        match client.send(&spec).await {
            Ok(response) => match response.status {
                200 | 201 => {
                    let text = response.matchable_text();
                    if let Some(term) = contains_any(&text, SENSITIVE_BODY_TERMS) {
                        debug!(%term, "sensitive marker in unauthenticated response");
                        ProbeResult::found(
                            self.kind(),
                            "Endpoint accessible without authentication and returns sensitive data",
                            "Implement proper authentication for this endpoint",
                        )
                    } else {
                        ProbeResult::found(
                            self.kind(),
                            "Endpoint accessible without authentication",
                            "Verify if this endpoint should require authentication",
                        )
                    }
                }
                401 | 403 => ProbeResult::clear(self.kind()),
                other => {
                    ProbeResult::clear_with(self.kind(), format!("Unexpected response ({})", other))
                }
            },
            Err(failure) => ProbeResult::error(self.kind(), failure),
        }
    }
}
