mod engine;

pub use engine::{CancelToken, ScanEngine};

use anyhow::{Result, bail};

/// Parse a comma-separated endpoint list. Order is preserved; it becomes the
/// report order.
pub fn parse_endpoints(input: &str) -> Result<Vec<String>> {
    let mut endpoints = Vec::new();

    for part in input.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !trimmed.starts_with('/') {
            bail!("Endpoint must start with '/': '{}'", trimmed);
        }
        endpoints.push(trimmed.to_string());
    }

    if endpoints.is_empty() {
        bail!("No valid endpoints found in input");
    }

    Ok(endpoints)
}
