use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use tera::{Context as TeraContext, Tera};

use crate::models::{ScanReport, ScanSummary};

#[derive(Serialize, Deserialize)]
struct ExportData {
    scan_time: String,
    vulnerability_count: usize,
    summary: ScanSummary,
    report: ScanReport,
}

pub struct JsonExporter;

impl JsonExporter {
    pub fn export(report: &ScanReport, path: &str) -> Result<()> {
        let output = ExportData {
            scan_time: Utc::now().to_rfc3339(),
            vulnerability_count: report.vulnerability_count(),
            summary: ScanSummary::from_report(report),
            report: report.clone(),
        };

        let json = serde_json::to_string_pretty(&output)?;
        fs::write(path, json).with_context(|| format!("Failed to write to {}", path))?;
        Ok(())
    }

    pub fn load(path: &str) -> Result<ScanReport> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;

        let data: ExportData = serde_json::from_str(&content)?;
        Ok(data.report)
    }
}

pub struct HtmlExporter;

impl HtmlExporter {
    pub fn export(report: &ScanReport, path: &str) -> Result<()> {
        let mut tera = Tera::default();
        tera.add_raw_template("report", TEMPLATE)?;

        let summary = ScanSummary::from_report(report);

        #[derive(Serialize)]
        struct HtmlRow {
            endpoint: String,
            probe: String,
            outcome: String,
            outcome_class: String,
            details: String,
            recommendation: String,
        }

        let rows: Vec<HtmlRow> = report
            .endpoints
            .iter()
            .flat_map(|endpoint| {
                endpoint.results.iter().map(|result| {
                    let (outcome, outcome_class) = if result.vulnerable {
                        ("VULNERABLE", "vulnerable")
                    } else if result.skipped {
                        ("SKIPPED", "skipped")
                    } else {
                        ("OK", "ok")
                    };
                    HtmlRow {
                        endpoint: endpoint.endpoint.clone(),
                        probe: result.probe.to_string(),
                        outcome: outcome.to_string(),
                        outcome_class: outcome_class.to_string(),
                        details: if result.skipped {
                            result.skip_reason.clone().unwrap_or_default()
                        } else {
                            result.details.clone()
                        },
                        recommendation: result.recommendation.clone(),
                    }
                })
            })
            .collect();

        let mut context = TeraContext::new();
        context.insert(
            "scan_time",
            &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        context.insert("base_url", &report.base_url);
        context.insert("vulnerability_count", &report.vulnerability_count());
        context.insert("endpoints_scanned", &summary.endpoints_scanned);
        context.insert("probes_run", &summary.probes_run);
        context.insert("rows", &rows);

        let html = tera.render("report", &context)?;
        fs::write(path, html).with_context(|| format!("Failed to write to {}", path))?;
        Ok(())
    }
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>apisentry report</title>
<style>
  body { font-family: -apple-system, sans-serif; margin: 2rem auto; max-width: 960px; color: #222; }
  h1 { font-size: 1.4rem; }
  .meta { color: #666; margin-bottom: 1.5rem; }
  table { border-collapse: collapse; width: 100%; }
  th, td { text-align: left; padding: 0.5rem 0.75rem; border-bottom: 1px solid #ddd; vertical-align: top; }
  th { background: #f5f5f5; }
  .vulnerable { color: #b00020; font-weight: bold; }
  .skipped { color: #9a6700; }
  .ok { color: #1a7f37; }
  .rec { color: #555; font-size: 0.9em; }
</style>
</head>
<body>
<h1>API security scan — {{ base_url }}</h1>
<p class="meta">
  {{ scan_time }} · {{ probes_run }} probes across {{ endpoints_scanned }} endpoints ·
  {{ vulnerability_count }} vulnerabilities
</p>
<table>
  <tr><th>Endpoint</th><th>Probe</th><th>Outcome</th><th>Details</th></tr>
  {% for row in rows %}
  <tr>
    <td>{{ row.endpoint }}</td>
    <td>{{ row.probe }}</td>
    <td class="{{ row.outcome_class }}">{{ row.outcome }}</td>
    <td>
      {{ row.details }}
      {% if row.recommendation %}<div class="rec">Fix: {{ row.recommendation }}</div>{% endif %}
    </td>
  </tr>
  {% endfor %}
</table>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndpointReport, ProbeKind, ProbeResult};

    fn sample_report() -> ScanReport {
        ScanReport {
            base_url: "http://localhost:3000".to_string(),
            endpoints: vec![EndpointReport {
                endpoint: "/api/users".to_string(),
                results: vec![
                    ProbeResult::found(ProbeKind::MissingAuth, "open endpoint", "add auth"),
                    ProbeResult::skipped(ProbeKind::BruteForce, "not a login endpoint"),
                ],
            }],
        }
    }

    #[test]
    fn test_json_round_trip() {
        let dir = std::env::temp_dir().join("apisentry-test-json");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("report.json");
        let path = path.to_str().unwrap();

        let report = sample_report();
        JsonExporter::export(&report, path).unwrap();
        let loaded = JsonExporter::load(path).unwrap();

        assert_eq!(loaded.base_url, report.base_url);
        assert_eq!(loaded.vulnerability_count(), 1);
        assert_eq!(loaded.endpoints[0].results, report.endpoints[0].results);
    }

    #[test]
    fn test_html_render() {
        let dir = std::env::temp_dir().join("apisentry-test-html");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("report.html");
        let path = path.to_str().unwrap();

        HtmlExporter::export(&sample_report(), path).unwrap();
        let html = fs::read_to_string(path).unwrap();

        assert!(html.contains("missing-auth"));
        assert!(html.contains("VULNERABLE"));
        assert!(html.contains("add auth"));
    }
}
