use colored::Colorize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use crate::models::{ProbeResult, ScanReport, ScanSummary};

pub struct ConsoleReporter;

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Probe")]
    probe: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_report(&self, report: &ScanReport) {
        self.print_matrix(report);
        self.print_findings(report);
        self.print_summary(report);
    }

    pub fn print_matrix(&self, report: &ScanReport) {
        let rows: Vec<TableRow> = report
            .endpoints
            .iter()
            .flat_map(|endpoint| {
                endpoint.results.iter().map(|result| TableRow {
                    endpoint: endpoint.endpoint.clone(),
                    probe: result.probe.to_string(),
                    outcome: Self::outcome_cell(result),
                })
            })
            .collect();

        if rows.is_empty() {
            return;
        }

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .to_string();

        println!("\n{}", table);
    }

    pub fn print_findings(&self, report: &ScanReport) {
        let mut any = false;

        for endpoint in &report.endpoints {
            for result in endpoint.vulnerable_results() {
                if !any {
                    println!("\n{}", "Findings".bold().underline());
                    any = true;
                }
                println!(
                    "\n[{}] {} {}",
                    "VULNERABLE".red().bold(),
                    result.probe.to_string().yellow(),
                    endpoint.endpoint.white().bold()
                );
                println!("  → {}", result.details);
                println!("    {}: {}", "Fix".cyan(), result.recommendation);
            }
        }

        if !any {
            println!("\n{}", "No vulnerabilities found.".green());
        }
    }

    pub fn print_summary(&self, report: &ScanReport) {
        let summary = ScanSummary::from_report(report);

        println!("\n{}", "Summary".bold().underline());
        println!(
            "{} probes across {} endpoints on {}",
            summary.probes_run, summary.endpoints_scanned, report.base_url
        );

        if summary.vulnerable > 0 {
            println!("  {}: {}", "VULNERABLE".red().bold(), summary.vulnerable);
        }
        if summary.skipped > 0 {
            println!("  {}: {}", "SKIPPED".yellow(), summary.skipped);
        }
        println!("  {}: {}", "OK".green(), summary.clear);
        println!();
    }

    fn outcome_cell(result: &ProbeResult) -> String {
        if result.vulnerable {
            "VULNERABLE".red().bold().to_string()
        } else if result.skipped {
            "SKIPPED".yellow().to_string()
        } else {
            "OK".green().to_string()
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}
