use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use apisentry::cli::{Cli, Commands};
use apisentry::config::ScanConfig;
use apisentry::reporter::{ConsoleReporter, HtmlExporter, JsonExporter};
use apisentry::scanner::{self, ScanEngine};
use apisentry::{probes, ScanReport};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            std::process::exit(2);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Scan {
            url,
            endpoints,
            auth,
            tests,
            timeout_ms,
            burst,
            window_ms,
            concurrency,
            output,
            verbose,
        } => {
            init_tracing(verbose);

            let selection_input: Vec<String> =
                tests.split(',').map(|t| t.trim().to_string()).collect();
            let selection = probes::parse_selection(&selection_input)?;
            let endpoints = scanner::parse_endpoints(&endpoints)?;

            let config = ScanConfig {
                request_timeout: Duration::from_millis(timeout_ms),
                rate_limit_burst: burst,
                rate_limit_window: Duration::from_millis(window_ms),
                concurrency,
                verbose,
                ..ScanConfig::default()
            };

            println!("{}", "API Security Scan".blue().bold());
            println!("{} {}", "Target:".blue(), url);
            println!("{} {}", "Endpoints:".blue(), endpoints.join(", "));
            println!(
                "{} {}\n",
                "Tests:".blue(),
                selection
                    .iter()
                    .map(|k| k.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            let engine = ScanEngine::new(&url, auth, &selection, &config)?;
            let report = engine.scan(&endpoints).await;

            ConsoleReporter::new().print_report(&report);

            if let Some(path) = output {
                JsonExporter::export(&report, &path)?;
                println!("Report written to {}", path);
            }

            Ok(exit_code(&report))
        }

        Commands::Report {
            input,
            format,
            output,
        } => {
            let report = JsonExporter::load(&input)?;
            match format.as_str() {
                "console" => ConsoleReporter::new().print_report(&report),
                "html" => {
                    let path = output.unwrap_or_else(|| "report.html".to_string());
                    HtmlExporter::export(&report, &path)?;
                    println!("Report written to {}", path);
                }
                other => bail!("Unknown format: '{}'. Supported: console, html", other),
            }
            Ok(0)
        }
    }
}

fn exit_code(report: &ScanReport) -> i32 {
    if report.vulnerability_count() > 0 { 1 } else { 0 }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "apisentry=debug"
    } else {
        "apisentry=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
