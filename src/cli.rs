use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "apisentry")]
#[command(version, about = "API security probe engine")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan API endpoints for common security weaknesses
    Scan {
        /// API base URL, e.g. https://api.example.com
        #[arg(short, long)]
        url: String,

        /// Comma-separated endpoint paths, e.g. /users,/orders
        #[arg(short, long)]
        endpoints: String,

        /// Bearer token attached to authenticated probe requests
        #[arg(short, long)]
        auth: Option<String>,

        /// Comma-separated tests to run
        #[arg(short, long, default_value = "all")]
        tests: String,

        /// Per-request timeout in milliseconds
        #[arg(long, default_value = "2000")]
        timeout_ms: u64,

        /// Requests in the rate-limit burst
        #[arg(long, default_value = "50")]
        burst: usize,

        /// Intended send window for the burst, milliseconds
        #[arg(long, default_value = "5000")]
        window_ms: u64,

        /// Endpoints scanned concurrently
        #[arg(short, long, default_value = "8")]
        concurrency: usize,

        /// Write the report as JSON
        #[arg(short, long)]
        output: Option<String>,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Re-render a previously exported JSON report
    Report {
        #[arg(short, long)]
        input: String,

        /// console or html
        #[arg(short, long, default_value = "console")]
        format: String,

        #[arg(short, long)]
        output: Option<String>,
    },
}
