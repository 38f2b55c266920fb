pub mod cli;
pub mod config;
pub mod http;
pub mod matcher;
pub mod models;
pub mod probes;
pub mod reporter;
pub mod scanner;

pub use config::{Credential, ScanConfig};
pub use http::{HttpSend, ProbeClient};
pub use matcher::SignatureSet;
pub use models::{
    EndpointReport, ProbeKind, ProbeResult, ScanReport, ScanSummary, Target, TransportFailure,
};
pub use probes::Probe;
pub use reporter::{ConsoleReporter, HtmlExporter, JsonExporter};
pub use scanner::{CancelToken, ScanEngine};
