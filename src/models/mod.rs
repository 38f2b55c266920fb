mod report;
mod request;
mod target;

pub use report::{EndpointReport, ProbeKind, ProbeResult, ScanReport, ScanSummary};
pub use request::{AcceptPolicy, HttpMethod, ProbeResponse, RequestSpec, TransportFailure};
pub use target::Target;
