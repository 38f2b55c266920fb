mod client;

pub use client::{HttpSend, ProbeClient};
