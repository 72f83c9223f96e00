//! Completion backend client and the background worker that drives it

pub mod client;
pub mod worker;

pub use client::{CompletionBackend, OpenAiClient, OpenAiConfig};
pub use worker::{run_completion, InflightClaim, InflightGuard};
