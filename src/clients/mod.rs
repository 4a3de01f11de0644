//! Outbound HTTP collaborators.

pub mod chat_relay;
pub mod upload;

use std::time::Duration;

/// Shared client for outbound calls with the configured request timeout.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}
