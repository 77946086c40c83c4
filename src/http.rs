use crate::config::HttpSettings;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("farbarter-storefront/", env!("CARGO_PKG_VERSION"));

/// Shared client for every collaborator. One attempt per request; the
/// timeouts bound that attempt.
pub fn build_client(settings: &HttpSettings) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| Client::new())
}
