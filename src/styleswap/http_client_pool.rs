//! HTTP client pool for provider endpoints.
//!
//! Each base URL gets one configured `reqwest::Client` that is shared by every provider client
//! pointing at it, so repeated generations reuse connections instead of paying DNS and TLS
//! setup on every call.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::time::Duration;

/// Global cache of HTTP clients indexed by base URL.
static CLIENT_POOL: Lazy<DashMap<String, reqwest::Client>> = Lazy::new(DashMap::new);

/// Creates or retrieves a shared HTTP client for the given base URL.
///
/// No request timeout is configured; generation calls run for as long as the transport
/// allows.
pub fn get_or_create_client(base_url: &str) -> reqwest::Client {
    CLIENT_POOL
        .entry(base_url.trim_end_matches('/').to_string())
        .or_insert_with(create_pooled_client)
        .clone()
}

/// Creates a new reqwest client with connection pooling settings.
///
/// - `pool_max_idle_per_host(16)`
/// - `pool_idle_timeout(90s)`
/// - `tcp_keepalive(60s)`
/// - `connect_timeout(30s)`
fn create_pooled_client() -> reqwest::Client {
    reqwest::ClientBuilder::new()
        .pool_max_idle_per_host(16)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .connect_timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_pool_keys_by_base_url() {
        let url = "https://generativelanguage.googleapis.com/v1beta";
        let _client1 = get_or_create_client(url);
        let _client2 = get_or_create_client(&format!("{}/", url));

        // Trailing slashes share an entry
        assert!(CLIENT_POOL.contains_key(url));
        assert!(!CLIENT_POOL.contains_key(&format!("{}/", url)));

        let different_url = "http://localhost:8089";
        let _client3 = get_or_create_client(different_url);
        assert!(CLIENT_POOL.contains_key(different_url));
        // Note: Can't check exact length due to parallel test execution
        assert!(CLIENT_POOL.len() >= 2);
    }
}
