//! Client configuration.

use crate::types::CachePolicy;
use serde::{Deserialize, Serialize};

/// Configuration for [`EndpointClient`](crate::client::EndpointClient) and
/// [`ReqwestDataProvider`](crate::client::ReqwestDataProvider).
///
/// # Examples
///
/// ```
/// use endpoint_kit::client::ClientConfig;
///
/// let config = ClientConfig {
///     request_timeout_ms: 5_000,
///     log_errors: true,
///     ..Default::default()
/// };
/// assert!(config.attempt_recovery);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Timeout applied to every request before the endpoint's encoder runs, in milliseconds
    pub request_timeout_ms: u64,
    /// Cache policy applied to every request before the endpoint's encoder runs
    pub cache_policy: CachePolicy,
    /// Offer failed calls to the recovery hook
    pub attempt_recovery: bool,
    /// Log terminal failures at `warn` instead of `debug`
    pub log_errors: bool,
    /// Idle connections kept per host by the reqwest provider
    pub pool_max_idle_per_host: usize,
    /// Proxy for all traffic of the reqwest provider, empty for none
    pub proxy_url: String,
    /// `User-Agent` sent by the reqwest provider, empty for reqwest's default
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 60_000,
            cache_policy: CachePolicy::default(),
            attempt_recovery: true,
            log_errors: false,
            pool_max_idle_per_host: 32,
            proxy_url: String::new(),
            user_agent: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout_ms, 60_000);
        assert_eq!(config.cache_policy, CachePolicy::UseProtocolCachePolicy);
        assert!(config.attempt_recovery);
        assert!(!config.log_errors);
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"log_errors": true, "cache_policy": "reload_ignoring_local_cache_data"}"#,
        )
        .unwrap();
        assert!(config.log_errors);
        assert_eq!(config.cache_policy, CachePolicy::ReloadIgnoringLocalCacheData);
        assert_eq!(config.request_timeout_ms, 60_000);
    }
}
