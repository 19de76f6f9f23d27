//! Real-time channel configuration

use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::error::ValidationError;

/// WebSocket transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Explicit WebSocket URL; derived from the API base URL when absent
    pub url: Option<String>,

    /// Reconnect automatically after an unexpected close
    #[serde(default = "default_reconnect")]
    pub reconnect: bool,

    /// Maximum automatic reconnect attempts
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,

    /// Delay between reconnect attempts in milliseconds
    #[serde(default = "default_reconnect_interval")]
    pub reconnect_interval_ms: u64,

    /// Heartbeat period in seconds (0 disables)
    #[serde(default)]
    pub heartbeat_secs: u64,

    /// Ignore progress updates lower than the current value
    #[serde(default)]
    pub monotonic_progress: bool,
}

impl RealtimeConfig {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn heartbeat(&self) -> Option<Duration> {
        (self.heartbeat_secs > 0).then(|| Duration::from_secs(self.heartbeat_secs))
    }

    /// The WebSocket URL to connect to.
    ///
    /// Without an explicit URL, `http` maps to `ws` and `https` to `wss` on
    /// the API host, with path `/ws`.
    pub fn resolve_url(&self, api_base: &Url) -> Result<Url, ValidationError> {
        if let Some(explicit) = &self.url {
            let url = Url::parse(explicit)
                .map_err(|e| ValidationError::InvalidRealtimeUrl(format!("{}: {}", explicit, e)))?;
            return match url.scheme() {
                "ws" | "wss" => Ok(url),
                other => Err(ValidationError::InvalidRealtimeUrl(format!(
                    "unsupported scheme '{}'",
                    other
                ))),
            };
        }

        let scheme = if api_base.scheme() == "https" { "wss" } else { "ws" };
        let mut url = api_base.clone();
        url.set_scheme(scheme)
            .map_err(|_| ValidationError::InvalidRealtimeUrl(api_base.to_string()))?;
        url.set_path("/ws");
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }

    /// Validate transport configuration
    pub fn validate(&self, api_base: &Url) -> Result<(), ValidationError> {
        self.resolve_url(api_base)?;
        if self.reconnect && self.reconnect_interval_ms == 0 {
            return Err(ValidationError::InvalidReconnectInterval);
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: None,
            reconnect: default_reconnect(),
            reconnect_attempts: default_reconnect_attempts(),
            reconnect_interval_ms: default_reconnect_interval(),
            heartbeat_secs: 0,
            monotonic_progress: false,
        }
    }
}

fn default_reconnect() -> bool {
    true
}

fn default_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_interval() -> u64 {
    3000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn test_realtime_defaults() {
        let config = RealtimeConfig::default();
        assert!(config.reconnect);
        assert_eq!(config.reconnect_attempts, 5);
        assert_eq!(config.reconnect_interval(), Duration::from_millis(3000));
        assert!(config.heartbeat().is_none());
        assert!(!config.monotonic_progress);
    }

    #[test]
    fn test_url_derived_from_http_base() {
        let config = RealtimeConfig::default();
        let url = config.resolve_url(&base("http://localhost:8001")).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8001/ws");
    }

    #[test]
    fn test_url_derived_from_https_base() {
        let config = RealtimeConfig::default();
        let url = config
            .resolve_url(&base("https://chat.example.com/api?x=1"))
            .unwrap();
        assert_eq!(url.as_str(), "wss://chat.example.com/ws");
    }

    #[test]
    fn test_explicit_url_wins() {
        let config = RealtimeConfig {
            url: Some("wss://push.example.com/live".to_string()),
            ..Default::default()
        };
        let url = config.resolve_url(&base("http://localhost:8001")).unwrap();
        assert_eq!(url.as_str(), "wss://push.example.com/live");
    }

    #[test]
    fn test_explicit_url_must_be_websocket() {
        let config = RealtimeConfig {
            url: Some("http://push.example.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(&base("http://localhost:8001")),
            Err(ValidationError::InvalidRealtimeUrl(_))
        ));
    }

    #[test]
    fn test_zero_interval_rejected_only_with_reconnect() {
        let mut config = RealtimeConfig {
            reconnect_interval_ms: 0,
            ..Default::default()
        };
        let api = base("http://localhost:8001");
        assert_eq!(
            config.validate(&api),
            Err(ValidationError::InvalidReconnectInterval)
        );

        config.reconnect = false;
        assert!(config.validate(&api).is_ok());
    }
}
