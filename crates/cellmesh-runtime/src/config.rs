//! Runtime configuration

use std::time::Duration;

use serde::Deserialize;

use cellmesh_agent::AnnounceRoute;

use crate::{RuntimeError, RuntimeResult};

/// Board runtime configuration
///
/// Missing fields in a JSON document fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// How long a propagation wave may take to quiesce
    pub quiesce_timeout_ms: u64,
    /// Route self-assignments to whoever sent the eliminating assignment
    /// instead of the board supervisor
    pub announce_to_sender: bool,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            quiesce_timeout_ms: 5_000,
            announce_to_sender: false,
            log_filter: "cellmesh=info".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_json(json: &str) -> RuntimeResult<Self> {
        serde_json::from_str(json).map_err(|e| RuntimeError::Config(e.to_string()))
    }

    pub fn with_quiesce_timeout(mut self, timeout: Duration) -> Self {
        self.quiesce_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_announce_route(mut self, route: AnnounceRoute) -> Self {
        self.announce_to_sender = route == AnnounceRoute::Sender;
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    pub fn quiesce_timeout(&self) -> Duration {
        Duration::from_millis(self.quiesce_timeout_ms)
    }

    pub fn announce_route(&self) -> AnnounceRoute {
        if self.announce_to_sender {
            AnnounceRoute::Sender
        } else {
            AnnounceRoute::Parent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.quiesce_timeout(), Duration::from_secs(5));
        assert_eq!(config.announce_route(), AnnounceRoute::Parent);
    }

    #[test]
    fn test_from_json_partial() {
        let config = RuntimeConfig::from_json(r#"{ "announce_to_sender": true }"#).unwrap();
        assert_eq!(config.announce_route(), AnnounceRoute::Sender);
        assert_eq!(config.quiesce_timeout_ms, 5_000);
        assert_eq!(config.log_filter, "cellmesh=info");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            RuntimeConfig::from_json("{ quiesce"),
            Err(RuntimeError::Config(_))
        ));
    }

    #[test]
    fn test_builders() {
        let config = RuntimeConfig::default()
            .with_quiesce_timeout(Duration::from_millis(250))
            .with_announce_route(AnnounceRoute::Sender)
            .with_log_filter("cellmesh=debug");
        assert_eq!(config.quiesce_timeout_ms, 250);
        assert!(config.announce_to_sender);
        assert_eq!(config.log_filter, "cellmesh=debug");
    }
}
