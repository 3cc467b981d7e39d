//! Service configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// Default interval between watcher polls (2 seconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Log service settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// How often the host should call `LogService::poll`
    pub poll_interval_ms: u64,
    /// Require `Permission::FlushLog` for flushes
    pub require_flush_permission: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            require_flush_permission: true,
        }
    }
}

impl ServiceConfig {
    /// Parse from JSON bytes. Missing fields take their defaults.
    pub fn from_json(data: &[u8]) -> ServiceResult<Self> {
        serde_json::from_slice(data).map_err(|e| ServiceError::Serialization(e.to_string()))
    }

    /// Serialize to JSON bytes
    pub fn to_json(&self) -> ServiceResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ServiceError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.poll_interval_ms, 2_000);
        assert!(config.require_flush_permission);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ServiceConfig::from_json(br#"{"poll_interval_ms":500}"#).unwrap();
        assert_eq!(config.poll_interval_ms, 500);
        assert!(config.require_flush_permission);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ServiceConfig {
            poll_interval_ms: 250,
            require_flush_permission: false,
        };
        let bytes = config.to_json().unwrap();
        assert_eq!(ServiceConfig::from_json(&bytes).unwrap(), config);
    }

    #[test]
    fn test_invalid_json() {
        let err = ServiceConfig::from_json(b"not json").unwrap_err();
        assert!(matches!(err, ServiceError::Serialization(_)));
    }
}
