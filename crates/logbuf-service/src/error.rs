//! Error types for the log service.

use logbuf_hal::LogError;
use serde::{Deserialize, Serialize};

use crate::permissions::Permission;

/// Errors from log service operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceError {
    /// Caller lacks a required permission
    PermissionDenied {
        /// The missing permission
        permission: Permission,
    },

    /// The log device failed
    Device(LogError),

    /// JSON encoding or decoding failed
    Serialization(String),

    /// IPC message tag not handled by this service
    UnknownMessage(u32),
}

impl From<LogError> for ServiceError {
    fn from(e: LogError) -> Self {
        ServiceError::Device(e)
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied { permission } => {
                write!(f, "permission denied: requires {}", permission.name())
            }
            Self::Device(e) => write!(f, "{}", e),
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
            Self::UnknownMessage(tag) => write!(f, "unknown message tag 0x{:x}", tag),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Device(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
