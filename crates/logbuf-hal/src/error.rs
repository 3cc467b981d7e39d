//! Error types for the log buffer device.

use core::fmt;
use serde::{Deserialize, Serialize};

/// errno values used for status codes.
pub mod errno {
    pub const ENOENT: i32 = 2;
    pub const EIO: i32 = 5;
    pub const EAGAIN: i32 = 11;
    pub const ENOMEM: i32 = 12;
    pub const EACCES: i32 = 13;
    pub const ENODEV: i32 = 19;
    pub const EINVAL: i32 = 22;
}

/// Failures reported by the backend log channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendError {
    /// The log channel does not exist
    NoDevice,
    /// Caller may not access the channel
    PermissionDenied,
    /// Non-blocking access found nothing to do
    WouldBlock,
    /// Bad request (e.g. entry larger than the buffer)
    InvalidArgument,
    /// I/O error talking to the log channel
    Io,
}

impl BackendError {
    /// Positive errno for this failure.
    pub fn errno(&self) -> i32 {
        match self {
            BackendError::NoDevice => errno::ENODEV,
            BackendError::PermissionDenied => errno::EACCES,
            BackendError::WouldBlock => errno::EAGAIN,
            BackendError::InvalidArgument => errno::EINVAL,
            BackendError::Io => errno::EIO,
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::NoDevice => write!(f, "no such log channel"),
            BackendError::PermissionDenied => write!(f, "permission denied"),
            BackendError::WouldBlock => write!(f, "operation would block"),
            BackendError::InvalidArgument => write!(f, "invalid argument"),
            BackendError::Io => write!(f, "I/O error"),
        }
    }
}

/// Device operations that reach the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceOp {
    Flush,
    TotalSize,
    UsedSize,
}

impl DeviceOp {
    pub fn name(&self) -> &'static str {
        match self {
            DeviceOp::Flush => "flush log",
            DeviceOp::TotalSize => "get total log size",
            DeviceOp::UsedSize => "get used log size",
        }
    }
}

/// Errors from the device module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogError {
    /// No module registered under the requested id
    ModuleLookup,
    /// The backend channel list could not be opened
    DeviceOpen(BackendError),
    /// The device handle could not be allocated
    Allocation,
    /// No device is open (never initialized, or already closed)
    NotInitialized,
    /// A flush or size query failed in the backend
    BackendOperation {
        /// The operation that failed
        op: DeviceOp,
        /// The backend failure
        source: BackendError,
    },
}

impl LogError {
    /// Negative errno-style status code for this error.
    pub fn status(&self) -> i32 {
        match self {
            LogError::ModuleLookup => -errno::ENOENT,
            LogError::DeviceOpen(_) => -1,
            LogError::Allocation => -errno::ENOMEM,
            LogError::NotInitialized => -errno::ENODEV,
            LogError::BackendOperation { source, .. } => -source.errno(),
        }
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::ModuleLookup => write!(f, "Failed to get module"),
            LogError::DeviceOpen(e) => write!(f, "Failed to open device: {}", e),
            LogError::Allocation => write!(f, "Failed to allocate device"),
            LogError::NotInitialized => write!(f, "Not initialized or closed"),
            LogError::BackendOperation { op, source } => {
                write!(f, "Failed to {}: {}", op.name(), source)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BackendError {}

#[cfg(feature = "std")]
impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogError::DeviceOpen(e) => Some(e),
            LogError::BackendOperation { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for device operations
pub type LogResult<T> = Result<T, LogError>;
