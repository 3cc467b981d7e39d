//! Backend log channel traits.
//!
//! The backend storage engine is an opaque collaborator. The device only needs
//! to open a channel list once, then take a reader for a channel from that list
//! whenever it performs an operation.

use crate::error::BackendError;
use crate::types::{ListOptions, LogId};

/// A reader for one log channel.
pub trait Logger {
    /// The channel this reader is attached to.
    fn id(&self) -> LogId;

    /// Discard everything in the channel buffer.
    fn clear(&self) -> Result<(), BackendError>;

    /// Total buffer capacity in bytes.
    fn log_size(&self) -> Result<u32, BackendError>;

    /// Bytes currently readable (used) in the buffer.
    fn readable_size(&self) -> Result<u32, BackendError>;
}

/// An opened set of log channels.
///
/// Dropping the list releases it in the backend.
pub trait LoggerList {
    type Logger: Logger;

    /// Get a reader for `id` from this list.
    fn logger(&self, id: LogId) -> Result<Self::Logger, BackendError>;
}

/// Entry point into the backend.
pub trait LogBackend {
    type List: LoggerList;

    /// Open a channel list for `id`.
    fn open_list(&self, id: LogId, options: ListOptions) -> Result<Self::List, BackendError>;
}
