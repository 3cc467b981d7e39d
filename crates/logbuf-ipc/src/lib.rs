//! IPC protocol constants for the log buffer service.
//!
//! Every message tag exchanged with the log service is defined here so that
//! clients and the service agree on a single numbering. Responses use the
//! request tag plus one.

#![no_std]

/// Log service message tags.
pub mod log {
    /// Flush (clear) the log buffer
    pub const MSG_LOG_FLUSH: u32 = 0x9000;
    /// Flush response
    pub const MSG_LOG_FLUSH_RESPONSE: u32 = 0x9001;
    /// Get total log buffer capacity
    pub const MSG_LOG_GET_TOTAL_SIZE: u32 = 0x9002;
    /// Total size response
    pub const MSG_LOG_GET_TOTAL_SIZE_RESPONSE: u32 = 0x9003;
    /// Get used (readable) log size
    pub const MSG_LOG_GET_USED_SIZE: u32 = 0x9004;
    /// Used size response
    pub const MSG_LOG_GET_USED_SIZE_RESPONSE: u32 = 0x9005;
    /// Dump service state
    pub const MSG_LOG_DUMP: u32 = 0x9010;
    /// Dump response
    pub const MSG_LOG_DUMP_RESPONSE: u32 = 0x9011;
    /// Used size change notification (service -> listener)
    pub const MSG_LOG_USED_SIZE_CHANGED: u32 = 0x9020;
}

pub use log::*;

/// Response tag for a request tag.
pub const fn response_tag(request: u32) -> u32 {
    request + 1
}
