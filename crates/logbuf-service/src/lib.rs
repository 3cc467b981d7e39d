//! Log Buffer Service
//!
//! System service on top of a [`LogSession`](logbuf_hal::LogSession):
//!
//! - **Service**: [`LogService`] checks caller permissions, counts flushes and
//!   answers size queries
//! - **Listeners**: callers register a [`UsedSizeListener`] and are told when the
//!   used log size changes; the host drives the watcher with [`LogService::poll`]
//! - **Diagnostics**: [`LogService::dump`] prints service state
//! - **IPC**: [`LogService::handle_message`] answers the `logbuf-ipc` protocol with
//!   JSON payloads
//! - **Config**: [`ServiceConfig`]
//!
//! # Protocol
//!
//! - `MSG_LOG_FLUSH (0x9000)`: Flush the log buffer (needs `FlushLog`)
//! - `MSG_LOG_GET_TOTAL_SIZE (0x9002)`: Total buffer capacity
//! - `MSG_LOG_GET_USED_SIZE (0x9004)`: Used buffer size
//! - `MSG_LOG_DUMP (0x9010)`: Service state dump (needs `Dump`)
//! - `MSG_LOG_USED_SIZE_CHANGED (0x9020)`: Sent to clients registered through
//!   an [`IpcListener`](ipc::IpcListener)
//!
//! Each response is tagged with its request tag plus one.

pub mod config;
pub mod error;
pub mod ipc;
pub mod listener;
pub mod permissions;
pub mod service;

pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use listener::{ListenerGone, ListenerId, UsedSizeListener};
pub use permissions::{CallerContext, Permission, ProcessClass};
pub use service::{LogService, PollOutcome};
