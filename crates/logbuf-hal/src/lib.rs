//! Log Buffer Device Module
//!
//! Exposes read/maintenance access to the system log buffer through a small
//! hardware-style device abstraction:
//!
//! - **Module**: the statically registered [`HwModule`] descriptor, found by id
//!   through a [`ModuleLoader`]
//! - **Device**: the [`LogDevice`] capability (flush, total size, used size, close)
//!   and its concrete implementation [`LogBufDevice`]
//! - **Channel**: the backend traits ([`LogBackend`], [`LoggerList`], [`Logger`])
//!   the device is built on
//! - **Session**: [`LogSession`], the caller-owned context that holds at most one
//!   open device and rejects queries when nothing is open
//! - **Status**: integer status/sentinel folding for callers that speak error codes
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  Caller (service / bridge)                                           │
//! └───────────────────────────────┬──────────────────────────────────────┘
//!                                 │ init / flush / sizes / close
//!                                 ▼
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  LogSession ── ModuleLoader::get_module("logbuf") ── HwModule::open  │
//! └───────────────────────────────┬──────────────────────────────────────┘
//!                                 │ Box<dyn LogDevice>
//!                                 ▼
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  LogBufDevice { DeviceHeader, LoggerList }                           │
//! │      every call: LoggerList::logger(Main) -> Logger -> clear/size    │
//! └───────────────────────────────┬──────────────────────────────────────┘
//!                                 ▼
//!                    Backend log channel (opaque)
//! ```
//!
//! The device owns its channel list for its whole lifetime. A fresh channel
//! reader is taken from the list on every operation; only the list is retained.

#![no_std]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod channel;
pub mod device;
pub mod error;
pub mod memory;
pub mod module;
pub mod session;
pub mod status;
pub mod types;

pub use channel::{LogBackend, Logger, LoggerList};
pub use device::{DeviceHeader, LogBufDevice, LogDevice, DEVICE_LIST_OPTIONS, DEVICE_VERSION, LOG_ID};
pub use error::{BackendError, DeviceOp, LogError, LogResult};
pub use memory::{MemoryLogBackend, MemoryLogger, MemoryLoggerList};
pub use module::{
    get_module, BuiltinModules, HwModule, ModuleLoader, HARDWARE_DEVICE_TAG, HARDWARE_MODULE_TAG,
    LOGBUF_HARDWARE_MODULE_ID, LOGBUF_MODULE,
};
pub use session::LogSession;
pub use types::{ListOptions, LogId, OpenMode};
