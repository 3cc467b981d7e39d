//! The log buffer device.
//!
//! A device is created by [`HwModule::open`]. It starts with a [`DeviceHeader`]
//! identifying it to the host, owns the backend channel list it was opened
//! with, and implements [`LogDevice`].
//!
//! Operations do not cache a channel reader. Each call asks the channel list
//! for a fresh reader of [`LOG_ID`], so the device tolerates the backend
//! changing the list between calls.

use alloc::boxed::Box;
use alloc::vec::Vec;
use tracing::{debug, error};

use crate::channel::{LogBackend, Logger, LoggerList};
use crate::error::{BackendError, DeviceOp, LogError, LogResult};
use crate::module::{HwModule, HARDWARE_DEVICE_TAG};
use crate::types::{ListOptions, LogId, OpenMode};

/// The one channel this device operates on
pub const LOG_ID: LogId = LogId::Main;

/// Device header version
pub const DEVICE_VERSION: u32 = 0;

/// How the channel list is opened: read-only, non-blocking, default tail, all pids
pub const DEVICE_LIST_OPTIONS: ListOptions = ListOptions {
    mode: OpenMode::from_bits(OpenMode::RDONLY.bits() | OpenMode::NONBLOCK.bits()),
    tail: 1,
    pid: 0,
};

/// Identification header, always first in a device.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DeviceHeader {
    /// Must be [`HARDWARE_DEVICE_TAG`]
    pub tag: u32,
    pub version: u32,
    /// Module that opened this device
    pub module: &'static HwModule,
}

impl DeviceHeader {
    fn new(module: &'static HwModule) -> Self {
        Self {
            tag: HARDWARE_DEVICE_TAG,
            version: DEVICE_VERSION,
            module,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.tag == HARDWARE_DEVICE_TAG
    }
}

/// Operations of an open log device.
pub trait LogDevice {
    fn header(&self) -> &DeviceHeader;

    /// Clear the log buffer.
    fn flush_log(&self) -> LogResult<()>;

    /// Total log buffer capacity in bytes.
    fn total_log_size(&self) -> LogResult<u32>;

    /// Bytes currently used in the log buffer.
    fn used_log_size(&self) -> LogResult<u32>;

    /// Release the channel list, then the device. Never fails.
    fn close(self: Box<Self>) -> LogResult<()>;
}

/// Log device over a backend channel list.
#[repr(C)]
pub struct LogBufDevice<L: LoggerList> {
    header: DeviceHeader,
    logger_list: L,
}

impl<L: LoggerList> LogBufDevice<L> {
    /// The channel list this device owns.
    pub fn logger_list(&self) -> &L {
        &self.logger_list
    }

    /// Take a fresh reader for the device channel and run `f` on it.
    fn with_logger<T>(
        &self,
        op: DeviceOp,
        f: impl FnOnce(&L::Logger) -> Result<T, BackendError>,
    ) -> LogResult<T> {
        self.logger_list
            .logger(LOG_ID)
            .and_then(|logger| {
            debug_assert_eq!(logger.id(), LOG_ID);
            f(&logger)
        })
            .map_err(|source| LogError::BackendOperation { op, source })
    }
}

impl<L: LoggerList> LogDevice for LogBufDevice<L> {
    fn header(&self) -> &DeviceHeader {
        &self.header
    }

    fn flush_log(&self) -> LogResult<()> {
        debug!("Flushing {}", LOG_ID.name());
        self.with_logger(DeviceOp::Flush, |logger| logger.clear())
    }

    fn total_log_size(&self) -> LogResult<u32> {
        debug!("Getting total buffer size of {}", LOG_ID.name());
        self.with_logger(DeviceOp::TotalSize, |logger| logger.log_size())
    }

    fn used_log_size(&self) -> LogResult<u32> {
        debug!("Getting used buffer size of {}", LOG_ID.name());
        self.with_logger(DeviceOp::UsedSize, |logger| logger.readable_size())
    }

    fn close(self: Box<Self>) -> LogResult<()> {
        debug!("Closing {}", LOG_ID.name());
        // Fields drop first (releasing the list), then the box is freed.
        drop(self);
        Ok(())
    }
}

/// Open the channel list and build a device around it.
pub(crate) fn open<B: LogBackend>(
    module: &'static HwModule,
    backend: &B,
    name: Option<&str>,
) -> LogResult<Box<LogBufDevice<B::List>>> {
    open_with(module, backend, name, try_box)
}

/// [`open`] with the device allocation supplied by the caller.
///
/// `alloc` owns the device it is given; when it fails the channel list is
/// dropped with it, before the error escapes.
fn open_with<B, A>(
    module: &'static HwModule,
    backend: &B,
    _name: Option<&str>,
    alloc: A,
) -> LogResult<Box<LogBufDevice<B::List>>>
where
    B: LogBackend,
    A: FnOnce(LogBufDevice<B::List>) -> LogResult<Box<LogBufDevice<B::List>>>,
{
    let logger_list = backend
        .open_list(LOG_ID, DEVICE_LIST_OPTIONS)
        .map_err(|e| {
            error!("Failed to open {}: {}", LOG_ID.name(), e);
            LogError::DeviceOpen(e)
        })?;

    let device = alloc(LogBufDevice {
        header: DeviceHeader::new(module),
        logger_list,
    })
    .map_err(|e| {
        error!("Failed to allocate device for {}", LOG_ID.name());
        e
    })?;

    debug!("Opened {}", LOG_ID.name());
    Ok(device)
}

/// Box `value`, reporting allocation failure instead of aborting.
fn try_box<T>(value: T) -> LogResult<Box<T>> {
    let mut storage: Vec<T> = Vec::new();
    storage
        .try_reserve_exact(1)
        .map_err(|_| LogError::Allocation)?;
    storage.push(value);
    let slice = Box::into_raw(storage.into_boxed_slice());
    // SAFETY: the slice holds exactly one `T`, and `[T; 1]` has the layout of `T`,
    // so the allocation can be owned and freed as a `Box<T>`.
    Ok(unsafe { Box::from_raw(slice as *mut T) })
}
