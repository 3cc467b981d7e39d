//! Caller-owned device session.
//!
//! A [`LogSession`] replaces a process-wide device pointer: it looks up the
//! module, opens at most one device, and forwards flush and size queries to it.
//! Every query requires an open device and fails with
//! [`LogError::NotInitialized`] otherwise, without touching the backend.
//!
//! The device slot sits behind a spin lock, so a session can be shared
//! between threads when its backend allows it.

use alloc::boxed::Box;
use spin::Mutex;
use tracing::debug;

use crate::channel::LogBackend;
use crate::device::LogDevice;
use crate::error::{LogError, LogResult};
use crate::module::{BuiltinModules, ModuleLoader, LOGBUF_HARDWARE_MODULE_ID};

type DeviceSlot = Option<Box<dyn LogDevice + Send>>;

/// Session holding at most one open log device.
pub struct LogSession<B: LogBackend, M: ModuleLoader = BuiltinModules> {
    backend: B,
    loader: M,
    device: Mutex<DeviceSlot>,
}

impl<B> LogSession<B>
where
    B: LogBackend,
    B::List: Send + 'static,
{
    /// Create a session resolving modules from the built-in table.
    pub fn new(backend: B) -> Self {
        Self::with_loader(backend, BuiltinModules)
    }
}

impl<B, M> LogSession<B, M>
where
    B: LogBackend,
    B::List: Send + 'static,
    M: ModuleLoader,
{
    /// Create a session resolving modules through `loader`.
    pub fn with_loader(backend: B, loader: M) -> Self {
        Self {
            backend,
            loader,
            device: Mutex::new(None),
        }
    }

    /// Look up the module and open the device.
    ///
    /// If a device is already open it is kept and no second device is opened.
    pub fn init(&self) -> LogResult<()> {
        let module = self.loader.get_module(LOGBUF_HARDWARE_MODULE_ID)?;

        let mut slot = self.device.lock();
        if slot.is_some() {
            debug!("Device already open, keeping it");
            return Ok(());
        }
        let device = module.open(&self.backend, None)?;
        *slot = Some(device);
        Ok(())
    }

    /// Close the open device. Closing with nothing open is a no-op.
    pub fn close(&self) -> LogResult<()> {
        let device = self.device.lock().take();
        match device {
            Some(device) => device.close(),
            None => Ok(()),
        }
    }

    /// Whether a device is currently open.
    pub fn is_open(&self) -> bool {
        self.device.lock().is_some()
    }

    /// Clear the log buffer.
    pub fn flush_log(&self) -> LogResult<()> {
        self.with_device(|device| device.flush_log())
    }

    /// Total log buffer capacity in bytes.
    pub fn total_log_size(&self) -> LogResult<u32> {
        self.with_device(|device| device.total_log_size())
    }

    /// Bytes currently used in the log buffer.
    pub fn used_log_size(&self) -> LogResult<u32> {
        self.with_device(|device| device.used_log_size())
    }

    /// The backend this session opens devices on.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn with_device<T>(
        &self,
        f: impl FnOnce(&(dyn LogDevice + Send)) -> LogResult<T>,
    ) -> LogResult<T> {
        let slot = self.device.lock();
        match slot.as_deref() {
            Some(device) => f(device),
            None => Err(LogError::NotInitialized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::memory::MemoryLogBackend;
    use crate::module::HwModule;

    struct NoModules;

    impl ModuleLoader for NoModules {
        fn get_module(&self, _id: &str) -> LogResult<&'static HwModule> {
            Err(LogError::ModuleLookup)
        }
    }

    #[test]
    fn test_queries_before_init_fail() {
        let session = LogSession::new(MemoryLogBackend::new());

        assert_eq!(session.flush_log(), Err(LogError::NotInitialized));
        assert_eq!(session.total_log_size(), Err(LogError::NotInitialized));
        assert_eq!(session.used_log_size(), Err(LogError::NotInitialized));
        assert_eq!(session.backend().logger_lookups(), 0);
    }

    #[test]
    fn test_init_and_close() {
        let session = LogSession::new(MemoryLogBackend::new());

        session.init().unwrap();
        assert!(session.is_open());
        assert_eq!(session.backend().open_lists(), 1);

        session.close().unwrap();
        assert!(!session.is_open());
        assert_eq!(session.backend().open_lists(), 0);
    }

    #[test]
    fn test_double_init_keeps_one_device() {
        let session = LogSession::new(MemoryLogBackend::new());

        session.init().unwrap();
        session.init().unwrap();
        assert_eq!(session.backend().lists_opened(), 1);

        session.close().unwrap();
    }

    #[test]
    fn test_double_close_is_noop() {
        let session = LogSession::new(MemoryLogBackend::new());
        session.init().unwrap();

        assert_eq!(session.close(), Ok(()));
        assert_eq!(session.close(), Ok(()));
        assert_eq!(session.backend().lists_released(), 1);
    }

    #[test]
    fn test_lookup_failure_is_distinct_from_open_failure() {
        let backend = MemoryLogBackend::new();
        backend.fail_open(Some(BackendError::NoDevice));

        let unregistered = LogSession::with_loader(backend.clone(), NoModules);
        assert_eq!(unregistered.init(), Err(LogError::ModuleLookup));

        let registered = LogSession::new(backend);
        assert_eq!(
            registered.init(),
            Err(LogError::DeviceOpen(BackendError::NoDevice))
        );
        assert!(!registered.is_open());
    }

    #[test]
    fn test_init_can_be_retried_after_failure() {
        let backend = MemoryLogBackend::new();
        backend.fail_open(Some(BackendError::WouldBlock));
        let session = LogSession::new(backend);

        assert!(session.init().is_err());
        session.backend().fail_open(None);
        session.init().unwrap();
        assert!(session.is_open());
    }
}
