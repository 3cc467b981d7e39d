//! Module descriptor and module lookup.
//!
//! A host finds the log buffer module by its id string and calls
//! [`HwModule::open`] to construct a device.

use alloc::boxed::Box;

use crate::channel::LogBackend;
use crate::device::{self, LogBufDevice};
use crate::error::{LogError, LogResult};

/// Build a four-character tag.
pub const fn make_tag(a: u8, b: u8, c: u8, d: u8) -> u32 {
    ((a as u32) << 24) | ((b as u32) << 16) | ((c as u32) << 8) | (d as u32)
}

/// Tag stamped on every module descriptor ("HWMT")
pub const HARDWARE_MODULE_TAG: u32 = make_tag(b'H', b'W', b'M', b'T');

/// Tag stamped on every device header ("HWDT")
pub const HARDWARE_DEVICE_TAG: u32 = make_tag(b'H', b'W', b'D', b'T');

/// Id the log buffer module is registered under
pub const LOGBUF_HARDWARE_MODULE_ID: &str = "logbuf";

/// Static module descriptor.
#[derive(Debug)]
pub struct HwModule {
    /// Must be [`HARDWARE_MODULE_TAG`]
    pub tag: u32,
    pub version_major: u16,
    pub version_minor: u16,
    /// Lookup id, unique per process
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    pub author: &'static str,
}

impl HwModule {
    /// Check the descriptor carries the module tag.
    pub fn is_valid(&self) -> bool {
        self.tag == HARDWARE_MODULE_TAG
    }

    /// Open a log buffer device backed by `backend`.
    ///
    /// `name` is reserved and ignored. On failure nothing is returned and
    /// nothing stays open in the backend.
    pub fn open<B: LogBackend>(
        &'static self,
        backend: &B,
        name: Option<&str>,
    ) -> LogResult<Box<LogBufDevice<B::List>>> {
        device::open(self, backend, name)
    }
}

/// The log buffer module.
pub static LOGBUF_MODULE: HwModule = HwModule {
    tag: HARDWARE_MODULE_TAG,
    version_major: 1,
    version_minor: 0,
    id: LOGBUF_HARDWARE_MODULE_ID,
    name: "logbuf module",
    author: "logbuf contributors",
};

static BUILTIN_MODULES: &[&HwModule] = &[&LOGBUF_MODULE];

/// Resolves module descriptors by id.
pub trait ModuleLoader {
    fn get_module(&self, id: &str) -> LogResult<&'static HwModule>;
}

/// Loader over the statically registered modules.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinModules;

impl ModuleLoader for BuiltinModules {
    fn get_module(&self, id: &str) -> LogResult<&'static HwModule> {
        get_module(id)
    }
}

/// Look up a statically registered module by id.
pub fn get_module(id: &str) -> LogResult<&'static HwModule> {
    BUILTIN_MODULES
        .iter()
        .copied()
        .find(|module| module.id == id)
        .ok_or(LogError::ModuleLookup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_module_by_id() {
        let module = get_module(LOGBUF_HARDWARE_MODULE_ID).unwrap();
        assert!(core::ptr::eq(module, &LOGBUF_MODULE));
        assert!(module.is_valid());
        assert_eq!(module.version_major, 1);
        assert_eq!(module.version_minor, 0);
    }

    #[test]
    fn test_get_module_unknown_id() {
        assert_eq!(get_module("nope").unwrap_err(), LogError::ModuleLookup);
        assert_eq!(get_module("").unwrap_err(), LogError::ModuleLookup);
        assert_eq!(
            BuiltinModules.get_module("LOGBUF").unwrap_err(),
            LogError::ModuleLookup
        );
    }

    #[test]
    fn test_tags() {
        assert_eq!(HARDWARE_MODULE_TAG, 0x48574D54);
        assert_eq!(HARDWARE_DEVICE_TAG, 0x48574454);
    }
}
