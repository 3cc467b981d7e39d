//! Log channel identifiers and open options.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Backend log buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum LogId {
    Main = 0,
    Radio = 1,
    Events = 2,
    System = 3,
    Crash = 4,
    Stats = 5,
    Security = 6,
    Kernel = 7,
}

impl LogId {
    /// All known log buffers, in id order.
    pub const ALL: [LogId; 8] = [
        LogId::Main,
        LogId::Radio,
        LogId::Events,
        LogId::System,
        LogId::Crash,
        LogId::Stats,
        LogId::Security,
        LogId::Kernel,
    ];

    /// Buffer name as known to the backend.
    pub fn name(&self) -> &'static str {
        match self {
            LogId::Main => "main",
            LogId::Radio => "radio",
            LogId::Events => "events",
            LogId::System => "system",
            LogId::Crash => "crash",
            LogId::Stats => "stats",
            LogId::Security => "security",
            LogId::Kernel => "kernel",
        }
    }

    pub fn from_raw(value: u32) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Open mode bits for a channel list (POSIX `open(2)` flag values).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenMode(u32);

impl OpenMode {
    /// Read only
    pub const RDONLY: Self = Self(0);
    /// Write only
    pub const WRONLY: Self = Self(1);
    /// Read/write
    pub const RDWR: Self = Self(2);
    /// Non-blocking reads
    pub const NONBLOCK: Self = Self(0o4000);

    const ACCESS_MASK: u32 = 0b11;

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Whether the mode only permits reading.
    pub fn is_read_only(&self) -> bool {
        self.0 & Self::ACCESS_MASK == Self::RDONLY.0
    }

    pub fn is_non_blocking(&self) -> bool {
        self.contains(Self::NONBLOCK)
    }
}

impl core::ops::BitOr for OpenMode {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Options for opening a channel list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListOptions {
    /// Open mode
    pub mode: OpenMode,
    /// Number of trailing entries to read (buffer ownership hint for readers)
    pub tail: u32,
    /// Only entries from this pid (0 = all)
    pub pid: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_id_names() {
        assert_eq!(LogId::Main.name(), "main");
        assert_eq!(LogId::Kernel.name(), "kernel");
        assert_eq!(LogId::from_raw(2), Some(LogId::Events));
        assert_eq!(LogId::from_raw(99), None);
    }

    #[test]
    fn test_open_mode_bits() {
        let mode = OpenMode::RDONLY | OpenMode::NONBLOCK;
        assert!(mode.is_read_only());
        assert!(mode.is_non_blocking());

        let mode = OpenMode::RDWR;
        assert!(!mode.is_read_only());
        assert!(!mode.is_non_blocking());
    }
}
