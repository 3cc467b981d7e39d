//! In-memory log backend for testing.
//!
//! Each channel is a bounded circular buffer of entries. Writing past the
//! capacity evicts the oldest entries. The backend also counts list opens,
//! releases and reader lookups, and can inject failures.

use alloc::collections::{BTreeMap, VecDeque};
use alloc::sync::Arc;
use spin::Mutex;

use crate::channel::{LogBackend, Logger, LoggerList};
use crate::error::BackendError;
use crate::types::{ListOptions, LogId};

/// Default capacity of each channel buffer (256 KB)
pub const DEFAULT_BUFFER_SIZE: u32 = 256 * 1024;

/// Bytes of per-entry header counted against the buffer
pub const ENTRY_HEADER_SIZE: u32 = 20;

/// One channel's circular buffer.
#[derive(Debug)]
struct ChannelBuffer {
    capacity: u32,
    /// Sizes of the stored entries, oldest first
    entries: VecDeque<u32>,
    used: u32,
    /// Failure returned by every operation on this channel
    fault: Option<BackendError>,
}

impl ChannelBuffer {
    fn new(capacity: u32) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
            used: 0,
            fault: None,
        }
    }

    fn check(&self) -> Result<(), BackendError> {
        match self.fault {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn push(&mut self, entry_size: u32) -> Result<(), BackendError> {
        if entry_size > self.capacity {
            return Err(BackendError::InvalidArgument);
        }
        while self.used.saturating_add(entry_size) > self.capacity {
            match self.entries.pop_front() {
                Some(oldest) => self.used -= oldest,
                None => break,
            }
        }
        self.entries.push_back(entry_size);
        self.used += entry_size;
        Ok(())
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.used = 0;
    }
}

#[derive(Debug)]
struct BackendState {
    channels: BTreeMap<LogId, ChannelBuffer>,
    /// Failure returned by `open_list`
    open_fault: Option<BackendError>,
    lists_opened: u32,
    lists_released: u32,
    logger_lookups: u32,
}

/// In-memory backend. Clones share the same buffers.
#[derive(Clone, Debug)]
pub struct MemoryLogBackend {
    state: Arc<Mutex<BackendState>>,
}

impl Default for MemoryLogBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLogBackend {
    /// Create a backend with every channel at [`DEFAULT_BUFFER_SIZE`].
    pub fn new() -> Self {
        let channels = LogId::ALL
            .iter()
            .map(|&id| (id, ChannelBuffer::new(DEFAULT_BUFFER_SIZE)))
            .collect();
        Self {
            state: Arc::new(Mutex::new(BackendState {
                channels,
                open_fault: None,
                lists_opened: 0,
                lists_released: 0,
                logger_lookups: 0,
            })),
        }
    }

    /// Resize a channel buffer, discarding its contents.
    pub fn set_capacity(&self, id: LogId, capacity: u32) {
        let mut state = self.state.lock();
        let fault = state.channels.get(&id).and_then(|c| c.fault);
        let mut channel = ChannelBuffer::new(capacity);
        channel.fault = fault;
        state.channels.insert(id, channel);
    }

    /// Remove a channel so lookups of it fail.
    pub fn remove_channel(&self, id: LogId) {
        self.state.lock().channels.remove(&id);
    }

    /// Append an entry with `payload` to a channel, evicting old entries as needed.
    ///
    /// Returns the bytes the entry occupies.
    pub fn write(&self, id: LogId, payload: &[u8]) -> Result<u32, BackendError> {
        let mut state = self.state.lock();
        let channel = state.channels.get_mut(&id).ok_or(BackendError::NoDevice)?;
        let entry_size = u32::try_from(payload.len())
            .ok()
            .and_then(|len| len.checked_add(ENTRY_HEADER_SIZE))
            .ok_or(BackendError::InvalidArgument)?;
        channel.push(entry_size)?;
        Ok(entry_size)
    }

    /// Make `open_list` fail with `fault` (or succeed again with `None`).
    pub fn fail_open(&self, fault: Option<BackendError>) {
        self.state.lock().open_fault = fault;
    }

    /// Make every operation on a channel fail with `fault` (or succeed again with `None`).
    pub fn fail_channel(&self, id: LogId, fault: Option<BackendError>) {
        if let Some(channel) = self.state.lock().channels.get_mut(&id) {
            channel.fault = fault;
        }
    }

    /// Number of successful `open_list` calls.
    pub fn lists_opened(&self) -> u32 {
        self.state.lock().lists_opened
    }

    /// Number of lists released.
    pub fn lists_released(&self) -> u32 {
        self.state.lock().lists_released
    }

    /// Lists currently open.
    pub fn open_lists(&self) -> u32 {
        let state = self.state.lock();
        state.lists_opened - state.lists_released
    }

    /// Number of reader lookups performed on any list.
    pub fn logger_lookups(&self) -> u32 {
        self.state.lock().logger_lookups
    }
}

impl LogBackend for MemoryLogBackend {
    type List = MemoryLoggerList;

    fn open_list(&self, id: LogId, _options: ListOptions) -> Result<MemoryLoggerList, BackendError> {
        let mut state = self.state.lock();
        if let Some(fault) = state.open_fault {
            return Err(fault);
        }
        if !state.channels.contains_key(&id) {
            return Err(BackendError::NoDevice);
        }
        state.lists_opened += 1;
        Ok(MemoryLoggerList {
            state: Arc::clone(&self.state),
        })
    }
}

/// Channel list opened from a [`MemoryLogBackend`].
#[derive(Debug)]
pub struct MemoryLoggerList {
    state: Arc<Mutex<BackendState>>,
}

impl LoggerList for MemoryLoggerList {
    type Logger = MemoryLogger;

    fn logger(&self, id: LogId) -> Result<MemoryLogger, BackendError> {
        let mut state = self.state.lock();
        state.logger_lookups += 1;
        if !state.channels.contains_key(&id) {
            return Err(BackendError::NoDevice);
        }
        Ok(MemoryLogger {
            state: Arc::clone(&self.state),
            id,
        })
    }
}

impl Drop for MemoryLoggerList {
    fn drop(&mut self) {
        self.state.lock().lists_released += 1;
    }
}

/// Reader for one channel of a [`MemoryLogBackend`].
#[derive(Debug)]
pub struct MemoryLogger {
    state: Arc<Mutex<BackendState>>,
    id: LogId,
}

impl MemoryLogger {
    fn with_channel<T>(
        &self,
        f: impl FnOnce(&mut ChannelBuffer) -> T,
    ) -> Result<T, BackendError> {
        let mut state = self.state.lock();
        let channel = state
            .channels
            .get_mut(&self.id)
            .ok_or(BackendError::NoDevice)?;
        channel.check()?;
        Ok(f(channel))
    }
}

impl Logger for MemoryLogger {
    fn id(&self) -> LogId {
        self.id
    }

    fn clear(&self) -> Result<(), BackendError> {
        self.with_channel(|channel| channel.clear())
    }

    fn log_size(&self) -> Result<u32, BackendError> {
        self.with_channel(|channel| channel.capacity)
    }

    fn readable_size(&self) -> Result<u32, BackendError> {
        self.with_channel(|channel| channel.used)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
