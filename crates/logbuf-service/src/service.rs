//! The log service.
//!
//! Wraps a [`LogSession`] with caller permission checks, a flush counter,
//! used-size listeners and a state dump.
//!
//! # Watcher
//!
//! While at least one listener is registered, the host calls [`LogService::poll`]
//! every [`ServiceConfig::poll_interval_ms`]. Each poll reads the used size and,
//! when it differs from the last value seen, tells every listener. Listeners that
//! report [`ListenerGone`](crate::ListenerGone) are unregistered. A failed read is
//! logged and the next poll tries again.

use std::fmt::Write;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use logbuf_hal::{BuiltinModules, LogBackend, LogError, LogSession, ModuleLoader};
use spin::Mutex;
use tracing::{debug, error, warn};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::listener::{ListenerId, ListenerTable, UsedSizeListener};
use crate::permissions::{CallerContext, Permission};

/// Usage line printed for unknown dump arguments
pub const DUMP_USAGE: &str = "Usage: LogService [flush-count|used-size|total-size|listeners]";

/// Result of one watcher tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// No listeners registered; the device was not queried
    Idle,
    /// Used size is the same as last time
    Unchanged,
    /// Used size changed and listeners were told
    Changed {
        used_log_size: u32,
        /// Listeners that took the notification
        notified: usize,
        /// Listeners dropped because they were gone
        dropped: usize,
    },
    /// The used size could not be read
    Failed(LogError),
}

/// Log buffer system service.
pub struct LogService<B: LogBackend, M: ModuleLoader = BuiltinModules> {
    session: LogSession<B, M>,
    config: ServiceConfig,
    flush_count: AtomicU64,
    listeners: Mutex<ListenerTable>,
    last_known_size: AtomicU32,
}

impl<B, M> LogService<B, M>
where
    B: LogBackend,
    B::List: Send + 'static,
    M: ModuleLoader,
{
    /// Open the device through `session` and start the service.
    pub fn new(session: LogSession<B, M>, config: ServiceConfig) -> ServiceResult<Self> {
        session.init()?;
        Ok(Self {
            session,
            config,
            flush_count: AtomicU64::new(0),
            listeners: Mutex::new(ListenerTable::default()),
            last_known_size: AtomicU32::new(0),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn session(&self) -> &LogSession<B, M> {
        &self.session
    }

    /// How long the host should wait between polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms)
    }

    /// Flush the log buffer on behalf of `caller`.
    ///
    /// Returns the flush count including this flush.
    pub fn flush_log(&self, caller: &CallerContext) -> ServiceResult<u64> {
        if self.config.require_flush_permission {
            require(caller, Permission::FlushLog)?;
        }
        debug!("Flushing log for pid {}", caller.pid);
        self.session.flush_log()?;
        Ok(self.flush_count.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Number of successful flushes since the service started.
    pub fn flush_count(&self) -> u64 {
        self.flush_count.load(Ordering::Relaxed)
    }

    pub fn used_log_size(&self) -> ServiceResult<u32> {
        debug!("Getting used log size");
        Ok(self.session.used_log_size()?)
    }

    pub fn total_log_size(&self) -> ServiceResult<u32> {
        debug!("Getting total log size");
        Ok(self.session.total_log_size()?)
    }

    /// Register a listener. Registering the same listener again returns its existing id.
    pub fn register(&self, listener: Arc<dyn UsedSizeListener>) -> ListenerId {
        let mut table = self.listeners.lock();
        if let Some(id) = table.find(&listener) {
            warn!("Ignoring duplicate listener: {}", id);
            return id;
        }
        if table.is_empty() {
            debug!("First listener registered, resetting last known used size");
            self.last_known_size.store(0, Ordering::Relaxed);
        }
        let id = table.insert(listener);
        debug!("Registered listener: {}", id);
        id
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut table = self.listeners.lock();
        if !table.remove(id) {
            warn!("Ignoring unregistered listener: {}", id);
            return false;
        }
        debug!("Unregistered listener: {}", id);
        if table.is_empty() {
            debug!("No listeners left, polls are idle");
        }
        true
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Run one watcher tick.
    pub fn poll(&self) -> PollOutcome {
        let listeners = {
            let table = self.listeners.lock();
            if table.is_empty() {
                return PollOutcome::Idle;
            }
            table.snapshot()
        };

        let used_log_size = match self.session.used_log_size() {
            Ok(size) => size,
            Err(e) => {
                error!("Failed to read used log size: {}", e);
                return PollOutcome::Failed(e);
            }
        };
        if self.last_known_size.swap(used_log_size, Ordering::Relaxed) == used_log_size {
            return PollOutcome::Unchanged;
        }
        debug!("Log data changed. Used data is now at {}", used_log_size);

        let mut notified = 0;
        let mut dropped = 0;
        for (id, listener) in listeners {
            debug!("Notifying listener: {}", id);
            match listener.on_used_log_size_change(used_log_size) {
                Ok(()) => notified += 1,
                Err(e) => {
                    warn!("Failed to update listener {}: {}", id, e);
                    if self.unregister(id) {
                        dropped += 1;
                    }
                }
            }
        }

        PollOutcome::Changed {
            used_log_size,
            notified,
            dropped,
        }
    }

    /// Dump service state for `caller`.
    ///
    /// With no arguments prints everything; with one of `flush-count`,
    /// `used-size`, `total-size` or `listeners` prints just that value.
    pub fn dump(&self, caller: &CallerContext, args: &[&str]) -> String {
        let mut out = String::new();
        if !caller.has_permission(Permission::Dump) {
            let _ = writeln!(
                out,
                "Permission Denial: can't dump LogService from pid={}, uid={}",
                caller.pid, caller.uid
            );
            return out;
        }

        match args.first() {
            Some(&"flush-count") => {
                let _ = writeln!(out, "{}", self.flush_count());
            }
            Some(&"used-size") => {
                let _ = writeln!(out, "{}", format_size(self.session.used_log_size()));
            }
            Some(&"total-size") => {
                let _ = writeln!(out, "{}", format_size(self.session.total_log_size()));
            }
            Some(&"listeners") => {
                let _ = writeln!(out, "{}", self.listener_count());
            }
            Some(_) => {
                let _ = writeln!(out, "{}", DUMP_USAGE);
            }
            None => {
                let _ = writeln!(out, "LogServiceState:");
                let _ = writeln!(out, "Flush count: {}", self.flush_count());
                let _ = writeln!(
                    out,
                    "Used log size: {}",
                    format_size(self.session.used_log_size())
                );
                let _ = writeln!(
                    out,
                    "Total log size: {}",
                    format_size(self.session.total_log_size())
                );
                let _ = writeln!(out, "Listeners: {}", self.listener_count());
            }
        }
        out
    }

    /// Close the device. Later queries fail with `NotInitialized`.
    pub fn close(&self) -> ServiceResult<()> {
        Ok(self.session.close()?)
    }
}

fn require(caller: &CallerContext, permission: Permission) -> ServiceResult<()> {
    if caller.has_permission(permission) {
        Ok(())
    } else {
        warn!(
            "pid {} (uid {}) denied {}",
            caller.pid,
            caller.uid,
            permission.name()
        );
        Err(ServiceError::PermissionDenied { permission })
    }
}

fn format_size(size: Result<u32, LogError>) -> String {
    match size {
        Ok(size) => size.to_string(),
        Err(e) => format!("error: {}", e),
    }
}
