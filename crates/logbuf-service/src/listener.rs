//! Used-size change listeners.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Returned by a listener that can no longer receive notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerGone;

impl fmt::Display for ListenerGone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener is gone")
    }
}

impl std::error::Error for ListenerGone {}

/// Receives used log size changes.
pub trait UsedSizeListener: Send + Sync {
    fn on_used_log_size_change(&self, used_log_size: u32) -> Result<(), ListenerGone>;
}

/// Registration handle for a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

pub(crate) type SharedListener = Arc<dyn UsedSizeListener>;

/// Registered listeners, keyed by id. A listener object is registered at most once.
#[derive(Default)]
pub(crate) struct ListenerTable {
    listeners: BTreeMap<ListenerId, SharedListener>,
    next_id: u64,
}

impl ListenerTable {
    /// Find the id of an already registered listener object.
    pub(crate) fn find(&self, listener: &SharedListener) -> Option<ListenerId> {
        self.listeners
            .iter()
            .find(|(_, existing)| Arc::ptr_eq(existing, listener))
            .map(|(&id, _)| id)
    }

    pub(crate) fn insert(&mut self, listener: SharedListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Copy out the current listeners so they can be notified without the lock held.
    pub(crate) fn snapshot(&self) -> Vec<(ListenerId, SharedListener)> {
        self.listeners
            .iter()
            .map(|(&id, listener)| (id, Arc::clone(listener)))
            .collect()
    }
}
