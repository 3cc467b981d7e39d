//! Caller identity and permission checks.

use serde::{Deserialize, Serialize};

/// Permissions the log service checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    /// Clear the log buffer
    FlushLog,
    /// Read the service state dump
    Dump,
}

impl Permission {
    pub fn name(&self) -> &'static str {
        match self {
            Permission::FlushLog => "FLUSH_LOG",
            Permission::Dump => "DUMP",
        }
    }
}

/// Process classification for permission checking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessClass {
    /// The service's own process and other system processes
    System,
    /// Runtime services
    Runtime,
    /// User applications
    Application,
}

/// Who is calling the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallerContext {
    pub pid: u32,
    pub uid: u32,
    pub process_class: ProcessClass,
    /// Permissions granted to a non-system caller
    granted: Vec<Permission>,
}

impl CallerContext {
    /// A system caller. System callers hold every permission.
    pub fn system(pid: u32) -> Self {
        Self {
            pid,
            uid: 0,
            process_class: ProcessClass::System,
            granted: Vec::new(),
        }
    }

    /// A runtime service with no granted permissions.
    pub fn runtime(pid: u32, uid: u32) -> Self {
        Self {
            pid,
            uid,
            process_class: ProcessClass::Runtime,
            granted: Vec::new(),
        }
    }

    /// An application with no granted permissions.
    pub fn application(pid: u32, uid: u32) -> Self {
        Self {
            pid,
            uid,
            process_class: ProcessClass::Application,
            granted: Vec::new(),
        }
    }

    /// Grant a permission.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        if !self.granted.contains(&permission) {
            self.granted.push(permission);
        }
        self
    }

    /// Check whether the caller holds `permission`.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.process_class == ProcessClass::System || self.granted.contains(&permission)
    }
}
