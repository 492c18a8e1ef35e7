//! Namespaced kernel parameters.

use crate::error::{RenderError, RenderResult};
use crate::render::{Validate, ValidationContext};
use std::collections::BTreeMap;

/// Kernel namespaces a container may set sysctls in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SysctlNamespace {
    /// `net.*`, scoped to the network namespace.
    Network,
    /// `fs.mqueue.*`, scoped to the IPC namespace.
    MessageQueue,
    /// The System V IPC `kernel.*` keys.
    Ipc,
}

const IPC_KERNEL_KEYS: &[&str] = &[
    "kernel.msgmax",
    "kernel.msgmnb",
    "kernel.msgmni",
    "kernel.sem",
    "kernel.shm_rmid_forced",
    "kernel.shmall",
    "kernel.shmmax",
    "kernel.shmmni",
];

impl SysctlNamespace {
    /// Classify a key, or `None` when it is not namespaced.
    pub fn of(key: &str) -> Option<Self> {
        if key.starts_with("net.") {
            Some(Self::Network)
        } else if key.starts_with("fs.mqueue.") {
            Some(Self::MessageQueue)
        } else if IPC_KERNEL_KEYS.contains(&key) {
            Some(Self::Ipc)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sysctls {
    container: String,
    sysctls: BTreeMap<String, String>,
}

impl Sysctls {
    pub(crate) fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            sysctls: BTreeMap::new(),
        }
    }

    /// Set a sysctl. The key is checked against the namespace catalog at render.
    pub fn add(&mut self, key: &str, value: impl ToString) -> RenderResult<()> {
        if key.is_empty() {
            return Err(RenderError::missing("sysctl", &self.container, "key"));
        }
        if self.sysctls.contains_key(key) {
            return Err(RenderError::duplicate("sysctl", &self.container, key));
        }
        self.sysctls.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub(crate) fn render(&self) -> BTreeMap<String, String> {
        self.sysctls.clone()
    }
}

impl Validate for Sysctls {
    fn validate(&self, ctx: &ValidationContext<'_>) -> RenderResult<()> {
        for key in self.sysctls.keys() {
            match SysctlNamespace::of(key) {
                None => {
                    return Err(RenderError::UnknownSysctl {
                        container: self.container.clone(),
                        key: key.clone(),
                    });
                }
                Some(SysctlNamespace::Network) if ctx.network_mode.is_host() => {
                    return Err(RenderError::incompatible(
                        &self.container,
                        format!("sysctl [{key}] cannot be set with host network mode"),
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
