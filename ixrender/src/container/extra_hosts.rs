//! `/etc/hosts` entries.

use crate::error::{RenderError, RenderResult};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Resolves to the host's gateway address inside the container.
pub const HOST_GATEWAY: &str = "host-gateway";

#[derive(Debug, Clone)]
pub struct ExtraHosts {
    container: String,
    hosts: BTreeMap<String, String>,
}

impl ExtraHosts {
    pub(crate) fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            hosts: BTreeMap::new(),
        }
    }

    /// Map `hostname` to an IP address or to [`HOST_GATEWAY`].
    pub fn add_host(&mut self, hostname: &str, ip: &str) -> RenderResult<()> {
        if hostname.is_empty() {
            return Err(RenderError::missing("extra host", &self.container, "hostname"));
        }
        if ip != HOST_GATEWAY && ip.parse::<IpAddr>().is_err() {
            return Err(RenderError::invalid(
                "extra host",
                &self.container,
                format!("[{ip}] for [{hostname}] is not a valid IP address"),
            ));
        }
        if self.hosts.contains_key(hostname) {
            return Err(RenderError::duplicate("extra host", &self.container, hostname));
        }
        self.hosts.insert(hostname.to_string(), ip.to_string());
        Ok(())
    }

    pub(crate) fn render(&self) -> BTreeMap<String, String> {
        self.hosts.clone()
    }
}
