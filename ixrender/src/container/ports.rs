//! Ports published on the host.

use crate::error::{RenderError, RenderResult};
use crate::types::{NetworkMode, PortProtocol};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Rendered `ports` entry (long syntax).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublishedPortSpec {
    pub target: u16,
    pub published: String,
    pub protocol: PortProtocol,
    pub mode: &'static str,
    pub host_ip: String,
}

#[derive(Debug, Clone)]
pub struct Ports {
    container: String,
    // (host_ip, published, protocol) -> target
    ports: BTreeMap<(IpAddr, u16, PortProtocol), u16>,
}

impl Ports {
    pub(crate) fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            ports: BTreeMap::new(),
        }
    }

    /// Publish `target` on `published` for every address in `host_ips`
    /// (all IPv4 and IPv6 addresses when empty).
    pub fn add_port(
        &mut self,
        published: u16,
        target: u16,
        protocol: PortProtocol,
        host_ips: &[String],
    ) -> RenderResult<()> {
        if published == 0 || target == 0 {
            return Err(RenderError::invalid(
                "published port",
                &self.container,
                "ports must be between 1 and 65535",
            ));
        }

        let addresses = if host_ips.is_empty() {
            vec![
                IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            ]
        } else {
            host_ips
                .iter()
                .map(|ip| {
                    ip.parse::<IpAddr>().map_err(|_| {
                        RenderError::invalid(
                            "published port",
                            &self.container,
                            format!("host ip [{ip}] is not a valid IP address"),
                        )
                    })
                })
                .collect::<RenderResult<Vec<_>>>()?
        };

        // check everything before inserting so a failure leaves no partial state
        for address in &addresses {
            if self.ports.contains_key(&(*address, published, protocol)) {
                return Err(RenderError::duplicate(
                    "published port",
                    &self.container,
                    format!("{address}:{published}/{protocol}"),
                ));
            }
        }
        if addresses.len() != addresses.iter().collect::<BTreeSet<_>>().len() {
            return Err(RenderError::invalid(
                "published port",
                &self.container,
                "host ips contain duplicates",
            ));
        }

        for address in addresses {
            self.ports.insert((address, published, protocol), target);
        }
        Ok(())
    }

    pub(crate) fn render(&self, network_mode: NetworkMode) -> Option<Vec<PublishedPortSpec>> {
        if self.ports.is_empty() {
            return None;
        }
        if network_mode.is_host() {
            tracing::warn!(
                container = %self.container,
                count = self.ports.len(),
                "Dropping published ports, container uses host network"
            );
            return None;
        }
        Some(
            self.ports
                .iter()
                .map(|(&(host_ip, published, protocol), &target)| PublishedPortSpec {
                    target,
                    published: published.to_string(),
                    protocol,
                    mode: "ingress",
                    host_ip: host_ip.to_string(),
                })
                .collect(),
        )
    }
}
