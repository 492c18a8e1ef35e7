//! Externally reachable endpoints (`x-portals`).

use crate::error::{RenderError, RenderResult};
use crate::types::{BindMode, PortSpec};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::str::FromStr;

pub const DEFAULT_PORTAL_NAME: &str = "Web UI";

/// Host used when a port has no candidate addresses.
const FALLBACK_HOST: &str = "0.0.0.0";

/// URL schemes a portal may use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortalScheme {
    #[default]
    Http,
    Https,
}

impl FromStr for PortalScheme {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(RenderError::InvalidScheme(other.to_string())),
        }
    }
}

/// Optional overrides for [`PortalRegistry::add`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortalOverrides {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    /// `None` (or an explicit null) keeps the port number of the `PortSpec`.
    #[serde(default)]
    pub port: Option<i64>,
    #[serde(default)]
    pub path: Option<String>,
}

/// A resolved portal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Portal {
    pub name: String,
    pub scheme: PortalScheme,
    pub host: String,
    pub port: u16,
    pub path: String,
    #[serde(skip)]
    bind_mode: BindMode,
}

impl Portal {
    /// Whether the underlying port was published or only exposed.
    pub fn bind_mode(&self) -> BindMode {
        self.bind_mode
    }
}

/// Portals in insertion order, unique by resolved name.
#[derive(Debug, Default, Clone)]
pub struct PortalRegistry {
    portals: Vec<Portal>,
}

impl PortalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve and record a portal for `spec`.
    pub fn add(&mut self, spec: &PortSpec, overrides: PortalOverrides) -> RenderResult<&Portal> {
        let name = overrides
            .name
            .unwrap_or_else(|| DEFAULT_PORTAL_NAME.to_string());
        if self.portals.iter().any(|portal| portal.name == name) {
            return Err(RenderError::DuplicatePortal(name));
        }

        let scheme = match overrides.scheme.as_deref() {
            Some(scheme) => scheme.parse()?,
            None => PortalScheme::default(),
        };

        let host = overrides.host.unwrap_or_else(|| resolve_host(&spec.host_ips));

        let port = match overrides.port {
            Some(port) => u16::try_from(port)
                .ok()
                .filter(|&port| port > 0)
                .ok_or(RenderError::InvalidPort(port))?,
            None if spec.port_number == 0 => return Err(RenderError::InvalidPort(0)),
            None => spec.port_number,
        };

        let path = overrides.path.unwrap_or_else(|| "/".to_string());
        if !path.starts_with('/') || path.contains("//") {
            return Err(RenderError::InvalidPath(path));
        }

        tracing::debug!(
            name = %name,
            ?scheme,
            host = %host,
            port,
            path = %path,
            bind_mode = ?spec.bind_mode,
            "Resolved portal"
        );

        self.portals.push(Portal {
            name,
            scheme,
            host,
            port,
            path,
            bind_mode: spec.bind_mode,
        });
        let index = self.portals.len() - 1;
        Ok(&self.portals[index])
    }

    pub fn len(&self) -> usize {
        self.portals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }

    pub(crate) fn render(&self) -> Vec<Portal> {
        self.portals.clone()
    }
}

/// First address that is not a wildcard, else the first candidate.
fn resolve_host(host_ips: &[String]) -> String {
    host_ips
        .iter()
        .find(|ip| {
            ip.parse::<IpAddr>()
                .map(|addr| !addr.is_unspecified())
                .unwrap_or(true)
        })
        .or_else(|| host_ips.first())
        .cloned()
        .unwrap_or_else(|| FALLBACK_HOST.to_string())
}
