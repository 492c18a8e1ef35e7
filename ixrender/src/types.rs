//! Small value types shared by containers and the portal registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a container is attached to the network.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    #[default]
    Bridge,
    Host,
}

impl NetworkMode {
    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host)
    }
}

/// Transport protocol of a port.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PortProtocol {
    #[default]
    Tcp,
    Udp,
}

impl PortProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl fmt::Display for PortProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            other => Err(format!("unknown protocol [{other}], expected tcp or udp")),
        }
    }
}

/// Whether a port is published on the host or only exposed to siblings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    #[default]
    Published,
    Exposed,
}

/// A port as it appears in values (host side of a mapping).
///
/// An empty `host_ips` list binds on every address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortSpec {
    #[serde(default)]
    pub bind_mode: BindMode,
    pub port_number: u16,
    #[serde(default)]
    pub host_ips: Vec<String>,
}

impl PortSpec {
    /// Published port bound on all addresses.
    pub fn published(port_number: u16) -> Self {
        Self {
            bind_mode: BindMode::Published,
            port_number,
            host_ips: Vec::new(),
        }
    }

    /// Port only exposed to other containers.
    pub fn exposed(port_number: u16) -> Self {
        Self {
            bind_mode: BindMode::Exposed,
            port_number,
            host_ips: Vec::new(),
        }
    }

    /// Replace the candidate host addresses.
    pub fn with_host_ips<I, S>(mut self, host_ips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.host_ips = host_ips.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parse() {
        assert_eq!("tcp".parse::<PortProtocol>().unwrap(), PortProtocol::Tcp);
        assert_eq!("udp".parse::<PortProtocol>().unwrap(), PortProtocol::Udp);
        assert!("sctp".parse::<PortProtocol>().is_err());
        assert!("TCP".parse::<PortProtocol>().is_err());
    }

    #[test]
    fn test_port_spec_serde_defaults() {
        let spec: PortSpec = serde_json::from_str(r#"{"port_number": 8080}"#).unwrap();
        assert_eq!(spec, PortSpec::published(8080));

        let spec: PortSpec = serde_json::from_str(
            r#"{"bind_mode": "exposed", "port_number": 53, "host_ips": ["::"]}"#,
        )
        .unwrap();
        assert_eq!(spec.bind_mode, BindMode::Exposed);
        assert_eq!(spec.host_ips, vec!["::".to_string()]);
    }
}
