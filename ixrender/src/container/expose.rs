//! Ports exposed to sibling containers without publishing them.

use crate::error::{RenderError, RenderResult};
use crate::types::{NetworkMode, PortProtocol};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct Expose {
    container: String,
    ports: BTreeSet<(u16, PortProtocol)>,
}

impl Expose {
    pub(crate) fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            ports: BTreeSet::new(),
        }
    }

    pub fn add_port(&mut self, port: u16, protocol: PortProtocol) -> RenderResult<()> {
        if port == 0 {
            return Err(RenderError::invalid(
                "exposed port",
                &self.container,
                "port must be between 1 and 65535",
            ));
        }
        if !self.ports.insert((port, protocol)) {
            return Err(RenderError::duplicate(
                "exposed port",
                &self.container,
                format!("{port}/{protocol}"),
            ));
        }
        Ok(())
    }

    /// `None` when nothing is exposed or the container shares the host network.
    pub(crate) fn render(&self, network_mode: NetworkMode) -> Option<Vec<String>> {
        if self.ports.is_empty() {
            return None;
        }
        if network_mode.is_host() {
            tracing::warn!(
                container = %self.container,
                count = self.ports.len(),
                "Dropping exposed ports, container uses host network"
            );
            return None;
        }
        Some(
            self.ports
                .iter()
                .map(|(port, protocol)| format!("{port}/{protocol}"))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let mut expose = Expose::new("web");
        expose.add_port(8080, PortProtocol::Tcp).unwrap();
        expose.add_port(53, PortProtocol::Udp).unwrap();
        expose.add_port(53, PortProtocol::Tcp).unwrap();

        assert_eq!(
            expose.render(NetworkMode::Bridge).unwrap(),
            vec!["53/tcp", "53/udp", "8080/tcp"]
        );
    }

    #[test]
    fn test_duplicate_pair() {
        let mut expose = Expose::new("web");
        expose.add_port(80, PortProtocol::Tcp).unwrap();
        assert!(matches!(
            expose.add_port(80, PortProtocol::Tcp).unwrap_err(),
            RenderError::Duplicate { .. }
        ));
    }

    #[test]
    fn test_host_network_omits_fragment() {
        let mut expose = Expose::new("web");
        expose.add_port(80, PortProtocol::Tcp).unwrap();
        assert!(expose.render(NetworkMode::Host).is_none());
    }

    #[test]
    fn test_empty_omits_fragment() {
        assert!(Expose::new("web").render(NetworkMode::Bridge).is_none());
    }
}
