//! DNS settings, seeded from the global network values.

use crate::error::{RenderError, RenderResult};
use crate::values::NetworkValues;

#[derive(Debug, Clone)]
pub struct Dns {
    container: String,
    nameservers: Vec<String>,
    searches: Vec<String>,
    opts: Vec<String>,
}

impl Dns {
    /// Copy the DNS settings from values, failing on any duplicate.
    pub(crate) fn from_network(container: &str, network: &NetworkValues) -> RenderResult<Self> {
        let mut dns = Self {
            container: container.to_string(),
            nameservers: Vec::new(),
            searches: Vec::new(),
            opts: Vec::new(),
        };
        for nameserver in &network.dns_nameservers {
            dns.add_nameserver(nameserver)?;
        }
        for search in &network.dns_searches {
            dns.add_search(search)?;
        }
        for opt in &network.dns_opts {
            dns.add_opt(opt)?;
        }
        Ok(dns)
    }

    pub fn add_nameserver(&mut self, nameserver: &str) -> RenderResult<()> {
        Self::push_unique(&self.container, &mut self.nameservers, "dns nameserver", nameserver)
    }

    pub fn add_search(&mut self, search: &str) -> RenderResult<()> {
        Self::push_unique(&self.container, &mut self.searches, "dns search", search)
    }

    pub fn add_opt(&mut self, opt: &str) -> RenderResult<()> {
        Self::push_unique(&self.container, &mut self.opts, "dns opt", opt)
    }

    fn push_unique(
        container: &str,
        list: &mut Vec<String>,
        resource: &'static str,
        value: &str,
    ) -> RenderResult<()> {
        if value.is_empty() {
            return Err(RenderError::missing(resource, container, "value"));
        }
        if list.iter().any(|existing| existing == value) {
            return Err(RenderError::duplicate(resource, container, value));
        }
        list.push(value.to_string());
        Ok(())
    }

    pub fn nameservers(&self) -> &[String] {
        &self.nameservers
    }

    pub fn searches(&self) -> &[String] {
        &self.searches
    }

    pub fn opts(&self) -> &[String] {
        &self.opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(nameservers: &[&str], searches: &[&str], opts: &[&str]) -> NetworkValues {
        let owned = |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
        NetworkValues {
            dns_nameservers: owned(nameservers),
            dns_searches: owned(searches),
            dns_opts: owned(opts),
            host_network: false,
        }
    }

    #[test]
    fn test_seeded_from_network() {
        let network = network(&["1.1.1.1", "8.8.8.8"], &["lan"], &["ndots:2"]);
        let dns = Dns::from_network("web", &network).unwrap();
        assert_eq!(dns.nameservers(), ["1.1.1.1", "8.8.8.8"]);
        assert_eq!(dns.searches(), ["lan"]);
        assert_eq!(dns.opts(), ["ndots:2"]);
    }

    #[test]
    fn test_duplicates_per_category() {
        assert!(Dns::from_network("web", &network(&["1.1.1.1", "1.1.1.1"], &[], &[])).is_err());
        assert!(Dns::from_network("web", &network(&[], &["lan", "lan"], &[])).is_err());
        assert!(Dns::from_network("web", &network(&[], &[], &["ndots:1", "ndots:1"])).is_err());
    }

    #[test]
    fn test_same_value_across_categories() {
        // each category is checked on its own
        let dns = Dns::from_network("web", &network(&["lan"], &["lan"], &["lan"])).unwrap();
        assert_eq!(dns.searches(), ["lan"]);
    }

    #[test]
    fn test_add_after_creation() {
        let mut dns = Dns::from_network("web", &network(&["1.1.1.1"], &[], &[])).unwrap();
        dns.add_nameserver("9.9.9.9").unwrap();
        assert!(dns.add_nameserver("1.1.1.1").is_err());
        assert!(dns.add_search("").is_err());
    }
}
