//! File configs mounted into a container.

use crate::error::{RenderError, RenderResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Rendered entry of a service's `configs` list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfigMountSpec {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ConfigEntry {
    content: String,
    target: String,
    mode: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Configs {
    container: String,
    configs: BTreeMap<String, ConfigEntry>,
}

impl Configs {
    pub(crate) fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            configs: BTreeMap::new(),
        }
    }

    /// Mount `content` at `target` under the config name `name`.
    ///
    /// `mode` is an octal permission string such as `"0644"` or `"0o600"`.
    /// Adding the exact same config twice is a no-op.
    pub fn add(
        &mut self,
        name: &str,
        content: &str,
        target: &str,
        mode: Option<&str>,
    ) -> RenderResult<()> {
        if name.is_empty() {
            return Err(RenderError::missing("config", &self.container, "name"));
        }
        if target.is_empty() {
            return Err(RenderError::missing("config", &self.container, "target"));
        }
        let mode = mode.map(|mode| self.parse_mode(mode)).transpose()?;
        let entry = ConfigEntry {
            content: content.to_string(),
            target: target.to_string(),
            mode,
        };

        if let Some(existing) = self.configs.get(name) {
            if *existing == entry {
                return Ok(());
            }
            return Err(RenderError::duplicate("config", &self.container, name));
        }
        if let Some((other, _)) = self.configs.iter().find(|(_, c)| c.target == target) {
            return Err(RenderError::invalid(
                "config",
                &self.container,
                format!("target [{target}] is already used by config [{other}]"),
            ));
        }

        tracing::debug!(container = %self.container, config = %name, target, "Added config");
        self.configs.insert(name.to_string(), entry);
        Ok(())
    }

    fn parse_mode(&self, mode: &str) -> RenderResult<u32> {
        let digits = mode.strip_prefix("0o").unwrap_or(mode);
        match u32::from_str_radix(digits, 8) {
            Ok(bits) if !digits.is_empty() && bits <= 0o7777 => Ok(bits),
            _ => Err(RenderError::invalid(
                "config",
                &self.container,
                format!("mode [{mode}] must be an octal permission between 0 and 7777"),
            )),
        }
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.configs.values().map(|c| c.target.as_str())
    }

    /// `(name, raw content)` pairs, for the top-level `configs` section.
    pub fn contents(&self) -> impl Iterator<Item = (&str, &str)> {
        self.configs
            .iter()
            .map(|(name, c)| (name.as_str(), c.content.as_str()))
    }

    pub(crate) fn render(&self) -> Vec<ConfigMountSpec> {
        self.configs
            .iter()
            .map(|(name, c)| ConfigMountSpec {
                source: name.clone(),
                target: c.target.clone(),
                mode: c.mode,
            })
            .collect()
    }
}
