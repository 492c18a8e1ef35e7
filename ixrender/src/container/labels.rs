//! Container labels.

use crate::error::{RenderError, RenderResult};
use crate::util::escape_dollar;
use std::collections::BTreeMap;

/// Label namespaces owned by the engine and the compose tooling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReservedLabelPrefix {
    Compose,
    Docker,
    Engine,
}

impl ReservedLabelPrefix {
    pub const ALL: [Self; 3] = [Self::Compose, Self::Docker, Self::Engine];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compose => "com.docker.compose.",
            Self::Docker => "com.docker.",
            Self::Engine => "ix.",
        }
    }

    /// The reserved prefix `key` falls under, if any.
    pub fn matching(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|prefix| key.starts_with(prefix.as_str()))
    }
}

/// Check a label key against the reserved namespaces.
pub(crate) fn check_label_key(container: &str, key: &str) -> RenderResult<()> {
    if key.is_empty() {
        return Err(RenderError::missing("label", container, "key"));
    }
    if let Some(prefix) = ReservedLabelPrefix::matching(key) {
        return Err(RenderError::invalid(
            "label",
            container,
            format!("key [{key}] uses reserved prefix [{}]", prefix.as_str()),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Labels {
    container: String,
    labels: BTreeMap<String, String>,
}

impl Labels {
    pub(crate) fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            labels: BTreeMap::new(),
        }
    }

    pub fn add_label(&mut self, key: &str, value: impl ToString) -> RenderResult<()> {
        check_label_key(&self.container, key)?;
        if self.labels.contains_key(key) {
            return Err(RenderError::duplicate("label", &self.container, key));
        }
        self.labels.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Values are `$`-escaped.
    pub(crate) fn render(&self) -> BTreeMap<String, String> {
        self.labels
            .iter()
            .map(|(key, value)| (key.clone(), escape_dollar(value)))
            .collect()
    }
}
