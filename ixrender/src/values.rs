//! Input document ("values") schema.
//!
//! The schema is closed: every struct denies unknown fields, so a document
//! edited after it was handed to [`Render`](crate::Render) is caught when it
//! is validated again at render time.

use crate::error::{RenderError, RenderResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-supplied values describing the composition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Values {
    /// Logical image name -> image reference.
    pub images: BTreeMap<String, ImageRef>,

    #[serde(default)]
    pub network: NetworkValues,

    /// Labels fanned out to the named containers at render time.
    #[serde(default)]
    pub labels: Vec<GlobalLabel>,

    /// Default resource limits for every container.
    #[serde(default)]
    pub resources: ResourceValues,

    /// Free-form notes emitted as `x-notes`.
    #[serde(default)]
    pub notes: Option<String>,
}

impl Values {
    /// Validate a raw document against the closed schema.
    pub fn from_document(document: &serde_json::Value) -> RenderResult<Self> {
        Self::deserialize(document).map_err(RenderError::Schema)
    }
}

/// Image repository and tag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageRef {
    pub repository: String,
    pub tag: String,
}

impl ImageRef {
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// `repository:tag`
    pub fn reference(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }
}

/// Network settings applied to every container on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkValues {
    #[serde(default)]
    pub dns_nameservers: Vec<String>,
    #[serde(default)]
    pub dns_searches: Vec<String>,
    #[serde(default)]
    pub dns_opts: Vec<String>,
    #[serde(default)]
    pub host_network: bool,
}

/// A label applied to a list of containers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalLabel {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub containers: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceValues {
    #[serde(default)]
    pub limits: Option<LimitValues>,
}

/// CPU count and memory in MiB.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitValues {
    #[serde(default)]
    pub cpus: Option<f64>,
    #[serde(default)]
    pub memory: Option<u64>,
}
