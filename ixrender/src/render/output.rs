//! Rendered document types.
//!
//! Field names follow the Compose file format so the output can be written
//! out as-is. Every map is a `BTreeMap`, which keeps the serialized document
//! stable across runs.

use crate::container::{
    ConfigMountSpec, DeploySpec, DependsOnSpec, HealthcheckSpec, MountSpec, PublishedPortSpec,
};
use crate::image::BuildSpec;
use crate::portal::Portal;
use serde::Serialize;
use std::collections::BTreeMap;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Immutable snapshot returned by [`Render::render`](super::Render::render).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedOutput {
    pub services: BTreeMap<String, ServiceSpec>,

    pub configs: BTreeMap<String, ConfigSpec>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub volumes: BTreeMap<String, VolumeSpec>,

    #[serde(rename = "x-portals")]
    pub portals: Vec<Portal>,

    #[serde(rename = "x-notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Top-level config; content is already `$`-escaped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfigSpec {
    pub content: String,
}

/// Top-level named volume. Always empty, the engine picks the driver.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VolumeSpec {}

/// One entry of `services`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServiceSpec {
    pub image: String,
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildSpec>,
    pub restart: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub tty: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub stdin_open: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init: Option<bool>,

    pub cap_drop: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cap_add: Vec<String>,
    pub security_opt: Vec<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<HealthcheckSpec>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub depends_on: BTreeMap<String, DependsOnSpec>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sysctls: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns_search: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns_opt: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_hosts: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expose: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<PublishedPortSpec>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub device_cgroup_rules: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<ConfigMountSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<MountSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy: Option<DeploySpec>,
}
