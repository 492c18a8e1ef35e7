//! Composition files: values plus a declarative list of containers.

use anyhow::{Context, Result};
use ixrender::container::HealthTest;
use ixrender::{Container, NetworkMode, PortProtocol, PortSpec, PortalOverrides, Render};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Composition {
    /// Engine input, passed through untouched.
    pub values: serde_json::Value,
    #[serde(default)]
    pub containers: Vec<ContainerDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerDef {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub network_mode: Option<NetworkMode>,
    #[serde(default)]
    pub restart: Option<RestartDef>,
    #[serde(default)]
    pub healthcheck: Option<HealthcheckDef>,
    #[serde(default)]
    pub user: Option<UserDef>,
    #[serde(default)]
    pub command: Option<Vec<String>>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    #[serde(default)]
    pub configs: Vec<ConfigDef>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub depends_on: BTreeMap<String, String>,
    #[serde(default)]
    pub sysctls: BTreeMap<String, String>,
    #[serde(default)]
    pub extra_hosts: BTreeMap<String, String>,
    #[serde(default)]
    pub device_cgroup_rules: Vec<String>,
    #[serde(default)]
    pub cap_add: Vec<String>,
    #[serde(default)]
    pub expose: Vec<ExposeDef>,
    #[serde(default)]
    pub ports: Vec<PortDef>,
    #[serde(default)]
    pub volumes: Vec<VolumeDef>,
    #[serde(default)]
    pub build: Vec<Option<String>>,
    #[serde(default)]
    pub portals: Vec<PortalDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestartDef {
    pub policy: String,
    #[serde(default)]
    pub maximum_retry_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserDef {
    pub uid: u32,
    pub gid: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthcheckDef {
    #[serde(default)]
    pub disable: bool,
    #[serde(default)]
    pub test: Option<TestDef>,
    #[serde(default)]
    pub interval: Option<u64>,
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub retries: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TestDef {
    Command { command: Vec<String> },
    Shell { script: String },
    Http { port: u16, #[serde(default = "root_path")] path: String },
    Wget { port: u16, #[serde(default = "root_path")] path: String },
    Tcp { port: u16 },
    Postgres { port: u16, user: String, database: String },
    Redis { port: u16 },
}

fn root_path() -> String {
    "/".to_string()
}

impl From<TestDef> for HealthTest {
    fn from(def: TestDef) -> Self {
        match def {
            TestDef::Command { command } => HealthTest::Command(command),
            TestDef::Shell { script } => HealthTest::Shell(script),
            TestDef::Http { port, path } => HealthTest::Http { port, path },
            TestDef::Wget { port, path } => HealthTest::Wget { port, path },
            TestDef::Tcp { port } => HealthTest::Tcp { port },
            TestDef::Postgres {
                port,
                user,
                database,
            } => HealthTest::Postgres {
                port,
                user,
                database,
            },
            TestDef::Redis { port } => HealthTest::Redis { port },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDef {
    pub name: String,
    pub content: String,
    pub target: String,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExposeDef {
    pub port: u16,
    #[serde(default)]
    pub protocol: PortProtocol,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortDef {
    pub port: PortSpec,
    #[serde(default)]
    pub target: Option<u16>,
    #[serde(default)]
    pub protocol: PortProtocol,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VolumeDef {
    HostPath {
        source: PathBuf,
        target: String,
        #[serde(default)]
        read_only: bool,
    },
    Volume {
        source: String,
        target: String,
        #[serde(default)]
        read_only: bool,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortalDef {
    pub port: PortSpec,
    #[serde(default)]
    pub overrides: PortalOverrides,
}

impl Composition {
    /// Parse JSON or YAML. YAML is a superset of JSON, so one parser covers both.
    pub fn parse(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse composition file")
    }

    /// Drive the engine with every container of the file.
    pub fn build(self) -> Result<Render> {
        let mut render = Render::new(self.values)?;
        for def in self.containers {
            let name = def.name.clone();
            def.apply(&mut render)
                .with_context(|| format!("Failed to configure container '{}'", name))?;
        }
        Ok(render)
    }
}

impl ContainerDef {
    fn apply(self, render: &mut Render) -> Result<()> {
        let container = render.add_container(&self.name, &self.image)?;
        let portals = self.configure(container)?;

        for portal in portals {
            render.portals_mut().add(&portal.port, portal.overrides)?;
        }
        Ok(())
    }

    fn configure(self, container: &mut Container) -> Result<Vec<PortalDef>> {
        if let Some(mode) = self.network_mode {
            container.set_network_mode(mode);
        }
        if let Some(restart) = self.restart {
            container
                .restart
                .set_policy(&restart.policy, restart.maximum_retry_count)?;
        }
        if let Some(healthcheck) = self.healthcheck {
            if let Some(test) = healthcheck.test {
                container.healthcheck.set_test(test.into())?;
            }
            if let Some(secs) = healthcheck.interval {
                container.healthcheck.set_interval(Duration::from_secs(secs))?;
            }
            if let Some(secs) = healthcheck.timeout {
                container.healthcheck.set_timeout(Duration::from_secs(secs))?;
            }
            if let Some(retries) = healthcheck.retries {
                container.healthcheck.set_retries(retries)?;
            }
            if healthcheck.disable {
                container.healthcheck.disable();
            }
        }
        if let Some(user) = self.user {
            container.set_user(user.uid, user.gid);
        }
        if let Some(command) = self.command {
            container.set_command(command)?;
        }

        container.environment.add_user_envs(self.environment)?;
        for config in self.configs {
            container.configs.add(
                &config.name,
                &config.content,
                &config.target,
                config.mode.as_deref(),
            )?;
        }
        for (key, value) in self.labels {
            container.labels.add_label(&key, value)?;
        }
        for (target, condition) in self.depends_on {
            container.depends_on.add_dependency(&target, &condition)?;
        }
        for (key, value) in self.sysctls {
            container.sysctls.add(&key, value)?;
        }
        for (hostname, ip) in self.extra_hosts {
            container.extra_hosts.add_host(&hostname, &ip)?;
        }
        for rule in self.device_cgroup_rules {
            container.device_cgroup_rules.add_rule(&rule)?;
        }
        for capability in self.cap_add {
            container.add_cap(&capability)?;
        }
        for expose in self.expose {
            container.expose.add_port(expose.port, expose.protocol)?;
        }
        for port in self.ports {
            container.add_port(&port.port, port.target, port.protocol)?;
        }
        for volume in self.volumes {
            match volume {
                VolumeDef::HostPath {
                    source,
                    target,
                    read_only,
                } => container.storage.add_host_path(source, &target, read_only)?,
                VolumeDef::Volume {
                    source,
                    target,
                    read_only,
                } => container.storage.add_named_volume(&source, &target, read_only)?,
            }
        }
        if !self.build.is_empty() {
            container.image.build_image(self.build)?;
        }

        Ok(self.portals)
    }
}
