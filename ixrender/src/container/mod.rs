//! A single service of the composition and the managers it owns.
//!
//! Every manager validates its own invariants when a value is added. Checks
//! that depend on other containers or on settings that may still change run
//! later through [`Validate`], when the composition is rendered.

mod configs;
mod deploy;
mod depends;
mod device_cgroup_rules;
mod dns;
mod environment;
mod expose;
mod extra_hosts;
mod healthcheck;
mod labels;
mod ports;
mod restart;
mod security_opts;
mod storage;
mod sysctls;

pub use configs::{ConfigMountSpec, Configs};
pub use deploy::{DeploySpec, LimitsSpec, Resources, ResourcesSpec};
pub use depends::{Dependencies, DependencyCondition, DependsOnSpec};
pub use device_cgroup_rules::{DeviceCgroupRule, DeviceCgroupRules, DeviceType};
pub use dns::Dns;
pub use environment::Environment;
pub use expose::Expose;
pub use extra_hosts::{ExtraHosts, HOST_GATEWAY};
pub use healthcheck::{HealthTest, Healthcheck, HealthcheckSpec};
pub use labels::{Labels, ReservedLabelPrefix};
pub use ports::{Ports, PublishedPortSpec};
pub use restart::{RestartPolicy, RestartPolicyKind};
pub use security_opts::{SecurityOptName, SecurityOpts};
pub use storage::{BindOptions, MountSpec, Storage};
pub use sysctls::{SysctlNamespace, Sysctls};

pub(crate) use labels::check_label_key;

use crate::error::{RenderError, RenderResult};
use crate::image::ImageBuilder;
use crate::options::RenderOptions;
use crate::render::{ServiceSpec, Validate, ValidationContext};
use crate::types::{BindMode, NetworkMode, PortProtocol, PortSpec};
use crate::util::escape_dollar;
use crate::values::{ImageRef, Values};
use std::collections::BTreeMap;

/// Capabilities that may be added back after `cap_drop: [ALL]`.
pub const ALLOWED_CAPABILITIES: &[&str] = &[
    "AUDIT_WRITE",
    "CHOWN",
    "DAC_OVERRIDE",
    "DAC_READ_SEARCH",
    "FOWNER",
    "FSETID",
    "IPC_LOCK",
    "KILL",
    "MKNOD",
    "NET_ADMIN",
    "NET_BIND_SERVICE",
    "NET_BROADCAST",
    "NET_RAW",
    "PERFMON",
    "SETFCAP",
    "SETGID",
    "SETPCAP",
    "SETUID",
    "SYS_ADMIN",
    "SYS_CHROOT",
    "SYS_NICE",
    "SYS_PTRACE",
    "SYS_RESOURCE",
    "SYS_TIME",
];

/// One named service.
#[derive(Debug, Clone)]
pub struct Container {
    name: String,
    platform: String,
    network_mode: NetworkMode,
    user: Option<(u32, u32)>,
    command: Option<Vec<String>>,
    entrypoint: Option<Vec<String>>,
    working_dir: Option<String>,
    hostname: Option<String>,
    tty: bool,
    stdin_open: bool,
    read_only: bool,
    init: Option<bool>,
    cap_add: Vec<String>,

    pub image: ImageBuilder,
    pub healthcheck: Healthcheck,
    pub restart: RestartPolicy,
    pub depends_on: Dependencies,
    pub sysctls: Sysctls,
    pub security_opts: SecurityOpts,
    pub dns: Dns,
    pub extra_hosts: ExtraHosts,
    pub expose: Expose,
    pub ports: Ports,
    pub device_cgroup_rules: DeviceCgroupRules,
    pub environment: Environment,
    pub configs: Configs,
    pub labels: Labels,
    pub storage: Storage,
    pub resources: Resources,
}

impl Container {
    pub(crate) fn new(
        name: &str,
        image: ImageRef,
        values: &Values,
        options: &RenderOptions,
    ) -> RenderResult<Self> {
        let network_mode = if values.network.host_network {
            NetworkMode::Host
        } else {
            NetworkMode::Bridge
        };

        Ok(Self {
            name: name.to_string(),
            platform: options.platform.clone(),
            network_mode,
            user: None,
            command: None,
            entrypoint: None,
            working_dir: None,
            hostname: None,
            tty: false,
            stdin_open: false,
            read_only: false,
            init: None,
            cap_add: Vec::new(),
            image: ImageBuilder::new(name, image, &options.image_prefix),
            healthcheck: Healthcheck::new(name),
            restart: RestartPolicy::new(name, options.restart_policy),
            depends_on: Dependencies::new(name),
            sysctls: Sysctls::new(name),
            security_opts: SecurityOpts::new(name),
            dns: Dns::from_network(name, &values.network)?,
            extra_hosts: ExtraHosts::new(name),
            expose: Expose::new(name),
            ports: Ports::new(name),
            device_cgroup_rules: DeviceCgroupRules::new(name),
            environment: Environment::new(name),
            configs: Configs::new(name),
            labels: Labels::new(name),
            storage: Storage::new(name),
            resources: Resources::from_limits(name, values.resources.limits.as_ref())?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn network_mode(&self) -> NetworkMode {
        self.network_mode
    }

    pub fn set_network_mode(&mut self, mode: NetworkMode) {
        self.network_mode = mode;
    }

    /// Route a values port to the right manager.
    ///
    /// Published ports go to `ports`, exposed ones to `expose`. `target`
    /// defaults to the port number.
    pub fn add_port(
        &mut self,
        spec: &PortSpec,
        target: Option<u16>,
        protocol: PortProtocol,
    ) -> RenderResult<()> {
        let target = target.unwrap_or(spec.port_number);
        match spec.bind_mode {
            BindMode::Published => {
                self.ports
                    .add_port(spec.port_number, target, protocol, &spec.host_ips)
            }
            BindMode::Exposed => self.expose.add_port(target, protocol),
        }
    }

    pub fn set_user(&mut self, uid: u32, gid: u32) {
        self.user = Some((uid, gid));
    }

    pub fn set_command<I, S>(&mut self, command: I) -> RenderResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = Some(self.argv("command", command)?);
        Ok(())
    }

    pub fn set_entrypoint<I, S>(&mut self, entrypoint: I) -> RenderResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entrypoint = Some(self.argv("entrypoint", entrypoint)?);
        Ok(())
    }

    fn argv<I, S>(&self, resource: &'static str, argv: I) -> RenderResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        if argv.is_empty() {
            return Err(RenderError::missing(resource, &self.name, "argument"));
        }
        Ok(argv)
    }

    pub fn set_working_dir(&mut self, working_dir: &str) -> RenderResult<()> {
        if !working_dir.starts_with('/') {
            return Err(RenderError::invalid(
                "working_dir",
                &self.name,
                format!("[{working_dir}] must be an absolute path"),
            ));
        }
        self.working_dir = Some(working_dir.to_string());
        Ok(())
    }

    pub fn set_hostname(&mut self, hostname: &str) -> RenderResult<()> {
        let valid = !hostname.is_empty()
            && hostname.len() <= 253
            && hostname.split('.').all(|part| {
                !part.is_empty()
                    && part.len() <= 63
                    && !part.starts_with('-')
                    && !part.ends_with('-')
                    && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            });
        if !valid {
            return Err(RenderError::invalid(
                "hostname",
                &self.name,
                format!("[{hostname}] is not a valid hostname"),
            ));
        }
        self.hostname = Some(hostname.to_string());
        Ok(())
    }

    pub fn set_tty(&mut self, tty: bool) {
        self.tty = tty;
    }

    pub fn set_stdin(&mut self, stdin_open: bool) {
        self.stdin_open = stdin_open;
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn set_init(&mut self, init: bool) {
        self.init = Some(init);
    }

    /// Add back one capability dropped by `cap_drop: [ALL]`.
    pub fn add_cap(&mut self, capability: &str) -> RenderResult<()> {
        if !ALLOWED_CAPABILITIES.contains(&capability) {
            return Err(RenderError::invalid(
                "capability",
                &self.name,
                format!("[{capability}] is not an allowed capability"),
            ));
        }
        if self.cap_add.iter().any(|cap| cap == capability) {
            return Err(RenderError::duplicate("capability", &self.name, capability));
        }
        self.cap_add.push(capability.to_string());
        Ok(())
    }

    /// Deferred checks, in the order they run.
    fn validators(&self) -> [&dyn Validate; 2] {
        [&self.depends_on, &self.sysctls]
    }

    fn check_mount_targets(&self) -> RenderResult<()> {
        for target in self.configs.targets() {
            if self.storage.targets().any(|mount| mount == target) {
                return Err(RenderError::Conflict {
                    resource: "mount target",
                    key: target.to_string(),
                    reason: format!(
                        "container [{}] mounts both a config and a volume there",
                        self.name
                    ),
                });
            }
        }
        Ok(())
    }

    /// Assemble the service. `labels` already includes global labels.
    pub(crate) fn render(&self, labels: BTreeMap<String, String>) -> ServiceSpec {
        let mut cap_add = self.cap_add.clone();
        cap_add.sort();

        ServiceSpec {
            image: self.image.image(),
            platform: self.platform.clone(),
            build: self.image.render_build(),
            restart: self.restart.render(),
            network_mode: self.network_mode.is_host().then(|| "host".to_string()),
            user: self.user.map(|(uid, gid)| format!("{uid}:{gid}")),
            command: self.command.as_deref().map(escape_argv),
            entrypoint: self.entrypoint.as_deref().map(escape_argv),
            working_dir: self.working_dir.clone(),
            hostname: self.hostname.clone(),
            tty: self.tty,
            stdin_open: self.stdin_open,
            read_only: self.read_only,
            init: self.init,
            cap_drop: vec!["ALL".to_string()],
            cap_add,
            security_opt: self.security_opts.render(),
            environment: self.environment.render(),
            labels,
            healthcheck: self.healthcheck.render(),
            depends_on: self.depends_on.render(),
            sysctls: self.sysctls.render(),
            dns: self.dns.nameservers().to_vec(),
            dns_search: self.dns.searches().to_vec(),
            dns_opt: self.dns.opts().to_vec(),
            extra_hosts: self.extra_hosts.render(),
            expose: self.expose.render(self.network_mode),
            ports: self.ports.render(self.network_mode),
            device_cgroup_rules: self.device_cgroup_rules.render(),
            configs: self.configs.render(),
            volumes: self.storage.render(),
            deploy: self.resources.render(),
        }
    }
}

fn escape_argv(argv: &[String]) -> Vec<String> {
    argv.iter().map(|arg| escape_dollar(arg)).collect()
}

impl Validate for Container {
    fn validate(&self, ctx: &ValidationContext<'_>) -> RenderResult<()> {
        for validator in self.validators() {
            validator.validate(ctx)?;
        }
        self.check_mount_targets()
    }
}
