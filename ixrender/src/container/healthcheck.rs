//! Container health checks.

use crate::error::{RenderError, RenderResult};
use crate::util::{escape_dollar, format_duration, shell_quote};
use serde::Serialize;
use std::time::Duration;

/// What the health check runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HealthTest {
    /// Exec form, run without a shell.
    Command(Vec<String>),
    /// Run through `/bin/sh -c`.
    Shell(String),
    /// `curl` against a local HTTP endpoint.
    Http { port: u16, path: String },
    /// `wget` against a local HTTP endpoint, for images without curl.
    Wget { port: u16, path: String },
    /// Open a TCP connection with netcat.
    Tcp { port: u16 },
    /// `pg_isready` against a local PostgreSQL.
    Postgres { port: u16, user: String, database: String },
    /// `redis-cli ping` against a local Redis.
    Redis { port: u16 },
}

impl HealthTest {
    fn validate(&self) -> Result<(), String> {
        match self {
            Self::Command(argv) if argv.is_empty() || argv[0].is_empty() => {
                Err("command must not be empty".into())
            }
            Self::Shell(script) if script.trim().is_empty() => {
                Err("shell script must not be empty".into())
            }
            Self::Http { port, path } | Self::Wget { port, path } => {
                check_port(*port)?;
                if !path.starts_with('/') {
                    return Err(format!("path [{path}] must start with [/]"));
                }
                Ok(())
            }
            Self::Tcp { port } | Self::Redis { port } => check_port(*port),
            Self::Postgres { port, user, database } => {
                check_port(*port)?;
                if user.is_empty() || database.is_empty() {
                    return Err("postgres user and database must not be empty".into());
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn to_test(&self) -> Vec<String> {
        let shell = |script: String| vec!["CMD-SHELL".to_string(), escape_dollar(&script)];
        match self {
            Self::Command(argv) => std::iter::once("CMD".to_string())
                .chain(argv.iter().map(|arg| escape_dollar(arg)))
                .collect(),
            Self::Shell(script) => shell(script.clone()),
            Self::Http { port, path } => shell(format!(
                "curl --silent --output /dev/null --show-error --fail {}",
                shell_quote(&format!("http://127.0.0.1:{port}{path}"))
            )),
            Self::Wget { port, path } => shell(format!(
                "wget --spider --quiet {}",
                shell_quote(&format!("http://127.0.0.1:{port}{path}"))
            )),
            Self::Tcp { port } => shell(format!("nc -z -w 5 127.0.0.1 {port}")),
            Self::Postgres {
                port,
                user,
                database,
            } => shell(format!(
                "pg_isready -h 127.0.0.1 -p {port} -U {} -d {}",
                shell_quote(user),
                shell_quote(database)
            )),
            Self::Redis { port } => shell(format!(
                "redis-cli -h 127.0.0.1 -p {port} ping | grep -q PONG"
            )),
        }
    }
}

fn check_port(port: u16) -> Result<(), String> {
    if port == 0 {
        return Err("port must be between 1 and 65535".into());
    }
    Ok(())
}

/// Rendered `healthcheck` fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthcheckSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,
}

/// Health check of one container.
///
/// A container with no test and not disabled inherits whatever the image
/// declares; nothing is rendered for it.
#[derive(Debug, Clone)]
pub struct Healthcheck {
    container: String,
    test: Option<HealthTest>,
    disabled: bool,
    interval: Duration,
    timeout: Duration,
    retries: u32,
    start_period: Duration,
    start_interval: Duration,
}

impl Healthcheck {
    pub(crate) fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            test: None,
            disabled: false,
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(5),
            retries: 5,
            start_period: Duration::from_secs(15),
            start_interval: Duration::from_secs(2),
        }
    }

    /// Set the test and re-enable the health check.
    pub fn set_test(&mut self, test: HealthTest) -> RenderResult<()> {
        test.validate()
            .map_err(|reason| RenderError::invalid("healthcheck", &self.container, reason))?;
        self.test = Some(test);
        self.disabled = false;
        Ok(())
    }

    pub fn set_interval(&mut self, interval: Duration) -> RenderResult<()> {
        self.interval = self.positive("interval", interval)?;
        Ok(())
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> RenderResult<()> {
        self.timeout = self.positive("timeout", timeout)?;
        Ok(())
    }

    pub fn set_start_period(&mut self, start_period: Duration) -> RenderResult<()> {
        self.start_period = self.positive("start_period", start_period)?;
        Ok(())
    }

    pub fn set_start_interval(&mut self, start_interval: Duration) -> RenderResult<()> {
        self.start_interval = self.positive("start_interval", start_interval)?;
        Ok(())
    }

    pub fn set_retries(&mut self, retries: u32) -> RenderResult<()> {
        if retries == 0 {
            return Err(RenderError::invalid(
                "healthcheck",
                &self.container,
                "retries must be at least 1",
            ));
        }
        self.retries = retries;
        Ok(())
    }

    /// Turn the health check off, including any check baked into the image.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn positive(&self, field: &str, duration: Duration) -> RenderResult<Duration> {
        if duration.as_secs() == 0 {
            return Err(RenderError::invalid(
                "healthcheck",
                &self.container,
                format!("{field} must be at least 1s"),
            ));
        }
        Ok(duration)
    }

    pub(crate) fn render(&self) -> Option<HealthcheckSpec> {
        if self.disabled {
            return Some(HealthcheckSpec {
                test: None,
                interval: None,
                timeout: None,
                retries: None,
                start_period: None,
                start_interval: None,
                disable: Some(true),
            });
        }

        let test = self.test.as_ref()?;
        Some(HealthcheckSpec {
            test: Some(test.to_test()),
            interval: Some(format_duration(self.interval)),
            timeout: Some(format_duration(self.timeout)),
            retries: Some(self.retries),
            start_period: Some(format_duration(self.start_period)),
            start_interval: Some(format_duration(self.start_interval)),
            disable: None,
        })
    }
}
