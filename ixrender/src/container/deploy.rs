//! Resource limits (`deploy.resources.limits`).

use crate::error::{RenderError, RenderResult};
use crate::values::LimitValues;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeploySpec {
    pub resources: ResourcesSpec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResourcesSpec {
    pub limits: LimitsSpec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LimitsSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Resources {
    container: String,
    cpus: Option<f64>,
    memory_mib: Option<u64>,
}

impl Resources {
    /// Start from the global limits in values.
    pub(crate) fn from_limits(container: &str, limits: Option<&LimitValues>) -> RenderResult<Self> {
        let mut resources = Self {
            container: container.to_string(),
            cpus: None,
            memory_mib: None,
        };
        if let Some(limits) = limits {
            if let Some(cpus) = limits.cpus {
                resources.set_cpus(cpus)?;
            }
            if let Some(memory) = limits.memory {
                resources.set_memory_mib(memory)?;
            }
        }
        Ok(resources)
    }

    pub fn set_cpus(&mut self, cpus: f64) -> RenderResult<()> {
        if !cpus.is_finite() || cpus <= 0.0 {
            return Err(RenderError::invalid(
                "resource limits",
                &self.container,
                format!("cpus [{cpus}] must be greater than 0"),
            ));
        }
        self.cpus = Some(cpus);
        Ok(())
    }

    pub fn set_memory_mib(&mut self, memory_mib: u64) -> RenderResult<()> {
        if memory_mib == 0 {
            return Err(RenderError::invalid(
                "resource limits",
                &self.container,
                "memory must be greater than 0",
            ));
        }
        self.memory_mib = Some(memory_mib);
        Ok(())
    }

    pub(crate) fn render(&self) -> Option<DeploySpec> {
        if self.cpus.is_none() && self.memory_mib.is_none() {
            return None;
        }
        Some(DeploySpec {
            resources: ResourcesSpec {
                limits: LimitsSpec {
                    cpus: self.cpus.map(|cpus| cpus.to_string()),
                    memory: self.memory_mib.map(|mib| format!("{mib}M")),
                },
            },
        })
    }
}
