//! Start-order dependencies between containers.

use crate::error::{RenderError, RenderResult};
use crate::render::{Validate, ValidationContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Condition a dependency must reach before the dependent starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyCondition {
    #[serde(rename = "service_started")]
    Started,
    #[serde(rename = "service_healthy")]
    Healthy,
    #[serde(rename = "service_completed_successfully")]
    CompletedSuccessfully,
}

impl FromStr for DependencyCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "service_started" => Ok(Self::Started),
            "service_healthy" => Ok(Self::Healthy),
            "service_completed_successfully" => Ok(Self::CompletedSuccessfully),
            other => Err(format!(
                "unknown condition [{other}], expected one of \
                 [service_started, service_healthy, service_completed_successfully]"
            )),
        }
    }
}

/// Rendered `depends_on` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DependsOnSpec {
    pub condition: DependencyCondition,
}

#[derive(Debug, Clone)]
pub struct Dependencies {
    container: String,
    dependencies: BTreeMap<String, DependencyCondition>,
}

impl Dependencies {
    pub(crate) fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            dependencies: BTreeMap::new(),
        }
    }

    /// Depend on another container by name.
    ///
    /// The target does not need to exist yet; it is resolved at render time.
    pub fn add_dependency(&mut self, name: &str, condition: &str) -> RenderResult<()> {
        if name.is_empty() {
            return Err(RenderError::missing("dependency", &self.container, "name"));
        }
        if name == self.container {
            return Err(RenderError::invalid(
                "dependency",
                &self.container,
                "a container cannot depend on itself",
            ));
        }
        let condition = condition
            .parse::<DependencyCondition>()
            .map_err(|reason| RenderError::invalid("dependency", &self.container, reason))?;
        if self.dependencies.contains_key(name) {
            return Err(RenderError::duplicate("dependency", &self.container, name));
        }

        tracing::debug!(
            container = %self.container,
            dependency = %name,
            ?condition,
            "Added dependency"
        );
        self.dependencies.insert(name.to_string(), condition);
        Ok(())
    }

    pub(crate) fn render(&self) -> BTreeMap<String, DependsOnSpec> {
        self.dependencies
            .iter()
            .map(|(name, &condition)| (name.clone(), DependsOnSpec { condition }))
            .collect()
    }
}

impl Validate for Dependencies {
    fn validate(&self, ctx: &ValidationContext<'_>) -> RenderResult<()> {
        for (name, condition) in &self.dependencies {
            let Some(target) = ctx.containers.get(name) else {
                return Err(RenderError::unknown_reference(
                    "depends_on",
                    &self.container,
                    name,
                ));
            };
            if *condition == DependencyCondition::Healthy && target.healthcheck.is_disabled() {
                return Err(RenderError::incompatible(
                    &self.container,
                    format!("depends on [{name}] being healthy, but its healthcheck is disabled"),
                ));
            }
        }
        Ok(())
    }
}
