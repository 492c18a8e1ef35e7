//! Restart policy.

use crate::error::{RenderError, RenderResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Restart policies understood by the container engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicyKind {
    No,
    Always,
    OnFailure,
    UnlessStopped,
}

impl RestartPolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Always => "always",
            Self::OnFailure => "on-failure",
            Self::UnlessStopped => "unless-stopped",
        }
    }
}

impl fmt::Display for RestartPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestartPolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no" => Ok(Self::No),
            "always" => Ok(Self::Always),
            "on-failure" => Ok(Self::OnFailure),
            "unless-stopped" => Ok(Self::UnlessStopped),
            other => Err(format!(
                "unknown policy [{other}], expected one of [no, always, on-failure, unless-stopped]"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RestartPolicy {
    container: String,
    policy: RestartPolicyKind,
    maximum_retry_count: Option<u32>,
}

impl RestartPolicy {
    pub(crate) fn new(container: &str, policy: RestartPolicyKind) -> Self {
        Self {
            container: container.to_string(),
            policy,
            maximum_retry_count: None,
        }
    }

    /// Set the policy by name.
    ///
    /// A retry count is only accepted together with `on-failure`.
    pub fn set_policy(
        &mut self,
        policy: &str,
        maximum_retry_count: Option<i64>,
    ) -> RenderResult<()> {
        let kind = policy
            .parse::<RestartPolicyKind>()
            .map_err(|reason| RenderError::invalid("restart policy", &self.container, reason))?;

        let count = match maximum_retry_count {
            None => None,
            Some(_) if kind != RestartPolicyKind::OnFailure => {
                return Err(RenderError::invalid(
                    "restart policy",
                    &self.container,
                    format!("maximum_retry_count is only allowed with [on-failure], not [{kind}]"),
                ));
            }
            Some(count) => Some(u32::try_from(count).map_err(|_| {
                RenderError::invalid(
                    "restart policy",
                    &self.container,
                    format!("maximum_retry_count [{count}] must be a non-negative integer"),
                )
            })?),
        };

        self.policy = kind;
        self.maximum_retry_count = count;
        Ok(())
    }

    pub fn policy(&self) -> RestartPolicyKind {
        self.policy
    }

    pub(crate) fn render(&self) -> String {
        match self.maximum_retry_count {
            Some(count) => format!("{}:{}", self.policy, count),
            None => self.policy.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RestartPolicy {
        RestartPolicy::new("web", RestartPolicyKind::UnlessStopped)
    }

    #[test]
    fn test_default_policy() {
        assert_eq!(policy().render(), "unless-stopped");
    }

    #[test]
    fn test_set_policy() {
        let mut restart = policy();
        restart.set_policy("always", None).unwrap();
        assert_eq!(restart.render(), "always");
        assert_eq!(restart.policy(), RestartPolicyKind::Always);
    }

    #[test]
    fn test_on_failure_with_retries() {
        let mut restart = policy();
        restart.set_policy("on-failure", Some(3)).unwrap();
        assert_eq!(restart.render(), "on-failure:3");

        restart.set_policy("on-failure", Some(0)).unwrap();
        assert_eq!(restart.render(), "on-failure:0");
    }

    #[test]
    fn test_invalid_policy() {
        let err = policy().set_policy("sometimes", None).unwrap_err();
        assert!(matches!(err, RenderError::Invalid { .. }));
    }

    #[test]
    fn test_retries_require_on_failure() {
        let mut restart = policy();
        let err = restart.set_policy("always", Some(3)).unwrap_err();
        assert!(err.to_string().contains("only allowed with [on-failure]"));
        assert_eq!(restart.render(), "unless-stopped");
    }

    #[test]
    fn test_negative_retries_rejected() {
        let err = policy().set_policy("on-failure", Some(-1)).unwrap_err();
        assert!(matches!(err, RenderError::Invalid { .. }));
    }
}
