//! Engine options.

use crate::container::RestartPolicyKind;
use serde::{Deserialize, Serialize};

/// Knobs that shape the rendered document but are not part of values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Prefix of locally built image references.
    ///
    /// Default: `"ix-"`
    #[serde(default = "default_image_prefix")]
    pub image_prefix: String,

    /// Platform every service is pinned to.
    ///
    /// Default: `"linux/amd64"`
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Restart policy a container starts with.
    ///
    /// Default: `unless-stopped`
    #[serde(default = "default_restart_policy")]
    pub restart_policy: RestartPolicyKind,
}

fn default_image_prefix() -> String {
    "ix-".to_string()
}

fn default_platform() -> String {
    "linux/amd64".to_string()
}

fn default_restart_policy() -> RestartPolicyKind {
    RestartPolicyKind::UnlessStopped
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_prefix: default_image_prefix(),
            platform: default_platform(),
            restart_policy: default_restart_policy(),
        }
    }
}

impl RenderOptions {
    /// Create a builder starting from the defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use ixrender::RenderOptions;
    ///
    /// let options = RenderOptions::builder().platform("linux/arm64").build();
    /// assert_eq!(options.platform, "linux/arm64");
    /// ```
    pub fn builder() -> RenderOptionsBuilder {
        RenderOptionsBuilder::new()
    }
}

// ============================================================================
// Render Options Builder (non-consuming)
// ============================================================================

/// Builder for [`RenderOptions`].
#[derive(Debug, Clone, Default)]
pub struct RenderOptionsBuilder {
    inner: RenderOptions,
}

impl RenderOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prefix of locally built image references.
    pub fn image_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.inner.image_prefix = prefix.into();
        self
    }

    /// Set the platform every service is pinned to.
    pub fn platform(&mut self, platform: impl Into<String>) -> &mut Self {
        self.inner.platform = platform.into();
        self
    }

    /// Set the restart policy new containers start with.
    pub fn restart_policy(&mut self, policy: RestartPolicyKind) -> &mut Self {
        self.inner.restart_policy = policy;
        self
    }

    pub fn build(&self) -> RenderOptions {
        self.inner.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.image_prefix, "ix-");
        assert_eq!(options.platform, "linux/amd64");
        assert_eq!(options.restart_policy, RestartPolicyKind::UnlessStopped);
    }

    #[test]
    fn test_serde_defaults() {
        let options: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RenderOptions::default());

        let options: RenderOptions =
            serde_json::from_str(r#"{"restart_policy": "on-failure"}"#).unwrap();
        assert_eq!(options.restart_policy, RestartPolicyKind::OnFailure);
    }

    #[test]
    fn test_builder_non_consuming() {
        let mut builder = RenderOptions::builder();
        builder.image_prefix("local-");

        let first = builder.build();
        let second = builder.restart_policy(RestartPolicyKind::Always).build();

        assert_eq!(first.image_prefix, "local-");
        assert_eq!(second.image_prefix, "local-");
        assert_eq!(first.restart_policy, RestartPolicyKind::UnlessStopped);
        assert_eq!(second.restart_policy, RestartPolicyKind::Always);
    }
}
