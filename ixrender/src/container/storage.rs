//! Bind mounts and named volumes.

use crate::error::{RenderError, RenderResult};
use crate::util::is_allowed_path;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
enum MountSource {
    HostPath(String),
    Volume(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Mount {
    source: MountSource,
    read_only: bool,
}

/// Rendered `volumes` entry (long syntax).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MountSpec {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub source: String,
    pub target: String,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<BindOptions>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BindOptions {
    pub create_host_path: bool,
}

#[derive(Debug, Clone)]
pub struct Storage {
    container: String,
    // target -> mount
    mounts: BTreeMap<String, Mount>,
}

impl Storage {
    pub(crate) fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            mounts: BTreeMap::new(),
        }
    }

    /// Bind-mount a host path. The path must pass the mount safety check.
    pub fn add_host_path(
        &mut self,
        source: impl AsRef<Path>,
        target: &str,
        read_only: bool,
    ) -> RenderResult<()> {
        self.add_bind(source.as_ref(), target, read_only, false)
    }

    /// Bind-mount a host path that backs an application volume.
    ///
    /// Stricter than [`add_host_path`](Self::add_host_path): the source must
    /// be given in its canonical form.
    pub fn add_volume_path(
        &mut self,
        source: impl AsRef<Path>,
        target: &str,
        read_only: bool,
    ) -> RenderResult<()> {
        self.add_bind(source.as_ref(), target, read_only, true)
    }

    /// Mount an engine-managed named volume.
    pub fn add_named_volume(
        &mut self,
        name: &str,
        target: &str,
        read_only: bool,
    ) -> RenderResult<()> {
        let valid_name = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric())
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "_.-".contains(c));
        if !valid_name {
            return Err(RenderError::invalid(
                "volume",
                &self.container,
                format!("volume name [{name}] must match [a-zA-Z0-9][a-zA-Z0-9_.-]*"),
            ));
        }
        self.insert(
            target,
            Mount {
                source: MountSource::Volume(name.to_string()),
                read_only,
            },
        )
    }

    fn add_bind(
        &mut self,
        source: &Path,
        target: &str,
        read_only: bool,
        is_volume: bool,
    ) -> RenderResult<()> {
        if source.as_os_str().is_empty() {
            return Err(RenderError::missing("host path", &self.container, "source"));
        }
        if !is_allowed_path(source, is_volume) {
            return Err(RenderError::UnsafeHostPath {
                container: self.container.clone(),
                path: source.display().to_string(),
            });
        }
        self.insert(
            target,
            Mount {
                source: MountSource::HostPath(source.display().to_string()),
                read_only,
            },
        )
    }

    fn insert(&mut self, target: &str, mount: Mount) -> RenderResult<()> {
        if target.is_empty() {
            return Err(RenderError::missing("mount", &self.container, "target"));
        }
        if !target.starts_with('/') || target == "/" {
            return Err(RenderError::invalid(
                "mount",
                &self.container,
                format!("target [{target}] must be an absolute path below [/]"),
            ));
        }
        if self.mounts.contains_key(target) {
            return Err(RenderError::duplicate("mount target", &self.container, target));
        }

        tracing::debug!(container = %self.container, target, source = ?mount.source, "Added mount");
        self.mounts.insert(target.to_string(), mount);
        Ok(())
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.mounts.keys().map(String::as_str)
    }

    pub fn named_volumes(&self) -> impl Iterator<Item = &str> {
        self.mounts.values().filter_map(|mount| match &mount.source {
            MountSource::Volume(name) => Some(name.as_str()),
            MountSource::HostPath(_) => None,
        })
    }

    pub(crate) fn render(&self) -> Vec<MountSpec> {
        self.mounts
            .iter()
            .map(|(target, mount)| match &mount.source {
                MountSource::HostPath(path) => MountSpec {
                    kind: "bind",
                    source: path.clone(),
                    target: target.clone(),
                    read_only: mount.read_only,
                    bind: Some(BindOptions {
                        create_host_path: false,
                    }),
                },
                MountSource::Volume(name) => MountSpec {
                    kind: "volume",
                    source: name.clone(),
                    target: target.clone(),
                    read_only: mount.read_only,
                    bind: None,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_path_mount() {
        let mut storage = Storage::new("web");
        storage
            .add_host_path("/mnt/tank/media", "/media", true)
            .unwrap();

        let rendered = storage.render();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].kind, "bind");
        assert_eq!(rendered[0].source, "/mnt/tank/media");
        assert!(rendered[0].read_only);
    }

    #[test]
    fn test_restricted_host_path() {
        let mut storage = Storage::new("web");
        let err = storage.add_host_path("/etc", "/host-etc", true).unwrap_err();
        assert!(matches!(err, RenderError::UnsafeHostPath { .. }));
        let err = storage.add_host_path("/mnt", "/pool", false).unwrap_err();
        assert!(matches!(err, RenderError::UnsafeHostPath { .. }));
    }

    #[test]
    fn test_target_rules() {
        let mut storage = Storage::new("web");
        assert!(storage.add_named_volume("data", "relative", false).is_err());
        assert!(storage.add_named_volume("data", "/", false).is_err());
        assert!(storage.add_named_volume("data", "", false).is_err());

        storage.add_named_volume("data", "/data", false).unwrap();
        let err = storage
            .add_host_path("/mnt/tank/data", "/data", false)
            .unwrap_err();
        assert!(matches!(err, RenderError::Duplicate { .. }));
    }

    #[test]
    fn test_named_volumes() {
        let mut storage = Storage::new("web");
        storage.add_named_volume("cache", "/cache", false).unwrap();
        storage.add_host_path("/mnt/tank/x", "/x", false).unwrap();
        assert!(storage.add_named_volume("-bad", "/bad", false).is_err());
        assert!(storage.add_named_volume("", "/bad", false).is_err());

        assert_eq!(storage.named_volumes().collect::<Vec<_>>(), vec!["cache"]);
        assert_eq!(storage.targets().collect::<Vec<_>>(), vec!["/cache", "/x"]);
    }
}
