//! Composition orchestrator.
//!
//! [`Render`] owns the input document, every container and the portal
//! registry. Mutators validate eagerly; [`Render::render`] re-validates the
//! document, runs the deferred checks of every container, resolves
//! cross-container references and assembles the output. It never returns a
//! partial document.

mod context;
mod output;

pub use context::{ContainerSet, Validate, ValidationContext};
pub use output::{ConfigSpec, RenderedOutput, ServiceSpec, VolumeSpec};

use crate::container::{Container, check_label_key};
use crate::error::{RenderError, RenderResult};
use crate::options::RenderOptions;
use crate::portal::PortalRegistry;
use crate::util::escape_dollar;
use crate::values::Values;
use std::collections::BTreeMap;

/// Builds one composition.
#[derive(Debug)]
pub struct Render {
    document: serde_json::Value,
    /// Parsed once at construction; containers are built from this snapshot.
    values: Values,
    options: RenderOptions,
    containers: ContainerSet,
    portals: PortalRegistry,
}

impl Render {
    /// Start a composition from a values document with default options.
    pub fn new(document: serde_json::Value) -> RenderResult<Self> {
        Self::with_options(document, RenderOptions::default())
    }

    pub fn with_options(document: serde_json::Value, options: RenderOptions) -> RenderResult<Self> {
        let values = Values::from_document(&document)?;
        Ok(Self {
            document,
            values,
            options,
            containers: ContainerSet::default(),
            portals: PortalRegistry::new(),
        })
    }

    /// The stored input document.
    pub fn values(&self) -> &serde_json::Value {
        &self.document
    }

    /// Mutable access to the input document. Changes are validated again by
    /// [`render`](Self::render); containers added later still use the values
    /// parsed at construction.
    pub fn values_mut(&mut self) -> &mut serde_json::Value {
        &mut self.document
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Add a container running the image registered under `image` in values.
    pub fn add_container(&mut self, name: &str, image: &str) -> RenderResult<&mut Container> {
        if self.containers.contains(name) {
            return Err(RenderError::DuplicateContainer(name.to_string()));
        }
        if name.is_empty() {
            return Err(RenderError::missing("container", name, "name"));
        }

        let image_ref = self
            .values
            .images
            .get(image)
            .cloned()
            .ok_or_else(|| RenderError::UnknownImage {
                container: name.to_string(),
                image: image.to_string(),
            })?;
        if image_ref.repository.is_empty() || image_ref.tag.is_empty() {
            return Err(RenderError::invalid(
                "image",
                name,
                format!("[{image}] needs both a repository and a tag"),
            ));
        }

        let container = Container::new(name, image_ref, &self.values, &self.options)?;
        tracing::debug!(
            container = %name,
            image = %container.image.image(),
            network_mode = ?container.network_mode(),
            "Added container"
        );
        Ok(self.containers.insert(container))
    }

    pub fn container(&self, name: &str) -> Option<&Container> {
        self.containers.get(name)
    }

    pub fn container_mut(&mut self, name: &str) -> Option<&mut Container> {
        self.containers.get_mut(name)
    }

    pub fn containers(&self) -> &ContainerSet {
        &self.containers
    }

    pub fn portals(&self) -> &PortalRegistry {
        &self.portals
    }

    pub fn portals_mut(&mut self) -> &mut PortalRegistry {
        &mut self.portals
    }

    /// Validate everything and emit the composition.
    pub fn render(&self) -> RenderResult<RenderedOutput> {
        let values = Values::from_document(&self.document)?;
        if self.containers.is_empty() {
            return Err(RenderError::EmptyComposition);
        }

        for container in self.containers.iter() {
            let ctx = ValidationContext {
                containers: &self.containers,
                network_mode: container.network_mode(),
            };
            container.validate(&ctx)?;
        }

        let mut labels = self.collect_labels(&values)?;
        let configs = self.collect_configs()?;

        let mut volumes = BTreeMap::new();
        let mut services = BTreeMap::new();
        for container in self.containers.iter() {
            for volume in container.storage.named_volumes() {
                volumes.insert(volume.to_string(), VolumeSpec::default());
            }
            let container_labels = labels.remove(container.name()).unwrap_or_default();
            services.insert(container.name().to_string(), container.render(container_labels));
        }

        let output = RenderedOutput {
            services,
            configs,
            volumes,
            portals: self.portals.render(),
            notes: values.notes.as_deref().map(escape_dollar),
        };

        tracing::info!(
            containers = output.services.len(),
            portals = output.portals.len(),
            configs = output.configs.len(),
            "Rendered composition"
        );
        Ok(output)
    }

    /// Per-container labels merged with the global labels of values.
    fn collect_labels(
        &self,
        values: &Values,
    ) -> RenderResult<BTreeMap<String, BTreeMap<String, String>>> {
        let mut labels: BTreeMap<String, BTreeMap<String, String>> = self
            .containers
            .iter()
            .map(|container| (container.name().to_string(), container.labels.render()))
            .collect();

        for label in &values.labels {
            for name in &label.containers {
                let merged = labels.get_mut(name.as_str()).ok_or_else(|| {
                    RenderError::unknown_reference("global label", &label.key, name)
                })?;
                check_label_key(name, &label.key)?;
                if merged.contains_key(&label.key) {
                    return Err(RenderError::Conflict {
                        resource: "label",
                        key: label.key.clone(),
                        reason: format!("already set on container [{name}]"),
                    });
                }
                merged.insert(label.key.clone(), escape_dollar(&label.value));
            }
        }
        Ok(labels)
    }

    /// Top-level configs. Two containers may share a config name only with
    /// identical content.
    fn collect_configs(&self) -> RenderResult<BTreeMap<String, ConfigSpec>> {
        let mut configs: BTreeMap<String, (String, &str)> = BTreeMap::new();
        for container in self.containers.iter() {
            for (name, content) in container.configs.contents() {
                match configs.get(name) {
                    Some((existing, owner)) if existing != content => {
                        return Err(RenderError::Conflict {
                            resource: "config",
                            key: name.to_string(),
                            reason: format!(
                                "containers [{owner}] and [{}] define different content",
                                container.name()
                            ),
                        });
                    }
                    Some(_) => {}
                    None => {
                        configs.insert(name.to_string(), (content.to_string(), container.name()));
                    }
                }
            }
        }

        Ok(configs
            .into_iter()
            .map(|(name, (content, _))| {
                (
                    name,
                    ConfigSpec {
                        content: escape_dollar(&content),
                    },
                )
            })
            .collect())
    }
}
