//! Container arena and the context deferred validators run against.

use crate::container::Container;
use crate::error::RenderResult;
use crate::types::NetworkMode;
use std::collections::HashMap;

/// Containers in insertion order plus a name index.
///
/// Sibling references (dependencies, global labels) are plain names looked
/// up here at render time.
#[derive(Debug, Default)]
pub struct ContainerSet {
    containers: Vec<Container>,
    index: HashMap<String, usize>,
}

impl ContainerSet {
    pub(crate) fn insert(&mut self, container: Container) -> &mut Container {
        let position = self.containers.len();
        self.index.insert(container.name().to_string(), position);
        self.containers.push(container);
        &mut self.containers[position]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Container> {
        self.index.get(name).map(|&position| &self.containers[position])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Container> {
        self.index
            .get(name)
            .map(|&position| &mut self.containers[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

/// Global state visible to a container's deferred checks.
pub struct ValidationContext<'a> {
    pub containers: &'a ContainerSet,
    pub network_mode: NetworkMode,
}

/// A deferred, render-time check.
///
/// Eager checks live in each manager's mutators; `validate` only covers what
/// depends on other containers or on settings that may change later.
pub trait Validate {
    fn validate(&self, ctx: &ValidationContext<'_>) -> RenderResult<()>;
}
