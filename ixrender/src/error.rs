//! Error types for the render engine.
//!
//! Every failure carries an [`ErrorKind`] so callers can tell apart the
//! validation phases:
//! - [`ErrorKind::Structural`]: raised eagerly by the mutator that introduced the value
//! - [`ErrorKind::Referential`]: a container name that does not exist (checked at render)
//! - [`ErrorKind::Policy`]: well-formed values that conflict with other settings
//!   (checked at render)
//! - [`ErrorKind::Schema`]: the input document no longer matches its closed schema
//! - [`ErrorKind::Composition`]: nothing to render

use thiserror::Error;

/// Result alias used throughout the engine.
pub type RenderResult<T> = Result<T, RenderError>;

/// Validation phase a [`RenderError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Structural,
    Referential,
    Policy,
    Schema,
    Composition,
}

/// Errors produced while building or rendering a composition.
#[derive(Debug, Error)]
pub enum RenderError {
    // ------------------------------------------------------------------
    // Structural (eager)
    // ------------------------------------------------------------------
    /// A container with this name is already registered.
    #[error("container [{0}] already exists")]
    DuplicateContainer(String),

    /// The container refers to an image key missing from `images`.
    #[error("container [{container}]: image [{image}] not found in values")]
    UnknownImage { container: String, image: String },

    /// A resource with the same identity was already added to a manager.
    #[error("container [{container}]: {resource} [{key}] already added")]
    Duplicate {
        resource: &'static str,
        container: String,
        key: String,
    },

    /// A required field was empty or absent.
    #[error("container [{container}]: {resource} requires a non-empty {field}")]
    Missing {
        resource: &'static str,
        container: String,
        field: &'static str,
    },

    /// A value is malformed or outside its allowed catalog.
    #[error("container [{container}]: invalid {resource}: {reason}")]
    Invalid {
        resource: &'static str,
        container: String,
        reason: String,
    },

    /// A build line tried to restate the base image.
    #[error("container [{container}]: build line [{line}] overrides the base image")]
    BaseImageOverride { container: String, line: String },

    /// A host path is not allowed to be mounted.
    #[error("container [{container}]: host path [{path}] is not allowed to be mounted")]
    UnsafeHostPath { container: String, path: String },

    /// Two portals resolved to the same name.
    #[error("portal [{0}] already added")]
    DuplicatePortal(String),

    /// Portal scheme outside the allowed set.
    #[error("invalid portal scheme [{0}], expected one of [http, https]")]
    InvalidScheme(String),

    /// Portal port is not a valid TCP port.
    #[error("invalid portal port [{0}]")]
    InvalidPort(i64),

    /// Portal path is not an absolute, normalized HTTP path.
    #[error("invalid portal path [{0}]")]
    InvalidPath(String),

    // ------------------------------------------------------------------
    // Referential (deferred)
    // ------------------------------------------------------------------
    /// A container references a sibling that was never added.
    #[error("{via} in [{container}] references unknown container [{referenced}]")]
    UnknownContainerReference {
        via: &'static str,
        container: String,
        referenced: String,
    },

    // ------------------------------------------------------------------
    // Policy (deferred)
    // ------------------------------------------------------------------
    /// A sysctl key outside the namespaced catalog.
    #[error("container [{container}]: sysctl [{key}] is not a namespaced sysctl")]
    UnknownSysctl { container: String, key: String },

    /// Settings that are individually valid but incompatible with each other.
    #[error("container [{container}]: {reason}")]
    Incompatible { container: String, reason: String },

    /// Cross-container or cross-manager conflict detected at render.
    #[error("{resource} [{key}] conflicts: {reason}")]
    Conflict {
        resource: &'static str,
        key: String,
        reason: String,
    },

    // ------------------------------------------------------------------
    // Schema / composition (deferred)
    // ------------------------------------------------------------------
    /// The input document does not match its closed schema.
    #[error("values do not match schema: {0}")]
    Schema(#[source] serde_json::Error),

    /// `render()` was called with no containers.
    #[error("at least one container must be added before rendering")]
    EmptyComposition,
}

impl RenderError {
    /// The validation phase this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateContainer(_)
            | Self::UnknownImage { .. }
            | Self::Duplicate { .. }
            | Self::Missing { .. }
            | Self::Invalid { .. }
            | Self::BaseImageOverride { .. }
            | Self::UnsafeHostPath { .. }
            | Self::DuplicatePortal(_)
            | Self::InvalidScheme(_)
            | Self::InvalidPort(_)
            | Self::InvalidPath(_) => ErrorKind::Structural,
            Self::UnknownContainerReference { .. } => ErrorKind::Referential,
            Self::UnknownSysctl { .. } | Self::Incompatible { .. } | Self::Conflict { .. } => {
                ErrorKind::Policy
            }
            Self::Schema(_) => ErrorKind::Schema,
            Self::EmptyComposition => ErrorKind::Composition,
        }
    }

    // ========================================================================
    // Convenience Constructors
    // ========================================================================

    pub(crate) fn duplicate(
        resource: &'static str,
        container: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::Duplicate {
            resource,
            container: container.into(),
            key: key.into(),
        }
    }

    pub(crate) fn missing(
        resource: &'static str,
        container: impl Into<String>,
        field: &'static str,
    ) -> Self {
        Self::Missing {
            resource,
            container: container.into(),
            field,
        }
    }

    pub(crate) fn invalid(
        resource: &'static str,
        container: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            resource,
            container: container.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn incompatible(container: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Incompatible {
            container: container.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_reference(
        via: &'static str,
        container: impl Into<String>,
        referenced: impl Into<String>,
    ) -> Self {
        Self::UnknownContainerReference {
            via,
            container: container.into(),
            referenced: referenced.into(),
        }
    }
}
