//! ixrender - composition render engine
//!
//! Turns a values document plus a set of programmatically configured
//! containers into a Compose-compatible document. Every mutator checks its
//! own input; checks spanning containers run when the composition is
//! rendered.
//!
//! ```
//! use ixrender::Render;
//! use serde_json::json;
//!
//! let mut render = Render::new(json!({
//!     "images": {"image": {"repository": "nginx", "tag": "latest"}}
//! }))?;
//! render.add_container("web", "image")?;
//!
//! let output = render.render()?;
//! assert_eq!(output.services["web"].image, "nginx:latest");
//! # Ok::<(), ixrender::RenderError>(())
//! ```

pub mod container;
pub mod error;
pub mod image;
pub mod options;
pub mod portal;
pub mod render;
pub mod types;
pub mod util;
pub mod values;

pub use container::Container;
pub use error::{ErrorKind, RenderError, RenderResult};
pub use image::{BuildSpec, ImageBuilder};
pub use options::{RenderOptions, RenderOptionsBuilder};
pub use portal::{Portal, PortalOverrides, PortalRegistry, PortalScheme};
pub use render::{ContainerSet, Render, RenderedOutput, ServiceSpec, Validate, ValidationContext};
pub use types::{BindMode, NetworkMode, PortProtocol, PortSpec};
pub use util::is_allowed_path;
pub use values::{GlobalLabel, ImageRef, LimitValues, NetworkValues, ResourceValues, Values};
