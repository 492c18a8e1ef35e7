//! Image selection and content-addressed local builds.
//!
//! A container runs `{repository}:{tag}` from values unless extra build
//! instructions are supplied. Built images are tagged with the SHA-256 of
//! the full Dockerfile, so any change to the base image or to a line
//! produces a new reference.

use crate::error::{RenderError, RenderResult};
use crate::values::ImageRef;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Rendered `build` fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BuildSpec {
    pub dockerfile_inline: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BuiltImage {
    reference: String,
    dockerfile: String,
}

#[derive(Debug, Clone)]
pub struct ImageBuilder {
    container: String,
    image: ImageRef,
    prefix: String,
    built: Option<BuiltImage>,
}

impl ImageBuilder {
    pub(crate) fn new(container: &str, image: ImageRef, prefix: &str) -> Self {
        Self {
            container: container.to_string(),
            image,
            prefix: prefix.to_string(),
            built: None,
        }
    }

    /// Build a local image on top of the container's base image.
    ///
    /// Empty and absent lines are skipped. A `FROM` line is rejected since
    /// the base image always comes from values.
    pub fn build_image<I, S>(&mut self, lines: I) -> RenderResult<()>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        if self.built.is_some() {
            return Err(RenderError::duplicate(
                "image build",
                &self.container,
                self.image.reference(),
            ));
        }

        let mut dockerfile = format!("FROM {}\n", self.image.reference());
        for entry in lines.into_iter().flatten() {
            let entry = entry.as_ref();
            if entry.is_empty() {
                continue;
            }
            // an entry may span several physical lines
            for line in entry.lines() {
                let directive = line.split_whitespace().next().unwrap_or_default();
                if directive.eq_ignore_ascii_case("FROM") {
                    return Err(RenderError::BaseImageOverride {
                        container: self.container.clone(),
                        line: line.to_string(),
                    });
                }
            }
            dockerfile.push_str(entry);
            dockerfile.push('\n');
        }

        let digest = hex::encode(Sha256::digest(dockerfile.as_bytes()));
        let reference = format!("{}{}_{}", self.prefix, self.image.reference(), digest);

        tracing::debug!(
            container = %self.container,
            base = %self.image.reference(),
            reference = %reference,
            "Built image reference"
        );

        self.built = Some(BuiltImage {
            reference,
            dockerfile,
        });
        Ok(())
    }

    /// The reference the service runs.
    pub fn image(&self) -> String {
        match &self.built {
            Some(built) => built.reference.clone(),
            None => self.image.reference(),
        }
    }

    pub fn base(&self) -> &ImageRef {
        &self.image
    }

    pub(crate) fn render_build(&self) -> Option<BuildSpec> {
        self.built.as_ref().map(|built| BuildSpec {
            dockerfile_inline: built.dockerfile.clone(),
            tags: vec![built.reference.clone()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nginx() -> ImageBuilder {
        ImageBuilder::new("web", ImageRef::new("nginx", "latest"), "ix-")
    }

    #[test]
    fn test_plain_image() {
        let builder = nginx();
        assert_eq!(builder.image(), "nginx:latest");
        assert!(builder.render_build().is_none());
    }

    #[test]
    fn test_build_skips_empty_lines() {
        let mut builder = nginx();
        builder
            .build_image([Some("RUN echo hello"), None, Some(""), Some("RUN echo world")])
            .unwrap();

        let expected = "FROM nginx:latest\nRUN echo hello\nRUN echo world\n";
        let digest = hex::encode(Sha256::digest(expected.as_bytes()));
        let reference = format!("ix-nginx:latest_{digest}");

        let build = builder.render_build().unwrap();
        assert_eq!(build.dockerfile_inline, expected);
        assert_eq!(build.tags, vec![reference.clone()]);
        assert_eq!(builder.image(), reference);
    }

    #[test]
    fn test_from_rejected() {
        for line in ["FROM alpine", "  FROM alpine", "from alpine", "\tFROM alpine AS base"] {
            let mut builder = nginx();
            let err = builder.build_image([Some(line)]).unwrap_err();
            assert!(matches!(err, RenderError::BaseImageOverride { .. }), "accepted [{line}]");
        }
        // not the directive itself
        nginx().build_image([Some("RUN echo FROM")]).unwrap();
        nginx().build_image([Some("FROMAGE=1")]).unwrap();
    }

    #[test]
    fn test_from_on_continuation_line_rejected() {
        let entries = [
            "RUN true\nFROM alpine",
            "RUN true\r\nfrom alpine",
            "RUN a \\\n  && b\nFROM x",
        ];
        for entry in entries {
            let mut builder = nginx();
            let err = builder.build_image([Some(entry)]).unwrap_err();
            assert!(matches!(err, RenderError::BaseImageOverride { .. }), "accepted [{entry}]");
            assert!(builder.render_build().is_none());
        }

        let mut builder = nginx();
        builder
            .build_image([Some("RUN apt-get update \\\n    && apt-get install -y curl")])
            .unwrap();
        assert_eq!(
            builder.render_build().unwrap().dockerfile_inline,
            "FROM nginx:latest\nRUN apt-get update \\\n    && apt-get install -y curl\n"
        );
    }

    #[test]
    fn test_digest_tracks_content() {
        let mut a = nginx();
        let mut b = nginx();
        let mut c = nginx();
        a.build_image([Some("RUN echo a")]).unwrap();
        b.build_image([Some("RUN echo a")]).unwrap();
        c.build_image([Some("RUN echo b")]).unwrap();
        assert_eq!(a.image(), b.image());
        assert_ne!(a.image(), c.image());

        let mut other_base = ImageBuilder::new("web", ImageRef::new("nginx", "1.27"), "ix-");
        other_base.build_image([Some("RUN echo a")]).unwrap();
        assert_ne!(
            a.image().rsplit('_').next(),
            other_base.image().rsplit('_').next()
        );
    }

    #[test]
    fn test_second_build_rejected() {
        let mut builder = nginx();
        builder.build_image([Some("RUN true")]).unwrap();
        assert!(builder.build_image([Some("RUN false")]).is_err());
    }
}
