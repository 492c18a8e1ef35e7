//! Shared fixtures for ixrender tests.

use ixrender::{Render, RenderOptions};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Values with two images: `image` (nginx:latest) and `db` (postgres:17).
pub fn values() -> Value {
    json!({
        "images": {
            "image": {"repository": "nginx", "tag": "latest"},
            "db": {"repository": "postgres", "tag": "17"}
        }
    })
}

/// [`values`] with extra top-level keys merged in.
pub fn values_with(extra: Value) -> Value {
    let mut document = values();
    if let (Some(target), Value::Object(extra)) = (document.as_object_mut(), extra) {
        target.extend(extra);
    }
    document
}

/// A render over [`values`] with default options.
pub fn render() -> Render {
    Render::new(values()).expect("fixture values are valid")
}

/// A render over `document` with default options.
pub fn render_with(document: Value) -> Render {
    Render::with_options(document, RenderOptions::default()).expect("document is valid")
}

/// Scratch directory under `/tmp`.
///
/// The default temp dir may itself live under a restricted root (for
/// example `/var/folders` on macOS), which would make every path unsafe.
pub fn scratch_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("ixr")
        .tempdir_in("/tmp")
        .expect("failed to create scratch dir in /tmp")
}

/// Create `dir/<name_0> -> dir/<name_1> -> ... -> target` and return the head.
#[cfg(unix)]
pub fn symlink_chain(dir: &Path, names: &[&str], target: &Path) -> PathBuf {
    let mut next = target.to_path_buf();
    for name in names.iter().rev() {
        let link = dir.join(name);
        std::os::unix::fs::symlink(&next, &link).expect("failed to create symlink");
        next = link;
    }
    next
}
