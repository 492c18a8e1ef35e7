//! Host path safety through the public API and the storage manager.

use ixrender::{RenderError, is_allowed_path};
use ixrender_test_utils::{render, scratch_dir};

#[test]
fn test_restricted_roots() {
    for path in ["/etc", "/etc/nginx", "/usr/local/bin", "/mnt/.ix-apps/app", "/proc/1"] {
        assert!(!is_allowed_path(path, false), "allowed [{path}]");
    }
    for path in ["/", "/home", "/mnt", "/opt"] {
        assert!(!is_allowed_path(path, false), "allowed [{path}]");
    }
    for path in ["/home/user", "/mnt/tank/media", "/opt/app", "/srv/data"] {
        assert!(is_allowed_path(path, false), "denied [{path}]");
    }
}

#[test]
fn test_missing_path_is_allowed() {
    let dir = scratch_dir();
    let missing = dir.path().join("does/not/exist");
    assert!(is_allowed_path(&missing, false));
}

#[cfg(unix)]
#[test]
fn test_symlink_chain_into_restricted_root() {
    let dir = scratch_dir();
    let head = ixrender_test_utils::symlink_chain(dir.path(), &["a", "b", "c"], "/etc".as_ref());
    assert!(!is_allowed_path(&head, false));
    assert!(!is_allowed_path(head.join("nginx"), false));

    let mut render = render();
    let web = render.add_container("web", "image").unwrap();
    let err = web.storage.add_host_path(&head, "/config", true).unwrap_err();
    assert!(matches!(err, RenderError::UnsafeHostPath { .. }));
}

#[cfg(unix)]
#[test]
fn test_volume_path_must_be_canonical() {
    let dir = scratch_dir();
    let root = dir.path().canonicalize().unwrap();
    let data = root.join("data");
    std::fs::create_dir(&data).unwrap();
    let link = ixrender_test_utils::symlink_chain(&root, &["link"], &data);

    assert!(is_allowed_path(&data, true));
    assert!(is_allowed_path(&link, false));
    assert!(!is_allowed_path(&link, true));
    assert!(!is_allowed_path("relative/data", true));

    let mut render = render();
    let web = render.add_container("web", "image").unwrap();
    web.storage.add_volume_path(&data, "/data", false).unwrap();
    assert!(web.storage.add_volume_path(&link, "/other", false).is_err());

    let output = render.render().unwrap();
    let mounts = &output.services["web"].volumes;
    assert_eq!(mounts.len(), 1);
    assert_eq!(mounts[0].source, data.display().to_string());
}
