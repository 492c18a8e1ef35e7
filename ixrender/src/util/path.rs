//! Mount path safety.
//!
//! A host path may be bind-mounted only if its fully resolved form (after
//! following every symlink hop) stays out of the restricted roots:
//!
//! - [`PREFIX_RESTRICTED_ROOTS`]: the root itself and everything beneath it is denied
//! - [`EXACT_RESTRICTED_ROOTS`]: only the root itself is denied, children are fine
//!
//! Paths that do not exist yet are resolved as far as the filesystem allows and
//! the remaining components are appended lexically.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Roots that may not be mounted, directly or through any nested path.
pub const PREFIX_RESTRICTED_ROOTS: &[&str] = &[
    "/bin",
    "/boot",
    "/conf",
    "/data",
    "/dev",
    "/etc",
    "/lib",
    "/lib32",
    "/lib64",
    "/libx32",
    "/mnt/.ix-apps",
    "/proc",
    "/root",
    "/run",
    "/sbin",
    "/sys",
    "/usr",
    "/var",
];

/// Roots that may not be mounted in their entirety.
pub const EXACT_RESTRICTED_ROOTS: &[&str] = &["/", "/cluster", "/home", "/mnt", "/opt", "/srv"];

/// Matches the kernel's ELOOP limit.
const MAX_SYMLINK_HOPS: usize = 40;

/// Check whether `path` is safe to mount into a container.
///
/// With `is_volume` set the check is stricter: the path must be absolute and
/// already canonical, so a volume source can never reach its target through
/// a symlink.
pub fn is_allowed_path(path: impl AsRef<Path>, is_volume: bool) -> bool {
    let requested = path.as_ref();

    let resolved = match resolve_path(requested) {
        Ok(resolved) => resolved,
        Err(err) => {
            tracing::debug!(
                path = %requested.display(),
                error = %err,
                "Unable to resolve mount path"
            );
            return false;
        }
    };

    if is_volume && !(requested.is_absolute() && normalize_lexically(requested) == resolved) {
        tracing::debug!(
            path = %requested.display(),
            resolved = %resolved.display(),
            "Volume path is not canonical"
        );
        return false;
    }

    if let Some(root) = PREFIX_RESTRICTED_ROOTS
        .iter()
        .find(|root| resolved.starts_with(root))
    {
        tracing::debug!(
            path = %requested.display(),
            resolved = %resolved.display(),
            root,
            "Mount path is under a restricted root"
        );
        return false;
    }

    if EXACT_RESTRICTED_ROOTS
        .iter()
        .any(|root| resolved == Path::new(root))
    {
        tracing::debug!(path = %requested.display(), "Mount path is a restricted root");
        return false;
    }

    true
}

/// Resolve `path` to an absolute path with every symlink followed.
///
/// Missing components are kept as-is, so a path that does not exist still
/// resolves. Fails only on symlink loops or when the working directory is
/// unavailable for a relative path.
pub fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut hops = 0;
    resolve_from(PathBuf::from("/"), &absolute, &mut hops)
}

fn resolve_from(mut resolved: PathBuf, path: &Path, hops: &mut usize) -> io::Result<PathBuf> {
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => resolved = PathBuf::from(prefix.as_os_str()),
            Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                let candidate = resolved.join(name);
                match fs::symlink_metadata(&candidate) {
                    Ok(meta) if meta.file_type().is_symlink() => {
                        *hops += 1;
                        if *hops > MAX_SYMLINK_HOPS {
                            return Err(io::Error::other(format!(
                                "too many levels of symbolic links at {}",
                                candidate.display()
                            )));
                        }
                        // Relative targets are relative to the link's directory
                        let target = fs::read_link(&candidate)?;
                        resolved = resolve_from(resolved, &target, hops)?;
                    }
                    _ => resolved = candidate,
                }
            }
        }
    }
    Ok(resolved)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> tempfile::TempDir {
        // /tmp keeps the fixture out of the restricted /var tree
        tempfile::Builder::new()
            .prefix("ixrender-path")
            .tempdir_in("/tmp")
            .unwrap()
    }

    #[test]
    fn test_prefix_restricted_roots() {
        assert!(!is_allowed_path("/etc", false));
        assert!(!is_allowed_path("/etc/ssl/certs", false));
        assert!(!is_allowed_path("/usr/lib/os-release", false));
        assert!(!is_allowed_path("/mnt/.ix-apps", false));
        assert!(!is_allowed_path("/mnt/.ix-apps/app_configs/web", false));
    }

    #[test]
    fn test_exact_restricted_roots() {
        assert!(!is_allowed_path("/", false));
        assert!(!is_allowed_path("/mnt", false));
        assert!(!is_allowed_path("/mnt/", false));
        assert!(!is_allowed_path("/home", false));

        assert!(is_allowed_path("/mnt/tank/media", false));
        assert!(is_allowed_path("/home/someone/photos", false));
    }

    #[test]
    fn test_component_boundaries() {
        // "/etcetera" is not nested under "/etc"
        assert!(is_allowed_path("/etcetera/data", false));
        assert!(is_allowed_path("/mnt/.ix-apps-backup", false));
    }

    #[test]
    fn test_nonexistent_path_allowed() {
        assert!(is_allowed_path("/mnt/nonexistent/pool/dataset", false));
        assert!(is_allowed_path("/srv/not/there/yet", false));
    }

    #[test]
    fn test_parent_dir_traversal() {
        assert!(!is_allowed_path("/srv/../etc/shadow", false));
        assert!(!is_allowed_path("/mnt/tank/..", false));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_chain_into_restricted_root() {
        use std::os::unix::fs::symlink;

        let dir = scratch_dir();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        let third = dir.path().join("third");
        symlink("/etc", &first).unwrap();
        symlink(&first, &second).unwrap();
        symlink("second", &third).unwrap();

        assert!(!is_allowed_path(&first, false));
        assert!(!is_allowed_path(&third, false));
        assert!(!is_allowed_path(third.join("nested/file"), false));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_into_restricted_root() {
        use std::os::unix::fs::symlink;

        let dir = scratch_dir();
        let link = dir.path().join("dangling");
        symlink("/var/lib/does-not-exist", &link).unwrap();

        assert!(!is_allowed_path(&link, false));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_exact_root() {
        use std::os::unix::fs::symlink;

        let dir = scratch_dir();
        let link = dir.path().join("root");
        symlink("/", &link).unwrap();

        assert!(!is_allowed_path(&link, false));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_denied() {
        use std::os::unix::fs::symlink;

        let dir = scratch_dir();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        symlink(&b, &a).unwrap();
        symlink(&a, &b).unwrap();

        assert!(resolve_path(&a).is_err());
        assert!(!is_allowed_path(&a, false));
    }

    #[cfg(unix)]
    #[test]
    fn test_volume_requires_canonical_path() {
        use std::os::unix::fs::symlink;

        let dir = scratch_dir();
        let real = dir.path().join("real");
        fs::create_dir(&real).unwrap();
        let link = dir.path().join("link");
        symlink(&real, &link).unwrap();

        let canonical = real.canonicalize().unwrap();
        assert!(is_allowed_path(&canonical, true));
        assert!(is_allowed_path(&link, false));
        assert!(!is_allowed_path(&link, true));
        assert!(!is_allowed_path("relative/path", true));
    }

    #[test]
    fn test_resolve_relative_path() {
        let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
        let resolved = resolve_path(Path::new("some/child")).unwrap();
        assert_eq!(resolved, cwd.join("some/child"));
    }
}
