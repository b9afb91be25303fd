use std::path::{Component, Path, PathBuf};

use crate::{ExplorerError, Result};

/// Resolve `path` against the current directory and fold `.` and `..`
/// components without touching the filesystem.
pub fn full_path(path: &Path) -> Result<PathBuf> {
    // also supplies the drive for `\dir` and `C:dir` on Windows
    let absolute = std::path::absolute(path).map_err(ExplorerError::CurrentDirectory)?;
    Ok(normalize(&absolute))
}

pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            // `pop` stops at the root, so "/.." stays "/"
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Compare two directory names the way the host filesystem does.
pub fn same_name(a: &str, b: &str) -> bool {
    if cfg!(windows) {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// If `target` lies under `root`, return the names of the directories between
/// them, outermost first. Returns `None` when `root` is not a prefix.
pub fn strip_root(target: &Path, root: &Path) -> Option<Vec<String>> {
    let mut remaining = target.components();
    for root_component in root.components() {
        let target_component = remaining.next()?;
        if !same_name(
            &root_component.as_os_str().to_string_lossy(),
            &target_component.as_os_str().to_string_lossy(),
        ) {
            return None;
        }
    }

    Some(
        remaining
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect(),
    )
}

/// Display name for a tree node: the directory's own name, or the whole path
/// for filesystem roots.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dot_components() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../..")), PathBuf::from("/"));
    }

    #[test]
    fn strip_root_splits_remaining_names() {
        let names = strip_root(Path::new("/data/photos/2024"), Path::new("/data")).unwrap();
        assert_eq!(names, vec!["photos".to_string(), "2024".to_string()]);

        assert_eq!(strip_root(Path::new("/data"), Path::new("/data")), Some(Vec::new()));
        assert_eq!(strip_root(Path::new("/other/photos"), Path::new("/data")), None);
        assert_eq!(strip_root(Path::new("/"), Path::new("/data")), None);
    }

    #[cfg(windows)]
    #[test]
    fn full_path_adds_drive_on_windows() {
        for path in [r"\photos", r"C:photos"] {
            let full = full_path(Path::new(path)).unwrap();
            assert!(full.is_absolute(), "{} resolved to {}", path, full.display());
            assert!(full.ends_with("photos"));
        }
    }

    #[test]
    fn display_name_of_root_is_whole_path() {
        assert_eq!(display_name(Path::new("/")), "/");
        assert_eq!(display_name(Path::new("/home/user")), "user");
    }
}
