// Path utilities for report paths and output locations
// Comparison is done on path components so separators never matter

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::error::ChecksumError;

/// Compute the label of `path` in summary files
///
/// When a sub path is given and `base_path` is not empty, `base_path` and then
/// `sub_path` (if not empty) are stripped as leading components. Otherwise,
/// or when `path` does not live under `base_path`, the bare file name is used.
/// Components are always joined with `/`.
pub fn report_path(path: &Path, base_path: &Path, sub_path: Option<&Path>) -> String {
    let fallback = || file_name(path);

    let Some(sub_path) = sub_path else {
        return fallback();
    };
    if base_path.as_os_str().is_empty() {
        return fallback();
    }

    let Some(relative) = strip_components(path, base_path) else {
        return fallback();
    };

    let relative = if sub_path.as_os_str().is_empty() {
        relative
    } else {
        strip_components(&relative, sub_path).unwrap_or(relative)
    };

    let joined = join_with_slash(&relative);
    if joined.is_empty() {
        fallback()
    } else {
        joined
    }
}

/// Remove `prefix` from the front of `path`, comparing normalized components
pub fn strip_components(path: &Path, prefix: &Path) -> Option<PathBuf> {
    let path = clean_path(path);
    let prefix = clean_path(prefix);
    if prefix == Path::new(".") {
        return Some(path);
    }
    path.strip_prefix(&prefix).ok().map(Path::to_path_buf)
}

fn join_with_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Clean a path by removing redundant components like "." and ".."
/// This provides a normalized form without requiring the path to exist
pub fn clean_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                    continue;
                }
                components.push(component);
            }
            _ => components.push(component),
        }
    }

    let result: PathBuf = components.iter().collect();
    if result.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        result
    }
}

/// Create `dir` and its parents; an existing directory is fine, anything else at
/// that path is an error
pub fn ensure_directory(dir: &Path) -> Result<(), ChecksumError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    if dir.exists() && !dir.is_dir() {
        return Err(ChecksumError::from_io_error(
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "a file with the same name already exists",
            ),
            "creating directory",
            Some(dir.to_path_buf()),
        ));
    }
    fs::create_dir_all(dir)
        .map_err(|e| ChecksumError::from_io_error(e, "creating directory", Some(dir.to_path_buf())))
}

/// Create the parent directory of `file` if needed
pub fn ensure_parent(file: &Path) -> Result<(), ChecksumError> {
    match file.parent() {
        Some(parent) => ensure_directory(parent),
        None => Ok(()),
    }
}
