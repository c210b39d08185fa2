// Tests for glob-based file sets

use std::fs;
use std::path::Path;

use checksum::checksum::{ChecksumError, FileSet};
use tempfile::tempdir;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"x").unwrap();
}

fn names(files: &[checksum::checksum::ChecksumFile], base: &Path) -> Vec<String> {
    files
        .iter()
        .map(|file| {
            file.path()
                .strip_prefix(base)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_default_includes_everything() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("b.txt"));
    touch(&dir.path().join("a.txt"));
    touch(&dir.path().join("lib").join("c.jar"));

    let files = FileSet::new(dir.path()).resolve().unwrap();
    assert_eq!(names(&files, dir.path()), vec!["a.txt", "b.txt", "lib/c.jar"]);
    for file in &files {
        assert_eq!(file.base_path(), dir.path());
    }
}

#[test]
fn test_includes_and_excludes() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("app.jar"));
    touch(&dir.path().join("app-tests.jar"));
    touch(&dir.path().join("notes.txt"));
    touch(&dir.path().join("lib").join("dep.jar"));

    let files = FileSet::new(dir.path())
        .include("**/*.jar")
        .include("*.jar")
        .exclude("*-tests.jar")
        .resolve()
        .unwrap();

    // Overlapping includes do not duplicate files
    assert_eq!(names(&files, dir.path()), vec!["app.jar", "lib/dep.jar"]);
}

#[test]
fn test_directories_are_skipped() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("empty")).unwrap();
    touch(&dir.path().join("file.bin"));

    let files = FileSet::new(dir.path()).include("*").resolve().unwrap();
    assert_eq!(names(&files, dir.path()), vec!["file.bin"]);
}

#[test]
fn test_invalid_exclude_pattern() {
    let dir = tempdir().unwrap();
    let err = FileSet::new(dir.path()).exclude("a[").resolve().unwrap_err();
    assert!(matches!(err, ChecksumError::InvalidPattern { .. }));
}

#[test]
fn test_no_match_is_empty() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.txt"));

    let files = FileSet::new(dir.path()).include("*.jar").resolve().unwrap();
    assert!(files.is_empty());
}

#[test]
fn test_directory_with_glob_characters() {
    let dir = tempdir().unwrap();
    let build = dir.path().join("build[1]");
    touch(&build.join("a.txt"));
    touch(&build.join("b.bin"));

    let files = FileSet::new(&build).include("*.txt").resolve().unwrap();
    assert_eq!(names(&files, &build), vec!["a.txt"]);
    assert_eq!(files[0].base_path(), build.as_path());
}
