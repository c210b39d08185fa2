// Input file records handed to an execution

use std::path::{Path, PathBuf};

use super::path_utils;

/// A file to compute checksums for
///
/// Two records with the same `path` are the same file for every summary target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChecksumFile {
    base_path: PathBuf,
    path: PathBuf,
    extension: Option<String>,
    classifier: Option<String>,
}

impl ChecksumFile {
    /// Record for `path`, reported relative to `base_path` (which may be empty)
    pub fn new(base_path: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            path: path.into(),
            extension: None,
            classifier: None,
        }
    }

    /// Record without a base path; reported by file name only
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(PathBuf::new(), path)
    }

    /// Set the logical file type used when naming attached artifacts
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Logical file type; falls back to the file name extension
    pub fn extension(&self) -> Option<&str> {
        self.extension
            .as_deref()
            .or_else(|| self.path.extension().and_then(|ext| ext.to_str()))
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// File name, lossily converted for messages and fallbacks
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Path used to label this file in summary outputs
    pub fn report_path(&self, sub_path: Option<&Path>) -> String {
        path_utils::report_path(&self.path, &self.base_path, sub_path)
    }
}
