// File set expansion
// Turns include/exclude glob patterns into a sorted list of files

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use tracing::debug;

use super::error::ChecksumError;
use super::file::ChecksumFile;

/// Files under `directory` matching any include and no exclude pattern
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileSet {
    pub directory: PathBuf,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

impl FileSet {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.includes.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    /// Matching regular files, sorted and de-duplicated
    ///
    /// Patterns are relative to `directory`; an empty include list means `**/*`.
    pub fn resolve(&self) -> Result<Vec<ChecksumFile>, ChecksumError> {
        let excludes = build_glob_set(&self.excludes)?;
        let default_include = ["**/*".to_string()];
        let includes: &[String] = if self.includes.is_empty() {
            &default_include
        } else {
            &self.includes
        };

        // The directory is literal text, only the include is a pattern
        let directory = PathBuf::from(glob::Pattern::escape(&self.directory.to_string_lossy()));

        let mut matched = BTreeSet::new();
        for pattern in includes {
            let full_pattern = directory.join(pattern);
            let full_pattern = full_pattern.to_string_lossy();
            let paths = glob::glob(&full_pattern).map_err(|e| ChecksumError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;

            for entry in paths {
                let path = entry.map_err(|e| {
                    let path = e.path().to_path_buf();
                    ChecksumError::from_io_error(io::Error::from(e), "listing", Some(path))
                })?;
                if !path.is_file() {
                    continue;
                }
                if self.is_excluded(&excludes, &path) {
                    debug!("Excluding {}", path.display());
                    continue;
                }
                matched.insert(path);
            }
        }

        Ok(matched
            .into_iter()
            .map(|path| ChecksumFile::new(self.directory.clone(), path))
            .collect())
    }

    fn is_excluded(&self, excludes: &GlobSet, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.directory).unwrap_or(path);
        excludes.is_match(relative)
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ChecksumError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ChecksumError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ChecksumError::InvalidPattern {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })
}
