//! Configuration for checksum executions.
//!
//! Settings come from an optional TOML file; every field has a default so an
//! empty file (or no file at all) is a valid configuration. Command line flags
//! are applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::checksum::target::Listeners;
use crate::checksum::{
    ArtifactListener, ChecksumError, ChecksumFile, CsvSummaryFileTarget, DigesterRegistry, Encoding,
    Execution, FailurePolicy, FileSet, LogTarget, OneHashPerFileTarget, ShasumSummaryFileTarget,
    XmlSummaryFileTarget, DEFAULT_ALGORITHMS,
};

/// Name of the configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "checksum.toml";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Algorithms to compute, in order
    pub algorithms: Vec<String>,
    /// Abort on the first error instead of logging and continuing
    pub fail_on_error: bool,
    pub fail_if_no_files: bool,
    pub fail_if_no_algorithms: bool,
    pub fail_if_no_targets: bool,

    /// Write one hash file per file and algorithm
    pub individual_files: bool,
    /// Directory for individual hash files; next to each file when unset
    pub individual_files_output_directory: Option<PathBuf>,
    /// Append the file name after the digest in individual hash files
    pub append_filename: bool,

    pub csv_summary: bool,
    pub csv_summary_file: PathBuf,
    pub xml_summary: bool,
    pub xml_summary_file: PathBuf,
    pub shasum_summary: bool,
    pub shasum_summary_file: PathBuf,

    /// Do not print digests to the log
    pub quiet: bool,
    /// Charset of text outputs (shasum files are always US-ASCII)
    pub encoding: String,
    /// Directory summary files are resolved against
    pub output_directory: PathBuf,
    /// Stripped from report paths after each file's base path
    pub sub_path: Option<PathBuf>,
    /// Skip the execution entirely
    pub skip: bool,
    /// Appended to file content before digesting (CRC32 only)
    pub salt: Option<String>,

    /// File sets to hash in addition to paths given on the command line
    pub file_sets: Vec<FileSet>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithms: DEFAULT_ALGORITHMS.iter().map(|a| a.to_string()).collect(),
            fail_on_error: true,
            fail_if_no_files: true,
            fail_if_no_algorithms: true,
            fail_if_no_targets: true,
            individual_files: true,
            individual_files_output_directory: None,
            append_filename: false,
            csv_summary: false,
            csv_summary_file: PathBuf::from("checksums.csv"),
            xml_summary: false,
            xml_summary_file: PathBuf::from("checksums.xml"),
            shasum_summary: false,
            shasum_summary_file: PathBuf::from("checksums.sha"),
            quiet: false,
            encoding: Encoding::Utf8.name().to_string(),
            output_directory: PathBuf::from("target"),
            sub_path: None,
            skip: false,
            salt: None,
            file_sets: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text; `origin` is only used in errors
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ChecksumError> {
        toml::from_str(text).map_err(|e| ChecksumError::Config {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ChecksumError> {
        let text = fs::read_to_string(path).map_err(|e| {
            ChecksumError::from_io_error(e, "reading configuration", Some(path.to_path_buf()))
        })?;
        Self::from_toml(&text, path)
    }

    /// Load `path` if given, else `checksum.toml` if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ChecksumError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(Path::new(DEFAULT_CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    /// Check algorithm names and the encoding
    pub fn validate(&self) -> Result<(), ChecksumError> {
        for algorithm in &self.algorithms {
            if !DigesterRegistry::is_supported(algorithm) {
                return Err(ChecksumError::UnsupportedAlgorithm {
                    algorithm: algorithm.clone(),
                });
            }
        }
        self.encoding()?;
        Ok(())
    }

    pub fn encoding(&self) -> Result<Encoding, ChecksumError> {
        self.encoding.parse()
    }

    pub fn policy(&self) -> FailurePolicy {
        if self.fail_on_error {
            FailurePolicy::Abort
        } else {
            FailurePolicy::ContinueAndLog
        }
    }

    pub fn csv_summary_path(&self) -> PathBuf {
        self.output_directory.join(&self.csv_summary_file)
    }

    pub fn xml_summary_path(&self) -> PathBuf {
        self.output_directory.join(&self.xml_summary_file)
    }

    pub fn shasum_summary_path(&self) -> PathBuf {
        self.output_directory.join(&self.shasum_summary_file)
    }

    /// Files of every configured file set
    pub fn resolve_file_sets(&self) -> Result<Vec<ChecksumFile>, ChecksumError> {
        let mut files = Vec::new();
        for file_set in &self.file_sets {
            files.extend(file_set.resolve()?);
        }
        Ok(files)
    }

    /// Build an execution over `files` with the configured targets
    ///
    /// `listeners` builds a fresh listener list for each target that produces files.
    pub fn execution<F>(
        &self,
        registry: Arc<DigesterRegistry>,
        files: Vec<ChecksumFile>,
        listeners: F,
    ) -> Result<Execution, ChecksumError>
    where
        F: Fn() -> Vec<Box<dyn ArtifactListener>>,
    {
        self.validate()?;
        let encoding = self.encoding()?;

        let mut execution = Execution::new(Arc::clone(&registry), self.policy());
        execution
            .set_files(files)
            .set_algorithms(self.algorithms.iter().cloned())
            .set_sub_path(self.sub_path.clone())
            .set_salt(self.salt.as_ref().map(|salt| salt.as_bytes().to_vec()))
            .set_fail_if_no_files(self.fail_if_no_files)
            .set_fail_if_no_algorithms(self.fail_if_no_algorithms)
            .set_fail_if_no_targets(self.fail_if_no_targets);

        if !self.quiet {
            execution.add_target(Box::new(LogTarget::new()));
        }

        if self.individual_files {
            let listeners: Listeners = listeners();
            let mut target = OneHashPerFileTarget::new(Arc::clone(&registry), encoding, listeners)
                .with_append_filename(self.append_filename);
            if let Some(directory) = &self.individual_files_output_directory {
                target = target.with_output_directory(directory);
            }
            execution.add_target(Box::new(target));
        }

        if self.csv_summary {
            execution.add_target(Box::new(CsvSummaryFileTarget::new(
                self.csv_summary_path(),
                encoding,
                listeners(),
            )));
        }

        if self.xml_summary {
            execution.add_target(Box::new(XmlSummaryFileTarget::new(
                self.xml_summary_path(),
                encoding,
                listeners(),
            )));
        }

        if self.shasum_summary {
            execution.add_target(Box::new(ShasumSummaryFileTarget::new(
                self.shasum_summary_path(),
                listeners(),
            )));
        }

        Ok(execution)
    }
}
