// Execution targets
// Sinks receiving every computed digest of an execution

pub mod csv_summary;
pub mod log_target;
pub mod one_hash_per_file;
pub mod shasum_summary;
pub mod summary;
pub mod xml_summary;

use std::fs;
use std::path::Path;

use tracing::info;

use super::encoding::Encoding;
use super::error::ChecksumError;
use super::file::ChecksumFile;
use super::path_utils;

pub use csv_summary::CsvSummaryFileTarget;
pub use log_target::LogTarget;
pub use one_hash_per_file::OneHashPerFileTarget;
pub use shasum_summary::ShasumSummaryFileTarget;
pub use summary::FileHashcodes;
pub use xml_summary::XmlSummaryFileTarget;

/// Line separator of the current platform
pub const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// A sink for digests with an `init`, `write*`, `close` lifecycle
///
/// An execution drives a target from a single thread and never writes to it
/// after `close`.
pub trait ExecutionTarget {
    /// Short human readable description used in logs and errors
    fn describe(&self) -> String;

    /// Prepare the target before any digest is written
    fn init(&mut self) -> Result<(), ChecksumError>;

    /// Record the digest of `file` computed with `algorithm`
    fn write(&mut self, digest: &str, file: &ChecksumFile, algorithm: &str) -> Result<(), ChecksumError>;

    /// Flush everything recorded; `sub_path` drives report paths
    fn close(&mut self, sub_path: Option<&Path>) -> Result<(), ChecksumError>;
}

/// Observer notified once an output file is durably written
pub trait ArtifactListener {
    fn artifact_created(
        &self,
        artifact: &Path,
        checksum_extension: &str,
        original_extension: Option<&str>,
        classifier: Option<&str>,
    );
}

/// Listener reporting every produced file in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingArtifactListener;

impl ArtifactListener for LoggingArtifactListener {
    fn artifact_created(
        &self,
        artifact: &Path,
        checksum_extension: &str,
        original_extension: Option<&str>,
        classifier: Option<&str>,
    ) {
        let artifact_type = match original_extension {
            Some(ext) => format!("{}{}", ext, checksum_extension),
            None => checksum_extension.trim_start_matches('.').to_string(),
        };
        match classifier {
            Some(classifier) => info!(
                "Created {} ({}, classifier {})",
                artifact.display(),
                artifact_type,
                classifier
            ),
            None => info!("Created {} ({})", artifact.display(), artifact_type),
        }
    }
}

/// Listeners shared by the targets of one execution
pub type Listeners = Vec<Box<dyn ArtifactListener>>;

/// Encode `text` and write it to `path`, creating parent directories first
pub(crate) fn write_text_file(path: &Path, text: &str, encoding: Encoding) -> Result<(), ChecksumError> {
    let bytes = encoding.encode(text)?;
    path_utils::ensure_parent(path)?;
    fs::write(path, bytes)
        .map_err(|e| ChecksumError::from_io_error(e, "writing", Some(path.to_path_buf())))
}

pub(crate) fn notify_all(
    listeners: &[Box<dyn ArtifactListener>],
    artifact: &Path,
    checksum_extension: &str,
    original_extension: Option<&str>,
    classifier: Option<&str>,
) {
    for listener in listeners {
        listener.artifact_created(artifact, checksum_extension, original_extension, classifier);
    }
}

/// Extension of a summary file including the leading dot, e.g. `.csv`
pub(crate) fn summary_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
