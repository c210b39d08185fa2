// Centralized error handling module
// Every failure carries the file, algorithm or target it happened on

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for checksum executions
#[derive(Debug, Error)]
pub enum ChecksumError {
    /// File system errors with context
    #[error("File not found: {}\nSuggestion: Check that the file path is correct and the file exists", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Permission denied while {operation} {}\nSuggestion: Check file permissions or run with appropriate privileges", .path.display())]
    PermissionDenied { path: PathBuf, operation: String },

    #[error("I/O error while {operation}{}: {source}", describe_path(.path))]
    Io {
        path: Option<PathBuf>,
        operation: String,
        #[source]
        source: io::Error,
    },

    /// Algorithm registry errors
    #[error("Unsupported algorithm {algorithm}.\nSuggestion: Run the 'algorithms' command to see available algorithms")]
    UnsupportedAlgorithm { algorithm: String },

    /// Execution parameter errors
    #[error("No file to process.")]
    NoFilesConfigured,

    #[error("No checksum algorithm defined.")]
    NoAlgorithmsConfigured,

    #[error("No output target defined.")]
    NoTargetsConfigured,

    /// Digest computation errors
    #[error("Unable to calculate {algorithm} hash for {file}: {reason}")]
    DigestComputation {
        file: String,
        algorithm: String,
        reason: String,
    },

    /// Execution target errors
    #[error("Could not initialize {target}: {reason}")]
    TargetInitialization { target: String, reason: String },

    #[error("Could not write to {target}: {reason}")]
    TargetWrite { target: String, reason: String },

    #[error("Could not close {target}: {reason}")]
    TargetClose { target: String, reason: String },

    /// Text encoding errors
    #[error("Unsupported encoding {encoding}. Supported encodings are UTF-8, US-ASCII and ISO-8859-1")]
    UnsupportedEncoding { encoding: String },

    #[error("Character {character:?} cannot be encoded as {encoding}")]
    Unencodable { character: char, encoding: String },

    /// Summary check errors
    #[error("Error parsing summary file {} at line {line}: {reason}", .path.display())]
    SummaryParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("The {algorithm} hash value '{actual}' of file '{}' does not equal the hash value '{expected}' stored in the summary file!", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        algorithm: String,
        expected: String,
        actual: String,
    },

    #[error("File {report_path} is not in summary file {}", .summary.display())]
    MissingFromSummary { report_path: String, summary: PathBuf },

    /// Configuration errors
    #[error("Invalid configuration in {}: {reason}\nSuggestion: Check the TOML syntax and field names", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl ChecksumError {
    /// Create an I/O error with context about the operation and optional path
    pub fn from_io_error(err: io::Error, operation: &str, path: Option<PathBuf>) -> Self {
        match (err.kind(), path) {
            (io::ErrorKind::NotFound, Some(path)) => ChecksumError::FileNotFound { path },
            (io::ErrorKind::PermissionDenied, Some(path)) => ChecksumError::PermissionDenied {
                path,
                operation: operation.to_string(),
            },
            (_, path) => ChecksumError::Io {
                path,
                operation: operation.to_string(),
                source: err,
            },
        }
    }

    /// Wrap any failure raised while digesting `file` with `algorithm`
    pub fn digest_failure(file: &str, algorithm: &str, cause: &ChecksumError) -> Self {
        ChecksumError::DigestComputation {
            file: file.to_string(),
            algorithm: algorithm.to_string(),
            reason: cause.to_string(),
        }
    }
}

fn describe_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" {}", p.display()),
        None => String::new(),
    }
}

// Default conversion for io::Error (without context)
impl From<io::Error> for ChecksumError {
    fn from(err: io::Error) -> Self {
        ChecksumError::from_io_error(err, "performing an unknown operation", None)
    }
}
