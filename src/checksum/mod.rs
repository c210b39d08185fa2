// Checksum core library
// Digest engines, execution engine and output targets

pub mod cksum;
pub mod digest;
pub mod encoding;
pub mod error;
pub mod execution;
pub mod file;
pub mod fileset;
pub mod keccak;
pub mod path_utils;
pub mod target;
pub mod verify;

// Re-export commonly used types for convenience
pub use self::digest::{
    supported_algorithms, AlgorithmInfo, DigestFormat, DigesterRegistry, FileDigester, Hasher,
    DEFAULT_ALGORITHMS,
};
pub use encoding::Encoding;
pub use error::ChecksumError;
pub use execution::{Execution, ExecutionStats, FailurePolicy};
pub use file::ChecksumFile;
pub use fileset::FileSet;
pub use target::{
    ArtifactListener, CsvSummaryFileTarget, ExecutionTarget, LogTarget, LoggingArtifactListener,
    OneHashPerFileTarget, ShasumSummaryFileTarget, XmlSummaryFileTarget,
};
pub use verify::{CheckReport, SummaryChecker, SummaryFile};
