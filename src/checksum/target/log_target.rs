// Log target: prints each digest to the build log

use std::path::Path;

use tracing::info;

use super::ExecutionTarget;
use crate::checksum::error::ChecksumError;
use crate::checksum::file::ChecksumFile;

#[derive(Debug, Default)]
pub struct LogTarget;

impl LogTarget {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionTarget for LogTarget {
    fn describe(&self) -> String {
        "log".to_string()
    }

    fn init(&mut self) -> Result<(), ChecksumError> {
        Ok(())
    }

    fn write(&mut self, digest: &str, file: &ChecksumFile, algorithm: &str) -> Result<(), ChecksumError> {
        info!("{} - {} : {}", file.file_name(), algorithm, digest);
        Ok(())
    }

    fn close(&mut self, _sub_path: Option<&Path>) -> Result<(), ChecksumError> {
        Ok(())
    }
}
