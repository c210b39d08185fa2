// One hash file per (file, algorithm)
// e.g. `app.jar` hashed with SHA-256 produces `app.jar.sha256`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::{notify_all, write_text_file, ExecutionTarget, Listeners};
use crate::checksum::digest::DigesterRegistry;
use crate::checksum::encoding::Encoding;
use crate::checksum::error::ChecksumError;
use crate::checksum::file::ChecksumFile;
use crate::checksum::path_utils;

/// Separator placed between the digest and the file name when it is appended
pub const FILENAME_SEPARATOR: &str = "  ";

pub struct OneHashPerFileTarget {
    registry: Arc<DigesterRegistry>,
    output_directory: Option<PathBuf>,
    append_filename: bool,
    encoding: Encoding,
    listeners: Listeners,
}

impl OneHashPerFileTarget {
    /// Hash files are written next to their source file
    pub fn new(registry: Arc<DigesterRegistry>, encoding: Encoding, listeners: Listeners) -> Self {
        Self {
            registry,
            output_directory: None,
            append_filename: false,
            encoding,
            listeners,
        }
    }

    /// Write hash files to `directory` instead of next to their source file
    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output_directory = Some(directory.into());
        self
    }

    /// Append two spaces and the file name after the digest (`md5sum` line format)
    pub fn with_append_filename(mut self, append_filename: bool) -> Self {
        self.append_filename = append_filename;
        self
    }

    /// Where the hash file of `file` for `extension` goes
    pub fn output_file(&self, file: &ChecksumFile, extension: &str) -> PathBuf {
        let directory = match &self.output_directory {
            Some(directory) => directory.clone(),
            None => file
                .path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        directory.join(format!("{}{}", file.file_name(), extension))
    }

    fn write_error(&self, reason: impl ToString) -> ChecksumError {
        ChecksumError::TargetWrite {
            target: self.describe(),
            reason: reason.to_string(),
        }
    }
}

impl ExecutionTarget for OneHashPerFileTarget {
    fn describe(&self) -> String {
        match &self.output_directory {
            Some(directory) => format!("hash files in {}", directory.display()),
            None => "hash files".to_string(),
        }
    }

    fn init(&mut self) -> Result<(), ChecksumError> {
        if let Some(directory) = &self.output_directory {
            path_utils::ensure_directory(directory).map_err(|e| ChecksumError::TargetInitialization {
                target: self.describe(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    fn write(&mut self, digest: &str, file: &ChecksumFile, algorithm: &str) -> Result<(), ChecksumError> {
        let digester = self.registry.get(algorithm).map_err(|e| self.write_error(e))?;
        let extension = digester.file_extension();
        let output = self.output_file(file, &extension);

        let content = if self.append_filename {
            format!("{}{}{}", digest, FILENAME_SEPARATOR, file.file_name())
        } else {
            digest.to_string()
        };

        write_text_file(&output, &content, self.encoding).map_err(|e| self.write_error(e))?;
        debug!("Wrote {}", output.display());

        notify_all(
            &self.listeners,
            &output,
            &extension,
            file.extension(),
            file.classifier(),
        );
        Ok(())
    }

    fn close(&mut self, _sub_path: Option<&Path>) -> Result<(), ChecksumError> {
        Ok(())
    }
}
