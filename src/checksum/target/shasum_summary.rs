// shasum-compatible summary file target
// Output can be checked with `shasum -c`

use std::path::{Path, PathBuf};

use super::summary::FileHashcodes;
use super::{notify_all, summary_extension, write_text_file, ExecutionTarget, Listeners, LINE_SEPARATOR};
use crate::checksum::encoding::Encoding;
use crate::checksum::error::ChecksumError;
use crate::checksum::file::ChecksumFile;

/// Separator between digest and file name; `*` marks binary mode
pub const SHASUM_FIELD_SEPARATOR: &str = " *";

/// Writes `DIGEST *report-path` lines for a single algorithm, in US-ASCII
pub struct ShasumSummaryFileTarget {
    summary_file: PathBuf,
    listeners: Listeners,
    hashcodes: FileHashcodes,
}

impl ShasumSummaryFileTarget {
    pub fn new(summary_file: impl Into<PathBuf>, listeners: Listeners) -> Self {
        Self {
            summary_file: summary_file.into(),
            listeners,
            hashcodes: FileHashcodes::new(),
        }
    }

    pub fn summary_file(&self) -> &Path {
        &self.summary_file
    }

    fn close_error(&self, reason: impl ToString) -> ChecksumError {
        ChecksumError::TargetClose {
            target: self.describe(),
            reason: reason.to_string(),
        }
    }
}

impl ExecutionTarget for ShasumSummaryFileTarget {
    fn describe(&self) -> String {
        format!("shasum summary file {}", self.summary_file.display())
    }

    fn init(&mut self) -> Result<(), ChecksumError> {
        self.hashcodes.clear();
        Ok(())
    }

    fn write(&mut self, digest: &str, file: &ChecksumFile, algorithm: &str) -> Result<(), ChecksumError> {
        self.hashcodes.insert(file, algorithm, digest);
        Ok(())
    }

    fn close(&mut self, sub_path: Option<&Path>) -> Result<(), ChecksumError> {
        let algorithms = self.hashcodes.algorithms();
        if algorithms.len() > 1 {
            let names: Vec<&str> = algorithms.iter().map(String::as_str).collect();
            return Err(self.close_error(format!(
                "shasum summary files support a single algorithm, got {}",
                names.join(", ")
            )));
        }

        let mut content = String::new();
        if let Some(algorithm) = algorithms.iter().next() {
            for entry in self.hashcodes.sorted_entries(sub_path) {
                if let Some(digest) = entry.hashcode(algorithm) {
                    content.push_str(digest);
                    content.push_str(SHASUM_FIELD_SEPARATOR);
                    content.push_str(&entry.report_path);
                    content.push_str(LINE_SEPARATOR);
                }
            }
        }

        write_text_file(&self.summary_file, &content, Encoding::Ascii).map_err(|e| self.close_error(e))?;

        notify_all(
            &self.listeners,
            &self.summary_file,
            &summary_extension(&self.summary_file),
            None,
            None,
        );
        Ok(())
    }
}
