// CSV summary file target
// One row per file, one column per algorithm

use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::summary::FileHashcodes;
use super::{notify_all, summary_extension, write_text_file, ExecutionTarget, Listeners, LINE_SEPARATOR};
use crate::checksum::encoding::Encoding;
use crate::checksum::error::ChecksumError;
use crate::checksum::file::ChecksumFile;

/// Marker starting the header line
pub const CSV_COMMENT_MARKER: &str = "#";

/// Name of the first header column
pub const CSV_FILE_COLUMN: &str = "File";

/// Writes `#File,ALG1,ALG2,...` followed by one row per file, sorted by report path
pub struct CsvSummaryFileTarget {
    summary_file: PathBuf,
    encoding: Encoding,
    listeners: Listeners,
    hashcodes: FileHashcodes,
}

impl CsvSummaryFileTarget {
    pub fn new(summary_file: impl Into<PathBuf>, encoding: Encoding, listeners: Listeners) -> Self {
        Self {
            summary_file: summary_file.into(),
            encoding,
            listeners,
            hashcodes: FileHashcodes::new(),
        }
    }

    pub fn summary_file(&self) -> &Path {
        &self.summary_file
    }

    fn render(&self, sub_path: Option<&Path>) -> Result<String, csv::Error> {
        let terminator = if LINE_SEPARATOR == "\r\n" {
            Terminator::CRLF
        } else {
            Terminator::Any(b'\n')
        };
        let mut writer = WriterBuilder::new()
            .terminator(terminator)
            .quote_style(QuoteStyle::Necessary)
            .flexible(true)
            .from_writer(Vec::new());

        let algorithms: Vec<&str> = self.hashcodes.algorithms().iter().map(String::as_str).collect();

        let header = format!("{}{}", CSV_COMMENT_MARKER, CSV_FILE_COLUMN);
        let mut header_record = vec![header.as_str()];
        header_record.extend(algorithms.iter().copied());
        writer.write_record(&header_record)?;

        for entry in self.hashcodes.sorted_entries(sub_path) {
            let mut record = vec![entry.report_path.as_str()];
            record.extend(
                algorithms
                    .iter()
                    .map(|algorithm| entry.hashcode(algorithm).unwrap_or("")),
            );
            writer.write_record(&record)?;
        }

        let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn close_error(&self, reason: impl ToString) -> ChecksumError {
        ChecksumError::TargetClose {
            target: self.describe(),
            reason: reason.to_string(),
        }
    }
}

impl ExecutionTarget for CsvSummaryFileTarget {
    fn describe(&self) -> String {
        format!("CSV summary file {}", self.summary_file.display())
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
        let content = self.render(sub_path).map_err(|e| self.close_error(e))?;
        write_text_file(&self.summary_file, &content, self.encoding).map_err(|e| self.close_error(e))?;

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
