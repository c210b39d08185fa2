// Verification against a CSV summary file
// Recomputes digests and compares them to the recorded values

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::digest::DigesterRegistry;
use super::error::ChecksumError;
use super::file::ChecksumFile;
use super::target::csv_summary::{CSV_COMMENT_MARKER, CSV_FILE_COLUMN};

/// Contents of a CSV summary file: report path => (algorithm, digest)
#[derive(Debug, Default)]
pub struct SummaryFile {
    path: PathBuf,
    algorithms: Vec<String>,
    rows: HashMap<String, Vec<(String, String)>>,
}

impl SummaryFile {
    /// Parse a summary file written by the CSV target
    pub fn read(path: &Path) -> Result<Self, ChecksumError> {
        let file = File::open(path).map_err(|e| {
            ChecksumError::from_io_error(e, "opening summary file", Some(path.to_path_buf()))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let header = format!("{}{}", CSV_COMMENT_MARKER, CSV_FILE_COLUMN);
        let mut summary = SummaryFile {
            path: path.to_path_buf(),
            ..Default::default()
        };

        for (index, record) in reader.records().enumerate() {
            let line = index + 1;
            let record = record.map_err(|e| ChecksumError::SummaryParse {
                path: path.to_path_buf(),
                line,
                reason: e.to_string(),
            })?;

            let Some(first) = record.get(0) else {
                continue;
            };
            if first.is_empty() && record.len() == 1 {
                continue;
            }

            if first == header {
                summary.algorithms = record.iter().skip(1).map(str::to_string).collect();
                continue;
            }

            if summary.algorithms.is_empty() {
                return Err(ChecksumError::SummaryParse {
                    path: path.to_path_buf(),
                    line,
                    reason: format!("expected a '{}' header before the first row", header),
                });
            }
            if record.len() - 1 > summary.algorithms.len() {
                return Err(ChecksumError::SummaryParse {
                    path: path.to_path_buf(),
                    line,
                    reason: format!(
                        "{} digests for {} algorithms",
                        record.len() - 1,
                        summary.algorithms.len()
                    ),
                });
            }

            let hashcodes = summary
                .algorithms
                .iter()
                .zip(record.iter().skip(1))
                .filter(|(_, digest)| !digest.is_empty())
                .map(|(algorithm, digest)| (algorithm.clone(), digest.to_string()))
                .collect();
            summary.rows.insert(first.to_string(), hashcodes);
        }

        Ok(summary)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Algorithms named in the header, in file order
    pub fn algorithms(&self) -> &[String] {
        &self.algorithms
    }

    /// Recorded digests of the file labelled `report_path`
    pub fn hashcodes(&self, report_path: &str) -> Option<&[(String, String)]> {
        self.rows.get(report_path).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outcome of a successful summary check
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CheckReport {
    pub files_checked: usize,
    pub digests_matched: usize,
}

/// Checks files against the digests recorded in a summary file
pub struct SummaryChecker {
    registry: Arc<DigesterRegistry>,
    sub_path: Option<PathBuf>,
}

impl SummaryChecker {
    pub fn new(registry: Arc<DigesterRegistry>) -> Self {
        Self {
            registry,
            sub_path: None,
        }
    }

    /// Sub path used to compute the report path files are looked up by
    pub fn with_sub_path(mut self, sub_path: Option<PathBuf>) -> Self {
        self.sub_path = sub_path;
        self
    }

    /// Verify every file; the first missing entry or mismatch fails the check
    pub fn check(&self, summary: &SummaryFile, files: &[ChecksumFile]) -> Result<CheckReport, ChecksumError> {
        let mut report = CheckReport::default();

        for file in files {
            let report_path = file.report_path(self.sub_path.as_deref());
            let hashcodes = summary
                .hashcodes(&report_path)
                .ok_or_else(|| ChecksumError::MissingFromSummary {
                    report_path: report_path.clone(),
                    summary: summary.path().to_path_buf(),
                })?;

            for (algorithm, expected) in hashcodes {
                let digester = self.registry.get(algorithm)?;
                let actual = digester
                    .calculate(file.path())
                    .map_err(|e| ChecksumError::digest_failure(&file.file_name(), algorithm, &e))?;

                if actual != *expected {
                    return Err(ChecksumError::ChecksumMismatch {
                        path: file.path().to_path_buf(),
                        algorithm: algorithm.clone(),
                        expected: expected.clone(),
                        actual,
                    });
                }
                debug!("{} - {} : {} = {}", report_path, algorithm, actual, expected);
                report.digests_matched += 1;
            }
            report.files_checked += 1;
        }

        Ok(report)
    }
}
