// Accumulator shared by the summary file targets

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::checksum::file::ChecksumFile;

/// Digests recorded per file, keyed by file path, in insertion order
#[derive(Debug, Default)]
pub struct FileHashcodes {
    entries: Vec<(ChecksumFile, Vec<(String, String)>)>,
    index: HashMap<PathBuf, usize>,
    algorithms: BTreeSet<String>,
}

/// One summary row, ready to serialize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry<'a> {
    pub report_path: String,
    pub file: &'a ChecksumFile,
    pub hashcodes: &'a [(String, String)],
}

impl SummaryEntry<'_> {
    /// Digest recorded for `algorithm`, if any
    pub fn hashcode(&self, algorithm: &str) -> Option<&str> {
        self.hashcodes
            .iter()
            .find(|(name, _)| name == algorithm)
            .map(|(_, digest)| digest.as_str())
    }
}

impl FileHashcodes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything recorded so far
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.algorithms.clear();
    }

    /// Record a digest; a second digest for the same file and algorithm replaces the first
    pub fn insert(&mut self, file: &ChecksumFile, algorithm: &str, digest: &str) {
        let position = match self.index.get(file.path()) {
            Some(&position) => position,
            None => {
                self.entries.push((file.clone(), Vec::new()));
                self.index.insert(file.path().to_path_buf(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let hashcodes = &mut self.entries[position].1;
        match hashcodes.iter_mut().find(|(name, _)| name == algorithm) {
            Some(existing) => existing.1 = digest.to_string(),
            None => hashcodes.push((algorithm.to_string(), digest.to_string())),
        }
        self.algorithms.insert(algorithm.to_string());
    }

    /// Every algorithm seen, in sorted order
    pub fn algorithms(&self) -> &BTreeSet<String> {
        &self.algorithms
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by report path
    pub fn sorted_entries(&self, sub_path: Option<&Path>) -> Vec<SummaryEntry<'_>> {
        let mut entries: Vec<SummaryEntry<'_>> = self
            .entries
            .iter()
            .map(|(file, hashcodes)| SummaryEntry {
                report_path: file.report_path(sub_path),
                file,
                hashcodes,
            })
            .collect();
        entries.sort_by(|a, b| a.report_path.cmp(&b.report_path));
        entries
    }
}
