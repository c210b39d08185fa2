// Tests for checking files against a CSV summary

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use checksum::checksum::{
    ChecksumError, ChecksumFile, CsvSummaryFileTarget, DigesterRegistry, Encoding, Execution,
    FailurePolicy, SummaryChecker, SummaryFile,
};
use tempfile::tempdir;

/// Write `files` under `base/target`, hash them into a CSV summary and return its path
fn write_summary(base: &Path, files: &[(&str, &str)]) -> (PathBuf, Vec<ChecksumFile>) {
    let target = base.join("target");
    fs::create_dir_all(&target).unwrap();

    let records: Vec<ChecksumFile> = files
        .iter()
        .map(|(name, content)| {
            let path = target.join(name);
            fs::write(&path, content).unwrap();
            ChecksumFile::new(base, path)
        })
        .collect();

    let summary = base.join("checksums.csv");
    let mut execution = Execution::new(Arc::new(DigesterRegistry::new()), FailurePolicy::Abort);
    execution
        .set_files(records.clone())
        .set_algorithms(["MD5", "SHA-256"])
        .set_sub_path(Some(PathBuf::from("target")))
        .add_target(Box::new(CsvSummaryFileTarget::new(&summary, Encoding::Utf8, Vec::new())));
    execution.run().unwrap();

    (summary, records)
}

#[test]
fn test_read_summary() {
    let dir = tempdir().unwrap();
    let (summary, _) = write_summary(dir.path(), &[("a.txt", "abc"), ("b.txt", "hello world")]);

    let parsed = SummaryFile::read(&summary).unwrap();
    assert_eq!(parsed.algorithms(), ["MD5".to_string(), "SHA-256".to_string()]);
    assert_eq!(parsed.len(), 2);

    let hashcodes = parsed.hashcodes("a.txt").unwrap();
    assert_eq!(hashcodes[0], ("MD5".to_string(), "900150983cd24fb0d6963f7d28e17f72".to_string()));
    assert_eq!(
        hashcodes[1].1,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert!(parsed.hashcodes("missing.txt").is_none());
}

#[test]
fn test_check_matching_files() {
    let dir = tempdir().unwrap();
    let (summary, files) = write_summary(dir.path(), &[("a.txt", "abc"), ("b.txt", "hello world")]);

    let parsed = SummaryFile::read(&summary).unwrap();
    let checker = SummaryChecker::new(Arc::new(DigesterRegistry::new()))
        .with_sub_path(Some(PathBuf::from("target")));
    let report = checker.check(&parsed, &files).unwrap();

    assert_eq!(report.files_checked, 2);
    assert_eq!(report.digests_matched, 4);
}

#[test]
fn test_check_detects_modified_file() {
    let dir = tempdir().unwrap();
    let (summary, files) = write_summary(dir.path(), &[("a.txt", "abc")]);
    fs::write(files[0].path(), "abd").unwrap();

    let parsed = SummaryFile::read(&summary).unwrap();
    let checker = SummaryChecker::new(Arc::new(DigesterRegistry::new()))
        .with_sub_path(Some(PathBuf::from("target")));

    let err = checker.check(&parsed, &files).unwrap_err();
    match err {
        ChecksumError::ChecksumMismatch { algorithm, expected, .. } => {
            assert_eq!(algorithm, "MD5");
            assert_eq!(expected, "900150983cd24fb0d6963f7d28e17f72");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_check_file_missing_from_summary() {
    let dir = tempdir().unwrap();
    let (summary, mut files) = write_summary(dir.path(), &[("a.txt", "abc")]);

    let extra = dir.path().join("target").join("extra.txt");
    fs::write(&extra, "extra").unwrap();
    files.push(ChecksumFile::new(dir.path(), extra));

    let parsed = SummaryFile::read(&summary).unwrap();
    let checker = SummaryChecker::new(Arc::new(DigesterRegistry::new()))
        .with_sub_path(Some(PathBuf::from("target")));

    let err = checker.check(&parsed, &files).unwrap_err();
    assert!(
        matches!(err, ChecksumError::MissingFromSummary { ref report_path, .. } if report_path == "extra.txt")
    );
}

#[test]
fn test_check_skips_empty_columns() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "abc").unwrap();
    let summary = dir.path().join("checksums.csv");
    fs::write(
        &summary,
        "#File,MD5,SHA-1\na.txt,900150983cd24fb0d6963f7d28e17f72,\n",
    )
    .unwrap();

    let parsed = SummaryFile::read(&summary).unwrap();
    let report = SummaryChecker::new(Arc::new(DigesterRegistry::new()))
        .check(&parsed, &[ChecksumFile::from_path(&file)])
        .unwrap();
    assert_eq!(report.files_checked, 1);
    assert_eq!(report.digests_matched, 1);
}

#[test]
fn test_summary_without_header() {
    let dir = tempdir().unwrap();
    let summary = dir.path().join("checksums.csv");
    fs::write(&summary, "a.txt,1234\n").unwrap();

    let err = SummaryFile::read(&summary).unwrap_err();
    assert!(matches!(err, ChecksumError::SummaryParse { line: 1, .. }));
}

#[test]
fn test_summary_with_too_many_columns() {
    let dir = tempdir().unwrap();
    let summary = dir.path().join("checksums.csv");
    fs::write(&summary, "#File,MD5\na.txt,1,2\n").unwrap();

    let err = SummaryFile::read(&summary).unwrap_err();
    assert!(matches!(err, ChecksumError::SummaryParse { line: 2, .. }));
}

#[test]
fn test_missing_summary_file() {
    let dir = tempdir().unwrap();
    let err = SummaryFile::read(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, ChecksumError::FileNotFound { .. }));
}
