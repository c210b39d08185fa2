// Tests for execution targets

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use checksum::checksum::target::LINE_SEPARATOR;
use checksum::checksum::{
    ArtifactListener, ChecksumError, ChecksumFile, CsvSummaryFileTarget, DigesterRegistry,
    Encoding, ExecutionTarget, LogTarget, OneHashPerFileTarget, ShasumSummaryFileTarget,
    XmlSummaryFileTarget,
};
use tempfile::tempdir;

type Recorded = Arc<Mutex<Vec<(PathBuf, String, Option<String>, Option<String>)>>>;

/// Listener keeping every notification for later inspection
struct RecordingListener {
    recorded: Recorded,
}

impl ArtifactListener for RecordingListener {
    fn artifact_created(
        &self,
        artifact: &Path,
        checksum_extension: &str,
        original_extension: Option<&str>,
        classifier: Option<&str>,
    ) {
        self.recorded.lock().unwrap().push((
            artifact.to_path_buf(),
            checksum_extension.to_string(),
            original_extension.map(str::to_string),
            classifier.map(str::to_string),
        ));
    }
}

fn recording_listener() -> (Vec<Box<dyn ArtifactListener>>, Recorded) {
    let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
    let listener = RecordingListener {
        recorded: Arc::clone(&recorded),
    };
    (vec![Box::new(listener)], recorded)
}

fn lines(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| format!("{}{}", line, LINE_SEPARATOR))
        .collect()
}

#[test]
fn test_one_hash_per_file_next_to_source() {
    let dir = tempdir().unwrap();
    let jar = dir.path().join("app.jar");
    fs::write(&jar, b"jar").unwrap();

    let registry = Arc::new(DigesterRegistry::new());
    let mut target = OneHashPerFileTarget::new(registry, Encoding::Utf8, Vec::new());
    target.init().unwrap();
    target
        .write("abc123", &ChecksumFile::from_path(&jar), "SHA-256")
        .unwrap();
    target.close(None).unwrap();

    let content = fs::read_to_string(dir.path().join("app.jar.sha256")).unwrap();
    assert_eq!(content, "abc123");
}

#[test]
fn test_one_hash_per_file_append_filename() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let jar = dir.path().join("app.jar");

    let registry = Arc::new(DigesterRegistry::new());
    let mut target = OneHashPerFileTarget::new(registry, Encoding::Utf8, Vec::new())
        .with_output_directory(&out)
        .with_append_filename(true);
    target.init().unwrap();
    assert!(out.is_dir());

    target
        .write("d41d8cd98f00b204e9800998ecf8427e", &ChecksumFile::from_path(&jar), "MD5")
        .unwrap();

    let content = fs::read_to_string(out.join("app.jar.md5")).unwrap();
    assert_eq!(content, "d41d8cd98f00b204e9800998ecf8427e  app.jar");
}

#[test]
fn test_one_hash_per_file_output_directory_is_a_file() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("out");
    fs::write(&blocker, b"not a directory").unwrap();

    let registry = Arc::new(DigesterRegistry::new());
    let mut target = OneHashPerFileTarget::new(registry, Encoding::Utf8, Vec::new())
        .with_output_directory(&blocker);

    let err = target.init().unwrap_err();
    assert!(matches!(err, ChecksumError::TargetInitialization { .. }));
}

#[test]
fn test_one_hash_per_file_notifies_listeners() {
    let dir = tempdir().unwrap();
    let jar = dir.path().join("lib.jar");
    let (listeners, recorded) = recording_listener();

    let registry = Arc::new(DigesterRegistry::new());
    let mut target = OneHashPerFileTarget::new(registry, Encoding::Utf8, listeners);
    target.init().unwrap();

    let file = ChecksumFile::from_path(&jar).with_classifier("sources");
    target.write("1234", &file, "SHA-1").unwrap();

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, dir.path().join("lib.jar.sha1"));
    assert_eq!(recorded[0].1, ".sha1");
    assert_eq!(recorded[0].2.as_deref(), Some("jar"));
    assert_eq!(recorded[0].3.as_deref(), Some("sources"));
}

#[test]
fn test_csv_summary_layout() {
    let dir = tempdir().unwrap();
    let summary = dir.path().join("target").join("checksums.csv");
    let (listeners, recorded) = recording_listener();

    let a = ChecksumFile::from_path(dir.path().join("A"));
    let b = ChecksumFile::from_path(dir.path().join("B"));

    let mut target = CsvSummaryFileTarget::new(&summary, Encoding::Utf8, listeners);
    target.init().unwrap();
    // Written out of order on purpose
    target.write("ccc", &b, "MD5").unwrap();
    target.write("aaa", &a, "MD5").unwrap();
    target.write("bbb", &a, "SHA-1").unwrap();
    target.close(None).unwrap();

    let content = fs::read_to_string(&summary).unwrap();
    assert_eq!(content, lines(&["#File,MD5,SHA-1", "A,aaa,bbb", "B,ccc,"]));

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, summary);
    assert_eq!(recorded[0].1, ".csv");
}

#[test]
fn test_csv_summary_report_paths() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("project");
    let summary = dir.path().join("checksums.csv");

    let nested = ChecksumFile::new(&base, base.join("target").join("lib").join("z.jar"));
    let top = ChecksumFile::new(&base, base.join("target").join("a.jar"));

    let mut target = CsvSummaryFileTarget::new(&summary, Encoding::Utf8, Vec::new());
    target.init().unwrap();
    target.write("1", &nested, "MD5").unwrap();
    target.write("2", &top, "MD5").unwrap();
    target.close(Some(Path::new("target"))).unwrap();

    let content = fs::read_to_string(&summary).unwrap();
    assert_eq!(content, lines(&["#File,MD5", "a.jar,2", "lib/z.jar,1"]));
}

#[test]
fn test_csv_summary_quotes_commas() {
    let dir = tempdir().unwrap();
    let summary = dir.path().join("checksums.csv");

    let mut target = CsvSummaryFileTarget::new(&summary, Encoding::Utf8, Vec::new());
    target.init().unwrap();
    target
        .write("1", &ChecksumFile::from_path(dir.path().join("a,b.txt")), "MD5")
        .unwrap();
    target.close(None).unwrap();

    let content = fs::read_to_string(&summary).unwrap();
    assert_eq!(content, lines(&["#File,MD5", "\"a,b.txt\",1"]));
}

#[test]
fn test_csv_summary_unencodable_name() {
    let dir = tempdir().unwrap();
    let summary = dir.path().join("checksums.csv");

    let mut target = CsvSummaryFileTarget::new(&summary, Encoding::Ascii, Vec::new());
    target.init().unwrap();
    target
        .write("1", &ChecksumFile::from_path(dir.path().join("résumé.txt")), "MD5")
        .unwrap();

    let err = target.close(None).unwrap_err();
    assert!(matches!(err, ChecksumError::TargetClose { .. }));
    assert!(!summary.exists());
}

#[test]
fn test_xml_summary_layout() {
    let dir = tempdir().unwrap();
    let summary = dir.path().join("checksums.xml");

    let a = ChecksumFile::from_path(dir.path().join("a.txt"));
    let b = ChecksumFile::from_path(dir.path().join("b&c.txt"));

    let mut target = XmlSummaryFileTarget::new(&summary, Encoding::Utf8, Vec::new());
    target.init().unwrap();
    target.write("222", &b, "MD5").unwrap();
    target.write("111", &a, "SHA-1").unwrap();
    target.write("000", &a, "MD5").unwrap();
    target.close(None).unwrap();

    // Indentation uses plain newlines; only the document end follows the platform
    let content = fs::read_to_string(&summary).unwrap();
    let expected = [
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
        "<files>",
        "  <file name=\"a.txt\">",
        "    <hashcode algorithm=\"SHA-1\">111</hashcode>",
        "    <hashcode algorithm=\"MD5\">000</hashcode>",
        "  </file>",
        "  <file name=\"b&amp;c.txt\">",
        "    <hashcode algorithm=\"MD5\">222</hashcode>",
        "  </file>",
        "</files>",
    ]
    .join("\n");
    assert_eq!(content, format!("{}{}", expected, LINE_SEPARATOR));
}

#[test]
fn test_xml_summary_escapes_markup() {
    let dir = tempdir().unwrap();
    let summary = dir.path().join("checksums.xml");

    let mut target = XmlSummaryFileTarget::new(&summary, Encoding::Latin1, Vec::new());
    target.init().unwrap();
    target
        .write("1", &ChecksumFile::from_path(dir.path().join("<a>\"b\".txt")), "MD5")
        .unwrap();
    target.close(None).unwrap();

    let content = fs::read(&summary).unwrap();
    let content = String::from_utf8(content).unwrap();
    assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>"));
    assert!(content.contains("<file name=\"&lt;a&gt;&quot;b&quot;.txt\">"));
}

#[test]
fn test_shasum_summary_layout() {
    let dir = tempdir().unwrap();
    let summary = dir.path().join("checksums.sha");

    let mut target = ShasumSummaryFileTarget::new(&summary, Vec::new());
    target.init().unwrap();
    target
        .write("ffff", &ChecksumFile::from_path(dir.path().join("b.bin")), "SHA-256")
        .unwrap();
    target
        .write("eeee", &ChecksumFile::from_path(dir.path().join("a.bin")), "SHA-256")
        .unwrap();
    target.close(None).unwrap();

    let content = fs::read_to_string(&summary).unwrap();
    assert_eq!(content, lines(&["eeee *a.bin", "ffff *b.bin"]));
}

#[test]
fn test_shasum_summary_rejects_two_algorithms() {
    let dir = tempdir().unwrap();
    let summary = dir.path().join("checksums.sha");
    let file = ChecksumFile::from_path(dir.path().join("a.bin"));

    let mut target = ShasumSummaryFileTarget::new(&summary, Vec::new());
    target.init().unwrap();
    target.write("1", &file, "MD5").unwrap();
    target.write("2", &file, "SHA-1").unwrap();

    let err = target.close(None).unwrap_err();
    assert!(matches!(err, ChecksumError::TargetClose { .. }));
    assert!(err.to_string().contains("single algorithm"));
    assert!(!summary.exists());
}

#[test]
fn test_shasum_summary_without_digests() {
    let dir = tempdir().unwrap();
    let summary = dir.path().join("checksums.sha");

    let mut target = ShasumSummaryFileTarget::new(&summary, Vec::new());
    target.init().unwrap();
    target.close(None).unwrap();

    assert_eq!(fs::read_to_string(&summary).unwrap(), "");
}

#[test]
fn test_log_target_accepts_everything() {
    let mut target = LogTarget::new();
    target.init().unwrap();
    target
        .write("abc", &ChecksumFile::from_path("/nowhere/file.txt"), "MD5")
        .unwrap();
    target.close(None).unwrap();
    assert_eq!(target.describe(), "log");
}
