// XML summary file target

use std::error::Error;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::summary::FileHashcodes;
use super::{notify_all, summary_extension, write_text_file, ExecutionTarget, Listeners, LINE_SEPARATOR};
use crate::checksum::encoding::Encoding;
use crate::checksum::error::ChecksumError;
use crate::checksum::file::ChecksumFile;

/// Number of spaces per nesting level
pub const XML_INDENTATION_SIZE: usize = 2;

/// Writes `<files><file name=".."><hashcode algorithm="..">..</hashcode></file></files>`
pub struct XmlSummaryFileTarget {
    summary_file: PathBuf,
    encoding: Encoding,
    listeners: Listeners,
    hashcodes: FileHashcodes,
}

impl XmlSummaryFileTarget {
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

    fn close_error(&self, reason: impl ToString) -> ChecksumError {
        ChecksumError::TargetClose {
            target: self.describe(),
            reason: reason.to_string(),
        }
    }

    fn render(&self, sub_path: Option<&Path>) -> Result<String, Box<dyn Error + Send + Sync>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', XML_INDENTATION_SIZE);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some(self.encoding.name()), None)))?;
        writer.write_event(Event::Start(BytesStart::new("files")))?;
        for entry in self.hashcodes.sorted_entries(sub_path) {
            let mut file = BytesStart::new("file");
            file.push_attribute(("name", entry.report_path.as_str()));
            writer.write_event(Event::Start(file))?;

            for (algorithm, digest) in entry.hashcodes {
                let mut hashcode = BytesStart::new("hashcode");
                hashcode.push_attribute(("algorithm", algorithm.as_str()));
                writer.write_event(Event::Start(hashcode))?;
                writer.write_event(Event::Text(BytesText::new(digest)))?;
                writer.write_event(Event::End(BytesEnd::new("hashcode")))?;
            }
            writer.write_event(Event::End(BytesEnd::new("file")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("files")))?;

        let mut document = String::from_utf8(writer.into_inner())?;
        document.push_str(LINE_SEPARATOR);
        Ok(document)
    }
}

impl ExecutionTarget for XmlSummaryFileTarget {
    fn describe(&self) -> String {
        format!("XML summary file {}", self.summary_file.display())
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
