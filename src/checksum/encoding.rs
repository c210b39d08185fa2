// Text encodings for summary and hash files

use std::fmt;
use std::str::FromStr;

use super::error::ChecksumError;

/// Charset used when writing text outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Ascii,
    Latin1,
}

impl Encoding {
    /// Canonical charset name
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Ascii => "US-ASCII",
            Encoding::Latin1 => "ISO-8859-1",
        }
    }

    /// Encode `text`, failing on the first character the charset cannot represent
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, ChecksumError> {
        let limit = match self {
            Encoding::Utf8 => return Ok(text.as_bytes().to_vec()),
            Encoding::Ascii => 0x7F,
            Encoding::Latin1 => 0xFF,
        };

        text.chars()
            .map(|c| {
                u8::try_from(u32::from(c))
                    .ok()
                    .filter(|&b| u32::from(b) <= limit)
                    .ok_or_else(|| ChecksumError::Unencodable {
                        character: c,
                        encoding: self.name().to_string(),
                    })
            })
            .collect()
    }
}

impl FromStr for Encoding {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('_', "-").as_str() {
            "UTF-8" | "UTF8" => Ok(Encoding::Utf8),
            "US-ASCII" | "ASCII" => Ok(Encoding::Ascii),
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" | "LATIN-1" => Ok(Encoding::Latin1),
            _ => Err(ChecksumError::UnsupportedEncoding {
                encoding: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
