//! Quality gate: an ordered, short-circuiting chain of checks.
//!
//! Only the first failing check is reported. The order is:
//! readability, filename blocklist, file size, content length,
//! garbled ratio, chapter count.

pub mod chapters;

use crate::config::AppConfig;
use crate::model::{Document, Reason, RejectionRecord, SourceFile};

pub use chapters::count_chapters;

/// A document that passed every check, with its chapter count attached.
#[derive(Debug, Clone)]
pub struct Screened {
    pub document: Document,
    pub chapter_count: usize,
}

#[derive(Debug, Clone)]
pub struct QualityGate {
    blocklist: Vec<String>,
    min_file_size: u64,
    min_content_length: usize,
    max_garbled_ratio: f64,
    min_chapters: usize,
    chapter_exempt_length: usize,
}

impl QualityGate {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            blocklist: config
                .filename_blocklist
                .iter()
                .filter(|token| !token.is_empty())
                .map(|token| token.to_lowercase())
                .collect(),
            min_file_size: config.min_file_size,
            min_content_length: config.min_content_length,
            max_garbled_ratio: config.max_garbled_ratio,
            min_chapters: config.min_chapters,
            chapter_exempt_length: config.chapter_exempt_length,
        }
    }

    /// Run the chain on one file. Pure: no I/O, no shared state.
    pub fn screen(&self, file: SourceFile) -> Result<Screened, RejectionRecord> {
        let SourceFile {
            path,
            relative_path,
            filename,
            raw,
        } = file;

        let content = match decode(raw) {
            Ok(content) => content,
            Err(reason) => {
                return Err(RejectionRecord {
                    filename,
                    reason,
                    path,
                    relative_path,
                })
            }
        };

        let document = Document::new(filename, path, relative_path, content);
        match self.check(&document) {
            Ok(chapter_count) => Ok(Screened {
                document,
                chapter_count,
            }),
            Err(reason) => Err(RejectionRecord {
                filename: document.filename,
                reason,
                path: document.path,
                relative_path: document.relative_path,
            }),
        }
    }

    fn check(&self, document: &Document) -> Result<usize, Reason> {
        self.check_filename(&document.filename)?;
        self.check_file_size(document.byte_size)?;
        self.check_content_length(document.length)?;
        self.check_garbled(&document.content)?;
        self.check_chapters(&document.content, document.length)
    }

    fn check_filename(&self, filename: &str) -> Result<(), Reason> {
        let lower = filename.to_lowercase();
        if self.blocklist.iter().any(|token| lower.contains(token.as_str())) {
            return Err(Reason::TestOrDebugFile);
        }
        Ok(())
    }

    fn check_file_size(&self, bytes: u64) -> Result<(), Reason> {
        if bytes < self.min_file_size {
            return Err(Reason::TooSmall(bytes));
        }
        Ok(())
    }

    fn check_content_length(&self, chars: usize) -> Result<(), Reason> {
        if chars < self.min_content_length {
            return Err(Reason::TooShort(chars));
        }
        Ok(())
    }

    fn check_garbled(&self, content: &str) -> Result<(), Reason> {
        if garbled_ratio(content) > self.max_garbled_ratio {
            return Err(Reason::GarbledContent);
        }
        Ok(())
    }

    /// Long documents are exempt even with no headings at all.
    fn check_chapters(&self, content: &str, chars: usize) -> Result<usize, Reason> {
        let count = count_chapters(content);
        if count < self.min_chapters && chars < self.chapter_exempt_length {
            return Err(Reason::TooFewChapters(count));
        }
        Ok(count)
    }
}

fn decode(raw: Result<Vec<u8>, String>) -> Result<String, Reason> {
    let bytes = raw.map_err(Reason::ReadError)?;
    String::from_utf8(bytes)
        .map_err(|e| Reason::ReadError(format!("invalid UTF-8: {}", e.utf8_error())))
}

/// Fraction of characters that are U+FFFD or outside the Basic
/// Multilingual Plane. Empty content counts as fully garbled.
pub fn garbled_ratio(content: &str) -> f64 {
    let mut total = 0usize;
    let mut garbled = 0usize;
    for c in content.chars() {
        total += 1;
        if c == char::REPLACEMENT_CHARACTER || c as u32 > 0xFFFF {
            garbled += 1;
        }
    }
    if total == 0 {
        return 1.0;
    }
    garbled as f64 / total as f64
}
