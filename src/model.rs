use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A candidate file as produced by the scanner, before any decoding.
///
/// `raw` carries the read failure as text so the gate can report it
/// instead of aborting the run.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub raw: Result<Vec<u8>, String>,
}

/// A successfully decoded document. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub filename: String,
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub content: String,
    pub byte_size: u64,
    /// Character count (not bytes).
    pub length: usize,
}

impl Document {
    pub fn new(filename: String, path: PathBuf, relative_path: PathBuf, content: String) -> Self {
        let byte_size = content.len() as u64;
        let length = content.chars().count();
        Self {
            filename,
            path,
            relative_path,
            content,
            byte_size,
            length,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    WebFiction,
    Mystery,
    TombRaiding,
    Horror,
    HistoricalRomance,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::WebFiction,
        Category::Mystery,
        Category::TombRaiding,
        Category::Horror,
        Category::HistoricalRomance,
        Category::Other,
    ];

    /// Folder and report label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::WebFiction => "網絡小說",
            Category::Mystery => "推理懸疑",
            Category::TombRaiding => "盜墓探險",
            Category::Horror => "恐怖驚悚",
            Category::HistoricalRomance => "古代言情",
            Category::Other => "其他",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a document was rejected. Variants are listed in gate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    ReadError(String),
    TestOrDebugFile,
    TooSmall(u64),
    TooShort(usize),
    GarbledContent,
    TooFewChapters(usize),
    DuplicateOf(String),
}

impl Reason {
    pub fn code(&self) -> &'static str {
        match self {
            Reason::ReadError(_) => "read_error",
            Reason::TestOrDebugFile => "test_or_debug_file",
            Reason::TooSmall(_) => "too_small",
            Reason::TooShort(_) => "too_short",
            Reason::GarbledContent => "garbled_content",
            Reason::TooFewChapters(_) => "too_few_chapters",
            Reason::DuplicateOf(_) => "duplicate_of",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::ReadError(detail) => write!(f, "read error: {}", detail),
            Reason::TestOrDebugFile => f.write_str("test/debug file"),
            Reason::TooSmall(bytes) => write!(f, "file too small ({} bytes)", bytes),
            Reason::TooShort(chars) => write!(f, "content too short ({} chars)", chars),
            Reason::GarbledContent => f.write_str("garbled content"),
            Reason::TooFewChapters(count) => write!(f, "too few chapters ({})", count),
            Reason::DuplicateOf(first) => write!(f, "duplicate of {}", first),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionRecord {
    pub filename: String,
    pub reason: Reason,
    pub path: PathBuf,
    pub relative_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedBook {
    pub filename: String,
    pub title: String,
    pub category: Category,
    pub content: String,
    pub length: usize,
    pub chapter_count: usize,
    pub source_path: PathBuf,
}

/// Terminal state of a single document. A document is either kept or
/// rejected, never both.
#[derive(Debug, Clone)]
pub enum Outcome {
    Accepted(AcceptedBook),
    Rejected(RejectionRecord),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub processed: usize,
    pub kept: usize,
    pub removed: usize,
    pub duplicates: usize,
}

impl Statistics {
    pub fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Accepted(_) => {
                self.kept += 1;
                self.processed += 1;
            }
            Outcome::Rejected(record) => {
                self.removed += 1;
                if matches!(record.reason, Reason::DuplicateOf(_)) {
                    self.duplicates += 1;
                }
            }
        }
    }
}
