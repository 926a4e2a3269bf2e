use crate::error::Error;
use crate::model::{AcceptedBook, Category};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const ILLEGAL_PATH_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Byte budget for a file stem, leaving room for ` (n)` and the extension
/// under the usual 255-byte name limit.
pub const MAX_STEM_BYTES: usize = 200;

/// Where one accepted book landed in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedBook {
    pub filename: String,
    pub title: String,
    pub category: Category,
    pub length: usize,
    pub chapter_count: usize,
    /// Relative to the books directory, e.g. `其他/平凡的世界.md`.
    pub archive_path: PathBuf,
}

pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if ILLEGAL_PATH_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Longest prefix of `s` that fits in `max_bytes` without splitting a char.
pub fn truncate_to_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = s
        .char_indices()
        .map(|(idx, c)| idx + c.len_utf8())
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    &s[..end]
}

/// Writes accepted books under `<books_dir>/<category>/<title>.<ext>`.
pub struct ArchiveWriter {
    books_dir: PathBuf,
    extension: String,
}

impl ArchiveWriter {
    pub fn new(books_dir: &Path, extension: &str) -> Self {
        Self {
            books_dir: books_dir.to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Two books that sanitize to the same name in one category never
    /// overwrite each other; later ones get a ` (n)` suffix.
    fn claim_path(&self, taken: &mut HashSet<PathBuf>, category: Category, title: &str) -> PathBuf {
        let sanitized = sanitize_title(title);
        let stem = truncate_to_bytes(&sanitized, MAX_STEM_BYTES);
        if stem.len() < sanitized.len() {
            debug!("Title '{}' shortened to fit a file name", title);
        }
        let dir = PathBuf::from(category.label());

        let mut candidate = dir.join(format!("{}.{}", stem, self.extension));
        let mut n = 2;
        while taken.contains(&candidate) {
            candidate = dir.join(format!("{} ({}).{}", stem, n, self.extension));
            n += 1;
        }
        if n > 2 {
            warn!(
                "Title collision for '{}', writing as {}",
                title,
                candidate.display()
            );
        }
        taken.insert(candidate.clone());
        candidate
    }

    /// Archive paths for `books`, in order, without touching the disk.
    pub fn plan(&self, books: &[AcceptedBook]) -> Vec<ArchivedBook> {
        let mut taken = HashSet::new();
        books
            .iter()
            .map(|book| ArchivedBook {
                filename: book.filename.clone(),
                title: book.title.clone(),
                category: book.category,
                length: book.length,
                chapter_count: book.chapter_count,
                archive_path: self.claim_path(&mut taken, book.category, &book.title),
            })
            .collect()
    }

    /// Any write failure aborts: a partial archive is not a valid result.
    pub fn write_books(&self, books: &[AcceptedBook]) -> Result<Vec<ArchivedBook>, Error> {
        let archived = self.plan(books);

        for (book, entry) in books.iter().zip(&archived) {
            let output_path = self.books_dir.join(&entry.archive_path);
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
            }
            fs::write(&output_path, book.content.as_bytes())
                .map_err(|e| Error::write(&output_path, e))?;
            debug!("Wrote {}", output_path.display());
        }

        Ok(archived)
    }
}
