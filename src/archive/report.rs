use super::writer::ArchivedBook;
use crate::error::Error;
use crate::model::{Category, RejectionRecord, Statistics};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const DELETION_REPORT: &str = "DELETION_REPORT.md";
pub const CATALOG: &str = "CATALOG.md";
pub const METADATA: &str = "metadata.json";
pub const REJECTIONS_CSV: &str = "rejections.csv";

#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub deletion_report: PathBuf,
    pub catalog: PathBuf,
    pub metadata: PathBuf,
    pub rejections_csv: PathBuf,
}

#[derive(Serialize)]
struct Metadata<'a> {
    stats: &'a Statistics,
    categories: BTreeMap<&'static str, Vec<BookEntry<'a>>>,
}

#[derive(Serialize)]
struct BookEntry<'a> {
    title: &'a str,
    filename: &'a str,
    length: usize,
    chapters: usize,
    archive_path: String,
}

#[derive(Serialize)]
struct RejectionRow<'a> {
    filename: &'a str,
    reason_code: &'a str,
    reason: String,
    path: String,
}

/// `1234567` → `1,234,567`
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Books grouped by category, categories and titles both sorted.
fn by_category(books: &[ArchivedBook]) -> BTreeMap<&'static str, Vec<&ArchivedBook>> {
    let mut grouped: BTreeMap<&'static str, Vec<&ArchivedBook>> = BTreeMap::new();
    for book in books {
        grouped.entry(book.category.label()).or_default().push(book);
    }
    for list in grouped.values_mut() {
        list.sort_by(|a, b| a.title.cmp(&b.title));
    }
    grouped
}

pub fn render_deletion_report(
    stats: &Statistics,
    rejected: &[RejectionRecord],
    generated_at: &DateTime<Local>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Deletion Report\n");
    let _ = writeln!(out, "Generated: {}\n", generated_at.to_rfc2822());
    let _ = writeln!(out, "## Statistics\n");
    let _ = writeln!(out, "- Total files: {}", stats.total);
    let _ = writeln!(out, "- Kept: {}", stats.kept);
    let _ = writeln!(out, "- Removed: {}", stats.removed);
    let _ = writeln!(out, "- Duplicates: {}\n", stats.duplicates);
    let _ = writeln!(out, "## Removed Files\n");
    let _ = writeln!(out, "| File | Reason |");
    let _ = writeln!(out, "|------|--------|");
    for record in rejected {
        let _ = writeln!(
            out,
            "| {} | {} |",
            escape_cell(&record.filename),
            escape_cell(&record.reason.to_string())
        );
    }
    out
}

pub fn render_catalog(stats: &Statistics, books: &[ArchivedBook]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Library Catalog\n");
    let _ = writeln!(out, "Total: {} books\n", stats.kept);

    for (label, list) in by_category(books) {
        let _ = writeln!(out, "## {} ({})\n", label, list.len());
        for book in list {
            let _ = writeln!(
                out,
                "- **{}** ({} chars, {} chapters)",
                book.title,
                format_count(book.length),
                book.chapter_count
            );
        }
        out.push('\n');
    }
    out
}

pub fn render_metadata(stats: &Statistics, books: &[ArchivedBook]) -> Result<String, Error> {
    let categories: BTreeMap<&'static str, Vec<BookEntry>> = by_category(books)
        .into_iter()
        .map(|(label, list)| {
            let entries: Vec<BookEntry> = list
                .into_iter()
                .map(|book| BookEntry {
                    title: &book.title,
                    filename: &book.filename,
                    length: book.length,
                    chapters: book.chapter_count,
                    archive_path: book.archive_path.to_string_lossy().replace('\\', "/"),
                })
                .collect();
            (label, entries)
        })
        .collect();

    Ok(serde_json::to_string_pretty(&Metadata { stats, categories })?)
}

/// Regenerates every report under `output_dir`, overwriting old copies.
/// Any failure here is fatal to the run.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    fn write(&self, name: &str, contents: &str) -> Result<PathBuf, Error> {
        let path = self.output_dir.join(name);
        fs::write(&path, contents).map_err(|e| Error::write(&path, e))?;
        Ok(path)
    }

    fn write_rejections_csv(&self, rejected: &[RejectionRecord]) -> Result<PathBuf, Error> {
        let path = self.output_dir.join(REJECTIONS_CSV);
        let mut wtr = csv::Writer::from_path(&path)?;
        for record in rejected {
            wtr.serialize(RejectionRow {
                filename: &record.filename,
                reason_code: record.reason.code(),
                reason: record.reason.to_string(),
                path: record.path.to_string_lossy().into_owned(),
            })?;
        }
        wtr.flush().map_err(|e| Error::write(&path, e))?;
        Ok(path)
    }

    pub fn write_all(
        &self,
        stats: &Statistics,
        rejected: &[RejectionRecord],
        books: &[ArchivedBook],
        generated_at: &DateTime<Local>,
    ) -> Result<ReportPaths, Error> {
        fs::create_dir_all(&self.output_dir).map_err(|e| Error::write(&self.output_dir, e))?;

        Ok(ReportPaths {
            deletion_report: self.write(
                DELETION_REPORT,
                &render_deletion_report(stats, rejected, generated_at),
            )?,
            catalog: self.write(CATALOG, &render_catalog(stats, books))?,
            metadata: self.write(METADATA, &render_metadata(stats, books)?)?,
            rejections_csv: self.write_rejections_csv(rejected)?,
        })
    }
}

/// One book as stored in `metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub filename: String,
    pub length: usize,
    pub chapters: usize,
    pub archive_path: String,
}

#[derive(Deserialize)]
struct StoredMetadata {
    categories: BTreeMap<String, Vec<CatalogEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub category: String,
    pub entry: CatalogEntry,
}

/// Books in a metadata document whose title contains `query`, ignoring
/// case. A blank query matches nothing.
pub fn search_metadata(json: &str, query: &str) -> Result<Vec<SearchHit>, Error> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let stored: StoredMetadata = serde_json::from_str(json)?;
    let hits = stored
        .categories
        .into_iter()
        .flat_map(|(category, entries)| {
            entries
                .into_iter()
                .map(move |entry| SearchHit {
                    category: category.clone(),
                    entry,
                })
        })
        .filter(|hit| hit.entry.title.to_lowercase().contains(&query))
        .collect();
    Ok(hits)
}

/// Search the metadata written by the last run under `output_dir`.
pub fn search_library(output_dir: &Path, query: &str) -> Result<Vec<SearchHit>, Error> {
    let json = fs::read_to_string(output_dir.join(METADATA))?;
    search_metadata(&json, query)
}

/// Category counts in taxonomy order, zero-count categories omitted.
pub fn category_counts(books: &[ArchivedBook]) -> Vec<(Category, usize)> {
    Category::ALL
        .iter()
        .map(|&category| {
            let count = books.iter().filter(|b| b.category == category).count();
            (category, count)
        })
        .filter(|&(_, count)| count > 0)
        .collect()
}
