use crate::error::Error;
use regex::Regex;

/// Derives a display title from a filename and the opening lines of a book.
#[derive(Debug, Clone)]
pub struct TitleExtractor {
    extension: String,
    suffixes: Vec<Regex>,
    heading_lines: usize,
}

impl TitleExtractor {
    pub fn new(extension: &str, suffix_patterns: &[String], heading_lines: usize) -> Result<Self, Error> {
        let suffixes = suffix_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            extension: format!(".{}", extension.trim_start_matches('.')),
            suffixes,
            heading_lines,
        })
    }

    /// Filename without extension, with source watermarks removed.
    pub fn from_filename(&self, filename: &str) -> String {
        let mut title = filename
            .strip_suffix(self.extension.as_str())
            .unwrap_or(filename)
            .to_string();
        for suffix in &self.suffixes {
            title = suffix.replace_all(&title, "").into_owned();
        }
        title
    }

    /// First `# ` heading within the leading lines, if any.
    fn heading<'a>(&self, content: &'a str) -> Option<&'a str> {
        content
            .lines()
            .take(self.heading_lines)
            .find_map(|line| {
                line.strip_prefix("# ")
                    .map(str::trim)
                    .filter(|rest| !rest.is_empty())
            })
    }

    /// A heading wins when it is at least half as long as the filename title.
    pub fn extract(&self, filename: &str, content: &str) -> String {
        let mut title = self.from_filename(filename);

        if let Some(heading) = self.heading(content) {
            if heading.chars().count() * 2 >= title.chars().count() {
                title = heading.to_string();
            }
        }

        let title = title.trim();
        if title.is_empty() {
            return filename.to_string();
        }
        title.to_string()
    }
}
