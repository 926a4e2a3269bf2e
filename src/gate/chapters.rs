use regex::Regex;

lazy_static::lazy_static! {
    /// Alternative heading detectors. Each one is a full estimate on its own.
    static ref CHAPTER_PATTERNS: Vec<Regex> = [
        r"##\s+第.{1,5}章",
        r"第.{1,5}章",
        r"Chapter\s+\d+",
        r"##\s+\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid built-in chapter pattern"))
    .collect();
}

/// Number of chapter markers in `content`: the largest match count of any
/// single pattern. Counts are never summed across patterns.
pub fn count_chapters(content: &str) -> usize {
    CHAPTER_PATTERNS
        .iter()
        .map(|pattern| pattern.find_iter(content).count())
        .max()
        .unwrap_or(0)
}
