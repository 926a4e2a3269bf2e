use crate::error::Error;
use crate::model::Category;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "BOOK_SIEVE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorRule {
    pub name: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

/// Category tables, checked in list order. Author rules always run before
/// keyword rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    pub authors: Vec<AuthorRule>,
    pub keywords: Vec<KeywordRule>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        let author = |name: &str, category| AuthorRule {
            name: name.to_string(),
            category,
        };
        let group = |category, words: &[&str]| KeywordRule {
            category,
            keywords: words.iter().map(|w| w.to_string()).collect(),
        };

        Self {
            authors: vec![
                author("阿加莎", Category::Mystery),
                author("史蒂芬·金", Category::Horror),
                author("南派三叔", Category::TombRaiding),
                author("天下霸唱", Category::TombRaiding),
                author("鬼马星", Category::Horror),
            ],
            keywords: vec![
                group(Category::WebFiction, &["女尊", "穿书", "重生", "穿越"]),
                group(Category::Mystery, &["谋杀", "探案", "侦探", "推理"]),
                group(Category::TombRaiding, &["盗墓", "鬼吹灯", "古墓"]),
                group(Category::Horror, &["恐怖", "惊悚", "鬼", "死"]),
                group(Category::HistoricalRomance, &["军师", "皇", "宫", "朝"]),
            ],
        }
    }
}

/// Run configuration. Every field has a default, so a config file only
/// needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Defaults to `<output_dir>/books`.
    pub books_dir: Option<PathBuf>,
    /// Defaults to `<output_dir>/waste`.
    pub waste_dir: Option<PathBuf>,
    pub extension: String,
    pub ignore_patterns: Vec<String>,

    pub filename_blocklist: Vec<String>,
    pub min_file_size: u64,
    pub min_content_length: usize,
    pub max_garbled_ratio: f64,
    pub min_chapters: usize,
    pub chapter_exempt_length: usize,
    pub fingerprint_prefix_chars: usize,

    pub title_suffix_patterns: Vec<String>,
    pub title_heading_lines: usize,
    pub taxonomy: Taxonomy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("./markdown"),
            output_dir: PathBuf::from("./library"),
            books_dir: None,
            waste_dir: None,
            extension: "md".to_string(),
            ignore_patterns: Vec::new(),
            filename_blocklist: ["test", "debug", "測試", "调试", "hbmb", "yq", "test_"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_file_size: 10 * 1024,
            min_content_length: 5000,
            max_garbled_ratio: 0.05,
            min_chapters: 3,
            chapter_exempt_length: 50_000,
            fingerprint_prefix_chars: 10_000,
            title_suffix_patterns: vec![
                "_TXT小说天堂$".to_string(),
                r"_.*?\.txt$".to_string(),
                r"\.txt$".to_string(),
            ],
            title_heading_lines: 10,
            taxonomy: Taxonomy::default(),
        }
    }
}

impl AppConfig {
    pub fn books_dir(&self) -> PathBuf {
        self.books_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join("books"))
    }

    pub fn waste_dir(&self) -> PathBuf {
        self.waste_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join("waste"))
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.extension.trim().is_empty() {
            return Err(invalid("extension must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.max_garbled_ratio) {
            return Err(invalid(format!(
                "max_garbled_ratio must be within 0..=1, got {}",
                self.max_garbled_ratio
            )));
        }
        if self.fingerprint_prefix_chars == 0 {
            return Err(invalid("fingerprint_prefix_chars must be greater than 0"));
        }
        for pattern in &self.title_suffix_patterns {
            Regex::new(pattern)?;
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::Config(ConfigError::Message(msg.into()))
}

/// Keys whose environment values are comma-separated lists.
const LIST_KEYS: &[&str] = &["ignore_patterns", "filename_blocklist", "title_suffix_patterns"];

/// `BOOK_SIEVE__MIN_CHAPTERS=5`, `BOOK_SIEVE__FILENAME_BLOCKLIST=draft,wip`.
/// Nested tables such as `taxonomy` are file-only.
fn environment() -> Environment {
    LIST_KEYS.iter().fold(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(","),
        |env, key| env.with_list_parse_key(key),
    )
}

/// Load configuration from `path` (or an optional `Config.toml` in the
/// working directory), then from `BOOK_SIEVE__*` environment variables.
pub fn load_configuration(path: Option<&Path>) -> Result<AppConfig, Error> {
    let builder = match path {
        Some(path) => Config::builder().add_source(ConfigFile::from(path).required(true)),
        None => Config::builder().add_source(ConfigFile::with_name("Config").required(false)),
    };

    let config = builder
        .add_source(environment())
        .build()?
        .try_deserialize::<AppConfig>()?;

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_thresholds() {
        let config = AppConfig::default();
        assert_eq!(config.min_file_size, 10240);
        assert_eq!(config.min_content_length, 5000);
        assert_eq!(config.min_chapters, 3);
        assert_eq!(config.chapter_exempt_length, 50000);
        assert_eq!(config.fingerprint_prefix_chars, 10000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_derived_output_dirs() {
        let config = AppConfig {
            output_dir: PathBuf::from("/out"),
            ..AppConfig::default()
        };
        assert_eq!(config.books_dir(), PathBuf::from("/out/books"));
        assert_eq!(config.waste_dir(), PathBuf::from("/out/waste"));

        let config = AppConfig {
            waste_dir: Some(PathBuf::from("/trash")),
            ..config
        };
        assert_eq!(config.waste_dir(), PathBuf::from("/trash"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = AppConfig {
            max_garbled_ratio: 1.5,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            title_suffix_patterns: vec!["(unclosed".to_string()],
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Pattern(_))));
    }

    #[test]
    fn test_load_configuration_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sieve.toml");
        fs::write(
            &path,
            r#"
source_dir = "/data/markdown"
min_chapters = 5
filename_blocklist = ["draft"]

[[taxonomy.authors]]
name = "金庸"
category = "historical_romance"
"#,
        )
        .unwrap();

        let config = load_configuration(Some(&path)).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("/data/markdown"));
        assert_eq!(config.min_chapters, 5);
        assert_eq!(config.filename_blocklist, vec!["draft".to_string()]);
        assert_eq!(config.min_content_length, 5000);
        assert_eq!(config.taxonomy.authors.len(), 1);
        assert_eq!(config.taxonomy.authors[0].category, Category::HistoricalRomance);
        assert_eq!(config.taxonomy.keywords.len(), 5);
    }

    #[test]
    fn test_environment_overrides_lists_and_scalars() {
        let mut vars = config::Map::new();
        vars.insert("BOOK_SIEVE__FILENAME_BLOCKLIST".to_string(), "draft,wip".to_string());
        vars.insert("BOOK_SIEVE__MIN_CHAPTERS".to_string(), "7".to_string());
        vars.insert("BOOK_SIEVE__EXTENSION".to_string(), "txt".to_string());

        let config = Config::builder()
            .add_source(environment().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>()
            .unwrap();

        assert_eq!(
            config.filename_blocklist,
            vec!["draft".to_string(), "wip".to_string()]
        );
        assert_eq!(config.min_chapters, 7);
        assert_eq!(config.extension, "txt");
        assert_eq!(config.min_content_length, 5000);
    }
}
