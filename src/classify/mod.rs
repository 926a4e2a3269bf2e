pub mod category;
pub mod title;

use crate::config::AppConfig;
use crate::error::Error;
use crate::model::Category;

pub use category::{Categorizer, CategoryRule, Matcher};
pub use title::TitleExtractor;

/// Title and category inference for accepted documents.
#[derive(Debug, Clone)]
pub struct Classifier {
    titles: TitleExtractor,
    categories: Categorizer,
}

impl Classifier {
    pub fn new(config: &AppConfig) -> Result<Self, Error> {
        Ok(Self {
            titles: TitleExtractor::new(
                &config.extension,
                &config.title_suffix_patterns,
                config.title_heading_lines,
            )?,
            categories: Categorizer::new(&config.taxonomy),
        })
    }

    /// Category is decided from the title alone.
    pub fn classify(&self, filename: &str, content: &str) -> (String, Category) {
        let title = self.titles.extract(filename, content);
        let category = self.categories.categorize(&title);
        (title, category)
    }
}
