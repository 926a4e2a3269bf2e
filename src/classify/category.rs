use crate::config::Taxonomy;
use crate::model::Category;

#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    /// Case-sensitive substring of the title.
    Author(String),
    /// Any keyword as a substring of the lower-cased title.
    Keywords(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRule {
    pub matcher: Matcher,
    pub category: Category,
}

impl CategoryRule {
    pub fn matches(&self, title: &str, title_lower: &str) -> bool {
        match &self.matcher {
            Matcher::Author(name) => title.contains(name.as_str()),
            Matcher::Keywords(words) => words.iter().any(|w| title_lower.contains(w.as_str())),
        }
    }
}

/// Prioritized rule list. First match wins; `Category::Other` otherwise.
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
}

impl Categorizer {
    pub fn new(taxonomy: &Taxonomy) -> Self {
        let authors = taxonomy
            .authors
            .iter()
            .filter(|a| !a.name.is_empty())
            .map(|a| CategoryRule {
                matcher: Matcher::Author(a.name.clone()),
                category: a.category,
            });

        let keywords = taxonomy.keywords.iter().map(|group| CategoryRule {
            matcher: Matcher::Keywords(
                group
                    .keywords
                    .iter()
                    .filter(|w| !w.is_empty())
                    .map(|w| w.to_lowercase())
                    .collect(),
            ),
            category: group.category,
        });

        Self {
            rules: authors.chain(keywords).collect(),
        }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn categorize(&self, title: &str) -> Category {
        let title_lower = title.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(title, &title_lower))
            .map(|rule| rule.category)
            .unwrap_or(Category::Other)
    }
}
