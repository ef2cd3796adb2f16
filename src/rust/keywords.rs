use log::debug;

use crate::Category;

/// Substrings that force a description into [`Category::Food`]
pub const FOOD_KEYWORDS: &[&str] = &[
    "food", "potato", "chips", "fries", "snack", "burger", "pizza",
    "coffee", "tea", "meal", "lunch", "dinner", "breakfast", "popcorn",
];

/// A category together with the substrings that select it
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn find_in(&self, description: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| description.contains(k.as_str()))
            .map(String::as_str)
    }
}

/// Rule-based short circuit applied before the statistical model.
///
/// Matching is plain substring containment, so "popcorn" hits inside
/// "popcorn bucket" and "tea" hits inside "steak". Callers pass text that is
/// already lowercased and trimmed.
#[derive(Debug, Clone)]
pub struct KeywordOverride {
    rules: Vec<KeywordRule>,
}

impl Default for KeywordOverride {
    fn default() -> Self {
        Self::new(vec![KeywordRule::new(Category::Food, FOOD_KEYWORDS)])
    }
}

impl KeywordOverride {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Returns the category of the first rule with a keyword inside `description`
    pub fn check(&self, description: &str) -> Option<Category> {
        self.rules.iter().find_map(|rule| {
            rule.find_in(description).map(|keyword| {
                debug!("Keyword '{}' matched, forcing {}", keyword, rule.category);
                rule.category
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_food_keyword_matches() {
        let rules = KeywordOverride::default();
        for keyword in FOOD_KEYWORDS {
            let text = format!("paid for {} downtown", keyword);
            assert_eq!(rules.check(&text), Some(Category::Food), "keyword {}", keyword);
        }
    }

    #[test]
    fn test_substring_not_token_match() {
        let rules = KeywordOverride::default();
        assert_eq!(rules.check("popcorn at the cinema"), Some(Category::Food));
        assert_eq!(rules.check("steakhouse"), Some(Category::Food));
        assert_eq!(rules.check("uber ride to airport"), None);
        assert_eq!(rules.check(""), None);
    }

    #[test]
    fn test_first_rule_wins() {
        let rules = KeywordOverride::new(vec![
            KeywordRule::new(Category::Travel, &["uber"]),
            KeywordRule::new(Category::Food, &["eats"]),
        ]);
        assert_eq!(rules.check("uber eats order"), Some(Category::Travel));
        assert_eq!(rules.check("just eats"), Some(Category::Food));
    }
}
