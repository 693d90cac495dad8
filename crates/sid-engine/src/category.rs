//! Static weighted keyword-to-category mapping
//!
//! Hand-tuned per domain and supplied at construction; never mutated at
//! runtime. Lookup tries an exact keyword match first, then partial
//! containment, then single-word overlap, keeping the highest-weight match
//! found anywhere in the table.

use std::collections::HashMap;

use sid_core::CategoryProfile;

/// One category's keyword table
#[derive(Debug, Clone)]
struct CategoryEntry {
    id: String,
    display_name: String,
    /// keyword -> weight in [0, 1]
    keywords: HashMap<String, f64>,
}

/// How a candidate name matched the table
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMatch {
    /// Category id, e.g. "characters"
    pub category_id: String,
    /// Display name, e.g. "Characters"
    pub category_name: String,
    /// Weight of the matched keyword
    pub weight: f64,
    /// Whether the name matched a keyword exactly
    pub exact: bool,
}

/// Read-only category table
#[derive(Debug, Clone)]
pub struct CategoryTable {
    entries: Vec<CategoryEntry>,
}

impl CategoryTable {
    /// Build the table for a configured profile
    pub fn for_profile(profile: CategoryProfile) -> Self {
        match profile {
            CategoryProfile::Story => Self::story(),
            CategoryProfile::Business => Self::business(),
        }
    }

    /// Children's story profile: characters, places, themes, objects, culture
    pub fn story() -> Self {
        Self {
            entries: vec![
                entry(
                    "characters",
                    "Characters",
                    &[
                        ("princess", 1.0),
                        ("prince", 1.0),
                        ("dragon", 1.0),
                        ("knight", 0.9),
                        ("wizard", 0.9),
                        ("witch", 0.9),
                        ("king", 0.9),
                        ("queen", 0.9),
                        ("fairy", 0.9),
                        ("giant", 0.8),
                        ("hero", 0.8),
                        ("monster", 0.8),
                        ("animal", 0.6),
                        ("wolf", 0.7),
                        ("bear", 0.7),
                        ("rabbit", 0.7),
                    ],
                ),
                entry(
                    "places",
                    "Places",
                    &[
                        ("castle", 1.0),
                        ("forest", 0.9),
                        ("village", 0.8),
                        ("mountain", 0.8),
                        ("kingdom", 0.9),
                        ("cave", 0.8),
                        ("river", 0.7),
                        ("island", 0.8),
                        ("garden", 0.7),
                        ("school", 0.7),
                        ("home", 0.5),
                    ],
                ),
                entry(
                    "themes",
                    "Themes",
                    &[
                        ("courage", 1.0),
                        ("bravery", 1.0),
                        ("friendship", 1.0),
                        ("kindness", 0.9),
                        ("adventure", 0.9),
                        ("magic", 0.9),
                        ("love", 0.8),
                        ("family", 0.8),
                        ("honesty", 0.9),
                        ("sharing", 0.8),
                        ("teamwork", 0.8),
                        ("learning", 0.7),
                    ],
                ),
                entry(
                    "objects",
                    "Objects",
                    &[
                        ("sword", 0.9),
                        ("crown", 0.9),
                        ("treasure", 0.9),
                        ("map", 0.7),
                        ("book", 0.7),
                        ("wand", 0.9),
                        ("boat", 0.7),
                        ("key", 0.7),
                        ("lantern", 0.7),
                    ],
                ),
                entry(
                    "culture",
                    "Culture",
                    &[
                        ("festival", 0.9),
                        ("dance", 0.8),
                        ("music", 0.8),
                        ("song", 0.8),
                        ("feast", 0.8),
                        ("tradition", 0.9),
                        ("story", 0.6),
                    ],
                ),
            ],
        }
    }

    /// Technology / finance / business profile
    pub fn business() -> Self {
        Self {
            entries: vec![
                entry(
                    "technology",
                    "Technology",
                    &[
                        ("software", 1.0),
                        ("computer", 0.9),
                        ("internet", 0.9),
                        ("data", 0.8),
                        ("platform", 0.8),
                        ("digital", 0.8),
                        ("cloud", 0.8),
                    ],
                ),
                entry(
                    "finance",
                    "Finance",
                    &[
                        ("investment", 1.0),
                        ("market", 0.9),
                        ("stock", 0.9),
                        ("revenue", 0.9),
                        ("budget", 0.8),
                        ("money", 0.7),
                        ("profit", 0.9),
                    ],
                ),
                entry(
                    "business",
                    "Business",
                    &[
                        ("company", 0.9),
                        ("startup", 1.0),
                        ("customer", 0.9),
                        ("product", 0.8),
                        ("strategy", 0.9),
                        ("growth", 0.8),
                        ("management", 0.8),
                    ],
                ),
            ],
        }
    }

    /// Find the best category match for a normalized candidate name.
    ///
    /// Exact keyword matches win outright; otherwise partial containment
    /// and single-word overlap are considered across every category and
    /// the highest weight is kept.
    pub fn lookup(&self, normalized_name: &str) -> Option<CategoryMatch> {
        // Exact match first
        for category in &self.entries {
            if let Some(&weight) = category.keywords.get(normalized_name) {
                return Some(CategoryMatch {
                    category_id: category.id.clone(),
                    category_name: category.display_name.clone(),
                    weight,
                    exact: true,
                });
            }
        }

        // Fallback: containment or word overlap, best weight anywhere
        let name_words: Vec<&str> = normalized_name.split_whitespace().collect();
        let mut best: Option<CategoryMatch> = None;

        for category in &self.entries {
            for (keyword, &weight) in &category.keywords {
                let contained =
                    normalized_name.contains(keyword.as_str()) || keyword.contains(normalized_name);
                let word_overlap = name_words.iter().any(|w| w == keyword);

                if (contained || word_overlap)
                    && best.as_ref().map(|b| weight > b.weight).unwrap_or(true)
                {
                    best = Some(CategoryMatch {
                        category_id: category.id.clone(),
                        category_name: category.display_name.clone(),
                        weight,
                        exact: false,
                    });
                }
            }
        }

        best
    }
}

fn entry(id: &str, display_name: &str, keywords: &[(&str, f64)]) -> CategoryEntry {
    CategoryEntry {
        id: id.to_string(),
        display_name: display_name.to_string(),
        keywords: keywords
            .iter()
            .map(|(k, w)| (k.to_string(), *w))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let table = CategoryTable::story();
        let m = table.lookup("princess").unwrap();
        assert_eq!(m.category_id, "characters");
        assert_eq!(m.weight, 1.0);
        assert!(m.exact);
    }

    #[test]
    fn test_themes_exact() {
        let table = CategoryTable::story();
        let m = table.lookup("courage").unwrap();
        assert_eq!(m.category_id, "themes");
        assert_eq!(m.weight, 1.0);
        assert!(m.exact);
    }

    #[test]
    fn test_word_overlap_match() {
        let table = CategoryTable::story();
        let m = table.lookup("brave princess").unwrap();
        assert_eq!(m.category_id, "characters");
        assert!(!m.exact);
        assert_eq!(m.weight, 1.0);
    }

    #[test]
    fn test_containment_match() {
        let table = CategoryTable::story();
        // "castles" contains keyword "castle"
        let m = table.lookup("castles").unwrap();
        assert_eq!(m.category_id, "places");
        assert!(!m.exact);
    }

    #[test]
    fn test_no_match() {
        let table = CategoryTable::story();
        assert!(table.lookup("quarterly memorandum").is_none());
    }

    #[test]
    fn test_business_profile() {
        let table = CategoryTable::for_profile(sid_core::CategoryProfile::Business);
        let m = table.lookup("startup").unwrap();
        assert_eq!(m.category_id, "business");
        assert!(table.lookup("princess").is_none());
    }
}
