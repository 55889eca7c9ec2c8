//! Typeahead suggestions for the free-text location inputs.

use crate::config::{SUGGESTION_LIMIT, SUGGESTION_MIN_CHARS};

const LOCATIONS: &[&str] = &[
    "Addis Ababa",
    "Dire Dawa",
    "Mekelle",
    "Bahir Dar",
    "Hawassa",
    "Adama",
    "Jimma",
];

const SKILLS: &[&str] = &[
    "Cooking",
    "Cleaning",
    "Childcare",
    "Elderly Care",
    "Gardening",
    "Driving",
    "Laundry",
    "Ironing",
];

const LANGUAGES: &[&str] = &[
    "Amharic", "Oromo", "Tigrinya", "Afar", "Somali", "Gedeo", "English",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Location,
    Skill,
    Language,
}

impl SuggestionKind {
    pub fn css_class(self) -> &'static str {
        match self {
            SuggestionKind::Location => "suggestion-location",
            SuggestionKind::Skill => "suggestion-skill",
            SuggestionKind::Language => "suggestion-language",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: &'static str,
    pub kind: SuggestionKind,
}

/// Catalog entries containing `query` (case-insensitive), locations first.
pub fn suggest(query: &str) -> Vec<Suggestion> {
    let needle = query.trim().to_lowercase();
    if needle.chars().count() < SUGGESTION_MIN_CHARS {
        return Vec::new();
    }

    let needle = needle.as_str();
    let catalogs = [
        (LOCATIONS, SuggestionKind::Location),
        (SKILLS, SuggestionKind::Skill),
        (LANGUAGES, SuggestionKind::Language),
    ];
    catalogs
        .iter()
        .flat_map(|(entries, kind)| {
            entries
                .iter()
                .filter(move |e| e.to_lowercase().contains(needle))
                .map(move |e| Suggestion {
                    text: *e,
                    kind: *kind,
                })
        })
        .take(SUGGESTION_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.text).collect()
    }

    #[test]
    fn short_queries_get_nothing() {
        assert!(suggest("").is_empty());
        assert!(suggest(" a ").is_empty());
    }

    #[test]
    fn matches_across_catalogs() {
        let found = suggest("ad");
        assert_eq!(texts(&found), vec!["Addis Ababa", "Adama"]);
        assert!(found.iter().all(|s| s.kind == SuggestionKind::Location));

        let found = suggest("MA");
        assert_eq!(texts(&found), vec!["Adama", "Jimma", "Somali"]);
        assert_eq!(found[2].kind, SuggestionKind::Language);

        let found = suggest("ar");
        assert_eq!(
            texts(&found),
            vec!["Bahir Dar", "Childcare", "Elderly Care", "Gardening", "Amharic"]
        );
        assert_eq!(found[1].kind, SuggestionKind::Skill);
    }

    #[test]
    fn capped_at_five() {
        assert_eq!(suggest("in").len(), 5);
    }
}
