//! Link reference definitions collected while scanning blocks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unicode_casefold::UnicodeCaseFold;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub url: String,
    pub title: Option<String>,
}

/// Label -> destination map; the first definition of a label wins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTable {
    entries: HashMap<String, Reference>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        ReferenceTable::default()
    }

    /// Record a definition. Returns false when the label was already defined.
    pub fn insert(&mut self, label: &str, reference: Reference) -> bool {
        let key = normalize_label(label);
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, reference);
        true
    }

    pub fn get(&self, label: &str) -> Option<&Reference> {
        self.entries.get(&normalize_label(label))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Normalize a label for matching (case-folded, whitespace collapsed)
pub fn normalize_label(label: &str) -> String {
    label
        .case_fold()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(url: &str) -> Reference {
        Reference {
            url: url.to_string(),
            title: None,
        }
    }

    #[test]
    fn test_first_definition_wins() {
        let mut table = ReferenceTable::new();
        assert!(table.insert("a", reference("/one")));
        assert!(!table.insert("A", reference("/two")));
        assert_eq!(table.get("a").map(|r| r.url.as_str()), Some("/one"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Foo \n  BAR "), "foo bar");
        assert_eq!(normalize_label("Straße"), "strasse");
    }
}
