// Category input parsing.
//
// The UI takes categories as one space-separated string
// ("Flowers Colors Cars Weather Food"). Order is preserved for display;
// repeated labels are dropped after their first appearance.

use std::collections::HashSet;

use serde::Serialize;

/// An ordered set of distinct category labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategorySet {
    labels: Vec<String>,
}

impl CategorySet {
    /// Split on whitespace, keeping the first occurrence of each label.
    pub fn parse(input: &str) -> Self {
        let mut seen = HashSet::new();
        let labels = input
            .split_whitespace()
            .filter(|label| seen.insert(*label))
            .map(str::to_string)
            .collect();
        Self { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
