use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tags used to select which dependency artifacts contribute model sources.
///
/// An empty filter selects every artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagFilter {
    tags: BTreeSet<String>,
}

impl TagFilter {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// True when the filter is empty or shares at least one tag with `tags`
    pub fn matches(&self, tags: &BTreeSet<String>) -> bool {
        self.tags.is_empty() || !self.tags.is_disjoint(tags)
    }
}

impl<S: Into<String>> FromIterator<S> for TagFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = TagFilter::default();
        assert!(filter.matches(&tags(&[])));
        assert!(filter.matches(&tags(&["a"])));
    }

    #[test]
    fn test_filter_requires_intersection() {
        let filter: TagFilter = ["a", "b"].into_iter().collect();
        assert!(filter.matches(&tags(&["b", "c"])));
        assert!(!filter.matches(&tags(&["c"])));
        assert!(!filter.matches(&tags(&[])));
    }
}
