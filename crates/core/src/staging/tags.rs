use serde::Serialize;
use std::collections::BTreeSet;

/// Tags a packaged projection is published with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArtifactTags(BTreeSet<String>);

impl ArtifactTags {
    /// User tags plus `group`, `group:name` and `group:name:version` when a group is set
    pub fn for_project<I, S>(group: Option<&str>, name: &str, version: Option<&str>, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tags: BTreeSet<String> = extra.into_iter().map(Into::into).collect();
        if let Some(group) = group.filter(|g| !g.is_empty()) {
            tags.insert(group.to_string());
            tags.insert(format!("{group}:{name}"));
            tags.insert(format!("{group}:{name}:{}", version.unwrap_or("unspecified")));
        }
        Self(tags)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_set(&self) -> &BTreeSet<String> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tags_follow_group() {
        let tags = ArtifactTags::for_project(Some("com.example"), "widgets", Some("1.2.0"), ["extra"]);
        assert_eq!(
            tags.as_set().iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["com.example", "com.example:widgets", "com.example:widgets:1.2.0", "extra"]
        );
    }

    #[test]
    fn test_no_group_keeps_only_user_tags() {
        let tags = ArtifactTags::for_project(None, "widgets", None, Vec::<String>::new());
        assert!(tags.is_empty());
    }
}
