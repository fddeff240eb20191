use std::collections::BTreeSet;
use std::path::Path;

use crate::api::UserId;

use super::StoreError;

/// A set of account ids, iterated in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipSet {
    ids: BTreeSet<UserId>,
}

impl RelationshipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse newline-delimited ids. Blank lines are skipped and repeated
    /// ids collapse into one entry.
    pub fn parse(contents: &str, source: &Path) -> Result<Self, StoreError> {
        let mut ids = BTreeSet::new();
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let id = line.parse::<UserId>().map_err(|_| StoreError::Malformed {
                path: source.to_path_buf(),
                line: index + 1,
                value: line.chars().take(40).collect(),
            })?;
            ids.insert(id);
        }
        Ok(Self { ids })
    }

    /// One id per line, trailing newline included when non-empty.
    pub fn to_lines(&self) -> String {
        let mut out = String::with_capacity(self.ids.len() * 12);
        for id in &self.ids {
            out.push_str(&id.to_string());
            out.push('\n');
        }
        out
    }

    /// Returns `true` if the id was not present.
    pub fn insert(&mut self, id: UserId) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserId> {
        self.ids.iter()
    }

    pub(crate) fn as_btree(&self) -> &BTreeSet<UserId> {
        &self.ids
    }
}

impl FromIterator<UserId> for RelationshipSet {
    fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl Extend<UserId> for RelationshipSet {
    fn extend<I: IntoIterator<Item = UserId>>(&mut self, iter: I) {
        self.ids.extend(iter);
    }
}

impl<'a> IntoIterator for &'a RelationshipSet {
    type Item = &'a UserId;
    type IntoIter = std::collections::btree_set::Iter<'a, UserId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dedupes_and_skips_blank_lines() {
        let set = RelationshipSet::parse("3\n1\n\n3\n  2 \n", Path::new("x.txt")).unwrap();
        assert_eq!(set.len(), 3);
        let ids: Vec<u64> = set.iter().map(|id| id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_empty() {
        let set = RelationshipSet::parse("", Path::new("x.txt")).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.to_lines(), "");
    }

    #[test]
    fn test_parse_reports_malformed_line() {
        let err = RelationshipSet::parse("1\n2\n@someone\n", Path::new("followers.txt"))
            .unwrap_err();
        match err {
            StoreError::Malformed { path, line, value } => {
                assert_eq!(path, Path::new("followers.txt"));
                assert_eq!(line, 3);
                assert_eq!(value, "@someone");
            }
            other => panic!("Expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_to_lines_is_sorted() {
        let set: RelationshipSet = [UserId(20), UserId(5), UserId(20)].into_iter().collect();
        assert_eq!(set.to_lines(), "5\n20\n");
    }
}
