//! Candidate groups: deduplicated mentions keyed by normalized surface text.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::mention::Mention;

/// A grouping key with its supporting mentions.
///
/// The first mention's literal text is the group's display name until the
/// group is resolved against a geocoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateGroup {
    /// Lower-cased surface text shared by every mention in the group
    pub key: String,

    /// Mentions in extraction/appearance order, never empty
    pub mentions: Vec<Mention>,
}

impl CandidateGroup {
    /// The literal text of the first-seen mention.
    pub fn display_name(&self) -> &str {
        &self.mentions[0].text
    }
}

/// Ordered mapping of key -> candidate group.
///
/// Key insertion order reflects first-seen order in the document. A given
/// key appears in exactly one group.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    groups: Vec<CandidateGroup>,
    index: HashMap<String, usize>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mention to the group owning its key, creating the group if the
    /// key is new.
    pub fn push(&mut self, mention: Mention) {
        let key = mention.key();
        match self.index.get(&key) {
            Some(&idx) => self.groups[idx].mentions.push(mention),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push(CandidateGroup {
                    key,
                    mentions: vec![mention],
                });
            }
        }
    }

    /// Groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &CandidateGroup> {
        self.groups.iter()
    }

    pub fn get(&self, key: &str) -> Option<&CandidateGroup> {
        self.index.get(key).map(|&idx| &self.groups[idx])
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total mentions across all groups.
    pub fn mention_count(&self) -> usize {
        self.groups.iter().map(|g| g.mentions.len()).sum()
    }
}

impl IntoIterator for CandidateSet {
    type Item = CandidateGroup;
    type IntoIter = std::vec::IntoIter<CandidateGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}
