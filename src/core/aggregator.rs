//! Candidate aggregation: normalize and deduplicate raw mention spans.

use tracing::debug;

use crate::domain::{CandidateSet, Mention};

use super::quota::Quota;

/// Fold mentions into an ordered candidate set, keyed by the lower-cased
/// surface text.
///
/// The quota bounds the total mention count across all groups; once it is
/// spent, remaining mentions are dropped and the partial set is returned.
/// The cap bounds pipeline cost on very large documents and on extraction
/// backends paid per call.
pub fn aggregate(mentions: impl IntoIterator<Item = Mention>, quota: &mut Quota) -> CandidateSet {
    let mut set = CandidateSet::new();
    aggregate_into(&mut set, mentions, quota);
    set
}

/// Fold mentions into an existing set, spending the shared quota.
///
/// The pipeline calls this once per extracted window so the cap applies
/// across the whole document, not per chunk.
pub fn aggregate_into(
    set: &mut CandidateSet,
    mentions: impl IntoIterator<Item = Mention>,
    quota: &mut Quota,
) {
    for mention in mentions {
        if !quota.try_acquire() {
            debug!(cap = quota.cap(), "mention cap reached, dropping remaining mentions");
            break;
        }
        set.push(mention);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(text: &str, start: usize) -> Mention {
        Mention::new(text, format!("near {text} today"), start, start + text.len(), 0, None)
    }

    #[test]
    fn test_groups_share_normalized_key() {
        let mut quota = Quota::new(100);
        let set = aggregate(
            vec![mention("Madrid", 0), mention("madrid", 50), mention("Toledo", 90)],
            &mut quota,
        );

        assert_eq!(set.len(), 2);
        // Every key is the lower-cased form of at least one mention's text
        for group in set.iter() {
            assert!(group.mentions.iter().any(|m| m.text.to_lowercase() == group.key));
        }
    }

    #[test]
    fn test_each_mention_lands_in_exactly_one_group() {
        let mut quota = Quota::new(100);
        let input = vec![mention("Ávila", 0), mention("ávila", 30), mention("Cádiz", 60)];
        let set = aggregate(input.clone(), &mut quota);
        assert_eq!(set.mention_count(), input.len());
    }

    #[test]
    fn test_cap_truncates_and_keeps_partial_group() {
        let mut quota = Quota::new(2);
        let set = aggregate(
            vec![
                mention("Lima", 0),
                mention("Lima", 40),
                mention("Lima", 80),
                mention("Bogotá", 120),
            ],
            &mut quota,
        );

        assert_eq!(set.mention_count(), 2);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("lima").unwrap().mentions.len(), 2);
        assert!(quota.is_exhausted());
    }

    #[test]
    fn test_empty_input_yields_empty_set() {
        let mut quota = Quota::new(10);
        let set = aggregate(Vec::new(), &mut quota);
        assert!(set.is_empty());
        assert_eq!(quota.used(), 0);
    }
}
