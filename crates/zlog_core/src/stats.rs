//! Journal statistics.
//!
//! # Invariants
//! - Tags are compared by value, matching how dreams embed tag copies.
//! - `tag_count` counts dreams; `most_frequent_tags` counts every occurrence,
//!   so a tag listed twice in one dream ranks twice.

use crate::model::sleep::Sleep;
use crate::model::tag::Tag;

pub const DEFAULT_TOP_TAGS: usize = 3;

/// Summary shown on the statistics screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalStats {
    pub total_sleeps: usize,
    pub total_dreams: usize,
    /// Most used tags with their occurrence counts, most frequent first.
    pub top_tags: Vec<(Tag, usize)>,
}

impl JournalStats {
    pub fn compute(sleeps: &[Sleep]) -> Self {
        Self {
            total_sleeps: total_sleeps(sleeps),
            total_dreams: total_dreams(sleeps),
            top_tags: most_frequent_tags(sleeps, DEFAULT_TOP_TAGS),
        }
    }
}

pub fn total_sleeps(sleeps: &[Sleep]) -> usize {
    sleeps.len()
}

pub fn total_dreams(sleeps: &[Sleep]) -> usize {
    sleeps.iter().map(|sleep| sleep.dreams.len()).sum()
}

/// Number of dreams whose tag list contains `tag`.
pub fn tag_count(sleeps: &[Sleep], tag: &Tag) -> usize {
    sleeps
        .iter()
        .flat_map(|sleep| sleep.dreams.iter())
        .filter(|dream| dream.has_tag(tag))
        .count()
}

/// Up to `limit` tags by descending occurrence count; ties keep the order in
/// which tags first appear in the journal.
pub fn most_frequent_tags(sleeps: &[Sleep], limit: usize) -> Vec<(Tag, usize)> {
    let mut counts: Vec<(&Tag, usize)> = Vec::new();
    for tag in embedded_tags(sleeps) {
        match counts.iter_mut().find(|(seen, _)| *seen == tag) {
            Some((_, count)) => *count += 1,
            None => counts.push((tag, 1)),
        }
    }

    // Stable sort keeps first-appearance order among equal counts.
    counts.sort_by(|left, right| right.1.cmp(&left.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(tag, count)| (tag.clone(), count))
        .collect()
}

fn embedded_tags(sleeps: &[Sleep]) -> impl Iterator<Item = &Tag> {
    sleeps
        .iter()
        .flat_map(|sleep| sleep.dreams.iter())
        .flat_map(|dream| dream.tags.iter())
}

#[cfg(test)]
mod tests {
    use super::{most_frequent_tags, tag_count, total_dreams, JournalStats};
    use crate::model::dream::{Dream, DreamType};
    use crate::model::samples::{caravan, elevator, fire, ocean};
    use crate::model::sleep::Sleep;
    use chrono_tz::Tz;

    fn dream_with(tags: Vec<crate::model::tag::Tag>) -> Dream {
        Dream::new("t", "d", DreamType::Normal).with_tags(tags)
    }

    fn journal() -> Vec<Sleep> {
        vec![
            Sleep::new(Tz::UTC).with_dreams(vec![
                dream_with(vec![ocean()]),
                dream_with(vec![fire(), caravan()]),
            ]),
            Sleep::new(Tz::UTC).with_dreams(vec![
                dream_with(vec![fire()]),
                dream_with(vec![elevator(), caravan()]),
            ]),
            Sleep::new(Tz::UTC),
        ]
    }

    #[test]
    fn counts_sleeps_dreams_and_tags() {
        let sleeps = journal();
        let stats = JournalStats::compute(&sleeps);
        assert_eq!(stats.total_sleeps, 3);
        assert_eq!(stats.total_dreams, 4);
        assert_eq!(total_dreams(&[]), 0);
        assert_eq!(tag_count(&sleeps, &fire()), 2);
        assert_eq!(tag_count(&sleeps, &ocean()), 1);
    }

    #[test]
    fn top_tags_break_ties_by_first_appearance() {
        let top = most_frequent_tags(&journal(), 3);
        let names: Vec<&str> = top.iter().map(|(tag, _)| tag.name.as_str()).collect();
        assert_eq!(names, vec!["fire", "caravan", "ocean"]);
        assert_eq!(top[0].1, 2);
        assert_eq!(top[2].1, 1);
    }

    #[test]
    fn tag_count_counts_each_dream_once() {
        let sleeps = vec![Sleep::new(Tz::UTC).with_dreams(vec![
            dream_with(vec![fire(), fire()]),
            dream_with(vec![ocean()]),
        ])];
        assert_eq!(tag_count(&sleeps, &fire()), 1);
        assert_eq!(most_frequent_tags(&sleeps, 1), vec![(fire(), 2)]);
    }

    #[test]
    fn edited_tag_copy_counts_separately() {
        let mut renamed = fire();
        renamed.details = "edited".to_string();
        let sleeps = vec![Sleep::new(Tz::UTC)
            .with_dreams(vec![dream_with(vec![fire()]), dream_with(vec![renamed.clone()])])];
        assert_eq!(tag_count(&sleeps, &fire()), 1);
        assert_eq!(tag_count(&sleeps, &renamed), 1);
    }
}
