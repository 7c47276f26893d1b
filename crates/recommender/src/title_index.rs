//! Exact title lookup over the loaded catalog.

use data_loader::MovieRecord;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

/// Maps each title to the catalog position of its first occurrence.
///
/// Lookups are exact and case-sensitive. Later records with a title that
/// was already seen are still in the catalog (and can appear as
/// neighbours), but can't be queried by title.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    positions: HashMap<String, usize>,
    shadowed: usize,
}

impl TitleIndex {
    pub fn build(records: &[MovieRecord]) -> Self {
        let mut positions = HashMap::with_capacity(records.len());
        let mut shadowed = 0;

        for (position, record) in records.iter().enumerate() {
            match positions.entry(record.title.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(position);
                }
                Entry::Occupied(first) => {
                    debug!(
                        "Duplicate title '{}' at {} (keeping {})",
                        record.title,
                        position,
                        first.get()
                    );
                    shadowed += 1;
                }
            }
        }

        Self {
            positions,
            shadowed,
        }
    }

    pub fn get(&self, title: &str) -> Option<usize> {
        self.positions.get(title).copied()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.positions.contains_key(title)
    }

    /// Number of distinct titles
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Records unreachable by title because an earlier record has the same one
    pub fn shadowed(&self) -> usize {
        self.shadowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(title: &str) -> MovieRecord {
        MovieRecord {
            id: None,
            title: title.to_string(),
            tags: "tag".to_string(),
        }
    }

    #[test]
    fn test_lookup_is_exact() {
        let index = TitleIndex::build(&[record("Avatar"), record("Alien")]);
        assert_eq!(index.get("Alien"), Some(1));
        assert_eq!(index.get("alien"), None);
        assert_eq!(index.get("Alien "), None);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let index = TitleIndex::build(&[record("Heat"), record("Up"), record("Heat")]);
        assert_eq!(index.get("Heat"), Some(0));
        assert_eq!(index.len(), 2);
        assert_eq!(index.shadowed(), 1);
    }

    proptest! {
        #[test]
        fn first_occurrence_wins_prop(titles in proptest::collection::vec("[a-c]{1,2}", 1..40)) {
            let records: Vec<MovieRecord> = titles.iter().map(|t| record(t)).collect();
            let index = TitleIndex::build(&records);

            for title in &titles {
                let first = titles.iter().position(|t| t == title).unwrap();
                prop_assert_eq!(index.get(title), Some(first));
            }
            prop_assert_eq!(index.len() + index.shadowed(), titles.len());
        }
    }
}
