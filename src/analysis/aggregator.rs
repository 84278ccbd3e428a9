use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{DocumentResult, ExperienceSkillIndex, SkillSet};

/// Running year -> skills mapping built across the corpus.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    buckets: HashMap<u32, SkillSet>,
    documents: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `skills` into the bucket for `years`, creating it if needed.
    pub fn union_or_insert(&mut self, years: u32, skills: &SkillSet) {
        let bucket = self.buckets.entry(years).or_default();
        bucket.extend(skills.iter().cloned());
    }

    /// Every detected year receives the document's full skill set.
    pub fn add_document(&mut self, years: &BTreeSet<u32>, skills: &SkillSet) {
        for year in years {
            self.union_or_insert(*year, skills);
        }
        self.documents += 1;
    }

    pub fn merge(&mut self, other: Aggregator) {
        for (years, skills) in other.buckets {
            self.buckets.entry(years).or_default().extend(skills);
        }
        self.documents += other.documents;
    }

    pub fn documents_seen(&self) -> usize {
        self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn freeze(self) -> ExperienceSkillIndex {
        let entries: BTreeMap<u32, Vec<String>> = self
            .buckets
            .into_iter()
            .map(|(years, skills)| (years, skills.into_iter().collect()))
            .collect();
        ExperienceSkillIndex::from_entries(entries)
    }
}

/// A one-document partial, ready to be merged into the run's aggregator.
impl From<&DocumentResult> for Aggregator {
    fn from(result: &DocumentResult) -> Self {
        let mut partial = Aggregator::new();
        partial.add_document(&result.years, &result.skills);
        partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> SkillSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn years(items: &[u32]) -> BTreeSet<u32> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_union_across_documents() {
        let mut aggregator = Aggregator::new();
        aggregator.add_document(&years(&[5]), &set(&["Go"]));
        aggregator.add_document(&years(&[5]), &set(&["Rust", "Go"]));

        let index = aggregator.freeze();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(5), Some(&["Go".to_string(), "Rust".to_string()][..]));
    }

    #[test]
    fn test_empty_skill_set_still_creates_bucket() {
        let mut aggregator = Aggregator::new();
        aggregator.add_document(&years(&[0]), &SkillSet::new());

        let index = aggregator.freeze();
        assert_eq!(index.get(0), Some(&[][..]));
    }

    #[test]
    fn test_every_year_gets_full_skill_set() {
        let mut aggregator = Aggregator::new();
        aggregator.add_document(&years(&[3, 5]), &set(&["SQL", "Airflow"]));

        let index = aggregator.freeze();
        assert_eq!(index.years().collect::<Vec<_>>(), vec![3, 5]);
        assert_eq!(index.get(3), index.get(5));
    }

    #[test]
    fn test_union_is_idempotent() {
        let mut once = Aggregator::new();
        once.union_or_insert(2, &set(&["Java", "Spring"]));

        let mut twice = Aggregator::new();
        twice.union_or_insert(2, &set(&["Java", "Spring"]));
        twice.union_or_insert(2, &set(&["Java", "Spring"]));

        assert_eq!(once.freeze(), twice.freeze());
    }

    #[test]
    fn test_order_independent() {
        let docs = vec![
            (years(&[1]), set(&["Excel"])),
            (years(&[3, 7]), set(&["Python", "SQL"])),
            (years(&[3]), set(&["dbt"])),
            (years(&[0]), set(&[])),
        ];

        let mut forward = Aggregator::new();
        for (y, s) in &docs {
            forward.add_document(y, s);
        }

        let mut backward = Aggregator::new();
        for (y, s) in docs.iter().rev() {
            backward.add_document(y, s);
        }

        assert_eq!(forward.documents_seen(), 4);
        assert_eq!(forward.freeze(), backward.freeze());
    }

    #[test]
    fn test_merge_matches_sequential_adds() {
        let mut left = Aggregator::new();
        left.add_document(&years(&[2]), &set(&["Go"]));
        let mut right = Aggregator::new();
        right.add_document(&years(&[2, 4]), &set(&["Kafka"]));

        let mut sequential = Aggregator::new();
        sequential.add_document(&years(&[2]), &set(&["Go"]));
        sequential.add_document(&years(&[2, 4]), &set(&["Kafka"]));

        left.merge(right);
        assert_eq!(left.documents_seen(), 2);
        assert_eq!(left.freeze(), sequential.freeze());
    }

    #[test]
    fn test_document_partials_merge_into_running_index() {
        let first = DocumentResult {
            id: "a".to_string(),
            years: years(&[3]),
            skills: set(&["SQL"]),
            ..Default::default()
        };
        let second = DocumentResult {
            id: "b".to_string(),
            years: years(&[3, 6]),
            skills: set(&["Python"]),
            ..Default::default()
        };

        let mut running = Aggregator::new();
        running.merge(Aggregator::from(&first));
        running.merge(Aggregator::from(&second));

        assert_eq!(running.documents_seen(), 2);
        let index = running.freeze();
        assert_eq!(index.get(3), Some(&["Python".to_string(), "SQL".to_string()][..]));
        assert_eq!(index.get(6), Some(&["Python".to_string()][..]));
    }

    #[test]
    fn test_freeze_sorts_keys_and_skills() {
        let mut aggregator = Aggregator::new();
        aggregator.add_document(&years(&[10]), &set(&["b", "a"]));
        aggregator.add_document(&years(&[2]), &set(&["z"]));

        let index = aggregator.freeze();
        let records = index.records();
        assert_eq!(records[0].years_of_experience, 2);
        assert_eq!(records[1].skills, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_corpus_freezes_to_empty_index() {
        let aggregator = Aggregator::new();
        assert!(aggregator.is_empty());
        assert!(aggregator.freeze().is_empty());
    }
}
