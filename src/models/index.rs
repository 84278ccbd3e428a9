use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Frozen mapping from years of experience to the skills seen at that level.
///
/// Keys iterate in ascending order and every skill list is sorted and
/// free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceSkillIndex {
    entries: BTreeMap<u32, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub years_of_experience: u32,
    pub skills: Vec<String>,
}

impl ExperienceSkillIndex {
    pub(crate) fn from_entries(entries: BTreeMap<u32, Vec<String>>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, years: u32) -> Option<&[String]> {
        self.entries.get(&years).map(Vec::as_slice)
    }

    pub fn years(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[String])> {
        self.entries.iter().map(|(years, skills)| (*years, skills.as_slice()))
    }

    pub fn records(&self) -> Vec<IndexRecord> {
        self.entries
            .iter()
            .map(|(years, skills)| IndexRecord {
                years_of_experience: *years,
                skills: skills.clone(),
            })
            .collect()
    }
}

impl FromIterator<IndexRecord> for ExperienceSkillIndex {
    fn from_iter<I: IntoIterator<Item = IndexRecord>>(iter: I) -> Self {
        let mut entries: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for record in iter {
            let skills = entries.entry(record.years_of_experience).or_default();
            skills.extend(record.skills);
            skills.sort();
            skills.dedup();
        }
        Self { entries }
    }
}
