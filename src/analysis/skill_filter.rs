use crate::models::{Entity, SkillSet};

/// Keeps entities whose label is on the allow-list and normalizes their text.
#[derive(Debug, Clone)]
pub struct SkillFilter {
    allowed_labels: Vec<String>,
}

impl SkillFilter {
    pub fn new<I, S>(allowed_labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_labels: allowed_labels
                .into_iter()
                .map(|label| label.as_ref().trim().to_lowercase())
                .filter(|label| !label.is_empty())
                .collect(),
        }
    }

    /// A label matches when it equals, or contains, one of the allowed tags.
    /// Comparison ignores case, so `B-MISC` and `misc` both match `MISC`.
    pub fn is_allowed(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.allowed_labels
            .iter()
            .any(|tag| label == *tag || label.contains(tag.as_str()))
    }

    pub fn filter(&self, entities: &[Entity]) -> SkillSet {
        entities
            .iter()
            .filter(|entity| self.is_allowed(&entity.label))
            .map(|entity| normalize_skill(&entity.text))
            .filter(|skill| !skill.is_empty())
            .collect()
    }
}

/// Strips word-piece markers and edge punctuation from an entity's text.
///
/// Stripping and trimming repeat until nothing changes, so `-##Spark` ends up
/// as `Spark` in one call.
pub fn normalize_skill(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = current
            .replace(" ##", "")
            .trim_start_matches("##")
            .trim_start_matches(is_leading_noise)
            .trim_end_matches(is_trailing_noise)
            .to_string();

        if next == current {
            return current;
        }
        current = next;
    }
}

// `+` and `#` survive at the end (C++, C#), `.` at the start (.NET).
fn is_leading_noise(c: char) -> bool {
    c.is_whitespace() || (is_edge_punctuation(c) && c != '.' && c != '#')
}

fn is_trailing_noise(c: char) -> bool {
    c.is_whitespace() || (is_edge_punctuation(c) && c != '+' && c != '#')
}

fn is_edge_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '•' | '·' | '–' | '—' | '“' | '”' | '‘' | '’' | '…')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(set: &SkillSet) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_keeps_only_allowed_labels() {
        let filter = SkillFilter::new(["MISC"]);
        let entities = vec![
            Entity::new("MISC", "Python"),
            Entity::new("MISC", "SQL"),
            Entity::new("ORG", "Acme"),
        ];
        assert_eq!(skills(&filter.filter(&entities)), vec!["Python", "SQL"]);
    }

    #[test]
    fn test_excluded_label_gives_empty_set() {
        let filter = SkillFilter::new(["MISC"]);
        assert!(filter.filter(&[Entity::new("ORG", "Acme")]).is_empty());
    }

    #[test]
    fn test_label_match_ignores_case_and_allows_substring() {
        let filter = SkillFilter::new(["skill", "Qualification"]);
        assert!(filter.is_allowed("SKILL"));
        assert!(filter.is_allowed("B-SKILL"));
        assert!(filter.is_allowed("qualifications"));
        assert!(!filter.is_allowed("PER"));
    }

    #[test]
    fn test_normalizes_and_dedupes() {
        let filter = SkillFilter::new(["MISC"]);
        let entities = vec![
            Entity::new("MISC", "  Kubernetes, "),
            Entity::new("MISC", "Kubernetes"),
            Entity::new("MISC", "(Terraform)"),
            Entity::new("MISC", " ... "),
            Entity::new("MISC", "C++."),
            Entity::new("MISC", ".NET"),
            Entity::new("MISC", "Py ##Spark"),
            Entity::new("MISC", "##ML"),
        ];
        assert_eq!(
            skills(&filter.filter(&entities)),
            vec![".NET", "C++", "Kubernetes", "ML", "PySpark", "Terraform"]
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let filter = SkillFilter::new(["MISC", "ORG"]);
        let entities = vec![
            Entity::new("MISC", " AWS; "),
            Entity::new("ORG", "“Snowflake”"),
            Entity::new("MISC", "C#"),
            Entity::new("PER", "Jane"),
        ];

        let once = filter.filter(&entities);
        let again: Vec<Entity> = once.iter().map(|s| Entity::new("MISC", s.as_str())).collect();
        assert_eq!(filter.filter(&again), once);
        assert_eq!(skills(&once), vec!["AWS", "C#", "Snowflake"]);
    }

    #[test]
    fn test_word_piece_markers_behind_punctuation() {
        assert_eq!(normalize_skill("-##Spark"), "Spark");
        assert_eq!(normalize_skill("(##ML"), "ML");
        assert_eq!(normalize_skill("##-##Go"), "Go");

        let filter = SkillFilter::new(["MISC"]);
        let entities = vec![
            Entity::new("MISC", "-##Spark"),
            Entity::new("MISC", "(##ML"),
            Entity::new("MISC", "Py ##Torch;"),
        ];
        let once = filter.filter(&entities);
        let again: Vec<Entity> = once.iter().map(|s| Entity::new("MISC", s.as_str())).collect();
        assert_eq!(filter.filter(&again), once);
        assert_eq!(skills(&once), vec!["ML", "PyTorch", "Spark"]);
    }

    #[test]
    fn test_empty_allow_list_keeps_nothing() {
        let filter = SkillFilter::new(Vec::<String>::new());
        assert!(filter.filter(&[Entity::new("MISC", "Rust")]).is_empty());
    }
}
