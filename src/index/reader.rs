//! Index querying utilities.

use std::collections::HashSet;

use super::AttachmentIndex;
use crate::model::document::Document;
use crate::model::recipient::RecipientTable;

/// Documents whose key equals `key` (trimmed), in extraction order.
///
/// Matching is exact and case-sensitive. Returns an empty slice when
/// nothing matches.
pub fn lookup<'a>(index: &'a AttachmentIndex, key: &str) -> &'a [Document] {
    index
        .by_key
        .get(key.trim())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Keys present in the index that no recipient row asks for, sorted.
pub fn unclaimed_keys<'a>(index: &'a AttachmentIndex, table: &RecipientTable) -> Vec<&'a str> {
    let wanted: HashSet<&str> = table.iter().map(|row| row.key.as_str()).collect();
    let mut keys: Vec<&str> = index
        .by_key
        .keys()
        .map(String::as_str)
        .filter(|k| !wanted.contains(k))
        .collect();
    keys.sort_unstable();
    keys
}

/// Count rows with at least one matching document.
pub fn count_matched(index: &AttachmentIndex, table: &RecipientTable) -> usize {
    table
        .iter()
        .filter(|row| !lookup(index, &row.key).is_empty())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::builder::build_index;
    use crate::model::recipient::RecipientRow;

    fn sample_index() -> AttachmentIndex {
        build_index(
            vec![
                Document::new("ABC123_doc.pdf", b"a".to_vec()),
                Document::new("abc123_other.pdf", b"b".to_vec()),
                Document::new("ABC123_extra.pdf", b"c".to_vec()),
                Document::new("ORPHAN_x.pdf", b"d".to_vec()),
            ],
            '_',
        )
    }

    #[test]
    fn test_lookup_exact_and_ordered() {
        let index = sample_index();
        let names: Vec<&str> = lookup(&index, "ABC123")
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["ABC123_doc.pdf", "ABC123_extra.pdf"]);
    }

    #[test]
    fn test_lookup_trims_key_but_keeps_case() {
        let index = sample_index();
        assert_eq!(lookup(&index, "  ABC123 ").len(), 2);
        assert_eq!(lookup(&index, "abc123").len(), 1);
        assert!(lookup(&index, "Abc123").is_empty());
    }

    #[test]
    fn test_lookup_missing_is_empty() {
        let index = sample_index();
        assert!(lookup(&index, "ZZZ999").is_empty());
        assert!(lookup(&index, "").is_empty());
    }

    #[test]
    fn test_unclaimed_and_matched() {
        let index = sample_index();
        let table = RecipientTable::new(vec![
            RecipientRow::new("ABC123", "Alice", "a@x.com"),
            RecipientRow::new("ZZZ999", "Bob", "b@x.com"),
        ]);
        assert_eq!(unclaimed_keys(&index, &table), vec!["ORPHAN", "abc123"]);
        assert_eq!(count_matched(&index, &table), 1);
    }
}
