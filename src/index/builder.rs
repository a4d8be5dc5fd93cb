//! Index construction.

use tracing::debug;

use super::AttachmentIndex;
use crate::model::document::Document;

/// Key embedded in a document name: everything before the first
/// `separator`, trimmed. A name without the separator is its own key.
///
/// `"ABC123_payslip.pdf"` with `'_'` gives `"ABC123"`.
pub fn derive_key(display_name: &str, separator: char) -> &str {
    display_name
        .split_once(separator)
        .map_or(display_name, |(key, _)| key)
        .trim()
}

/// Group documents by derived key, preserving extraction order per key.
pub fn build_index(documents: Vec<Document>, separator: char) -> AttachmentIndex {
    let mut index = AttachmentIndex::default();

    for doc in documents {
        let key = derive_key(&doc.name, separator).to_string();
        index.by_key.entry(key).or_default().push(doc);
        index.document_count += 1;
    }

    debug!(
        keys = index.key_count(),
        documents = index.document_count,
        "Built attachment index"
    );
    index
}
