//! Attachment index: documents grouped by the key embedded in their names.

pub mod builder;
pub mod reader;

use std::collections::HashMap;

use crate::model::document::Document;

/// Lookup from key to the documents carrying it, in extraction order.
///
/// Every document lives under exactly one key. Duplicates are kept.
#[derive(Debug, Default)]
pub struct AttachmentIndex {
    pub(crate) by_key: HashMap<String, Vec<Document>>,
    pub(crate) document_count: usize,
}

impl AttachmentIndex {
    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }

    /// Total number of documents indexed.
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    pub fn is_empty(&self) -> bool {
        self.document_count == 0
    }
}
