//! Core data model types: recipient rows and extracted documents.

pub mod document;
pub mod recipient;
