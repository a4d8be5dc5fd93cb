//! `docmailer` — mail each spreadsheet recipient the documents that carry
//! their key.
//!
//! Documents come out of ZIP archives and are grouped by the token before
//! the first separator in their file name. Each spreadsheet row whose key
//! matches at least one document gets one message with those documents
//! attached, sent through a single authenticated SMTP session.

pub mod compose;
pub mod config;
pub mod error;
pub mod index;
pub mod input;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod send;
