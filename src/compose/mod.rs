//! Message composition: templates and the per-recipient message builder.

pub mod message;
pub mod template;
