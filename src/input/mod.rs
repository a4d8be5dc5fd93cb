//! Readers for the run's inputs: the recipient spreadsheet and the
//! document archives.

pub mod archive;
pub mod sheet;
