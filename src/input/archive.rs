//! Pull documents out of ZIP archives.
//!
//! Entries are read fully into memory. Only entries whose name ends in the
//! configured extension (case-insensitive) are kept; everything else is
//! ignored without a warning. An entry larger than [`MAX_ENTRY_SIZE`] makes
//! the whole archive invalid.

use std::io::{Cursor, Read};
use std::path::Path;

use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{MailerError, Result};
use crate::model::document::Document;

/// Largest uncompressed entry accepted (256 MB).
pub const MAX_ENTRY_SIZE: u64 = 256 * 1024 * 1024;

/// Extract every matching document from an in-memory archive.
///
/// `name` identifies the archive in errors and logs. Empty input yields an
/// empty list rather than an error.
pub fn extract(name: &str, bytes: &[u8], extension: &str) -> Result<Vec<Document>> {
    if bytes.is_empty() {
        debug!(archive = name, "Empty archive input, nothing to extract");
        return Ok(Vec::new());
    }

    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| MailerError::archive(name, e))?;
    let suffix = format!(".{}", extension.trim_start_matches('.').to_ascii_lowercase());
    let mut documents = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| MailerError::archive(name, e))?;

        if entry.is_dir() {
            continue;
        }

        let entry_name = entry.name().to_string();
        if !entry_name.to_ascii_lowercase().ends_with(&suffix) {
            continue;
        }

        // Header sizes are untrusted: check before allocating, and cap the
        // read in case the entry inflates past what it declared.
        let declared = entry.size();
        if declared > MAX_ENTRY_SIZE {
            warn!(archive = name, entry = %entry_name, size = declared, "Entry exceeds size limit");
            return Err(oversized(name));
        }
        let mut content = Vec::with_capacity(declared as usize);
        (&mut entry)
            .take(MAX_ENTRY_SIZE + 1)
            .read_to_end(&mut content)
            .map_err(|e| MailerError::archive(name, e.into()))?;
        if content.len() as u64 > MAX_ENTRY_SIZE {
            warn!(archive = name, entry = %entry_name, "Entry inflates past size limit");
            return Err(oversized(name));
        }

        documents.push(Document::new(basename(&entry_name), content));
    }

    info!(archive = name, count = documents.len(), "Extracted documents");
    Ok(documents)
}

/// Read an archive from disk and extract its documents.
pub fn extract_file(path: &Path, extension: &str) -> Result<Vec<Document>> {
    if !path.exists() {
        return Err(MailerError::FileNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|e| MailerError::io(path, e))?;
    extract(&path.display().to_string(), &bytes, extension)
}

/// Extract from several archives, concatenated in argument order.
///
/// The first unreadable archive aborts the whole call.
pub fn extract_all(paths: &[impl AsRef<Path>], extension: &str) -> Result<Vec<Document>> {
    let mut all = Vec::new();
    for path in paths {
        all.extend(extract_file(path.as_ref(), extension)?);
    }
    Ok(all)
}

fn oversized(name: &str) -> MailerError {
    MailerError::archive(name, ZipError::InvalidArchive("entry exceeds size limit".into()))
}

/// Last path component of a ZIP entry name.
///
/// ZIP names always use `/`, but archives built on Windows sometimes carry
/// backslashes too.
fn basename(entry_name: &str) -> &str {
    entry_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(entry_name)
}
